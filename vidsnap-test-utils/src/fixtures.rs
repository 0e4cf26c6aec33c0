use serde_json::{json, Value};

/// Header fields shared by every fixture document.
pub fn video_header(name: &str, dataset: bool) -> Value {
    json!({
        "name": name,
        "dataset": dataset,
        "description": "fixture video",
        "metadata": { "source": "fixture" },
        "length_in_seconds": 12.5,
        "height": 360,
        "width": 640,
        "frames": 1,
        "segments": 0,
        "stream": false,
    })
}

pub fn event(id: i32, parent: Option<i32>, operation: &str) -> Value {
    let mut event = json!({
        "id": id,
        "operation": operation,
        "started": true,
        "completed": true,
        "errored": false,
        "error_message": "",
        "created": "2017-09-01T12:00:00Z",
        "duration": 1.5,
        "arguments": { "target": "frames" },
        "task_id": format!("task-{}", id),
    });
    if let Some(parent) = parent {
        event["parent"] = json!(parent);
    }
    event
}

pub fn frame(id: i32, frame_index: i32, regions: Vec<Value>) -> Value {
    json!({
        "id": id,
        "name": format!("{}.jpg", frame_index),
        "frame_index": frame_index,
        "subdir": "",
        "h": 360,
        "w": 640,
        "t": 0.0,
        "keyframe": true,
        "segment_index": 0,
        "region_list": regions,
    })
}

pub fn region(id: i32, frame_index: i32, object_name: &str) -> Value {
    json!({
        "id": id,
        "x": 10,
        "y": 20,
        "h": 30,
        "w": 40,
        "region_type": "D",
        "confidence": 0.9,
        "object_name": object_name,
        "full_frame": false,
        "text": "",
        "metadata": null,
        "materialized": true,
        "png": false,
        "frame_index": frame_index,
        "segment_index": 0,
    })
}

pub fn region_relation(id: i32, source: i32, target: i32) -> Value {
    json!({
        "id": id,
        "source_region": source,
        "target_region": target,
        "name": "overlaps",
        "weight": 0.5,
        "metadata": { "iou": 0.5 },
    })
}

/// Two events (11 is a child of 10), one frame 100 holding regions 200 and
/// 201, and one relation 200 -> 201.
pub fn scenario_snapshot() -> Value {
    let mut doc = video_header("scenario", false);
    doc["event_list"] = json!([event(10, None, "perform_detection"), event(11, Some(10), "perform_indexing")]);
    doc["frame_list"] = json!([frame(
        100,
        0,
        vec![region(200, 0, "person"), region(201, 0, "dog")]
    )]);
    doc["segment_list"] = json!([]);
    doc["region_relation_list"] = json!([region_relation(300, 200, 201)]);
    doc["index_entries_list"] = json!([]);
    doc
}

/// Index entries record owned by event 11 referencing region 200 and frame 100.
pub fn scenario_index_entries() -> Value {
    json!({
        "algorithm": "inception",
        "count": 1,
        "contains_detections": true,
        "contains_frames": false,
        "approximate": false,
        "created": "2017-09-01T12:05:00Z",
        "event": 11,
        "features_file_name": "inception.npy",
        "detection_name": "Frame",
        "entries": [{ "detection_primary_key": 200, "frame_primary_key": 100 }],
    })
}

/// `count` frames, each holding `regions_per_frame` regions, with old ids
/// starting at 1000 for frames and 5000 for regions.
pub fn dense_snapshot(count: i32, regions_per_frame: i32) -> Value {
    let mut doc = video_header("dense", true);
    let mut frames = Vec::new();
    let mut next_region = 5000;
    for i in 0..count {
        let mut regions = Vec::new();
        for _ in 0..regions_per_frame {
            regions.push(region(next_region, i, "car"));
            next_region += 1;
        }
        frames.push(frame(1000 + i, i, regions));
    }
    doc["frames"] = json!(count);
    doc["frame_list"] = Value::Array(frames);
    doc["event_list"] = json!([]);
    doc["index_entries_list"] = json!([]);
    doc
}
