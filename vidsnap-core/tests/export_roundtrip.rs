use std::collections::BTreeSet;

use anyhow::Result;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use vidsnap::database::migrations::Migrator;
use vidsnap::services::{ExportService, IdRemapper, ImportService};
use vidsnap::snapshot::{EntityKind, SnapshotDocument};
use vidsnap_test_utils::{fixtures, TestDb};

async fn setup_db() -> Result<DatabaseConnection> {
    Ok(TestDb::new_in_memory()
        .connect_migrated::<Migrator>()
        .await?)
}

/// The scenario plus a segment, a frameless region, tubes and index entries.
fn full_snapshot() -> Value {
    let mut document = fixtures::scenario_snapshot();
    document["segment_list"] = json!([{
        "id": 40,
        "segment_index": 0,
        "start_time": 0.0,
        "end_time": 4.0,
        "frame_count": 96,
        "start_index": 0,
        "metadata": { "codec": "h264" },
        "framelist": { "0": 0.0 },
        "event": 10,
    }]);
    let mut frame_2 = fixtures::frame(101, 24, vec![fixtures::region(202, 24, "person")]);
    frame_2["event"] = json!(10);
    document["frame_list"]
        .as_array_mut()
        .expect("frame list")
        .push(frame_2);
    let mut whole_video = fixtures::region(250, 0, "scene");
    whole_video["full_frame"] = json!(true);
    document["region_list"] = json!([whole_video]);
    document["tube_list"] = json!([{
        "id": 60,
        "start_frame_index": 0,
        "end_frame_index": 24,
        "start_region": 200,
        "end_region": 202,
        "text": "walker",
        "event": 11,
    }]);
    document["tube_relation_list"] = json!([{ "id": 61, "source_tube": 60, "target_tube": 60 }]);
    document["tube_region_relation_list"] = json!([{ "id": 62, "region": 201, "tube": 60 }]);
    document["index_entries_list"] = json!([fixtures::scenario_index_entries()]);
    document
}

fn id_pairs<T>(items: &[T], pair: impl Fn(&T) -> (i32, i32)) -> BTreeSet<(i32, i32)> {
    items.iter().map(pair).collect()
}

fn remap_pairs(
    pairs: BTreeSet<(i32, i32)>,
    remapper: &IdRemapper,
    left: EntityKind,
    right: EntityKind,
) -> BTreeSet<(i32, i32)> {
    pairs
        .into_iter()
        .map(|(a, b)| {
            (
                remapper.get(left, a).expect("left id remapped"),
                remapper.get(right, b).expect("right id remapped"),
            )
        })
        .collect()
}

#[tokio::test]
async fn export_nests_regions_and_orders_frames() -> Result<()> {
    let db = setup_db().await?;
    let summary = ImportService::new(db.clone())
        .import_snapshot(&full_snapshot(), None, None)
        .await?;
    let remap = &summary.remapper;

    let document = ExportService::new(db.clone())
        .export_video(summary.video_id)
        .await?;

    assert_eq!(document.video.name, "scenario");
    assert_eq!(document.event_list.len(), 2);
    assert_eq!(document.segment_list.len(), 1);
    assert_eq!(document.frame_list.len(), 2);
    assert_eq!(document.region_count(), 4);

    let frame_indexes: Vec<i32> = document.frame_list.iter().map(|f| f.frame_index).collect();
    assert_eq!(frame_indexes, vec![0, 24]);

    let first_frame = &document.frame_list[0];
    let nested: Vec<Option<i32>> = first_frame.region_list.iter().map(|r| r.id).collect();
    assert_eq!(
        nested,
        vec![
            remap.get(EntityKind::Region, 200),
            remap.get(EntityKind::Region, 201)
        ]
    );

    assert_eq!(document.region_list.len(), 1);
    assert!(document.region_list[0].full_frame);
    assert_eq!(document.region_list[0].id, remap.get(EntityKind::Region, 250));

    assert_eq!(document.tube_list[0].start_region, remap.get(EntityKind::Region, 200));
    assert_eq!(document.index_entries_list[0].event, remap.get(EntityKind::Event, 11).expect("event"));
    Ok(())
}

#[tokio::test]
async fn exported_json_parses_back_to_the_same_document() -> Result<()> {
    let db = setup_db().await?;
    let summary = ImportService::new(db.clone())
        .import_snapshot(&full_snapshot(), None, None)
        .await?;
    let export = ExportService::new(db.clone());

    let typed = export.export_video(summary.video_id).await?;
    let raw = export.export_video_json(summary.video_id).await?;

    assert!(raw.get("region_list").is_some());
    assert!(raw["frame_list"][0].get("region_list").is_some());
    assert_eq!(SnapshotDocument::from_value(&raw)?, typed);
    Ok(())
}

#[tokio::test]
async fn reimport_yields_an_isomorphic_graph() -> Result<()> {
    let source = setup_db().await?;
    let original = ImportService::new(source.clone())
        .import_snapshot(&full_snapshot(), None, None)
        .await?;
    let exported = ExportService::new(source.clone())
        .export_video_json(original.video_id)
        .await?;
    let before = SnapshotDocument::from_value(&exported)?;

    let target = setup_db().await?;
    // shift every id space so old and new ids differ
    ImportService::new(target.clone())
        .import_snapshot(&fixtures::dense_snapshot(3, 2), None, None)
        .await?;
    let copy = ImportService::new(target.clone())
        .import_snapshot(&exported, None, None)
        .await?;
    let after = ExportService::new(target.clone())
        .export_video(copy.video_id)
        .await?;
    let remap = &copy.remapper;

    assert_eq!(copy.counts, original.counts);
    assert_eq!(after.event_list.len(), before.event_list.len());
    assert_eq!(after.region_count(), before.region_count());
    assert_eq!(after.tube_region_relation_list.len(), before.tube_region_relation_list.len());

    let parents = |doc: &SnapshotDocument| -> BTreeSet<(i32, i32)> {
        doc.event_list
            .iter()
            .filter_map(|e| e.parent.map(|p| (e.id, p)))
            .collect()
    };
    assert_eq!(
        remap_pairs(parents(&before), remap, EntityKind::Event, EntityKind::Event),
        parents(&after)
    );

    let region_frames = |doc: &SnapshotDocument| -> BTreeSet<(i32, i32)> {
        doc.frame_list
            .iter()
            .flat_map(|f| f.region_list.iter().filter_map(move |r| r.id.map(|id| (id, f.id))))
            .collect()
    };
    assert_eq!(
        remap_pairs(region_frames(&before), remap, EntityKind::Region, EntityKind::Frame),
        region_frames(&after)
    );

    let relations = |doc: &SnapshotDocument| {
        id_pairs(&doc.region_relation_list, |r| (r.source_region, r.target_region))
    };
    assert_eq!(
        remap_pairs(relations(&before), remap, EntityKind::Region, EntityKind::Region),
        relations(&after)
    );

    let tube_regions = |doc: &SnapshotDocument| {
        id_pairs(&doc.tube_region_relation_list, |r| (r.tube, r.region))
    };
    assert_eq!(
        remap_pairs(tube_regions(&before), remap, EntityKind::Tube, EntityKind::Region),
        tube_regions(&after)
    );

    let segment_events = |doc: &SnapshotDocument| {
        id_pairs(&doc.segment_list, |s| (s.id, s.event.unwrap_or_default()))
    };
    assert_eq!(
        remap_pairs(segment_events(&before), remap, EntityKind::Segment, EntityKind::Event),
        segment_events(&after)
    );

    let before_entry = &before.index_entries_list[0].entries.as_ref().expect("entries")[0];
    let after_entry = &after.index_entries_list[0].entries.as_ref().expect("entries")[0];
    let old_region = before_entry["detection_primary_key"].as_i64().expect("key") as i32;
    let old_frame = before_entry["frame_primary_key"].as_i64().expect("key") as i32;
    assert_eq!(
        after_entry["detection_primary_key"],
        json!(remap.get(EntityKind::Region, old_region))
    );
    assert_eq!(
        after_entry["frame_primary_key"],
        json!(remap.get(EntityKind::Frame, old_frame))
    );
    assert_eq!(after_entry["video_primary_key"], json!(copy.video_id));
    Ok(())
}

#[tokio::test]
async fn exporting_unknown_video_is_not_found() -> Result<()> {
    let db = setup_db().await?;
    let err = ExportService::new(db.clone())
        .export_video(404)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "video 404 not found");
    Ok(())
}
