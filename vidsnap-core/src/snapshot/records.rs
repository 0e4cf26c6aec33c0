//! Typed records of the snapshot document.
//!
//! Import parses each record on its own from the raw JSON so a malformed
//! record is reported with its kind and old id. Export builds the same
//! types and serializes them, so the two directions share one shape.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::kinds::EntityKind;
use crate::errors::{ImportExportError, ImportExportResult};

/// Header fields describing the root video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub name: String,
    pub dataset: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub length_in_seconds: f64,
    pub height: i32,
    pub width: i32,
    pub frames: i32,
    #[serde(default)]
    pub segments: i32,
    #[serde(default)]
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<i32>,
    pub operation: String,
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub errored: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub start_ts: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: Option<f64>,
    /// Older documents name the duration `seconds`.
    #[serde(default, skip_serializing)]
    pub seconds: Option<f64>,
    #[serde(default)]
    pub arguments: Option<Value>,
    #[serde(default)]
    pub task_id: Option<String>,
}

impl EventRecord {
    pub fn effective_duration(&self) -> f64 {
        self.seconds.or(self.duration).unwrap_or(-1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub id: i32,
    pub segment_index: i32,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub end_time: f64,
    #[serde(default)]
    pub frame_count: i32,
    #[serde(default)]
    pub start_index: i32,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub framelist: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub id: i32,
    #[serde(default)]
    pub name: Option<String>,
    pub frame_index: i32,
    #[serde(default)]
    pub subdir: Option<String>,
    #[serde(default)]
    pub h: i32,
    #[serde(default)]
    pub w: i32,
    #[serde(default)]
    pub t: Option<f64>,
    #[serde(default)]
    pub keyframe: bool,
    #[serde(default)]
    pub segment_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<i32>,
    /// Parsed region by region, see [`parse_frame`].
    #[serde(default, skip_deserializing)]
    pub region_list: Vec<RegionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub h: i32,
    #[serde(default)]
    pub w: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon_points: Option<Value>,
    pub region_type: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub object_name: String,
    #[serde(default)]
    pub full_frame: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, skip_serializing)]
    pub metadata_text: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing)]
    pub metadata_json: Option<Value>,
    #[serde(default)]
    pub materialized: bool,
    #[serde(default)]
    pub png: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<i32>,
    #[serde(default)]
    pub frame_index: Option<i32>,
    #[serde(default, skip_serializing)]
    pub parent_frame_index: Option<i32>,
    #[serde(default)]
    pub segment_index: Option<i32>,
    #[serde(default, skip_serializing)]
    pub parent_segment_index: Option<i32>,
}

impl RegionRecord {
    pub fn effective_text(&self) -> String {
        self.text
            .clone()
            .or_else(|| self.metadata_text.clone())
            .unwrap_or_default()
    }

    pub fn effective_metadata(&self) -> Option<Value> {
        self.metadata.clone().or_else(|| self.metadata_json.clone())
    }

    /// `owner_frame_index` is the index of the frame the region is nested under.
    pub fn effective_frame_index(&self, owner_frame_index: Option<i32>) -> i32 {
        self.parent_frame_index
            .or(self.frame_index)
            .or(owner_frame_index)
            .unwrap_or(-1)
    }

    pub fn effective_segment_index(&self) -> i32 {
        self.parent_segment_index
            .or(self.segment_index)
            .unwrap_or(-1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRelationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub source_region: i32,
    pub target_region: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TubeRecord {
    pub id: i32,
    pub start_frame_index: i32,
    pub end_frame_index: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_region: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_region: Option<i32>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TubeRelationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub source_tube: i32,
    pub target_tube: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TubeRegionRelationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub region: i32,
    pub tube: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntriesRecord {
    pub algorithm: String,
    #[serde(default)]
    pub indexer_shasum: Option<String>,
    #[serde(default)]
    pub approximator_shasum: Option<String>,
    pub count: i32,
    pub contains_detections: bool,
    pub contains_frames: bool,
    #[serde(default)]
    pub approximate: bool,
    pub created: DateTime<Utc>,
    pub event: i32,
    #[serde(default)]
    pub features_file_name: String,
    /// Name of a payload under `indexes/` used when `entries` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Value>,
    #[serde(default)]
    pub detection_name: String,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// The whole nested snapshot of one video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotDocument {
    #[serde(flatten)]
    pub video: VideoRecord,
    pub event_list: Vec<EventRecord>,
    pub segment_list: Vec<SegmentRecord>,
    pub frame_list: Vec<FrameRecord>,
    /// Regions that belong to no frame.
    pub region_list: Vec<RegionRecord>,
    pub region_relation_list: Vec<RegionRelationRecord>,
    pub tube_list: Vec<TubeRecord>,
    pub tube_relation_list: Vec<TubeRelationRecord>,
    pub tube_region_relation_list: Vec<TubeRegionRelationRecord>,
    pub index_entries_list: Vec<IndexEntriesRecord>,
}

impl SnapshotDocument {
    /// Parse a raw document record by record.
    ///
    /// Absent or null lists are empty. The document format must already be
    /// classified as current; legacy frames simply carry no regions here.
    pub fn from_value(document: &Value) -> ImportExportResult<Self> {
        if !document.is_object() {
            return Err(ImportExportError::validation(
                EntityKind::Video,
                None,
                "snapshot document must be a JSON object",
            ));
        }

        let video = parse_record::<VideoRecord>(EntityKind::Video, document)?;

        let frame_list = list_field(document, "frame_list", EntityKind::Frame)?
            .iter()
            .map(parse_frame)
            .collect::<ImportExportResult<Vec<_>>>()?;

        Ok(Self {
            video,
            event_list: parse_list(document, "event_list", EntityKind::Event)?,
            segment_list: parse_list(document, "segment_list", EntityKind::Segment)?,
            frame_list,
            region_list: parse_list(document, "region_list", EntityKind::Region)?,
            region_relation_list: parse_list(
                document,
                "region_relation_list",
                EntityKind::RegionRelation,
            )?,
            tube_list: parse_list(document, "tube_list", EntityKind::Tube)?,
            tube_relation_list: parse_list(
                document,
                "tube_relation_list",
                EntityKind::TubeRelation,
            )?,
            tube_region_relation_list: parse_list(
                document,
                "tube_region_relation_list",
                EntityKind::TubeRegionRelation,
            )?,
            index_entries_list: parse_list(
                document,
                "index_entries_list",
                EntityKind::IndexEntries,
            )?,
        })
    }

    pub fn region_count(&self) -> usize {
        self.region_list.len()
            + self
                .frame_list
                .iter()
                .map(|frame| frame.region_list.len())
                .sum::<usize>()
    }
}

/// Parse a frame and then each nested region on its own.
pub fn parse_frame(value: &Value) -> ImportExportResult<FrameRecord> {
    let mut frame = parse_record::<FrameRecord>(EntityKind::Frame, value)?;
    frame.region_list = list_field(value, "region_list", EntityKind::Frame)?
        .iter()
        .map(|region| parse_record::<RegionRecord>(EntityKind::Region, region))
        .collect::<ImportExportResult<Vec<_>>>()?;
    Ok(frame)
}

/// Deserialize one record, mapping failures to a validation error that names
/// the kind and, when readable, the record's old id.
pub fn parse_record<T: DeserializeOwned>(kind: EntityKind, value: &Value) -> ImportExportResult<T> {
    T::deserialize(value)
        .map_err(|err| ImportExportError::validation(kind, record_old_id(value), err.to_string()))
}

fn parse_list<T: DeserializeOwned>(
    document: &Value,
    key: &str,
    kind: EntityKind,
) -> ImportExportResult<Vec<T>> {
    list_field(document, key, kind)?
        .iter()
        .map(|value| parse_record(kind, value))
        .collect()
}

fn list_field<'a>(value: &'a Value, key: &str, kind: EntityKind) -> ImportExportResult<&'a [Value]> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(ImportExportError::validation(
            kind,
            record_old_id(value),
            format!("`{}` must be an array", key),
        )),
    }
}

fn record_old_id(value: &Value) -> Option<i64> {
    value.get("id").and_then(Value::as_i64)
}
