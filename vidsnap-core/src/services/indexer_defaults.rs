//! Index-entry defaults and payload rewriting.

use std::path::Path;

use serde_json::{Map, Value};

use crate::errors::{ImportExportError, ImportExportResult};
use crate::services::id_remapper::IdRemapper;
use crate::snapshot::{EntityKind, ImportStage};

/// Indexer checksums for documents written before the field existed.
pub const KNOWN_INDEXER_SHASUMS: &[(&str, &str)] = &[
    ("inception", "48b026cf77dfbd5d9841cca3ee550ef0ee5a0751"),
    ("facenet", "9f99caccbc75dcee8cb0a55a0551d7c5cb8a6836"),
    ("vgg", "52723231e796dd06fafd190957c8a3b5a69e009c"),
];

pub const UNKNOWN_INDEXER_SHASUM: &str = "UNKNOWN";

/// Directory, relative to the project root, holding out-of-band payloads.
pub const INDEXES_DIR: &str = "indexes";

const VIDEO_KEY: &str = "video_primary_key";
const FRAME_KEY: &str = "frame_primary_key";
const DETECTION_KEY: &str = "detection_primary_key";

/// The declared checksum, else the known one for `algorithm`, else the sentinel.
pub fn resolve_indexer_shasum(algorithm: &str, declared: Option<&str>) -> String {
    if let Some(declared) = declared {
        return declared.to_string();
    }
    match KNOWN_INDEXER_SHASUMS
        .iter()
        .find(|(name, _)| *name == algorithm)
    {
        Some((_, shasum)) => (*shasum).to_string(),
        None => {
            tracing::warn!(
                "No indexer checksum known for algorithm '{}', using {}",
                algorithm,
                UNKNOWN_INDEXER_SHASUM
            );
            UNKNOWN_INDEXER_SHASUM.to_string()
        }
    }
}

/// Read an out-of-band entries payload from `{root}/indexes/{file_name}`.
pub fn load_entries(root: &Path, file_name: &str) -> ImportExportResult<Value> {
    let path = root.join(INDEXES_DIR).join(file_name);
    let raw = std::fs::read_to_string(&path).map_err(|err| ImportExportError::io(&path, err))?;
    serde_json::from_str(&raw).map_err(|err| {
        ImportExportError::io(
            &path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, err),
        )
    })
}

/// Point every object element of `entries` at the new video, frame and region ids.
///
/// Elements that are not objects pass through unchanged.
pub fn rewrite_entries(entries: Value, video_id: i32, remapper: &IdRemapper) -> ImportExportResult<Value> {
    let elements = match entries {
        Value::Array(elements) => elements,
        other => {
            return Err(ImportExportError::validation(
                EntityKind::IndexEntries,
                None,
                format!("`entries` must be an array, found {}", json_type(&other)),
            ))
        }
    };

    elements
        .into_iter()
        .map(|element| match element {
            Value::Object(map) => rewrite_entry(map, video_id, remapper).map(Value::Object),
            other => Ok(other),
        })
        .collect::<ImportExportResult<Vec<_>>>()
        .map(Value::Array)
}

fn rewrite_entry(
    mut entry: Map<String, Value>,
    video_id: i32,
    remapper: &IdRemapper,
) -> ImportExportResult<Map<String, Value>> {
    entry.insert(VIDEO_KEY.to_string(), Value::from(video_id));
    for (key, kind) in [(DETECTION_KEY, EntityKind::Region), (FRAME_KEY, EntityKind::Frame)] {
        let old_id = match entry.get(key) {
            None | Some(Value::Null) => continue,
            Some(value) => entry_id(key, value)?,
        };
        let new_id = remapper.resolve(ImportStage::IndexEntries, kind, old_id)?;
        entry.insert(key.to_string(), Value::from(new_id));
    }
    Ok(entry)
}

fn entry_id(key: &str, value: &Value) -> ImportExportResult<i32> {
    value
        .as_i64()
        .and_then(|id| i32::try_from(id).ok())
        .ok_or_else(|| {
            ImportExportError::validation(
                EntityKind::IndexEntries,
                None,
                format!("`{}` must be an integer identifier, found {}", key, value),
            )
        })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vidsnap_test_utils::TempDir;

    fn remapper() -> IdRemapper {
        let mut remapper = IdRemapper::new();
        remapper.record(EntityKind::Region, 200, 2);
        remapper.record(EntityKind::Frame, 100, 1);
        remapper
    }

    #[test]
    fn known_algorithms_get_their_checksum() {
        assert_eq!(
            resolve_indexer_shasum("inception", None),
            "48b026cf77dfbd5d9841cca3ee550ef0ee5a0751"
        );
        assert_eq!(
            resolve_indexer_shasum("vgg", None),
            "52723231e796dd06fafd190957c8a3b5a69e009c"
        );
    }

    #[test]
    fn declared_checksum_wins_and_unknown_falls_back() {
        assert_eq!(resolve_indexer_shasum("facenet", Some("abc")), "abc");
        assert_eq!(resolve_indexer_shasum("sift", None), UNKNOWN_INDEXER_SHASUM);
    }

    #[test]
    fn rewrites_frame_and_detection_keys() {
        let entries = json!([
            { "detection_primary_key": 200, "frame_primary_key": 100, "score": 0.3 },
            "opaque",
            { "frame_primary_key": 100 },
        ]);
        let rewritten = rewrite_entries(entries, 7, &remapper()).unwrap();
        assert_eq!(
            rewritten,
            json!([
                { "detection_primary_key": 2, "frame_primary_key": 1, "score": 0.3, "video_primary_key": 7 },
                "opaque",
                { "frame_primary_key": 1, "video_primary_key": 7 },
            ])
        );
    }

    #[test]
    fn unresolved_entry_is_a_hard_failure() {
        let entries = json!([{ "detection_primary_key": 999 }]);
        let err = rewrite_entries(entries, 7, &remapper()).unwrap_err();
        assert!(matches!(
            err,
            ImportExportError::Reference {
                stage: ImportStage::IndexEntries,
                kind: EntityKind::Region,
                old_id: 999
            }
        ));
    }

    #[test]
    fn non_integer_key_is_a_validation_error() {
        let entries = json!([{ "frame_primary_key": "100" }]);
        let err = rewrite_entries(entries, 7, &remapper()).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn entries_must_be_an_array() {
        let err = rewrite_entries(json!({ "a": 1 }), 7, &remapper()).unwrap_err();
        assert!(err.to_string().contains("an object"));
    }

    #[test]
    fn loads_out_of_band_payload() {
        let dir = TempDir::new().unwrap();
        dir.write("indexes/inception.json", br#"[{"frame_primary_key": 100}]"#)
            .unwrap();
        let entries = load_entries(dir.path(), "inception.json").unwrap();
        assert_eq!(entries, json!([{ "frame_primary_key": 100 }]));

        let err = load_entries(dir.path(), "missing.json").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn malformed_payload_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        dir.write("indexes/bad.json", b"not json").unwrap();
        let err = load_entries(dir.path(), "bad.json").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
