use serde_json::Value;

use crate::errors::{ImportExportError, ImportExportResult};

/// Frame keys used by retired document versions in place of `region_list`.
pub const LEGACY_FRAME_KEYS: [&str; 2] = ["detection_list", "annotation_list"];

/// Shape of an incoming snapshot document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentFormat {
    Current,
    /// A frame carries a legacy key instead of `region_list`.
    Legacy {
        frame_id: Option<i64>,
        key: &'static str,
    },
}

/// Classify a document before any stage touches storage.
pub fn classify(document: &Value) -> DocumentFormat {
    let frames = match document.get("frame_list").and_then(Value::as_array) {
        Some(frames) => frames,
        None => return DocumentFormat::Current,
    };

    for frame in frames {
        if frame.get("region_list").is_some() {
            continue;
        }
        if let Some(key) = LEGACY_FRAME_KEYS
            .iter()
            .copied()
            .find(|key| frame.get(*key).is_some())
        {
            return DocumentFormat::Legacy {
                frame_id: frame.get("id").and_then(Value::as_i64),
                key,
            };
        }
    }

    DocumentFormat::Current
}

/// Fail with `UnsupportedFormat` unless the document is current.
pub fn ensure_supported(document: &Value) -> ImportExportResult<()> {
    match classify(document) {
        DocumentFormat::Current => Ok(()),
        DocumentFormat::Legacy { frame_id, key } => {
            let frame = frame_id
                .map(|id| format!("frame {}", id))
                .unwrap_or_else(|| "a frame".to_string());
            Err(ImportExportError::UnsupportedFormat(format!(
                "{} carries legacy `{}` instead of `region_list`",
                frame, key
            )))
        }
    }
}
