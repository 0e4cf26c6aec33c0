//! Snapshot document model
//!
//! A snapshot is the nested JSON form of one video's entity graph. Every
//! cross reference inside it uses the identifiers of the source database.

pub mod format;
pub mod kinds;
pub mod records;

pub use format::{classify, ensure_supported, DocumentFormat};
pub use kinds::{EntityKind, ImportStage};
pub use records::{
    EventRecord, FrameRecord, IndexEntriesRecord, RegionRecord, RegionRelationRecord,
    SegmentRecord, SnapshotDocument, TubeRecord, TubeRegionRelationRecord, TubeRelationRecord,
    VideoRecord,
};
