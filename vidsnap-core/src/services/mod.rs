pub mod asset_relocator;
pub mod bulk_writer;
pub mod export_service;
pub mod id_remapper;
pub mod import_service;
pub mod indexer_defaults;
pub mod record_builders;

pub use asset_relocator::{AssetKind, AssetMove, AssetRelocator, RelocationReport};
pub use bulk_writer::{BatchSink, BulkWriter, TableSink, VideoScopedEntity};
pub use export_service::ExportService;
pub use id_remapper::{BackReferences, IdRemapper};
pub use import_service::{EntityCounts, ImportService, ImportSummary};
