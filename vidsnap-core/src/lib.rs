pub mod config;
pub mod database;
pub mod errors;
pub mod services;
pub mod snapshot;

pub use config::SnapshotConfig;
pub use errors::{ImportExportError, ImportExportResult};
