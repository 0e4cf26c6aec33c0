//! Error types for vidsnap-core
//!
//! Import and export sessions report failures through [`ImportExportError`].
//! Each variant carries enough context (entity kind, old identifier, stage,
//! file paths) to diagnose the failure without re-running the session.
//!
//! # Error Categories
//!
//! - **Validation**: a document record is missing a required field or is malformed
//! - **Reference**: an old identifier does not resolve in the session's remap table
//! - **UnsupportedFormat**: the document uses a retired schema variant
//! - **FileSystem**: an asset rename failed (carries both paths)
//! - **Io**: an out-of-band side file could not be loaded
//! - **Relocation**: asset moves failed after commit; names the imported video

pub mod import_export;

pub use import_export::ImportExportError;

/// Result type alias for import/export operations
pub type ImportExportResult<T> = Result<T, ImportExportError>;
