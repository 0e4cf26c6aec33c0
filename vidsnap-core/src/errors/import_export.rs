//! Import and export error types
//!
//! Every failure of an import or export session surfaces as one of these
//! variants, carrying the entity kind, old identifier and stage where known.
//!
//! # Examples
//!
//! ```rust
//! use vidsnap::errors::ImportExportError;
//! use vidsnap::snapshot::{EntityKind, ImportStage};
//!
//! let err = ImportExportError::Reference {
//!     stage: ImportStage::RegionRelations,
//!     kind: EntityKind::Region,
//!     old_id: 42,
//! };
//! assert_eq!(err.error_code(), "UNRESOLVED_REFERENCE");
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::snapshot::{EntityKind, ImportStage};

/// Import and export operation errors
#[derive(Error, Debug)]
pub enum ImportExportError {
    /// A required document field is absent or malformed
    #[error("Validation failed for {kind}{}: {message}", describe_old_id(.old_id))]
    Validation {
        kind: EntityKind,
        old_id: Option<i64>,
        message: String,
    },

    /// An old identifier does not resolve in its remap table
    #[error("Unresolved reference in {stage} stage: no imported {kind} with old id {old_id}")]
    Reference {
        stage: ImportStage,
        kind: EntityKind,
        old_id: i64,
    },

    /// The document uses a retired schema variant
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Renaming a binary asset failed
    #[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
    FileSystem {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing a snapshot side file failed
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Asset relocation failed after the video's entities were committed
    #[error("Video {video_id} was imported but the {} stage failed: {source}", ImportStage::Assets)]
    Relocation {
        video_id: i32,
        #[source]
        source: Box<ImportExportError>,
    },

    /// Requested entity does not exist
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i32 },

    /// Storage returned a different number of identifiers than records written
    #[error("Bulk write returned {actual} identifiers for {expected} {kind} records")]
    BatchMismatch {
        kind: EntityKind,
        expected: usize,
        actual: usize,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

fn describe_old_id(old_id: &Option<i64>) -> String {
    match old_id {
        Some(id) => format!(" {}", id),
        None => String::new(),
    }
}

impl ImportExportError {
    pub fn validation(kind: EntityKind, old_id: Option<i64>, message: impl Into<String>) -> Self {
        ImportExportError::Validation {
            kind,
            old_id,
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ImportExportError::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ImportExportError::Validation { .. }
                | ImportExportError::Reference { .. }
                | ImportExportError::UnsupportedFormat(_)
                | ImportExportError::Serialization(_)
        )
    }

    /// Check if this is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, ImportExportError::NotFound { .. })
    }

    /// Check if this is a server error (500-series)
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ImportExportError::FileSystem { .. }
                | ImportExportError::Io { .. }
                | ImportExportError::Relocation { .. }
                | ImportExportError::BatchMismatch { .. }
                | ImportExportError::Database(_)
        )
    }

    /// Get error code for API and CLI responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ImportExportError::Validation { .. } => "VALIDATION_FAILED",
            ImportExportError::Reference { .. } => "UNRESOLVED_REFERENCE",
            ImportExportError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            ImportExportError::FileSystem { .. } => "FILESYSTEM_ERROR",
            ImportExportError::Io { .. } => "IO_ERROR",
            ImportExportError::Relocation { .. } => "RELOCATION_FAILED",
            ImportExportError::NotFound { .. } => "NOT_FOUND",
            ImportExportError::BatchMismatch { .. } => "BATCH_MISMATCH",
            ImportExportError::Serialization(_) => "SERIALIZATION_ERROR",
            ImportExportError::Database(_) => "DATABASE_ERROR",
        }
    }
}
