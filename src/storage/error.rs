use thiserror::Error;

use crate::utils::ids::RecordId;

use super::namespace::Namespace;

/// Failures of the storage layer. Read failures are usually recovered to defaults by the
/// `*_or_default` style helpers; everything else reaches the caller.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored value under {key} is not valid: {source}")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Record {0} not found")]
    RecordNotFound(RecordId),

    #[error("Patch can't be applied: {0}")]
    InvalidPatch(#[source] serde_json::Error),

    #[error("Invalid backup format: {0}")]
    InvalidBackupFormat(String),

    /// Restore already removed every namespace when a write failed. Only `restored` hold data
    /// from the backup, the rest are empty.
    #[error("Restore failed while writing {namespace} (restored so far: {restored:?}): {source}")]
    PartialRestoreFailure {
        namespace: Namespace,
        restored: Vec<Namespace>,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;
