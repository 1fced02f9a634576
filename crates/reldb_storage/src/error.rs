//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
///
/// Storage errors are cheap to clone so that one failure can be reported to
/// every caller that shared the failed transaction.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),

    /// Attempted to read beyond the end of a log.
    #[error("read beyond end of storage: offset {offset}, len {len}, size {size}")]
    ReadPastEnd {
        /// The requested read offset.
        offset: u64,
        /// The requested read length.
        len: usize,
        /// The current storage size.
        size: u64,
    },

    /// The stored bytes are corrupted.
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// The backend has been closed and can no longer be used.
    #[error("storage is closed")]
    Closed,

    /// A write was attempted through a read-only transaction.
    #[error("transaction is read-only")]
    ReadOnly,

    /// Another process holds the lock on a log file.
    #[error("log file locked by another process: {}", .0.display())]
    Locked(PathBuf),
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl StorageError {
    /// Returns true if this error reports a closed backend.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
