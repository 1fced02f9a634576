//! Error types for RelDB core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in RelDB core operations.
///
/// `CoreError` is `Clone`: a single batch failure is reported to every call
/// that shared the failed transaction.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(reldb_storage::StorageError),

    /// Value codec error.
    #[error("codec error: {0}")]
    Codec(#[from] reldb_codec::CodecError),

    /// The configuration has no encoder.
    #[error("invalid encoder, cannot be empty")]
    EmptyEncoder,

    /// The stored element type does not match the store's element type.
    #[error("invalid type: store holds {stored}, opened as {requested}")]
    InvalidType {
        /// Type name recorded in the store.
        stored: String,
        /// Type name the store was opened with.
        requested: String,
    },

    /// A sequence number was requested from the no-op block writer.
    #[error("invalid block writer: block logging is disabled")]
    InvalidBlockWriter,

    /// The store is closed.
    #[error("store is closed")]
    Closed,

    /// The call succeeded, but the batch it ran in was aborted by a sibling.
    #[error("error occurred within batch, but not within this request: {cause}")]
    BatchAborted {
        /// The sibling failure that aborted the batch.
        cause: Box<CoreError>,
    },

    /// A call panicked while running inside a transaction.
    #[error("internal fault: {message}")]
    InternalFault {
        /// Panic payload, when it was a string.
        message: String,
    },

    /// An identifier is not a zero-padded decimal index.
    #[error("invalid identifier {id:?}: {reason}")]
    InvalidId {
        /// The identifier as supplied, including leading zeros.
        id: String,
        /// Why parsing failed.
        reason: String,
    },

    /// No entry exists under the identifier.
    #[error("entry not found: {id}")]
    EntryNotFound {
        /// The identifier that was looked up.
        id: String,
    },

    /// The relationship key was not declared when the store was opened.
    #[error("relationship not found: {key}")]
    RelationshipNotFound {
        /// The undeclared relationship key.
        key: String,
    },

    /// A relationship identifier would collide with the seek-id separator.
    #[error("invalid relationship id {id:?} under {key}: must not contain \"::\" or end with ':'")]
    InvalidRelationshipId {
        /// Relationship key the identifier was declared under.
        key: String,
        /// The rejected identifier.
        id: String,
    },

    /// A call asked for its transaction to be rolled back.
    #[error("transaction aborted: {reason}")]
    Aborted {
        /// Reason for abort.
        reason: String,
    },

    /// A block key or value does not fit the block frame's 32-bit length.
    #[error("block {part} of {len} bytes exceeds the frame limit")]
    BlockTooLarge {
        /// `"key"` or `"value"`.
        part: &'static str,
        /// Length of the oversized part.
        len: usize,
    },

    /// Stored data or the block log is corrupted.
    #[error("corruption: {message}")]
    Corruption {
        /// Description of the corruption.
        message: String,
    },
}

impl From<reldb_storage::StorageError> for CoreError {
    fn from(err: reldb_storage::StorageError) -> Self {
        if err.is_closed() {
            Self::Closed
        } else {
            Self::Storage(err)
        }
    }
}

impl CoreError {
    /// Creates a transaction aborted error.
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::Aborted {
            reason: reason.into(),
        }
    }

    /// Wraps the error that aborted a batch for a call that succeeded in it.
    pub fn batch_aborted(cause: CoreError) -> Self {
        Self::BatchAborted {
            cause: Box::new(cause),
        }
    }

    /// Creates an internal fault error.
    pub fn internal_fault(message: impl Into<String>) -> Self {
        Self::InternalFault {
            message: message.into(),
        }
    }

    /// Creates an invalid identifier error.
    pub fn invalid_id(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidId {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Creates an entry not found error.
    pub fn entry_not_found(id: impl Into<String>) -> Self {
        Self::EntryNotFound { id: id.into() }
    }

    /// Creates a relationship not found error.
    pub fn relationship_not_found(key: impl Into<String>) -> Self {
        Self::RelationshipNotFound { key: key.into() }
    }

    /// Creates a corruption error.
    pub fn corruption(message: impl Into<String>) -> Self {
        Self::Corruption {
            message: message.into(),
        }
    }

    /// Returns true if this error reports a closed store.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
