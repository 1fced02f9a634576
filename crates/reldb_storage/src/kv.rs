//! Key-value backend trait definitions.

use crate::error::StorageResult;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// A key and its value, as yielded by a [`RawCursor`].
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// An ordered, transactional key-value backend.
///
/// Keys live in named buckets and are ordered bytewise within a bucket.
/// Buckets are created implicitly by the first write into them; reading or
/// iterating a bucket that was never written behaves like an empty bucket.
///
/// # Invariants
///
/// - At most one write transaction is open at a time; `begin(true)` blocks
///   until the previous writer has committed or rolled back
/// - Read transactions observe the state as of their `begin`
/// - After [`Backend::close`], every `begin` fails with
///   [`StorageError::Closed`](crate::StorageError::Closed)
pub trait Backend: Send + Sync {
    /// Begins a transaction. Write transactions are exclusive.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Closed` once the backend has been closed.
    fn begin(&self, writable: bool) -> StorageResult<Box<dyn BackendTxn + '_>>;

    /// Closes the backend. Open transactions may finish; new ones fail.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot release its resources.
    fn close(&self) -> StorageResult<()>;

    /// Returns true once [`Backend::close`] has been called.
    fn is_closed(&self) -> bool;
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn begin(&self, writable: bool) -> StorageResult<Box<dyn BackendTxn + '_>> {
        (**self).begin(writable)
    }

    fn close(&self) -> StorageResult<()> {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

/// One backend transaction.
///
/// Dropping a transaction without committing discards its writes.
pub trait BackendTxn {
    /// Returns true if this transaction may write.
    fn is_writable(&self) -> bool;

    /// Reads the value stored under `key` in `bucket`.
    fn get(&self, bucket: &[u8], key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Stores `value` under `key` in `bucket`, creating the bucket if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ReadOnly` for read transactions.
    fn put(&mut self, bucket: &[u8], key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Removes `key` from `bucket`. Returns true if the key existed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ReadOnly` for read transactions.
    fn delete(&mut self, bucket: &[u8], key: &[u8]) -> StorageResult<bool>;

    /// Opens a cursor over `bucket`.
    fn cursor(&self, bucket: &[u8]) -> StorageResult<Box<dyn RawCursor + '_>>;

    /// Atomically publishes all writes made by this transaction.
    fn commit(self: Box<Self>) -> StorageResult<()>;

    /// Discards all writes made by this transaction.
    fn rollback(self: Box<Self>) -> StorageResult<()>;
}

/// A positioned cursor over one bucket.
///
/// Every method returns the entry the cursor lands on, or `None` when it
/// moves past either end. Once past an end, `next` and `prev` keep returning
/// `None` until the cursor is repositioned by `first`, `last` or a seek.
pub trait RawCursor {
    /// Moves to the smallest key.
    fn first(&mut self) -> StorageResult<Option<KeyValue>>;

    /// Moves to the largest key.
    fn last(&mut self) -> StorageResult<Option<KeyValue>>;

    /// Moves to the next larger key.
    fn next(&mut self) -> StorageResult<Option<KeyValue>>;

    /// Moves to the next smaller key.
    fn prev(&mut self) -> StorageResult<Option<KeyValue>>;

    /// Moves to the smallest key greater than or equal to `key`.
    fn seek(&mut self, key: &[u8]) -> StorageResult<Option<KeyValue>>;

    /// Moves to the largest key less than or equal to `key`.
    fn seek_reverse(&mut self, key: &[u8]) -> StorageResult<Option<KeyValue>>;
}

/// Opens backends for a store.
///
/// An initializer is the pluggable part of store configuration: it decides
/// which concrete backend a store runs on.
pub trait Initializer: Send + Sync + fmt::Debug {
    /// Opens (or creates) the backend for the store called `name` in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be opened.
    fn open(&self, dir: &Path, name: &str) -> StorageResult<Box<dyn Backend>>;
}
