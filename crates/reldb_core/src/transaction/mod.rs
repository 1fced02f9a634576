//! Transactions.
//!
//! A [`Transaction`] binds one backend transaction to one block writer. It
//! is the unit of atomicity for a flushed batch: every call in the batch sees
//! the same transaction, and all of their writes commit or roll back
//! together.
//!
//! ## Layout
//!
//! | bucket        | key                          | value              |
//! |---------------|------------------------------|--------------------|
//! | `entries`     | entry identifier             | encoded entry      |
//! | `meta`        | `index`, `type`              | next index, type   |
//! | `rel:<key>`   | `relationship::entry` seek id| empty              |
//!
//! Entry and metadata writes are mirrored to the block writer. Relationship
//! rows are derived from entries and are not logged.

mod guard;
mod read;

pub use guard::guarded_call;
pub use read::Page;

use crate::block::{BlockType, BlockWriter};
use crate::cursor::{EntryCursor, IdCursor};
use crate::error::{CoreError, CoreResult};
use crate::id::{format_id, is_valid_relationship_id, join_seek_id};
use crate::record::Record;
use reldb_codec::Encoder;
use reldb_storage::BackendTxn;
use std::marker::PhantomData;
use std::sync::Arc;

pub(crate) const ENTRIES_BUCKET: &[u8] = b"entries";
pub(crate) const META_BUCKET: &[u8] = b"meta";
pub(crate) const META_INDEX_KEY: &[u8] = b"index";
pub(crate) const META_TYPE_KEY: &[u8] = b"type";

const RELATIONSHIP_BUCKET_PREFIX: &str = "rel:";

/// Store-wide settings every transaction reads.
#[derive(Debug)]
pub(crate) struct Context {
    pub(crate) encoder: Arc<dyn Encoder>,
    pub(crate) relationship_keys: Vec<String>,
    pub(crate) index_length: usize,
}

impl Context {
    fn relationship_bucket(&self, key: &str) -> CoreResult<Vec<u8>> {
        if !self.relationship_keys.iter().any(|k| k == key) {
            return Err(CoreError::relationship_not_found(key));
        }
        Ok(format!("{RELATIONSHIP_BUCKET_PREFIX}{key}").into_bytes())
    }
}

/// A transaction over a store of `T`.
pub struct Transaction<'t, T> {
    txn: Box<dyn BackendTxn + 't>,
    blocks: &'t mut dyn BlockWriter,
    ctx: &'t Context,
    _marker: PhantomData<fn() -> T>,
}

impl<'t, T: Record> Transaction<'t, T> {
    pub(crate) fn new(
        txn: Box<dyn BackendTxn + 't>,
        blocks: &'t mut dyn BlockWriter,
        ctx: &'t Context,
    ) -> Self {
        Self {
            txn,
            blocks,
            ctx,
            _marker: PhantomData,
        }
    }

    pub(crate) fn into_inner(self) -> Box<dyn BackendTxn + 't> {
        self.txn
    }

    /// Returns true if this transaction may write.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.txn.is_writable()
    }

    /// Inserts `entry` under a newly assigned identifier and returns it.
    ///
    /// The identifier is also set on `entry`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::RelationshipNotFound` if the entry declares an
    /// unknown relationship key, or a storage or codec error.
    pub fn new_entry(&mut self, entry: &mut T) -> CoreResult<String> {
        let index = self.next_entry_index()?;
        let id = format_id(index, self.ctx.index_length);
        entry.set_id(id.clone());
        self.write_entry(&id, entry, None)?;
        Ok(id)
    }

    /// Reads the entry stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EntryNotFound` if there is no such entry.
    pub fn get(&self, id: &str) -> CoreResult<T> {
        let bytes = self
            .txn
            .get(ENTRIES_BUCKET, id.as_bytes())?
            .ok_or_else(|| CoreError::entry_not_found(id))?;
        Ok(reldb_codec::unmarshal(self.ctx.encoder.as_ref(), &bytes)?)
    }

    /// Returns true if an entry is stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lookup fails.
    pub fn exists(&self, id: &str) -> CoreResult<bool> {
        Ok(self.txn.get(ENTRIES_BUCKET, id.as_bytes())?.is_some())
    }

    /// Replaces the entry stored under `id`, updating its relationships.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EntryNotFound` if there is no such entry.
    pub fn edit(&mut self, id: &str, entry: &mut T) -> CoreResult<()> {
        let previous = self.get(id)?;
        entry.set_id(id.to_string());
        self.write_entry(id, entry, Some(&previous))
    }

    /// Removes the entry stored under `id` and returns it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EntryNotFound` if there is no such entry.
    pub fn remove(&mut self, id: &str) -> CoreResult<T> {
        let previous = self.get(id)?;
        self.txn.delete(ENTRIES_BUCKET, id.as_bytes())?;
        for (key, relationship_ids) in previous.relationships().iter() {
            let bucket = self.ctx.relationship_bucket(key)?;
            for relationship_id in relationship_ids {
                self.txn
                    .delete(&bucket, join_seek_id(relationship_id, id).as_bytes())?;
            }
        }
        self.blocks
            .add_block(BlockType::DeleteEntry, id.as_bytes(), &[])?;
        Ok(previous)
    }

    /// Cursor over every entry.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the cursor cannot be opened.
    pub fn cursor(&self) -> CoreResult<EntryCursor<'_, T>> {
        let raw = self.txn.cursor(ENTRIES_BUCKET)?;
        Ok(EntryCursor::new(raw, self.ctx.encoder.as_ref()))
    }

    /// Identifier cursor over every entry.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the cursor cannot be opened.
    pub fn id_cursor(&self) -> CoreResult<IdCursor<'_>> {
        Ok(IdCursor::unscoped(self.txn.cursor(ENTRIES_BUCKET)?))
    }

    /// Identifier cursor over the entries related to `relationship_id`
    /// under `relationship_key`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::RelationshipNotFound` for an undeclared key.
    pub fn relationship_cursor(
        &self,
        relationship_key: &str,
        relationship_id: &str,
    ) -> CoreResult<IdCursor<'_>> {
        let bucket = self.ctx.relationship_bucket(relationship_key)?;
        Ok(IdCursor::scoped(self.txn.cursor(&bucket)?, relationship_id))
    }

    /// Returns true if `entry_id` is related to `relationship_id` under
    /// `relationship_key`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::RelationshipNotFound` for an undeclared key.
    pub fn is_related(
        &self,
        relationship_key: &str,
        relationship_id: &str,
        entry_id: &str,
    ) -> CoreResult<bool> {
        let bucket = self.ctx.relationship_bucket(relationship_key)?;
        let key = join_seek_id(relationship_id, entry_id);
        Ok(self.txn.get(&bucket, key.as_bytes())?.is_some())
    }

    /// Sequence number the next logged block will receive.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidBlockWriter` when block logging is disabled.
    pub fn next_block_index(&mut self) -> CoreResult<u64> {
        self.blocks.next_index()
    }

    /// Records `T::TYPE_NAME` on first open and rejects a mismatch later.
    pub(crate) fn check_type(&mut self) -> CoreResult<()> {
        let requested = T::TYPE_NAME;
        match self.txn.get(META_BUCKET, META_TYPE_KEY)? {
            Some(stored) if stored == requested.as_bytes() => Ok(()),
            Some(stored) => Err(CoreError::InvalidType {
                stored: String::from_utf8_lossy(&stored).into_owned(),
                requested: requested.to_string(),
            }),
            None => self.put_meta(META_TYPE_KEY, requested.as_bytes()),
        }
    }

    fn next_entry_index(&mut self) -> CoreResult<u64> {
        let index = match self.txn.get(META_BUCKET, META_INDEX_KEY)? {
            Some(bytes) => {
                let array: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| CoreError::corruption("entry index is not 8 bytes"))?;
                u64::from_be_bytes(array)
            }
            None => 0,
        };
        self.put_meta(META_INDEX_KEY, &(index + 1).to_be_bytes())?;
        Ok(index)
    }

    fn put_meta(&mut self, key: &[u8], value: &[u8]) -> CoreResult<()> {
        self.txn.put(META_BUCKET, key, value)?;
        self.blocks.add_block(BlockType::WriteMeta, key, value)
    }

    fn write_entry(&mut self, id: &str, entry: &T, previous: Option<&T>) -> CoreResult<()> {
        let current = entry.relationships();
        for (key, ids) in current.iter() {
            self.ctx.relationship_bucket(key)?;
            if let Some(id) = ids.iter().find(|id| !is_valid_relationship_id(id)) {
                return Err(CoreError::InvalidRelationshipId {
                    key: key.to_string(),
                    id: id.clone(),
                });
            }
        }

        let value = reldb_codec::marshal(self.ctx.encoder.as_ref(), entry)?;
        self.txn.put(ENTRIES_BUCKET, id.as_bytes(), &value)?;
        self.blocks
            .add_block(BlockType::WriteEntry, id.as_bytes(), &value)?;

        let old = previous.map(Record::relationships).unwrap_or_default();
        for key in &self.ctx.relationship_keys {
            let bucket = self.ctx.relationship_bucket(key)?;
            let (before, after) = (old.get(key), current.get(key));

            for relationship_id in before.iter().filter(|r| !after.contains(*r)) {
                self.txn
                    .delete(&bucket, join_seek_id(relationship_id, id).as_bytes())?;
            }
            for relationship_id in after.iter().filter(|r| !before.contains(*r)) {
                self.txn
                    .put(&bucket, join_seek_id(relationship_id, id).as_bytes(), &[])?;
            }
        }
        Ok(())
    }
}

impl<T> std::fmt::Debug for Transaction<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("writable", &self.txn.is_writable())
            .finish_non_exhaustive()
    }
}
