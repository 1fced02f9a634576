//! Ordered in-memory key-value backend.

use crate::error::{StorageError, StorageResult};
use crate::kv::{Backend, BackendTxn, Initializer, KeyValue, RawCursor};
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Bucket = BTreeMap<Vec<u8>, Vec<u8>>;
type Buckets = BTreeMap<Vec<u8>, Bucket>;

/// An ordered in-memory key-value backend.
///
/// Suitable for tests and for ephemeral stores. Read transactions share an
/// immutable snapshot; a write transaction works on a private copy that
/// replaces the snapshot on commit. That copy is a deep clone of every
/// bucket, so each write transaction costs time proportional to the whole
/// store.
///
/// # Example
///
/// ```rust
/// use reldb_storage::{Backend, MemoryBackend};
///
/// let backend = MemoryBackend::new();
/// let mut txn = backend.begin(true).unwrap();
/// txn.put(b"meta", b"index", &7u64.to_be_bytes()).unwrap();
/// txn.rollback().unwrap();
///
/// let txn = backend.begin(false).unwrap();
/// assert!(txn.get(b"meta", b"index").unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    snapshot: RwLock<Arc<Buckets>>,
    writer: Mutex<()>,
    closed: AtomicBool,
}

impl MemoryBackend {
    /// Creates a new empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys stored in `bucket`.
    #[must_use]
    pub fn bucket_len(&self, bucket: &[u8]) -> usize {
        self.snapshot.read().get(bucket).map_or(0, BTreeMap::len)
    }
}

impl Backend for MemoryBackend {
    fn begin(&self, writable: bool) -> StorageResult<Box<dyn BackendTxn + '_>> {
        if self.is_closed() {
            return Err(StorageError::Closed);
        }

        let guard = writable.then(|| self.writer.lock());
        let snapshot = Arc::clone(&self.snapshot.read());
        let working = guard.as_ref().map(|_| (*snapshot).clone());

        Ok(Box::new(MemoryTxn {
            backend: self,
            snapshot,
            working,
            _guard: guard,
        }))
    }

    fn close(&self) -> StorageResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

struct MemoryTxn<'a> {
    backend: &'a MemoryBackend,
    snapshot: Arc<Buckets>,
    working: Option<Buckets>,
    _guard: Option<MutexGuard<'a, ()>>,
}

impl MemoryTxn<'_> {
    fn buckets(&self) -> &Buckets {
        self.working.as_ref().unwrap_or(self.snapshot.as_ref())
    }

    fn working_mut(&mut self) -> StorageResult<&mut Buckets> {
        self.working.as_mut().ok_or(StorageError::ReadOnly)
    }
}

impl BackendTxn for MemoryTxn<'_> {
    fn is_writable(&self) -> bool {
        self.working.is_some()
    }

    fn get(&self, bucket: &[u8], key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self
            .buckets()
            .get(bucket)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    fn put(&mut self, bucket: &[u8], key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.working_mut()?
            .entry(bucket.to_vec())
            .or_default()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, bucket: &[u8], key: &[u8]) -> StorageResult<bool> {
        let working = self.working_mut()?;
        Ok(working
            .get_mut(bucket)
            .is_some_and(|entries| entries.remove(key).is_some()))
    }

    fn cursor(&self, bucket: &[u8]) -> StorageResult<Box<dyn RawCursor + '_>> {
        Ok(Box::new(MemoryCursor {
            entries: self.buckets().get(bucket),
            position: None,
        }))
    }

    fn commit(mut self: Box<Self>) -> StorageResult<()> {
        let Some(working) = self.working.take() else {
            return Ok(());
        };

        if self.backend.is_closed() {
            return Err(StorageError::Closed);
        }

        *self.backend.snapshot.write() = Arc::new(working);
        Ok(())
    }

    fn rollback(self: Box<Self>) -> StorageResult<()> {
        Ok(())
    }
}

struct MemoryCursor<'a> {
    entries: Option<&'a Bucket>,
    position: Option<Vec<u8>>,
}

impl<'a> MemoryCursor<'a> {
    fn land(&mut self, found: Option<(&Vec<u8>, &Vec<u8>)>) -> Option<KeyValue> {
        let found = found.map(|(k, v)| (k.clone(), v.clone()));
        self.position = found.as_ref().map(|(k, _)| k.clone());
        found
    }

    fn range(&self, lower: Bound<&[u8]>, upper: Bound<&[u8]>) -> Option<RangeIter<'a>> {
        self.entries
            .map(|entries| entries.range::<[u8], _>((lower, upper)))
    }
}

type RangeIter<'a> = std::collections::btree_map::Range<'a, Vec<u8>, Vec<u8>>;

impl RawCursor for MemoryCursor<'_> {
    fn first(&mut self) -> StorageResult<Option<KeyValue>> {
        let found = self.entries.and_then(|entries| entries.iter().next());
        Ok(self.land(found))
    }

    fn last(&mut self) -> StorageResult<Option<KeyValue>> {
        let found = self.entries.and_then(|entries| entries.iter().next_back());
        Ok(self.land(found))
    }

    fn next(&mut self) -> StorageResult<Option<KeyValue>> {
        let Some(position) = self.position.clone() else {
            return Ok(None);
        };
        let found = self
            .range(Bound::Excluded(position.as_slice()), Bound::Unbounded)
            .and_then(|mut range| range.next());
        Ok(self.land(found))
    }

    fn prev(&mut self) -> StorageResult<Option<KeyValue>> {
        let Some(position) = self.position.clone() else {
            return Ok(None);
        };
        let found = self
            .range(Bound::Unbounded, Bound::Excluded(position.as_slice()))
            .and_then(|mut range| range.next_back());
        Ok(self.land(found))
    }

    fn seek(&mut self, key: &[u8]) -> StorageResult<Option<KeyValue>> {
        let found = self
            .range(Bound::Included(key), Bound::Unbounded)
            .and_then(|mut range| range.next());
        Ok(self.land(found))
    }

    fn seek_reverse(&mut self, key: &[u8]) -> StorageResult<Option<KeyValue>> {
        let found = self
            .range(Bound::Unbounded, Bound::Included(key))
            .and_then(|mut range| range.next_back());
        Ok(self.land(found))
    }
}

/// Initializer producing a fresh [`MemoryBackend`] for every open.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryInitializer;

impl Initializer for MemoryInitializer {
    fn open(&self, _dir: &Path, _name: &str) -> StorageResult<Box<dyn Backend>> {
        Ok(Box::new(MemoryBackend::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn populated(keys: &[&str]) -> MemoryBackend {
        let backend = MemoryBackend::new();
        let mut txn = backend.begin(true).unwrap();
        for key in keys {
            txn.put(b"b", key.as_bytes(), key.as_bytes()).unwrap();
        }
        txn.commit().unwrap();
        backend
    }

    fn key(found: Option<KeyValue>) -> Option<String> {
        found.map(|(k, _)| String::from_utf8(k).unwrap())
    }

    #[test]
    fn memory_kv_commit_publishes_writes() {
        let backend = populated(&["a"]);
        let txn = backend.begin(false).unwrap();
        assert_eq!(txn.get(b"b", b"a").unwrap(), Some(b"a".to_vec()));
        assert_eq!(backend.bucket_len(b"b"), 1);
    }

    #[test]
    fn memory_kv_rollback_discards_writes() {
        let backend = MemoryBackend::new();
        let mut txn = backend.begin(true).unwrap();
        txn.put(b"b", b"k", b"v").unwrap();
        txn.rollback().unwrap();

        let txn = backend.begin(false).unwrap();
        assert!(txn.get(b"b", b"k").unwrap().is_none());
    }

    #[test]
    fn memory_kv_drop_discards_writes() {
        let backend = MemoryBackend::new();
        {
            let mut txn = backend.begin(true).unwrap();
            txn.put(b"b", b"k", b"v").unwrap();
        }
        assert_eq!(backend.bucket_len(b"b"), 0);
    }

    #[test]
    fn memory_kv_read_txn_rejects_writes() {
        let backend = MemoryBackend::new();
        let mut txn = backend.begin(false).unwrap();
        assert!(!txn.is_writable());
        assert!(matches!(
            txn.put(b"b", b"k", b"v"),
            Err(StorageError::ReadOnly)
        ));
        assert!(matches!(txn.delete(b"b", b"k"), Err(StorageError::ReadOnly)));
    }

    #[test]
    fn memory_kv_reader_keeps_snapshot() {
        let backend = populated(&["a"]);
        let reader = backend.begin(false).unwrap();

        let mut writer = backend.begin(true).unwrap();
        writer.put(b"b", b"z", b"z").unwrap();
        writer.commit().unwrap();

        assert!(reader.get(b"b", b"z").unwrap().is_none());
    }

    #[test]
    fn memory_kv_delete_reports_presence() {
        let backend = populated(&["a"]);
        let mut txn = backend.begin(true).unwrap();
        assert!(txn.delete(b"b", b"a").unwrap());
        assert!(!txn.delete(b"b", b"a").unwrap());
        assert!(!txn.delete(b"missing", b"a").unwrap());
    }

    #[test]
    fn memory_kv_closed_rejects_begin() {
        let backend = MemoryBackend::new();
        backend.close().unwrap();
        assert!(backend.is_closed());
        assert!(matches!(backend.begin(false), Err(StorageError::Closed)));
    }

    #[test]
    fn memory_kv_close_fails_pending_commit() {
        let backend = MemoryBackend::new();
        let mut txn = backend.begin(true).unwrap();
        txn.put(b"b", b"k", b"v").unwrap();
        backend.close().unwrap();
        assert!(matches!(txn.commit(), Err(StorageError::Closed)));
    }

    #[test]
    fn cursor_walks_forward_and_backward() {
        let backend = populated(&["a", "b", "c"]);
        let txn = backend.begin(false).unwrap();
        let mut cursor = txn.cursor(b"b").unwrap();

        assert_eq!(key(cursor.first().unwrap()), Some("a".into()));
        assert_eq!(key(cursor.next().unwrap()), Some("b".into()));
        assert_eq!(key(cursor.next().unwrap()), Some("c".into()));
        assert_eq!(key(cursor.next().unwrap()), None);
        assert_eq!(key(cursor.next().unwrap()), None);

        assert_eq!(key(cursor.last().unwrap()), Some("c".into()));
        assert_eq!(key(cursor.prev().unwrap()), Some("b".into()));
        assert_eq!(key(cursor.prev().unwrap()), Some("a".into()));
        assert_eq!(key(cursor.prev().unwrap()), None);
    }

    #[test]
    fn cursor_seek_lands_on_or_after() {
        let backend = populated(&["a", "c", "e"]);
        let txn = backend.begin(false).unwrap();
        let mut cursor = txn.cursor(b"b").unwrap();

        assert_eq!(key(cursor.seek(b"c").unwrap()), Some("c".into()));
        assert_eq!(key(cursor.seek(b"d").unwrap()), Some("e".into()));
        assert_eq!(key(cursor.seek(b"f").unwrap()), None);
    }

    #[test]
    fn cursor_seek_reverse_lands_on_or_before() {
        let backend = populated(&["a", "c", "e"]);
        let txn = backend.begin(false).unwrap();
        let mut cursor = txn.cursor(b"b").unwrap();

        assert_eq!(key(cursor.seek_reverse(b"c").unwrap()), Some("c".into()));
        assert_eq!(key(cursor.seek_reverse(b"d").unwrap()), Some("c".into()));
        assert_eq!(key(cursor.seek_reverse(b"0").unwrap()), None);
    }

    #[test]
    fn cursor_over_missing_bucket_is_empty() {
        let backend = MemoryBackend::new();
        let txn = backend.begin(false).unwrap();
        let mut cursor = txn.cursor(b"nothing").unwrap();
        assert!(cursor.first().unwrap().is_none());
        assert!(cursor.last().unwrap().is_none());
        assert!(cursor.seek(b"a").unwrap().is_none());
    }

    #[test]
    fn memory_initializer_opens_fresh_backend() {
        let backend = MemoryInitializer.open(Path::new("."), "test").unwrap();
        let txn = backend.begin(false).unwrap();
        assert!(txn.get(b"b", b"k").unwrap().is_none());
    }

    /// Index the cursor should land on after one move over sorted `keys`.
    fn step_model(position: Option<usize>, forward: bool, len: usize) -> Option<usize> {
        let i = position?;
        if forward {
            (i + 1 < len).then_some(i + 1)
        } else {
            i.checked_sub(1)
        }
    }

    proptest! {
        #[test]
        fn cursor_matches_sorted_model(
            keys in prop::collection::btree_set(prop::collection::vec(0u8..4, 0..4), 0..12),
            target in prop::collection::vec(0u8..4, 0..4),
            reverse in any::<bool>(),
            moves in prop::collection::vec(any::<bool>(), 0..8),
        ) {
            let backend = MemoryBackend::new();
            let mut txn = backend.begin(true).unwrap();
            for key in &keys {
                txn.put(b"b", key, key).unwrap();
            }
            txn.commit().unwrap();

            let sorted: Vec<Vec<u8>> = keys.into_iter().collect();
            let txn = backend.begin(false).unwrap();
            let mut cursor = txn.cursor(b"b").unwrap();

            let (found, mut position) = if reverse {
                (cursor.seek_reverse(&target).unwrap(), sorted.iter().rposition(|k| *k <= target))
            } else {
                (cursor.seek(&target).unwrap(), sorted.iter().position(|k| *k >= target))
            };
            prop_assert_eq!(found.map(|(k, _)| k), position.map(|i| sorted[i].clone()));

            for forward in moves {
                let found = if forward { cursor.next() } else { cursor.prev() }.unwrap();
                position = step_model(position, forward, sorted.len());
                prop_assert_eq!(found.map(|(k, _)| k), position.map(|i| sorted[i].clone()));
            }
        }
    }
}
