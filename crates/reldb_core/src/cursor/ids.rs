//! Identifier-only cursor.

use super::{key_to_id, Seekable};
use crate::error::CoreResult;
use crate::id::SEEK_SEPARATOR;
use reldb_storage::{KeyValue, RawCursor};

/// Walks identifiers without decoding values.
///
/// Over the entries bucket every key is an entry identifier. Over a
/// relationship bucket keys are seek identifiers (`relationship::entry`); the
/// cursor is then scoped to one relationship identifier and yields only the
/// entry half. Relationship identifiers must not contain the separator.
pub struct IdCursor<'t> {
    raw: Box<dyn RawCursor + 't>,
    prefix: Vec<u8>,
}

impl<'t> IdCursor<'t> {
    /// Cursor over every key of a bucket.
    pub(crate) fn unscoped(raw: Box<dyn RawCursor + 't>) -> Self {
        Self {
            raw,
            prefix: Vec::new(),
        }
    }

    /// Cursor over the entries related to `relationship_id`.
    pub(crate) fn scoped(raw: Box<dyn RawCursor + 't>, relationship_id: &str) -> Self {
        let mut prefix = Vec::with_capacity(relationship_id.len() + SEEK_SEPARATOR.len());
        prefix.extend_from_slice(relationship_id.as_bytes());
        prefix.extend_from_slice(SEEK_SEPARATOR.as_bytes());
        Self { raw, prefix }
    }

    fn key_for(&self, id: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.prefix.len() + id.len());
        key.extend_from_slice(&self.prefix);
        key.extend_from_slice(id.as_bytes());
        key
    }

    fn resolve(&self, kv: Option<KeyValue>) -> CoreResult<Option<String>> {
        match kv {
            Some((key, _)) if key.starts_with(&self.prefix) => {
                key_to_id(&key[self.prefix.len()..]).map(Some)
            }
            _ => Ok(None),
        }
    }
}

impl Seekable for IdCursor<'_> {
    type Item = String;

    fn id_of(item: &String) -> &str {
        item
    }

    fn first(&mut self) -> CoreResult<Option<String>> {
        let kv = if self.prefix.is_empty() {
            self.raw.first()?
        } else {
            self.raw.seek(&self.prefix)?
        };
        self.resolve(kv)
    }

    fn last(&mut self) -> CoreResult<Option<String>> {
        let kv = if self.prefix.is_empty() {
            self.raw.last()?
        } else {
            // 0xFF never occurs in UTF-8, so this sorts after every entry.
            let mut upper = self.prefix.clone();
            upper.push(0xFF);
            self.raw.seek_reverse(&upper)?
        };
        self.resolve(kv)
    }

    fn next(&mut self) -> CoreResult<Option<String>> {
        let kv = self.raw.next()?;
        self.resolve(kv)
    }

    fn prev(&mut self) -> CoreResult<Option<String>> {
        let kv = self.raw.prev()?;
        self.resolve(kv)
    }

    fn seek(&mut self, id: &str) -> CoreResult<Option<String>> {
        let key = self.key_for(id);
        let kv = self.raw.seek(&key)?;
        self.resolve(kv)
    }

    fn seek_reverse(&mut self, id: &str) -> CoreResult<Option<String>> {
        let key = self.key_for(id);
        let kv = self.raw.seek_reverse(&key)?;
        self.resolve(kv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::seek;
    use crate::id::join_seek_id;
    use reldb_storage::{Backend, MemoryBackend};

    fn backend() -> MemoryBackend {
        let backend = MemoryBackend::new();
        let mut txn = backend.begin(true).unwrap();
        for (rel, entry) in [("u1", "00000001"), ("u1", "00000004"), ("u2", "00000002"), ("u3", "00000003")] {
            txn.put(b"rel:users", join_seek_id(rel, entry).as_bytes(), b"")
                .unwrap();
        }
        txn.commit().unwrap();
        backend
    }

    fn collect(cursor: &mut IdCursor<'_>, reverse: bool) -> Vec<String> {
        let mut ids = Vec::new();
        let mut last: Option<String> = None;
        while let Some(id) = seek(cursor, last.as_deref(), reverse).unwrap() {
            ids.push(id.clone());
            last = Some(id);
        }
        ids
    }

    #[test]
    fn scoped_cursor_stays_within_relationship() {
        let backend = backend();
        let txn = backend.begin(false).unwrap();

        let mut cursor = IdCursor::scoped(txn.cursor(b"rel:users").unwrap(), "u1");
        assert_eq!(collect(&mut cursor, false), vec!["00000001", "00000004"]);
        assert_eq!(collect(&mut cursor, true), vec!["00000004", "00000001"]);

        let mut cursor = IdCursor::scoped(txn.cursor(b"rel:users").unwrap(), "u2");
        assert_eq!(cursor.last().unwrap().as_deref(), Some("00000002"));
        assert_eq!(cursor.next().unwrap(), None);
    }

    #[test]
    fn scoped_cursor_for_unknown_relationship_is_empty() {
        let backend = backend();
        let txn = backend.begin(false).unwrap();

        let mut cursor = IdCursor::scoped(txn.cursor(b"rel:users").unwrap(), "u9");
        assert_eq!(cursor.first().unwrap(), None);
        assert_eq!(cursor.last().unwrap(), None);
    }

    #[test]
    fn unscoped_cursor_yields_whole_keys() {
        let backend = backend();
        let txn = backend.begin(false).unwrap();

        let mut cursor = IdCursor::unscoped(txn.cursor(b"rel:users").unwrap());
        assert_eq!(cursor.first().unwrap().as_deref(), Some("u1::00000001"));
        assert_eq!(collect(&mut cursor, false).len(), 4);
    }
}
