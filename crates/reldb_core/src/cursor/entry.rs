//! Cursor over entries and their values.

use super::{key_to_id, Seekable};
use crate::error::CoreResult;
use crate::record::Record;
use reldb_codec::Encoder;
use reldb_storage::{KeyValue, RawCursor};
use std::marker::PhantomData;

/// Walks every entry in identifier order, decoding values as it goes.
pub struct EntryCursor<'t, T> {
    raw: Box<dyn RawCursor + 't>,
    encoder: &'t dyn Encoder,
    _marker: PhantomData<fn() -> T>,
}

impl<'t, T: Record> EntryCursor<'t, T> {
    pub(crate) fn new(raw: Box<dyn RawCursor + 't>, encoder: &'t dyn Encoder) -> Self {
        Self {
            raw,
            encoder,
            _marker: PhantomData,
        }
    }

    fn decode(&self, kv: Option<KeyValue>) -> CoreResult<Option<(String, T)>> {
        let Some((key, value)) = kv else {
            return Ok(None);
        };
        let id = key_to_id(&key)?;
        let entry = reldb_codec::unmarshal(self.encoder, &value)?;
        Ok(Some((id, entry)))
    }
}

impl<T: Record> Seekable for EntryCursor<'_, T> {
    type Item = (String, T);

    fn id_of(item: &Self::Item) -> &str {
        &item.0
    }

    fn first(&mut self) -> CoreResult<Option<Self::Item>> {
        let kv = self.raw.first()?;
        self.decode(kv)
    }

    fn last(&mut self) -> CoreResult<Option<Self::Item>> {
        let kv = self.raw.last()?;
        self.decode(kv)
    }

    fn next(&mut self) -> CoreResult<Option<Self::Item>> {
        let kv = self.raw.next()?;
        self.decode(kv)
    }

    fn prev(&mut self) -> CoreResult<Option<Self::Item>> {
        let kv = self.raw.prev()?;
        self.decode(kv)
    }

    fn seek(&mut self, id: &str) -> CoreResult<Option<Self::Item>> {
        let kv = self.raw.seek(id.as_bytes())?;
        self.decode(kv)
    }

    fn seek_reverse(&mut self, id: &str) -> CoreResult<Option<Self::Item>> {
        let kv = self.raw.seek_reverse(id.as_bytes())?;
        self.decode(kv)
    }
}
