//! Filtered reads.
//!
//! Filters intersect. The first match filter drives iteration through its
//! relationship index; every other filter is checked per candidate. When
//! all filters are inverse, iteration walks every entry.

use super::Transaction;
use crate::cursor::{self, IdCursor};
use crate::error::CoreResult;
use crate::filter::Filter;
use crate::record::Record;
use std::ops::ControlFlow;

/// One page of a filtered read.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Entries in iteration order.
    pub entries: Vec<T>,
    /// Identifier of the last entry; pass it back to read the next page.
    /// `None` when the page is empty.
    pub last_id: Option<String>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            last_id: None,
        }
    }
}

impl<T: Record> Transaction<'_, T> {
    /// Visits the identifiers of entries accepted by every filter.
    ///
    /// Iteration resumes strictly after `seek_id` when one is given, and
    /// stops when `f` breaks.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::RelationshipNotFound` if a filter names an
    /// undeclared key, or the first error returned by `f`.
    pub fn for_each_id<F>(
        &self,
        seek_id: Option<&str>,
        filters: &[Filter],
        reverse: bool,
        mut f: F,
    ) -> CoreResult<()>
    where
        F: FnMut(&str) -> CoreResult<ControlFlow<()>>,
    {
        let driver = filters.iter().position(|filter| !filter.is_inverse());
        let mut ids = self.filter_cursor(filters, driver)?;

        let mut current = cursor::seek(&mut ids, seek_id, reverse)?;
        while let Some(id) = current {
            if self.accepts(&id, filters, driver)? && f(&id)?.is_break() {
                break;
            }
            current = cursor::step(&mut ids, reverse)?;
        }
        Ok(())
    }

    /// Visits entries accepted by every filter.
    ///
    /// # Errors
    ///
    /// Same as [`Transaction::for_each_id`], plus decoding errors.
    pub fn for_each<F>(
        &self,
        seek_id: Option<&str>,
        filters: &[Filter],
        reverse: bool,
        mut f: F,
    ) -> CoreResult<()>
    where
        F: FnMut(&str, T) -> CoreResult<ControlFlow<()>>,
    {
        self.for_each_id(seek_id, filters, reverse, |id| {
            let entry = self.get(id)?;
            f(id, entry)
        })
    }

    /// Reads up to `limit` entries accepted by every filter, starting after
    /// `seek_id`. A `limit` of zero reads everything.
    ///
    /// # Errors
    ///
    /// Same as [`Transaction::for_each`].
    pub fn get_filtered(
        &self,
        seek_id: Option<&str>,
        filters: &[Filter],
        limit: usize,
        reverse: bool,
    ) -> CoreResult<Page<T>> {
        let mut page = Page::default();
        self.for_each(seek_id, filters, reverse, |id, entry| {
            page.entries.push(entry);
            page.last_id = Some(id.to_string());
            if limit > 0 && page.entries.len() >= limit {
                Ok(ControlFlow::Break(()))
            } else {
                Ok(ControlFlow::Continue(()))
            }
        })?;
        Ok(page)
    }

    fn filter_cursor(&self, filters: &[Filter], driver: Option<usize>) -> CoreResult<IdCursor<'_>> {
        for filter in filters {
            self.ctx.relationship_bucket(filter.relationship_key())?;
        }

        match driver.map(|index| &filters[index]) {
            Some(filter) => {
                self.relationship_cursor(filter.relationship_key(), filter.relationship_id())
            }
            None => self.id_cursor(),
        }
    }

    fn accepts(&self, id: &str, filters: &[Filter], driver: Option<usize>) -> CoreResult<bool> {
        for (index, filter) in filters.iter().enumerate() {
            if Some(index) == driver {
                continue;
            }
            let related =
                self.is_related(filter.relationship_key(), filter.relationship_id(), id)?;
            if !filter.accepts(related) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
