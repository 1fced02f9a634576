//! Cursors and resumable pagination.
//!
//! Two cursor shapes walk the store: [`EntryCursor`] yields identifiers with
//! their decoded entries, and [`IdCursor`] yields identifiers only, either
//! over every entry or over the entries related to one identifier. Both are
//! [`Seekable`], so [`seek`] resumes either of them after the last element a
//! caller saw.

mod entry;
mod ids;

pub use entry::EntryCursor;
pub use ids::IdCursor;

use crate::error::{CoreError, CoreResult};

/// A cursor that can be positioned by identifier.
///
/// Every method returns the element the cursor lands on, or `None` when it
/// moves past either end of its range.
pub trait Seekable {
    /// Element yielded by the cursor.
    type Item;

    /// Identifier of an element, as passed to [`seek`].
    fn id_of(item: &Self::Item) -> &str;

    /// Moves to the first element.
    fn first(&mut self) -> CoreResult<Option<Self::Item>>;

    /// Moves to the last element.
    fn last(&mut self) -> CoreResult<Option<Self::Item>>;

    /// Moves to the next element.
    fn next(&mut self) -> CoreResult<Option<Self::Item>>;

    /// Moves to the previous element.
    fn prev(&mut self) -> CoreResult<Option<Self::Item>>;

    /// Moves to the first element whose identifier is `>= id`.
    fn seek(&mut self, id: &str) -> CoreResult<Option<Self::Item>>;

    /// Moves to the last element whose identifier is `<= id`.
    fn seek_reverse(&mut self, id: &str) -> CoreResult<Option<Self::Item>>;
}

/// Positions `cursor` for the next page.
///
/// Without a resume point this is the first element, or the last one when
/// `reverse` is set. With one, the cursor seeks to `last_id` and steps once
/// more (`next`, or `prev` in reverse) so the page starts strictly after the
/// element the caller already has. If `last_id` itself is gone, the seek
/// already lands past it and no extra step is taken.
///
/// An empty `last_id` counts as no resume point.
///
/// # Errors
///
/// Returns any error from the underlying cursor.
pub fn seek<C>(cursor: &mut C, last_id: Option<&str>, reverse: bool) -> CoreResult<Option<C::Item>>
where
    C: Seekable + ?Sized,
{
    match (last_id.filter(|id| !id.is_empty()), reverse) {
        (None, false) => cursor.first(),
        (None, true) => cursor.last(),
        (Some(id), false) => match cursor.seek(id)? {
            Some(item) if C::id_of(&item) == id => cursor.next(),
            landed => Ok(landed),
        },
        (Some(id), true) => match cursor.seek_reverse(id)? {
            Some(item) if C::id_of(&item) == id => cursor.prev(),
            landed => Ok(landed),
        },
    }
}

/// Steps `cursor` in the direction of `reverse`.
pub(crate) fn step<C>(cursor: &mut C, reverse: bool) -> CoreResult<Option<C::Item>>
where
    C: Seekable + ?Sized,
{
    if reverse {
        cursor.prev()
    } else {
        cursor.next()
    }
}

pub(crate) fn key_to_id(key: &[u8]) -> CoreResult<String> {
    String::from_utf8(key.to_vec())
        .map_err(|_| CoreError::invalid_id(String::from_utf8_lossy(key), "not valid UTF-8"))
}
