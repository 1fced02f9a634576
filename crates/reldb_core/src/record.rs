//! The element type stored in a store.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A value that can be stored.
///
/// A record carries its own identifier, assigned by the store when the
/// record is first written, and declares which identifiers it is related to
/// under each relationship key.
///
/// # Example
///
/// ```rust
/// use reldb_core::{Record, Relationships};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct Note {
///     id: String,
///     user_id: String,
///     tags: Vec<String>,
/// }
///
/// impl Record for Note {
///     const TYPE_NAME: &'static str = "note";
///
///     fn id(&self) -> &str {
///         &self.id
///     }
///
///     fn set_id(&mut self, id: String) {
///         self.id = id;
///     }
///
///     fn relationships(&self) -> Relationships {
///         Relationships::new()
///             .with("users", [&self.user_id])
///             .with("tags", &self.tags)
///     }
/// }
/// ```
pub trait Record: Serialize + DeserializeOwned + Send + 'static {
    /// Name recorded by the first open of a store and checked by every later
    /// open. Keep it stable for as long as stored data should stay readable.
    const TYPE_NAME: &'static str;

    /// The record's identifier; empty until it is first written.
    fn id(&self) -> &str;

    /// Sets the record's identifier.
    fn set_id(&mut self, id: String);

    /// Identifiers this record is related to, grouped by relationship key.
    fn relationships(&self) -> Relationships {
        Relationships::new()
    }
}

/// Relationship identifiers declared by a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    entries: Vec<(String, Vec<String>)>,
}

impl Relationships {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds identifiers under `key`. Empty identifiers are skipped.
    #[must_use]
    pub fn with<I, S>(mut self, key: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = key.into();
        let ids = ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .filter(|id| !id.is_empty());

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.extend(ids),
            None => self.entries.push((key, ids.collect())),
        }
        self
    }

    /// Identifiers declared under `key`.
    pub fn get(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map_or(&[][..], |(_, ids)| ids.as_slice())
    }

    /// Iterates `(key, ids)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, ids)| (k.as_str(), ids.as_slice()))
    }
}
