//! Relationship filters.
//!
//! A filter scopes a read to entries that are (or are not) related to one
//! identifier under one relationship key. Filters are plain values; the
//! store intersects every filter it is given.

use serde::{Deserialize, Serialize};

/// Whether a filter keeps or drops related entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Polarity {
    /// Keep entries related to the identifier.
    Include,
    /// Keep entries not related to the identifier.
    Exclude,
}

/// A relationship filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    #[serde(rename = "relationshipKey")]
    relationship_key: String,
    #[serde(rename = "relationshipID")]
    relationship_id: String,
    polarity: Polarity,
}

impl Filter {
    /// Keeps entries related to `relationship_id` under `relationship_key`.
    pub fn matching(relationship_key: impl Into<String>, relationship_id: impl Into<String>) -> Self {
        Self {
            relationship_key: relationship_key.into(),
            relationship_id: relationship_id.into(),
            polarity: Polarity::Include,
        }
    }

    /// Keeps entries not related to `relationship_id` under `relationship_key`.
    pub fn inverse_matching(
        relationship_key: impl Into<String>,
        relationship_id: impl Into<String>,
    ) -> Self {
        Self {
            relationship_key: relationship_key.into(),
            relationship_id: relationship_id.into(),
            polarity: Polarity::Exclude,
        }
    }

    /// The relationship key this filter targets.
    #[must_use]
    pub fn relationship_key(&self) -> &str {
        &self.relationship_key
    }

    /// The relationship identifier this filter targets.
    #[must_use]
    pub fn relationship_id(&self) -> &str {
        &self.relationship_id
    }

    /// Include or exclude.
    #[must_use]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Returns true for inverse filters.
    #[must_use]
    pub fn is_inverse(&self) -> bool {
        self.polarity == Polarity::Exclude
    }

    /// Decides an entry given whether it is related to the target.
    #[must_use]
    pub fn accepts(&self, related: bool) -> bool {
        match self.polarity {
            Polarity::Include => related,
            Polarity::Exclude => !related,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_accepts_related_only() {
        let filter = Filter::matching("users", "00000001");
        assert!(filter.accepts(true));
        assert!(!filter.accepts(false));
        assert!(!filter.is_inverse());
    }

    #[test]
    fn inverse_match_accepts_unrelated_only() {
        let filter = Filter::inverse_matching("users", "00000001");
        assert!(!filter.accepts(true));
        assert!(filter.accepts(false));
        assert_eq!(filter.polarity(), Polarity::Exclude);
    }

    #[test]
    fn filters_with_same_target_differ_by_polarity() {
        assert_ne!(
            Filter::matching("users", "7"),
            Filter::inverse_matching("users", "7")
        );
        assert_eq!(Filter::matching("users", "7"), Filter::matching("users", "7"));
    }

    #[test]
    fn serialized_field_names() {
        let json = serde_json::to_value(Filter::matching("groups", "00000003")).unwrap();
        assert_eq!(json["relationshipKey"], "groups");
        assert_eq!(json["relationshipID"], "00000003");
        assert_eq!(json["polarity"], "include");
    }
}
