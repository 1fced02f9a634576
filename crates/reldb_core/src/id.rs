//! Entry identifiers and composite seek identifiers.
//!
//! Entry identifiers are zero-padded decimal indexes (`00000042`), so their
//! byte order matches their creation order. Relationship indexes key each
//! related entry by a seek identifier `relationship_id::entry_id`, which keeps
//! all entries of one relationship contiguous in key order.

use crate::error::{CoreError, CoreResult};

/// Separator between the two halves of a seek identifier.
pub const SEEK_SEPARATOR: &str = "::";

/// Formats an index as a zero-padded identifier of at least `length` digits.
#[must_use]
pub fn format_id(index: u64, length: usize) -> String {
    format!("{index:0length$}")
}

/// Parses a zero-padded identifier back into its index.
///
/// Leading zeros are stripped and the remainder is read as an unsigned
/// base-10 integer; an identifier made only of zeros is index 0.
///
/// # Errors
///
/// Returns `CoreError::InvalidId` carrying the identifier exactly as given
/// when the remainder is not a decimal number or overflows `u64`.
pub fn parse_id(id: &str) -> CoreResult<u64> {
    let digits = id.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::invalid_id(id, "not a decimal index"));
    }

    digits
        .parse::<u64>()
        .map_err(|e| CoreError::invalid_id(id, e.to_string()))
}

/// Joins a relationship identifier and an entry identifier.
#[must_use]
pub fn join_seek_id(relationship_id: &str, entry_id: &str) -> String {
    let mut seek_id =
        String::with_capacity(relationship_id.len() + SEEK_SEPARATOR.len() + entry_id.len());
    seek_id.push_str(relationship_id);
    seek_id.push_str(SEEK_SEPARATOR);
    seek_id.push_str(entry_id);
    seek_id
}

/// Whether `relationship_id` can be joined into a seek identifier and split
/// back unambiguously.
///
/// An identifier containing the separator, or ending in `:`, would share a
/// key prefix with another identifier's rows.
#[must_use]
pub fn is_valid_relationship_id(relationship_id: &str) -> bool {
    !relationship_id.contains(SEEK_SEPARATOR) && !relationship_id.ends_with(':')
}

/// Splits a seek identifier on the first separator.
///
/// Without a separator the whole input is the relationship identifier and
/// the entry identifier is empty.
#[must_use]
pub fn split_seek_id(seek_id: &str) -> (&str, &str) {
    seek_id.split_once(SEEK_SEPARATOR).unwrap_or((seek_id, ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn format_pads_to_length() {
        assert_eq!(format_id(42, 8), "00000042");
        assert_eq!(format_id(0, 3), "000");
        assert_eq!(format_id(123_456, 3), "123456");
    }

    #[test]
    fn parse_strips_leading_zeros() {
        assert_eq!(parse_id("00042").unwrap(), 42);
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("100").unwrap(), 100);
    }

    #[test]
    fn parse_all_zeros_is_zero() {
        assert_eq!(parse_id("00000").unwrap(), 0);
        assert_eq!(parse_id("").unwrap(), 0);
    }

    #[test]
    fn parse_error_names_original_id() {
        let err = parse_id("00abc").unwrap_err();
        assert!(matches!(&err, CoreError::InvalidId { id, .. } if id == "00abc"));
        assert!(err.to_string().contains("00abc"));
    }

    #[test]
    fn parse_rejects_signs_and_overflow() {
        assert!(parse_id("00+5").is_err());
        assert!(parse_id("-1").is_err());
        assert!(parse_id("99999999999999999999999").is_err());
    }

    #[test]
    fn relationship_ids_that_prefix_other_rows_are_invalid() {
        assert!(is_valid_relationship_id("a"));
        assert!(is_valid_relationship_id("a:b"));
        assert!(!is_valid_relationship_id("a:"));
        assert!(!is_valid_relationship_id("a::b"));
        assert!(!is_valid_relationship_id("::"));
    }

    #[test]
    fn split_without_separator_has_empty_entry() {
        assert_eq!(split_seek_id("user-7"), ("user-7", ""));
    }

    #[test]
    fn split_uses_first_separator_only() {
        assert_eq!(split_seek_id("a::b::c"), ("a", "b::c"));
        assert_eq!(split_seek_id("::b"), ("", "b"));
    }

    proptest! {
        #[test]
        fn seek_id_join_then_split(
            relationship in "[a-z0-9]{0,6}(:[a-z0-9]{1,6})?",
            entry in "(:?[a-z0-9]{1,6}){0,2}",
        ) {
            let joined = join_seek_id(&relationship, &entry);
            prop_assert_eq!(split_seek_id(&joined), (relationship.as_str(), entry.as_str()));
        }

        #[test]
        fn format_then_parse(index in any::<u64>(), length in 1usize..24) {
            prop_assert_eq!(parse_id(&format_id(index, length)).unwrap(), index);
        }
    }
}
