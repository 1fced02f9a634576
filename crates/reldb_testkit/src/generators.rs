//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use crate::fixtures::Note;
use proptest::prelude::*;

/// Strategy for relationship identifiers.
///
/// Always accepted by [`reldb_core::is_valid_relationship_id`], so records
/// built from it can be written and joining then splitting a seek
/// identifier is lossless.
pub fn relationship_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9-]{1,8}(:[a-z0-9-]{1,8})?").expect("Invalid regex")
}

/// Strategy for the entry half of a seek identifier.
pub fn entry_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("(:?[a-z0-9]{1,8}){0,3}").expect("Invalid regex")
}

/// Strategy for zero-padded identifiers with their index.
pub fn padded_id_strategy() -> impl Strategy<Value = (u64, usize, String)> {
    (any::<u64>(), 1usize..24).prop_map(|(index, length)| {
        (index, length, reldb_core::format_id(index, length))
    })
}

/// Strategy for a note owned by one of `users` users, with up to two tags.
pub fn note_strategy(users: usize) -> impl Strategy<Value = Note> {
    let users = users.max(1);
    (
        0..users,
        prop::collection::btree_set(prop::sample::select(vec!["red", "green", "blue"]), 0..=2),
        "[a-z ]{0,16}",
    )
        .prop_map(|(user, tags, text)| {
            tags.into_iter().fold(Note::new(format!("user-{user}"), text), |note, tag| {
                note.tagged(tag)
            })
        })
}

/// Strategy for batch outcome plans: `true` marks a call that fails.
pub fn batch_plan_strategy(max_calls: usize) -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(prop::bool::weighted(0.2), 1..=max_calls.max(1))
}
