//! Benchmark utilities.

#![warn(missing_docs)]

use rand::Rng;
use reldb_core::{Config, Store};
use reldb_testkit::{Note, NOTE_RELATIONSHIPS};

/// Tags notes are drawn from.
pub const TAGS: [&str; 4] = ["red", "green", "blue", "amber"];

/// Generate random note text of the specified length.
pub fn random_text(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

/// Generate notes spread over `users` users, each with one random tag.
pub fn generate_notes(count: usize, users: usize, text_len: usize) -> Vec<Note> {
    let mut rng = rand::thread_rng();
    let users = users.max(1);
    (0..count)
        .map(|_| {
            let user = rng.gen_range(0..users);
            let tag = TAGS[rng.gen_range(0..TAGS.len())];
            Note::new(format!("user-{user}"), random_text(text_len)).tagged(tag)
        })
        .collect()
}

/// Opens an in-memory store and inserts `notes` in one dedicated transaction.
pub fn populated_store(config: Config, notes: &[Note]) -> Store<Note> {
    let store = Store::open(config, NOTE_RELATIONSHIPS).expect("open store");
    store
        .transaction(|txn| {
            for note in notes {
                txn.new_entry(&mut note.clone())?;
            }
            Ok(())
        })
        .expect("populate store");
    store
}
