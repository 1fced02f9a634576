//! Test fixtures and store helpers.
//!
//! Provides a sample record type and convenience functions for setting up
//! test stores.

use reldb_core::{BlockLogMode, Config, Record, Relationships, Store};
use reldb_storage::{Backend, Initializer, MemoryBackend, StorageResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Relationship keys declared by [`Note`].
pub const NOTE_RELATIONSHIPS: [&str; 2] = ["users", "tags"];

/// A sample record related to one user and any number of tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Identifier assigned by the store.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Body text.
    pub text: String,
}

impl Note {
    /// Creates an untagged note.
    pub fn new(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Adds a tag.
    #[must_use]
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

impl Record for Note {
    const TYPE_NAME: &'static str = "note";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn relationships(&self) -> Relationships {
        Relationships::new()
            .with("users", [&self.user_id])
            .with("tags", &self.tags)
    }
}

/// Initializer handing every open the same in-memory backend.
///
/// Lets a test reopen a store and observe what an earlier open wrote.
#[derive(Debug, Clone, Default)]
pub struct SharedMemoryInitializer {
    backend: Arc<MemoryBackend>,
}

impl SharedMemoryInitializer {
    /// Creates an initializer over a fresh backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared backend.
    pub fn backend(&self) -> &MemoryBackend {
        &self.backend
    }
}

impl Initializer for SharedMemoryInitializer {
    fn open(&self, _dir: &Path, _name: &str) -> StorageResult<Box<dyn Backend>> {
        Ok(Box::new(Arc::clone(&self.backend)))
    }
}

/// A test store with automatic cleanup.
pub struct TestStore {
    /// The store instance.
    pub store: Store<Note>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates an in-memory store without a block log.
    pub fn memory() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an in-memory store from `config`.
    pub fn with_config(config: Config) -> Self {
        Self {
            store: Store::open(config, NOTE_RELATIONSHIPS).expect("Failed to open store"),
            _temp_dir: None,
        }
    }

    /// Creates an in-memory store with an in-memory block log.
    pub fn logged() -> Self {
        Self::with_config(Config::default().block_log(BlockLogMode::Memory))
    }

    /// Creates a store whose block log is a file in a temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = Config::default()
            .dir(temp_dir.path())
            .name("test")
            .block_log(BlockLogMode::File);

        Self {
            store: Store::open(config, NOTE_RELATIONSHIPS).expect("Failed to open file store"),
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the store directory if file-based, None if in-memory.
    pub fn dir(&self) -> Option<&Path> {
        self._temp_dir.as_ref().map(TempDir::path)
    }
}

impl std::ops::Deref for TestStore {
    type Target = Store<Note>;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a temporary in-memory store.
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&Store<Note>) -> R,
{
    let test_store = TestStore::memory();
    f(&test_store.store)
}

/// Runs a test with a store that keeps its block log in a temporary file.
pub fn with_file_store<F, R>(f: F) -> R
where
    F: FnOnce(&Store<Note>, &Path) -> R,
{
    let test_store = TestStore::file();
    let dir = test_store
        .dir()
        .expect("File store should have a directory")
        .to_path_buf();
    f(&test_store.store, &dir)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a store holding `count` notes spread round-robin over
    /// `users` users (`user-0`, `user-1`, ...). Returns the identifiers in
    /// insertion order.
    pub fn populated_store(count: usize, users: usize) -> (TestStore, Vec<String>) {
        let test_store = TestStore::memory();
        let users = users.max(1);

        let ids = (0..count)
            .map(|i| {
                let note = Note::new(format!("user-{}", i % users), format!("note {i}"));
                test_store.new_entry(note).expect("Failed to insert note")
            })
            .collect();

        (test_store, ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let test_store = TestStore::memory();
        assert!(test_store.dir().is_none());
        assert_eq!(test_store.name(), "reldb");
    }

    #[test]
    fn test_with_temp_store() {
        with_temp_store(|store| {
            let id = store.new_entry(Note::new("user-1", "hello")).unwrap();
            assert_eq!(store.get(&id).unwrap().text, "hello");
        });
    }

    #[test]
    fn test_file_store_writes_block_file() {
        with_file_store(|store, dir| {
            store.new_entry(Note::new("user-1", "hello")).unwrap();
            assert!(dir.join("test.blocks").exists());
        });
    }

    #[test]
    fn test_populated_scenario() {
        let (store, ids) = scenarios::populated_store(6, 3);
        assert_eq!(ids.len(), 6);
        assert_eq!(ids[0], "00000000");
        assert_eq!(store.get(&ids[4]).unwrap().user_id, "user-1");
    }

    #[test]
    fn test_shared_initializer_reopens_same_data() {
        let initializer = Arc::new(SharedMemoryInitializer::new());
        let config = Config::default().initializer(initializer.clone());

        let first: Store<Note> = Store::open(config.clone(), NOTE_RELATIONSHIPS).unwrap();
        let id = first.new_entry(Note::new("user-1", "kept")).unwrap();

        let second: Store<Note> = Store::open(config, NOTE_RELATIONSHIPS).unwrap();
        assert_eq!(second.get(&id).unwrap().text, "kept");
        assert_eq!(initializer.backend().bucket_len(b"entries"), 1);
    }
}
