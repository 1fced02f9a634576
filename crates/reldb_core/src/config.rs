//! Store configuration.

use crate::error::{CoreError, CoreResult};
use reldb_codec::{Encoder, JsonEncoder};
use reldb_storage::{Initializer, MemoryInitializer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default maximum number of calls a batch collects before it is flushed.
pub const DEFAULT_MAX_BATCH_CALLS: usize = 1024;

/// Default maximum time a batch collects calls before it is flushed.
pub const DEFAULT_MAX_BATCH_DURATION: Duration = Duration::from_millis(10);

/// Default for retrying the successful prefix of a failed batch.
pub const DEFAULT_RETRY_BATCH_FAIL: bool = true;

/// Default number of digits in a generated entry identifier.
pub const DEFAULT_INDEX_LENGTH: usize = 8;

/// Where the block log is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockLogMode {
    /// No block log; writes use the no-op block writer.
    #[default]
    Disabled,
    /// Blocks are kept in memory, for export and tests.
    Memory,
    /// Blocks are appended to `<dir>/<name>.blocks`.
    File,
}

/// Configuration for opening a store.
#[derive(Clone)]
pub struct Config {
    /// Store name, used for file names.
    pub name: String,

    /// Directory holding the store's files.
    pub dir: PathBuf,

    /// Opens the key-value backend.
    pub initializer: Option<Arc<dyn Initializer>>,

    /// Encodes entry values. Required.
    pub encoder: Option<Arc<dyn Encoder>>,

    /// Digits in a generated entry identifier.
    pub index_length: usize,

    /// Calls collected before a batch is flushed immediately.
    pub max_batch_calls: usize,

    /// Longest time a batch waits for more calls.
    pub max_batch_duration: Duration,

    /// Whether calls that succeeded in an aborted batch are retried.
    pub retry_batch_fail: bool,

    /// Block log placement.
    pub block_log: BlockLogMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "reldb".to_string(),
            dir: PathBuf::from("."),
            initializer: Some(Arc::new(MemoryInitializer)),
            encoder: Some(Arc::new(JsonEncoder)),
            index_length: DEFAULT_INDEX_LENGTH,
            max_batch_calls: DEFAULT_MAX_BATCH_CALLS,
            max_batch_duration: DEFAULT_MAX_BATCH_DURATION,
            retry_batch_fail: DEFAULT_RETRY_BATCH_FAIL,
            block_log: BlockLogMode::Disabled,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("name", &self.name)
            .field("dir", &self.dir)
            .field("initializer", &self.initializer)
            .field("encoder", &self.encoder.as_ref().map(|e| e.name()))
            .field("index_length", &self.index_length)
            .field("max_batch_calls", &self.max_batch_calls)
            .field("max_batch_duration", &self.max_batch_duration)
            .field("retry_batch_fail", &self.retry_batch_fail)
            .field("block_log", &self.block_log)
            .finish()
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the store name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the store directory.
    #[must_use]
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Sets the backend initializer.
    #[must_use]
    pub fn initializer(mut self, initializer: Arc<dyn Initializer>) -> Self {
        self.initializer = Some(initializer);
        self
    }

    /// Sets the value encoder.
    #[must_use]
    pub fn encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Sets the identifier length.
    #[must_use]
    pub const fn index_length(mut self, length: usize) -> Self {
        self.index_length = length;
        self
    }

    /// Sets the maximum number of calls per batch.
    #[must_use]
    pub const fn max_batch_calls(mut self, calls: usize) -> Self {
        self.max_batch_calls = calls;
        self
    }

    /// Sets the maximum batch wait.
    #[must_use]
    pub const fn max_batch_duration(mut self, duration: Duration) -> Self {
        self.max_batch_duration = duration;
        self
    }

    /// Sets whether successful calls in an aborted batch are retried.
    #[must_use]
    pub const fn retry_batch_fail(mut self, retry: bool) -> Self {
        self.retry_batch_fail = retry;
        self
    }

    /// Sets block log placement.
    #[must_use]
    pub const fn block_log(mut self, mode: BlockLogMode) -> Self {
        self.block_log = mode;
        self
    }

    /// Fills unset fields with their defaults.
    ///
    /// Zero counts, zero durations, an empty name and a missing initializer
    /// are replaced. The encoder is left alone so that [`Config::validate`]
    /// can report it.
    #[must_use]
    pub fn apply_defaults(mut self) -> Self {
        if self.name.is_empty() {
            self.name = Self::default().name;
        }
        if self.initializer.is_none() {
            self.initializer = Some(Arc::new(MemoryInitializer));
        }
        if self.index_length == 0 {
            self.index_length = DEFAULT_INDEX_LENGTH;
        }
        if self.max_batch_calls == 0 {
            self.max_batch_calls = DEFAULT_MAX_BATCH_CALLS;
        }
        if self.max_batch_duration.is_zero() {
            self.max_batch_duration = DEFAULT_MAX_BATCH_DURATION;
        }
        self
    }

    /// Checks that the configuration can open a store.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EmptyEncoder` if no encoder is set.
    pub fn validate(&self) -> CoreResult<()> {
        if self.encoder.is_none() {
            return Err(CoreError::EmptyEncoder);
        }
        Ok(())
    }

    /// Path of the block log file.
    #[must_use]
    pub fn block_log_path(&self) -> PathBuf {
        self.dir.join(format!("{}.blocks", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.max_batch_calls, 1024);
        assert_eq!(config.max_batch_duration, Duration::from_millis(10));
        assert!(config.retry_batch_fail);
        assert_eq!(config.index_length, 8);
        assert_eq!(config.block_log, BlockLogMode::Disabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .name("notes")
            .max_batch_calls(4)
            .retry_batch_fail(false)
            .index_length(12);

        assert_eq!(config.name, "notes");
        assert_eq!(config.max_batch_calls, 4);
        assert!(!config.retry_batch_fail);
        assert_eq!(config.index_length, 12);
    }

    #[test]
    fn apply_defaults_fills_zero_fields() {
        let mut config = Config::new()
            .name("")
            .max_batch_calls(0)
            .max_batch_duration(Duration::ZERO)
            .index_length(0);
        config.initializer = None;

        let config = config.apply_defaults();
        assert_eq!(config.name, "reldb");
        assert_eq!(config.max_batch_calls, DEFAULT_MAX_BATCH_CALLS);
        assert_eq!(config.max_batch_duration, DEFAULT_MAX_BATCH_DURATION);
        assert_eq!(config.index_length, DEFAULT_INDEX_LENGTH);
        assert!(config.initializer.is_some());
    }

    #[test]
    fn apply_defaults_keeps_explicit_values() {
        let config = Config::new()
            .max_batch_calls(3)
            .max_batch_duration(Duration::from_secs(1))
            .apply_defaults();
        assert_eq!(config.max_batch_calls, 3);
        assert_eq!(config.max_batch_duration, Duration::from_secs(1));
    }

    #[test]
    fn missing_encoder_is_rejected() {
        let mut config = Config::default();
        config.encoder = None;

        let config = config.apply_defaults();
        assert!(matches!(config.validate(), Err(CoreError::EmptyEncoder)));
    }

    #[test]
    fn block_log_path_uses_name() {
        let config = Config::new().dir("/tmp/stores").name("notes");
        assert_eq!(config.block_log_path(), PathBuf::from("/tmp/stores/notes.blocks"));
    }
}
