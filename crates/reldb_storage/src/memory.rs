//! In-memory log sink.

use crate::error::{StorageError, StorageResult};
use crate::log::LogBackend;
use std::io;

/// An in-memory log sink.
///
/// Backs `BlockLogMode::Memory` stores and the block log's own tests.
///
/// # Example
///
/// ```rust
/// use reldb_storage::{InMemoryLog, LogBackend};
///
/// let mut log = InMemoryLog::new();
/// let offset = log.append(b"block").unwrap();
/// assert_eq!(offset, 0);
/// assert_eq!(log.size().unwrap(), 5);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryLog {
    bytes: Vec<u8>,
}

impl InMemoryLog {
    /// Creates a new empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log holding `bytes`, as if they had been appended earlier.
    #[must_use]
    pub fn with_data(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Bytes currently in the log.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.bytes
    }
}

impl LogBackend for InMemoryLog {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let size = self.bytes.len() as u64;
        usize::try_from(offset)
            .ok()
            .and_then(|start| Some(start..start.checked_add(len)?))
            .and_then(|range| self.bytes.get(range))
            .map(<[u8]>::to_vec)
            .ok_or(StorageError::ReadPastEnd { offset, len, size })
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let offset = self.bytes.len() as u64;
        self.bytes.extend_from_slice(data);
        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.bytes.len() as u64)
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        match usize::try_from(new_size) {
            Ok(len) if len <= self.bytes.len() => {
                self.bytes.truncate(len);
                Ok(())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot truncate to {new_size}, log holds {} bytes", self.bytes.len()),
            )
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_log_append_returns_offsets() {
        let mut log = InMemoryLog::new();
        assert_eq!(log.append(b"hello").unwrap(), 0);
        assert_eq!(log.append(b" world").unwrap(), 5);
        assert_eq!(log.size().unwrap(), 11);
        assert_eq!(log.read_at(6, 5).unwrap(), b"world");
    }

    #[test]
    fn memory_log_read_past_end_fails() {
        let mut log = InMemoryLog::new();
        log.append(b"hello").unwrap();
        assert!(matches!(
            log.read_at(3, 10),
            Err(StorageError::ReadPastEnd { .. })
        ));
    }

    #[test]
    fn memory_log_truncate() {
        let mut log = InMemoryLog::with_data(b"hello world".to_vec());
        log.truncate(5).unwrap();
        assert_eq!(log.data(), b"hello");
        assert_eq!(log.read_at(0, 0).unwrap(), b"");
        assert!(log.truncate(100).is_err());
    }
}
