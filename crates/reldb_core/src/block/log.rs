//! The block log.

use super::record::Block;
use crate::error::{CoreError, CoreResult};
use parking_lot::Mutex;
use reldb_storage::LogBackend;

struct LogState {
    backend: Box<dyn LogBackend>,
    next_sequence: u64,
}

/// Append-only log of committed blocks.
///
/// Opening a log scans it once to recover the next sequence number and to
/// drop a torn tail.
pub struct BlockLog {
    state: Mutex<LogState>,
}

impl std::fmt::Debug for BlockLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockLog")
            .field("next_sequence", &self.next_sequence())
            .finish_non_exhaustive()
    }
}

impl BlockLog {
    /// Opens a block log over `backend`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Corruption` if a complete block fails validation or
    /// sequences are not contiguous, or a storage error if the log cannot be
    /// read or truncated.
    pub fn open(mut backend: Box<dyn LogBackend>) -> CoreResult<Self> {
        let (blocks, valid_len) = scan(backend.as_ref())?;
        let size = backend.size()?;

        if valid_len < size {
            tracing::warn!(
                valid_len,
                size,
                "dropping torn block at tail of block log"
            );
            backend.truncate(valid_len)?;
        }

        let next_sequence = blocks.last().map_or(0, |b| b.sequence + 1);
        tracing::debug!(blocks = blocks.len(), next_sequence, "block log opened");

        Ok(Self {
            state: Mutex::new(LogState {
                backend,
                next_sequence,
            }),
        })
    }

    /// Sequence number of the next block to be appended.
    #[must_use]
    pub fn next_sequence(&self) -> u64 {
        self.state.lock().next_sequence
    }

    /// Appends committed blocks and flushes the log.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Corruption` if the first block does not carry the
    /// next sequence number, or a storage error if the append fails.
    pub fn append(&self, blocks: &[Block]) -> CoreResult<()> {
        let Some(first) = blocks.first() else {
            return Ok(());
        };

        let mut state = self.state.lock();
        if first.sequence != state.next_sequence {
            return Err(CoreError::corruption(format!(
                "block sequence {} appended, expected {}",
                first.sequence, state.next_sequence
            )));
        }

        let mut data = Vec::new();
        for block in blocks {
            data.extend_from_slice(&block.encode()?);
        }

        state.backend.append(&data)?;
        state.backend.flush()?;
        state.next_sequence += blocks.len() as u64;

        tracing::trace!(
            count = blocks.len(),
            next_sequence = state.next_sequence,
            "blocks appended"
        );
        Ok(())
    }

    /// Reads every block in the log, in sequence order.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read or is corrupted.
    pub fn read_all(&self) -> CoreResult<Vec<Block>> {
        let state = self.state.lock();
        let (blocks, _) = scan(state.backend.as_ref())?;
        Ok(blocks)
    }
}

/// Decodes every complete block. Returns the blocks and the byte length they
/// cover; anything past that length is a torn tail.
fn scan(backend: &dyn LogBackend) -> CoreResult<(Vec<Block>, u64)> {
    let size = backend.size()?;
    let len = usize::try_from(size)
        .map_err(|_| CoreError::corruption(format!("block log of {size} bytes is too large")))?;
    let data = backend.read_at(0, len)?;

    let mut blocks: Vec<Block> = Vec::new();
    let mut offset = 0usize;
    while offset < data.len() {
        let Some((block, used)) = Block::decode(&data[offset..])? else {
            break;
        };

        let expected = blocks.last().map_or(0, |b| b.sequence + 1);
        if block.sequence != expected {
            return Err(CoreError::corruption(format!(
                "block sequence {} at offset {offset}, expected {expected}",
                block.sequence
            )));
        }

        blocks.push(block);
        offset += used;
    }

    Ok((blocks, offset as u64))
}
