//! Block writers handed to transactions.

use super::record::{Block, BlockType};
use crate::error::{CoreError, CoreResult};

/// Destination for the blocks a transaction produces.
pub trait BlockWriter {
    /// Records one write.
    ///
    /// # Errors
    ///
    /// Returns an error if the block cannot be recorded.
    fn add_block(&mut self, block_type: BlockType, key: &[u8], value: &[u8]) -> CoreResult<()>;

    /// Returns the sequence number the next added block will receive.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidBlockWriter` when block logging is disabled.
    fn next_index(&mut self) -> CoreResult<u64>;
}

/// Writer used when block logging is disabled.
///
/// Blocks are discarded. There is no sequence to hand out, so
/// [`BlockWriter::next_index`] always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopBlockWriter;

impl BlockWriter for NopBlockWriter {
    fn add_block(&mut self, _: BlockType, _: &[u8], _: &[u8]) -> CoreResult<()> {
        Ok(())
    }

    fn next_index(&mut self) -> CoreResult<u64> {
        Err(CoreError::InvalidBlockWriter)
    }
}

/// Blocks buffered by one transaction until it commits.
///
/// Sequence numbers continue from `base`, the log's next sequence when the
/// transaction began. Writers are exclusive, so the sequences are still free
/// when the buffer is appended.
#[derive(Debug)]
pub struct PendingBlocks {
    base: u64,
    blocks: Vec<Block>,
}

impl PendingBlocks {
    /// Creates an empty buffer whose first block gets sequence `base`.
    #[must_use]
    pub fn new(base: u64) -> Self {
        Self {
            base,
            blocks: Vec::new(),
        }
    }

    /// Number of buffered blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if nothing was buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Consumes the buffer.
    #[must_use]
    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

impl BlockWriter for PendingBlocks {
    fn add_block(&mut self, block_type: BlockType, key: &[u8], value: &[u8]) -> CoreResult<()> {
        let sequence = self.next_index()?;
        self.blocks.push(Block {
            sequence,
            block_type,
            key: key.to_vec(),
            value: value.to_vec(),
        });
        Ok(())
    }

    fn next_index(&mut self) -> CoreResult<u64> {
        Ok(self.base + self.blocks.len() as u64)
    }
}
