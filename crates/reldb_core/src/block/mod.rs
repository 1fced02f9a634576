//! Block log for durability and export.
//!
//! Every committed write is described by a block: one entry written, one
//! entry deleted, or one metadata value written. Blocks are buffered per
//! transaction and reach the log only after the backend commit succeeds, so
//! the log never holds writes of an aborted batch.
//!
//! ## Block Format
//!
//! ```text
//! | magic (4) | version (2) | type (1) | sequence (8) | key_len (4) | value_len (4) | key | value | crc32 (4) |
//! ```
//!
//! ## Recovery Policy
//!
//! - A torn block at the tail (incomplete header or body) is dropped and the
//!   log is truncated to the last complete block
//! - A CRC mismatch, bad magic, unknown type or unsupported version is fatal
//! - Sequences must be contiguous; a gap is fatal

mod log;
mod record;
mod writer;

pub use log::BlockLog;
pub use record::{Block, BlockType, BLOCK_MAGIC, BLOCK_VERSION};
pub use writer::{BlockWriter, NopBlockWriter, PendingBlocks};
