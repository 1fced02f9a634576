//! Block types and framing.

use crate::error::{CoreError, CoreResult};

/// Magic bytes opening every block.
pub const BLOCK_MAGIC: [u8; 4] = *b"RBLK";

/// Current block format version.
pub const BLOCK_VERSION: u16 = 1;

/// magic (4) + version (2) + type (1) + sequence (8) + key_len (4) + value_len (4)
pub(crate) const HEADER_SIZE: usize = 23;

pub(crate) const CRC_SIZE: usize = 4;

/// Kind of write a block records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockType {
    /// A metadata value was written.
    WriteMeta = 1,
    /// An entry was created or replaced.
    WriteEntry = 2,
    /// An entry was removed.
    DeleteEntry = 3,
}

impl BlockType {
    /// Converts a byte to a block type.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(Self::WriteMeta),
            2 => Some(Self::WriteEntry),
            3 => Some(Self::DeleteEntry),
            _ => None,
        }
    }

    /// Converts the block type to a byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// One block of the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Position of the block in the log, starting at 0.
    pub sequence: u64,
    /// What the block records.
    pub block_type: BlockType,
    /// Key written or deleted.
    pub key: Vec<u8>,
    /// Value written; empty for deletes.
    pub value: Vec<u8>,
}

impl Block {
    /// Frames the block for appending to a log.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::BlockTooLarge` if the key or value is longer than
    /// `u32::MAX` bytes.
    pub fn encode(&self) -> CoreResult<Vec<u8>> {
        let key_len = frame_len("key", self.key.len())?;
        let value_len = frame_len("value", self.value.len())?;

        let mut data =
            Vec::with_capacity(HEADER_SIZE + self.key.len() + self.value.len() + CRC_SIZE);
        data.extend_from_slice(&BLOCK_MAGIC);
        data.extend_from_slice(&BLOCK_VERSION.to_le_bytes());
        data.push(self.block_type.as_byte());
        data.extend_from_slice(&self.sequence.to_le_bytes());
        data.extend_from_slice(&key_len.to_le_bytes());
        data.extend_from_slice(&value_len.to_le_bytes());
        data.extend_from_slice(&self.key);
        data.extend_from_slice(&self.value);

        let crc = crc32fast::hash(&data);
        data.extend_from_slice(&crc.to_le_bytes());
        Ok(data)
    }

    /// Decodes the block at the start of `data`.
    ///
    /// Returns the block and the number of bytes it occupies, or `None` when
    /// `data` ends before the block does.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Corruption` for bad magic, an unsupported version,
    /// an unknown block type or a CRC mismatch.
    pub fn decode(data: &[u8]) -> CoreResult<Option<(Self, usize)>> {
        if data.len() < HEADER_SIZE {
            return Ok(None);
        }

        if data[0..4] != BLOCK_MAGIC {
            return Err(CoreError::corruption("bad block magic"));
        }

        let version = u16::from_le_bytes([data[4], data[5]]);
        if version != BLOCK_VERSION {
            return Err(CoreError::corruption(format!(
                "unsupported block version {version}"
            )));
        }

        let block_type = BlockType::from_byte(data[6])
            .ok_or_else(|| CoreError::corruption(format!("unknown block type {}", data[6])))?;
        let sequence = u64::from_le_bytes(read_array(&data[7..15]));
        let key_len = u32::from_le_bytes(read_array(&data[15..19])) as usize;
        let value_len = u32::from_le_bytes(read_array(&data[19..23])) as usize;

        let body_end = HEADER_SIZE + key_len + value_len;
        let total = body_end + CRC_SIZE;
        if data.len() < total {
            return Ok(None);
        }

        let stored = u32::from_le_bytes(read_array(&data[body_end..total]));
        let computed = crc32fast::hash(&data[..body_end]);
        if stored != computed {
            return Err(CoreError::corruption(format!(
                "checksum mismatch at sequence {sequence}: expected {stored:08x}, got {computed:08x}"
            )));
        }

        let key_end = HEADER_SIZE + key_len;
        let block = Self {
            sequence,
            block_type,
            key: data[HEADER_SIZE..key_end].to_vec(),
            value: data[key_end..body_end].to_vec(),
        };
        Ok(Some((block, total)))
    }
}

fn read_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut array = [0u8; N];
    array.copy_from_slice(bytes);
    array
}

fn frame_len(part: &'static str, len: usize) -> CoreResult<u32> {
    u32::try_from(len).map_err(|_| CoreError::BlockTooLarge { part, len })
}
