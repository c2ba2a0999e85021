// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{Block, BlockCore, BlockDataType, BlockSize, BlockType, Error};
use brightchain_encoding::Checksum;
use chrono::{DateTime, Utc};

/// A block produced by XOR whitening.
///
/// Carries `length_before_encryption` so the source's pre-padding length
/// survives a round trip through the XOR engine.
#[derive(Debug, Clone)]
pub struct WhitenedBlock {
    core: BlockCore,
}

impl WhitenedBlock {
    /// Creates a readable, persistable whitened block dated now.
    pub fn new(block_size: BlockSize, data: &[u8]) -> Result<Self, Error> {
        Self::from_parts(block_size, data, None, None, None, true, true)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        block_size: BlockSize,
        data: &[u8],
        checksum: Option<Checksum>,
        date_created: Option<DateTime<Utc>>,
        length_before_encryption: Option<u32>,
        can_read: bool,
        can_persist: bool,
    ) -> Result<Self, Error> {
        let core = BlockCore::build(
            block_size,
            BlockType::OwnerFreeWhitened,
            BlockDataType::RawData,
            data,
            checksum,
            date_created,
            length_before_encryption,
            can_read,
            can_persist,
        )?;
        Ok(WhitenedBlock { core })
    }
}

impl Block for WhitenedBlock {
    fn core(&self) -> &BlockCore {
        &self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_data_is_zero_padded() {
        let block = WhitenedBlock::new(BlockSize::Message, b"abc").unwrap();
        let data = block.data().unwrap();
        assert_eq!(data.len(), 512);
        assert_eq!(&data[..3], b"abc");
        assert!(data[3..].iter().all(|b| *b == 0));
    }

    #[test]
    fn length_must_fit_block() {
        let err =
            WhitenedBlock::from_parts(BlockSize::Message, b"x", None, None, Some(513), true, true)
                .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidLengthBeforeEncryption {
                length: 513,
                block_size: 512
            }
        ));
    }
}
