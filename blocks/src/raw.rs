// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{Block, BlockCore, BlockDataType, BlockSize, BlockType, Error};
use brightchain_encoding::Checksum;
use chrono::{DateTime, Utc};
use rand::RngCore;

/// An opaque, header-free block of bytes padded to its block size.
///
/// Raw blocks are the at-rest shape of random and whitened data.
#[derive(Debug, Clone)]
pub struct RawDataBlock {
    core: BlockCore,
}

impl RawDataBlock {
    /// Creates a readable, persistable raw block dated now.
    pub fn new(block_size: BlockSize, data: &[u8]) -> Result<Self, Error> {
        Self::with_options(block_size, data, None, None, true, true)
    }

    pub fn with_options(
        block_size: BlockSize,
        data: &[u8],
        checksum: Option<Checksum>,
        date_created: Option<DateTime<Utc>>,
        can_read: bool,
        can_persist: bool,
    ) -> Result<Self, Error> {
        let core = BlockCore::build(
            block_size,
            BlockType::RawData,
            BlockDataType::RawData,
            data,
            checksum,
            date_created,
            None,
            can_read,
            can_persist,
        )?;
        Ok(RawDataBlock { core })
    }
}

impl Block for RawDataBlock {
    fn core(&self) -> &BlockCore {
        &self.core
    }
}

/// A block filled with cryptographically strong random bytes at construction.
///
/// Single-use as a tuple companion until reused as a whitener.
#[derive(Debug, Clone)]
pub struct RandomBlock {
    core: BlockCore,
}

impl RandomBlock {
    /// Fills an entire buffer of `block_size` bytes from the OS CSPRNG and
    /// addresses it.
    pub fn new(block_size: BlockSize) -> Self {
        let mut buf = vec![0u8; block_size.as_usize()];
        rand::rngs::OsRng.fill_bytes(&mut buf);
        let core = BlockCore::build(
            block_size,
            BlockType::Random,
            BlockDataType::RawData,
            &buf,
            None,
            None,
            None,
            true,
            true,
        )
        .expect("a full random buffer always fits its block size");
        RandomBlock { core }
    }

    /// Rebuilds a random block from previously generated entropy, e.g. a
    /// tuple companion loaded back from a store.
    pub fn from_data(block_size: BlockSize, data: &[u8]) -> Result<Self, Error> {
        let core = BlockCore::build(
            block_size,
            BlockType::Random,
            BlockDataType::RawData,
            data,
            None,
            None,
            None,
            true,
            true,
        )?;
        Ok(RandomBlock { core })
    }
}

impl Block for RandomBlock {
    fn core(&self) -> &BlockCore {
        &self.core
    }
}
