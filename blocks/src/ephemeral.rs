// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{Block, BlockCore, BlockDataType, BlockSize, BlockType, Error};
use brightchain_crypto::Member;
use brightchain_encoding::Checksum;
use chrono::{DateTime, Utc};

/// A plaintext block held in memory only, owned by its creating member.
///
/// Ephemeral blocks are never written to long-term storage as-is; they are
/// either whitened into tuples or sealed through the encryption collaborator
/// first, so `can_persist` is always false.
#[derive(Debug, Clone)]
pub struct EphemeralBlock {
    core: BlockCore,
    creator: Member,
}

impl EphemeralBlock {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        block_type: BlockType,
        block_data_type: BlockDataType,
        block_size: BlockSize,
        data: &[u8],
        checksum: Option<Checksum>,
        creator: Member,
        date_created: Option<DateTime<Utc>>,
        length_before_encryption: Option<u32>,
    ) -> Result<Self, Error> {
        let core = BlockCore::build(
            block_size,
            block_type,
            block_data_type,
            data,
            checksum,
            date_created,
            length_before_encryption,
            true,
            false,
        )?;
        Ok(EphemeralBlock { core, creator })
    }

    /// Convenience constructor for a plaintext source chunk entering the
    /// whitening pipeline.
    pub fn from_source_chunk(
        block_size: BlockSize,
        data: &[u8],
        creator: Member,
    ) -> Result<Self, Error> {
        Self::new(
            BlockType::EphemeralOwnedData,
            BlockDataType::RawData,
            block_size,
            data,
            None,
            creator,
            None,
            Some(data.len() as u32),
        )
    }

    /// Getter for the owning member.
    pub fn creator(&self) -> &Member {
        &self.creator
    }
}

impl Block for EphemeralBlock {
    fn core(&self) -> &BlockCore {
        &self.core
    }
}
