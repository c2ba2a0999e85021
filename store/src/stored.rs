// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::Error;
use brightchain_blocks::{Block, BlockSize};
use brightchain_encoding::{sha3_512, Checksum};

/// The at-rest form of a block: its content address, size class, and the
/// full padded payload.
///
/// Construction is the only place bytes and id can meet, and it refuses any
/// pairing where the bytes do not hash to the id, so a `StoredBlock` in hand
/// always satisfies the store's integrity invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlock {
    checksum: Checksum,
    block_size: BlockSize,
    data: Vec<u8>,
}

impl StoredBlock {
    /// Addresses a payload by its own digest.
    pub fn new(block_size: BlockSize, data: Vec<u8>) -> Result<Self, Error> {
        if data.len() != block_size.as_usize() {
            return Err(Error::BlockSizeMismatch {
                expected: block_size.as_usize(),
                actual: data.len(),
            });
        }
        let checksum = sha3_512(&data);
        Ok(StoredBlock {
            checksum,
            block_size,
            data,
        })
    }

    /// Rebuilds an at-rest block from an id and payload, verifying they
    /// agree.
    pub fn from_parts(
        checksum: Checksum,
        block_size: BlockSize,
        data: Vec<u8>,
    ) -> Result<Self, Error> {
        if data.len() != block_size.as_usize() {
            return Err(Error::BlockSizeMismatch {
                expected: block_size.as_usize(),
                actual: data.len(),
            });
        }
        let actual = sha3_512(&data);
        if actual != checksum {
            return Err(Error::BlockIdMismatch {
                expected: checksum,
                actual,
            });
        }
        Ok(StoredBlock {
            checksum,
            block_size,
            data,
        })
    }

    /// Captures an in-memory block's padded buffer for storage.
    pub fn from_block<B: Block>(block: &B) -> Result<Self, Error> {
        let data = block
            .data()
            .map_err(|e| Error::Other(e.to_string()))?
            .to_vec();
        Self::from_parts(block.checksum().clone(), block.block_size(), data)
    }

    /// Getter for the content address.
    pub fn checksum(&self) -> &Checksum {
        &self.checksum
    }

    /// Getter for the size class.
    pub fn block_size(&self) -> BlockSize {
        self.block_size
    }

    /// Getter for the padded payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the block and yields the payload.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
