// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::Error;
use std::fmt;

/// The closed set of valid block sizes.
///
/// Every block buffer is exactly one of these lengths; shorter payloads are
/// zero-padded up to the block size before hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockSize {
    /// 512 B, message-sized payloads
    Message,
    /// 1 KiB
    Tiny,
    /// 4 KiB
    Small,
    /// 1 MiB
    Medium,
    /// 16 MiB
    Large,
    /// 64 MiB
    Huge,
}

impl BlockSize {
    /// All valid sizes, ascending.
    pub const ALL: [BlockSize; 6] = [
        BlockSize::Message,
        BlockSize::Tiny,
        BlockSize::Small,
        BlockSize::Medium,
        BlockSize::Large,
        BlockSize::Huge,
    ];

    /// Byte length of this block size.
    pub const fn as_usize(self) -> usize {
        match self {
            BlockSize::Message => 512,
            BlockSize::Tiny => 1024,
            BlockSize::Small => 4096,
            BlockSize::Medium => 1_048_576,
            BlockSize::Large => 16_777_216,
            BlockSize::Huge => 67_108_864,
        }
    }

    /// Maps an exact byte length back to its block size.
    pub fn from_exact(length: usize) -> Result<BlockSize, Error> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_usize() == length)
            .ok_or(Error::InvalidBlockSize(length))
    }

    /// Smallest block size enclosing a payload of `length` bytes.
    pub fn length_to_block_size(length: u64) -> Result<BlockSize, Error> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_usize() as u64 >= length)
            .ok_or(Error::LengthExceedsMaximum(length))
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_usize())
    }
}

impl TryFrom<usize> for BlockSize {
    type Error = Error;

    fn try_from(length: usize) -> Result<Self, Self::Error> {
        Self::from_exact(length)
    }
}
