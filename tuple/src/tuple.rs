// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{Error, TUPLE_SIZE};
use brightchain_blocks::{AnyBlock, Block, BlockSize};
use brightchain_encoding::{Checksum, SHA3_512_LEN};

/// An ordered sequence of exactly `TUPLE_SIZE` blocks of one block size.
///
/// The first member of a whitened tuple is the prime; the remainder are its
/// companions in the order they were XORed in.
#[derive(Debug, Clone)]
pub struct BlockTuple {
    blocks: Vec<AnyBlock>,
}

impl BlockTuple {
    pub fn new(blocks: Vec<AnyBlock>) -> Result<Self, Error> {
        if blocks.len() != TUPLE_SIZE {
            return Err(Error::InvalidTupleSize {
                size: blocks.len(),
                expected: TUPLE_SIZE,
            });
        }
        let size = blocks[0].block_size();
        if blocks.iter().any(|b| b.block_size() != size) {
            return Err(Error::BlockSizeMismatch);
        }
        Ok(BlockTuple { blocks })
    }

    /// Getter for the members, prime first.
    pub fn blocks(&self) -> &[AnyBlock] {
        &self.blocks
    }

    /// The shared block size of all members.
    pub fn block_size(&self) -> BlockSize {
        self.blocks[0].block_size()
    }

    /// Ordered member checksums.
    pub fn block_ids(&self) -> Vec<Checksum> {
        self.blocks.iter().map(|b| b.checksum().clone()).collect()
    }

    /// The member checksums concatenated into one buffer, in tuple order.
    pub fn block_ids_buffer(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(TUPLE_SIZE * SHA3_512_LEN);
        for block in &self.blocks {
            buf.extend_from_slice(block.checksum().as_bytes());
        }
        buf
    }

    /// The prime: the stored representative of the whitened source.
    pub fn prime(&self) -> &AnyBlock {
        &self.blocks[0]
    }

    /// The companions XORed into the prime, in order.
    pub fn companions(&self) -> &[AnyBlock] {
        &self.blocks[1..]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brightchain_blocks::RandomBlock;

    #[test]
    fn tuple_must_be_exactly_sized() {
        let blocks: Vec<AnyBlock> = (0..2)
            .map(|_| RandomBlock::new(BlockSize::Message).into())
            .collect();
        assert!(matches!(
            BlockTuple::new(blocks),
            Err(Error::InvalidTupleSize {
                size: 2,
                expected: 3
            })
        ));
    }

    #[test]
    fn tuple_members_share_block_size() {
        let blocks: Vec<AnyBlock> = vec![
            RandomBlock::new(BlockSize::Message).into(),
            RandomBlock::new(BlockSize::Message).into(),
            RandomBlock::new(BlockSize::Tiny).into(),
        ];
        assert!(matches!(
            BlockTuple::new(blocks),
            Err(Error::BlockSizeMismatch)
        ));
    }

    #[test]
    fn ids_buffer_concatenates_in_order() {
        let blocks: Vec<AnyBlock> = (0..3)
            .map(|_| RandomBlock::new(BlockSize::Message).into())
            .collect();
        let tuple = BlockTuple::new(blocks).unwrap();

        let ids = tuple.block_ids();
        let buf = tuple.block_ids_buffer();
        assert_eq!(buf.len(), 3 * SHA3_512_LEN);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(
                &buf[i * SHA3_512_LEN..(i + 1) * SHA3_512_LEN],
                id.as_bytes()
            );
        }
    }
}
