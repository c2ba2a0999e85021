// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use brightchain_blocks::{Block, BlockSize, RandomBlock, WhitenedBlock};
use brightchain_tuple::Error as TupleError;
use std::collections::VecDeque;

/// Supplies fresh random companion blocks to the write pipeline.
pub trait RandomBlockSource {
    fn random_block(&mut self, block_size: BlockSize) -> Result<RandomBlock, TupleError>;
}

/// Supplies reusable whiteners; yielding `None` makes the pipeline fall back
/// to fresh randoms.
pub trait WhitenedBlockSource {
    fn next_whitener(&mut self, block_size: BlockSize)
        -> Result<Option<WhitenedBlock>, TupleError>;
}

/// Draws every random block from the OS CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsprngRandomSource;

impl RandomBlockSource for CsprngRandomSource {
    fn random_block(&mut self, block_size: BlockSize) -> Result<RandomBlock, TupleError> {
        Ok(RandomBlock::new(block_size))
    }
}

/// A whitener source that never yields; every tuple gets fresh randoms.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWhiteners;

impl WhitenedBlockSource for NoWhiteners {
    fn next_whitener(
        &mut self,
        _block_size: BlockSize,
    ) -> Result<Option<WhitenedBlock>, TupleError> {
        Ok(None)
    }
}

/// A FIFO pool of previously persisted blocks offered for reuse as
/// whiteners. Reuse across unrelated tuples is what makes stored blocks
/// owner-free.
#[derive(Debug, Default)]
pub struct WhitenerPool {
    pool: VecDeque<WhitenedBlock>,
}

impl WhitenerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a block for future reuse.
    pub fn push(&mut self, block: WhitenedBlock) {
        self.pool.push_back(block);
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

impl WhitenedBlockSource for WhitenerPool {
    fn next_whitener(
        &mut self,
        block_size: BlockSize,
    ) -> Result<Option<WhitenedBlock>, TupleError> {
        // Skip entries of the wrong size class; they go back to the tail.
        for _ in 0..self.pool.len() {
            let candidate = match self.pool.pop_front() {
                Some(candidate) => candidate,
                None => break,
            };
            if candidate.block_size() == block_size {
                return Ok(Some(candidate));
            }
            self.pool.push_back(candidate);
        }
        Ok(None)
    }
}
