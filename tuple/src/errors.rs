// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

/// Tuple engine error
#[derive(Debug, Error)]
pub enum Error {
    /// A tuple must hold exactly `TUPLE_SIZE` blocks
    #[error("Invalid tuple size {size}, must be {expected}")]
    InvalidTupleSize { size: usize, expected: usize },
    /// Tuple members must share one block size
    #[error("Tuple members disagree on block size")]
    BlockSizeMismatch,
    /// Whitener and random counts do not sum to a full tuple
    #[error("Invalid block count: {whiteners} whiteners + {randoms} randoms + 1 prime != tuple size")]
    InvalidBlockCount { whiteners: usize, randoms: usize },
    /// A required input was absent
    #[error("Missing parameter: {0}")]
    MissingParameters(&'static str),
    /// XOR computation could not complete
    #[error("XOR operation failed: {0}")]
    XorFailed(String),
    /// Random companion supply failed
    #[error("Random block generation failed: {0}")]
    RandomGenerationFailed(String),
    /// Whitener supply failed
    #[error("Whitening block generation failed: {0}")]
    WhitenerGenerationFailed(String),
    /// The source byte stream broke mid-pipeline
    #[error("Data stream processing failed: {0}")]
    StreamProcessingFailed(String),
    #[error(transparent)]
    Block(#[from] brightchain_blocks::Error),
}
