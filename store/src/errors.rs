// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use brightchain_encoding::Checksum;
use thiserror::Error;

/// Block store error
#[derive(Debug, PartialEq, Error)]
pub enum Error {
    /// No block stored under the requested id
    #[error("Block {0} not found in store")]
    KeyNotFound(Checksum),
    /// A different payload already lives at this id
    #[error("A different block already exists at {0}")]
    BlockAlreadyExists(Checksum),
    /// Payload bytes do not hash to the id they are keyed under
    #[error("Block bytes hash to {actual}, not the id {expected}")]
    BlockIdMismatch {
        expected: Checksum,
        actual: Checksum,
    },
    /// Payload length disagrees with the declared block size
    #[error("Block is {actual} bytes, expected block size {expected}")]
    BlockSizeMismatch { expected: usize, actual: usize },
    #[error("{0}")]
    Other(String),
}

impl From<Error> for String {
    fn from(e: Error) -> Self {
        e.to_string()
    }
}
