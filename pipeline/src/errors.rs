// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io;
use thiserror::Error;

/// Streaming pipeline error; terminal for the invocation that raised it.
#[derive(Debug, Error)]
pub enum Error {
    /// The source byte stream failed
    #[error("Source stream failed: {0}")]
    Source(#[from] io::Error),
    /// Source produced a different byte count than it declared
    #[error("Source declared {declared} bytes but produced {actual}")]
    LengthMismatch { declared: u64, actual: u64 },
    /// Reassembled plaintext does not hash to the recorded digest
    #[error("Recovered plaintext fails its end-to-end digest")]
    PlaintextChecksumMismatch,
    /// A sealed root cannot fit its block size
    #[error("Sealed list block of {sealed} bytes exceeds block size {block_size}")]
    SealedRootTooLarge { sealed: usize, block_size: usize },
    #[error(transparent)]
    Store(#[from] brightchain_store::Error),
    #[error(transparent)]
    Tuple(#[from] brightchain_tuple::Error),
    #[error(transparent)]
    Block(#[from] brightchain_blocks::Error),
    #[error(transparent)]
    Cbl(#[from] brightchain_cbl::CblError),
    #[error(transparent)]
    SuperCbl(#[from] brightchain_cbl::SuperCblError),
    #[error(transparent)]
    Magnet(#[from] brightchain_cbl::MagnetError),
    #[error(transparent)]
    Crypto(#[from] brightchain_crypto::Error),
}
