// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use brightchain_encoding::Checksum;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Block layer error
#[derive(Debug, Error)]
pub enum Error {
    /// Payload does not fit the chosen block size
    #[error("Data length {data_length} exceeds block size {block_size}")]
    ExceedsBlockSize {
        data_length: usize,
        block_size: usize,
    },
    /// Creation date lies past the current wall clock
    #[error("Block creation date is in the future")]
    FutureCreationDate,
    /// Pre-padding length does not fit inside the block
    #[error("Length before encryption {length} out of range for block size {block_size}")]
    InvalidLengthBeforeEncryption { length: u32, block_size: usize },
    /// Recorded and recomputed digests diverge
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        expected: Checksum,
        actual: Checksum,
    },
    /// Read attempted through a handle without read permission
    #[error("Block is not readable")]
    NotReadable,
    /// Write attempted through a handle without persist permission
    #[error("Block is not persistable")]
    NotPersistable,
    /// The handle's backing file is gone
    #[error("Backing file not found: {0}")]
    FileNotFound(PathBuf),
    /// Value is not one of the closed set of block sizes
    #[error("Invalid block size {0}")]
    InvalidBlockSize(usize),
    /// No block size encloses the given length
    #[error("No block size can enclose length {0}")]
    LengthExceedsMaximum(u64),
    /// Unknown block type tag on the wire
    #[error("Invalid block type tag {0}")]
    InvalidBlockType(u8),
    /// Unknown block data type tag on the wire
    #[error("Invalid block data type tag {0}")]
    InvalidBlockDataType(u8),
    /// Body too short for the encryption header fields
    #[error("Encrypted body length {length} cannot carry the encryption header")]
    InvalidEncryptedLength { length: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}
