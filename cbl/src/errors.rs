// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use brightchain_blocks::BlockType;
use brightchain_encoding::Checksum;
use thiserror::Error;

/// Constituent block list error
#[derive(Debug, PartialEq, Error)]
pub enum CblError {
    /// Signature does not verify against the creator's public key
    #[error("Invalid CBL signature")]
    InvalidSignature,
    /// Header bytes do not form a well-shaped CBL
    #[error("Invalid CBL structure: {0}")]
    InvalidStructure(String),
    /// Extended-header access on a basic CBL
    #[error("Block is not an extended CBL")]
    NotExtendedCbl,
    /// A constituent block could not be loaded
    #[error("Failed to load constituent block {0}")]
    FailedToLoadBlock(Checksum),
    /// Stored creator id disagrees with the verifying member
    #[error("Creator id does not match the verifying member")]
    CreatorIdMismatch,
    /// More addresses than the block size can carry
    #[error("Address count {count} exceeds capacity {capacity}")]
    AddressCountExceedsCapacity { count: usize, capacity: usize },
    /// File name empty after trimming
    #[error("File name is empty")]
    FileNameEmpty,
    /// File name longer than the wire format allows
    #[error("File name exceeds {max} bytes", max = crate::MAX_FILE_NAME_LENGTH)]
    FileNameTooLong,
    /// File name carries control characters
    #[error("File name contains control characters")]
    FileNameControlCharacters,
    /// File name attempts path traversal
    #[error("File name contains path traversal")]
    FileNamePathTraversal,
    /// File name fails the allowed-character pattern
    #[error("File name contains disallowed characters")]
    FileNameInvalid,
    /// MIME type empty after trimming
    #[error("MIME type is empty")]
    MimeTypeEmpty,
    /// MIME type has surrounding whitespace
    #[error("MIME type has surrounding whitespace")]
    MimeTypeWhitespace,
    /// MIME type carries uppercase characters
    #[error("MIME type must be lowercase")]
    MimeTypeNotLowercase,
    /// MIME type longer than the wire format allows
    #[error("MIME type exceeds {max} bytes", max = crate::MAX_MIME_TYPE_LENGTH)]
    MimeTypeTooLong,
    /// MIME type is not a type/subtype pair
    #[error("MIME type is not a valid type/subtype pair")]
    MimeTypeInvalid,
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error(transparent)]
    Crypto(#[from] brightchain_crypto::Error),
}

/// Capacity calculation error
#[derive(Debug, PartialEq, Eq, Error)]
pub enum CapacityError {
    /// Block type has no defined capacity
    #[error("Block type {0:?} has no defined capacity")]
    InvalidBlockType(BlockType),
    /// Payload cannot fit the block after overheads
    #[error("Payload of {payload} bytes exceeds capacity {capacity}")]
    CapacityExceeded { payload: usize, capacity: usize },
    /// Multi-recipient sealing with an unusable recipient count
    #[error("Invalid recipient count {0}")]
    InvalidRecipientCount(usize),
    /// Extended-header file name failed validation
    #[error("Invalid file name for extended header")]
    InvalidFileName,
    /// Extended-header MIME type failed validation
    #[error("Invalid MIME type for extended header")]
    InvalidMimeType,
}

/// Super-CBL error
#[derive(Debug, PartialEq, Error)]
pub enum SuperCblError {
    /// Leading bytes are not the Super-CBL magic/type pair
    #[error("Block is not a Super-CBL")]
    InvalidCblType,
    /// Header bytes do not form a well-shaped Super-CBL
    #[error("Invalid Super-CBL format: {0}")]
    InvalidFormat(String),
    /// Hierarchy recurses past the configured bound
    #[error("Super-CBL depth {depth} exceeds maximum {max}")]
    MaxDepthExceeded { depth: u8, max: u8 },
    /// Reconstructed address count disagrees with the header
    #[error("Block count mismatch: header says {expected}, found {actual}")]
    BlockCountMismatch { expected: u64, actual: u64 },
    /// A sub-CBL is absent from storage
    #[error("Missing sub-CBL {0}")]
    MissingSubCbl(Checksum),
    #[error(transparent)]
    Cbl(#[from] CblError),
}

/// Magnet URL error
#[derive(Debug, PartialEq, Eq, Error)]
pub enum MagnetError {
    /// Not a magnet URL
    #[error("Invalid magnet URL scheme: {0}")]
    InvalidScheme(String),
    /// No `xt` parameter
    #[error("Magnet URL is missing its exact topic")]
    MissingTopic,
    /// `xt` parameter is not a BrightChain urn over a checksum
    #[error("Invalid magnet URL topic: {0}")]
    InvalidTopic(String),
    /// No `xs` parameter
    #[error("Magnet URL is missing its exact size")]
    MissingBlockSize,
    /// `xs` parameter is not a valid block size
    #[error("Invalid magnet URL block size: {0}")]
    InvalidBlockSize(String),
}
