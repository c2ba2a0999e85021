// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

/// Checksum decoding error
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ChecksumError {
    /// Raw byte form was not exactly 64 bytes
    #[error("Invalid checksum length {length}, must be 64 bytes")]
    InvalidLength { length: usize },
    /// Hex form was not exactly 128 lowercase hex digits
    #[error("Invalid checksum hex: {0}")]
    InvalidHex(String),
}
