// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

/// Crypto error
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Failed to produce a signature
    #[error("Failed to sign digest: {0}")]
    SigningError(String),
    /// Provided key material is not understood
    #[error("Invalid key material")]
    InvalidKey,
    /// Authenticated decryption failed
    #[error("Failed to decrypt data")]
    DecryptionFailed,
    /// Sealing plaintext failed
    #[error("Failed to encrypt data")]
    EncryptionFailed,
    /// Ciphertext too short to carry the ECIES prefix fields
    #[error("Invalid ciphertext length {length}")]
    InvalidCiphertext { length: usize },
    /// Signature byte form was not exactly 64 bytes
    #[error("Invalid signature length {length}, must be 64")]
    InvalidSignatureLength { length: usize },
}

impl From<libsecp256k1::Error> for Error {
    fn from(err: libsecp256k1::Error) -> Error {
        Error::SigningError(format!("{:?}", err))
    }
}
