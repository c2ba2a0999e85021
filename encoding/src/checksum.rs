// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::ChecksumError;
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// SHA3-512 digest length in bytes.
pub const SHA3_512_LEN: usize = 64;

/// A SHA3-512 digest; the content address of a block.
///
/// Immutable after construction. Equality is byte-wise; the hex form is
/// always 128 lowercase hex digits.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Checksum([u8; SHA3_512_LEN]);

impl Checksum {
    /// Wraps a raw 64-byte digest.
    pub fn new(bytes: [u8; SHA3_512_LEN]) -> Self {
        Checksum(bytes)
    }

    /// Builds a checksum from a byte slice of any source.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChecksumError> {
        let arr: [u8; SHA3_512_LEN] = bytes
            .try_into()
            .map_err(|_| ChecksumError::InvalidLength {
                length: bytes.len(),
            })?;
        Ok(Checksum(arr))
    }

    /// Parses the 128-character lowercase hex form.
    pub fn from_hex(s: &str) -> Result<Self, ChecksumError> {
        if s.len() != SHA3_512_LEN * 2 {
            return Err(ChecksumError::InvalidHex(s.to_owned()));
        }
        let bytes = hex::decode(s).map_err(|_| ChecksumError::InvalidHex(s.to_owned()))?;
        Self::from_bytes(&bytes)
    }

    /// Returns the lossless hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns reference to digest bytes.
    pub fn as_bytes(&self) -> &[u8; SHA3_512_LEN] {
        &self.0
    }

    /// Returns the digest as an owned byte vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// The all-zero digest, used as a placeholder address in tests and
    /// unsigned structures.
    pub fn zeroed() -> Self {
        Checksum([0u8; SHA3_512_LEN])
    }
}

impl AsRef<[u8]> for Checksum {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({})", self.to_hex())
    }
}

impl FromStr for Checksum {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Checksum {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ser::Serialize::serialize(&self.0[..], serializer)
    }
}

impl<'de> Deserialize<'de> for Checksum {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: Cow<'de, [u8]> = de::Deserialize::deserialize(deserializer)?;
        Checksum::from_bytes(&bytes).map_err(de::Error::custom)
    }
}
