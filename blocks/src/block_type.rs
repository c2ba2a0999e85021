// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::Error;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// Dispatch tag for block codecs and capacity calculation.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, FromPrimitive)]
#[repr(u8)]
pub enum BlockType {
    Unknown = 0,
    RawData = 1,
    Random = 2,
    OwnerFreeWhitened = 3,
    EphemeralOwnedData = 4,
    ConstituentBlockList = 5,
    ExtendedConstituentBlockList = 6,
    EncryptedOwnedData = 7,
    EncryptedConstituentBlockList = 8,
    EncryptedExtendedConstituentBlockList = 9,
    MultiEncrypted = 10,
    FecData = 11,
    Handle = 12,
}

impl BlockType {
    /// Whether this type wraps an ECIES-sealed body.
    pub fn is_encrypted(self) -> bool {
        matches!(
            self,
            BlockType::EncryptedOwnedData
                | BlockType::EncryptedConstituentBlockList
                | BlockType::EncryptedExtendedConstituentBlockList
                | BlockType::MultiEncrypted
        )
    }

    /// Whether this type carries a constituent block list body.
    pub fn is_cbl(self) -> bool {
        matches!(
            self,
            BlockType::ConstituentBlockList
                | BlockType::ExtendedConstituentBlockList
                | BlockType::EncryptedConstituentBlockList
                | BlockType::EncryptedExtendedConstituentBlockList
        )
    }
}

impl TryFrom<u8> for BlockType {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        BlockType::from_u8(tag).ok_or(Error::InvalidBlockType(tag))
    }
}

/// Describes how a block's payload is interpreted.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, FromPrimitive)]
#[repr(u8)]
pub enum BlockDataType {
    RawData = 0,
    EphemeralStructuredData = 1,
    PublicMemberData = 2,
    PrivateMemberData = 3,
    Encrypted = 4,
}

impl TryFrom<u8> for BlockDataType {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        BlockDataType::from_u8(tag).ok_or(Error::InvalidBlockDataType(tag))
    }
}
