// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{
    validate_file_name, validate_mime_type, CapacityError, ADDRESS_LEN, BASE_HEADER_LEN,
};
use brightchain_blocks::{BlockSize, BlockType};
use brightchain_crypto::ECIES_OVERHEAD;
use brightchain_tuple::TUPLE_SIZE;

/// Per-recipient entry in a multi-recipient sealed body: the recipient's
/// GUID plus their wrapped symmetric key.
pub const MULTI_RECIPIENT_ENTRY_LEN: usize = 64;
/// Recipient count is a single wire byte.
pub const MAX_MULTI_RECIPIENTS: usize = 255;

/// How a block's body is sealed, for overhead accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionKind {
    None,
    /// Single-recipient ECIES: ephemeral key, nonce, tag.
    Ecies,
    /// Shared-key sealing fanned out to several recipients.
    MultiRecipient { recipients: usize },
}

/// Bytes the sealing layer consumes before any payload.
pub fn encryption_overhead(kind: EncryptionKind) -> Result<usize, CapacityError> {
    match kind {
        EncryptionKind::None => Ok(0),
        EncryptionKind::Ecies => Ok(ECIES_OVERHEAD),
        EncryptionKind::MultiRecipient { recipients } => {
            if recipients == 0 || recipients > MAX_MULTI_RECIPIENTS {
                return Err(CapacityError::InvalidRecipientCount(recipients));
            }
            Ok(ECIES_OVERHEAD + 1 + recipients * MULTI_RECIPIENT_ENTRY_LEN)
        }
    }
}

/// Header bytes a block type consumes inside its body.
///
/// `Handle` references an external block rather than storing one, so it is
/// intentionally zero-overhead, like the raw data types.
pub fn block_type_overhead(
    block_type: BlockType,
    file_name: Option<&str>,
    mime_type: Option<&str>,
) -> Result<usize, CapacityError> {
    match block_type {
        BlockType::RawData
        | BlockType::Random
        | BlockType::OwnerFreeWhitened
        | BlockType::EphemeralOwnedData
        | BlockType::EncryptedOwnedData
        | BlockType::MultiEncrypted
        | BlockType::Handle => Ok(0),
        BlockType::ConstituentBlockList | BlockType::EncryptedConstituentBlockList => {
            Ok(BASE_HEADER_LEN)
        }
        BlockType::ExtendedConstituentBlockList
        | BlockType::EncryptedExtendedConstituentBlockList => {
            Ok(BASE_HEADER_LEN + extended_header_overhead(file_name, mime_type)?)
        }
        BlockType::Unknown | BlockType::FecData => {
            Err(CapacityError::InvalidBlockType(block_type))
        }
    }
}

/// Extra header bytes the extended filename/MIME fields consume.
pub fn extended_header_overhead(
    file_name: Option<&str>,
    mime_type: Option<&str>,
) -> Result<usize, CapacityError> {
    let file_name = file_name.unwrap_or("");
    let mime_type = mime_type.unwrap_or("");
    validate_file_name(file_name).map_err(|_| CapacityError::InvalidFileName)?;
    validate_mime_type(mime_type).map_err(|_| CapacityError::InvalidMimeType)?;
    Ok(2 + file_name.len() + 1 + mime_type.len())
}

/// Bytes available for payload in a block of `block_size` once sealing and
/// header overheads are paid.
pub fn available_capacity(
    block_size: BlockSize,
    block_type: BlockType,
    encryption: EncryptionKind,
    file_name: Option<&str>,
    mime_type: Option<&str>,
) -> Result<usize, CapacityError> {
    let overhead = encryption_overhead(encryption)?
        + block_type_overhead(block_type, file_name, mime_type)?;
    Ok(block_size.as_usize().saturating_sub(overhead))
}

/// Largest address count a CBL of `block_size` can carry, rounded down to a
/// multiple of `TUPLE_SIZE` so reconstruction stays tuple-granular.
///
/// Returns zero rather than a count below one whole tuple.
pub fn cbl_address_capacity(
    block_size: BlockSize,
    encryption: EncryptionKind,
    file_name: Option<&str>,
    mime_type: Option<&str>,
) -> Result<usize, CapacityError> {
    let block_type = if file_name.is_some() || mime_type.is_some() {
        BlockType::ExtendedConstituentBlockList
    } else {
        BlockType::ConstituentBlockList
    };
    let available = available_capacity(block_size, block_type, encryption, file_name, mime_type)?;

    let mut count = available / ADDRESS_LEN;
    count -= count % TUPLE_SIZE;
    if count < TUPLE_SIZE {
        return Ok(0);
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_cbl_capacity_is_tuple_aligned() {
        let capacity =
            cbl_address_capacity(BlockSize::Small, EncryptionKind::None, None, None).unwrap();
        // 4096 - 98 = 3998; 3998 / 64 = 62; down to a multiple of 3.
        assert_eq!(capacity, 60);
        assert_eq!(capacity % TUPLE_SIZE, 0);
    }

    #[test]
    fn message_block_capacities() {
        // 512 - 98 = 414; 414 / 64 = 6 addresses; sealing shrinks the
        // budget to one tuple.
        assert_eq!(
            cbl_address_capacity(BlockSize::Message, EncryptionKind::None, None, None).unwrap(),
            6
        );
        assert_eq!(
            cbl_address_capacity(BlockSize::Message, EncryptionKind::Ecies, None, None).unwrap(),
            3
        );
    }

    #[test]
    fn overheads_monotonically_shrink_capacity() {
        let plain =
            cbl_address_capacity(BlockSize::Small, EncryptionKind::None, None, None).unwrap();
        let sealed =
            cbl_address_capacity(BlockSize::Small, EncryptionKind::Ecies, None, None).unwrap();
        let extended = cbl_address_capacity(
            BlockSize::Small,
            EncryptionKind::Ecies,
            Some("a.txt"),
            Some("text/plain"),
        )
        .unwrap();
        let longer_name = cbl_address_capacity(
            BlockSize::Small,
            EncryptionKind::Ecies,
            Some("a much longer file name.txt"),
            Some("text/plain"),
        )
        .unwrap();

        assert!(plain >= sealed);
        assert!(sealed >= extended);
        assert!(extended >= longer_name);
        for capacity in [plain, sealed, extended, longer_name] {
            assert_eq!(capacity % TUPLE_SIZE, 0);
        }
    }

    #[test]
    fn recipient_count_bounds() {
        assert_eq!(
            encryption_overhead(EncryptionKind::MultiRecipient { recipients: 0 }),
            Err(CapacityError::InvalidRecipientCount(0))
        );
        assert_eq!(
            encryption_overhead(EncryptionKind::MultiRecipient { recipients: 256 }),
            Err(CapacityError::InvalidRecipientCount(256))
        );
        assert!(
            encryption_overhead(EncryptionKind::MultiRecipient { recipients: 2 }).unwrap()
                > encryption_overhead(EncryptionKind::Ecies).unwrap()
        );
    }

    #[test]
    fn unknown_types_have_no_capacity() {
        assert_eq!(
            block_type_overhead(BlockType::Unknown, None, None),
            Err(CapacityError::InvalidBlockType(BlockType::Unknown))
        );
    }

    #[test]
    fn invalid_extended_fields_surface_before_assembly() {
        assert_eq!(
            cbl_address_capacity(
                BlockSize::Small,
                EncryptionKind::None,
                Some("../etc/passwd"),
                Some("text/plain")
            ),
            Err(CapacityError::InvalidFileName)
        );
        assert_eq!(
            cbl_address_capacity(
                BlockSize::Small,
                EncryptionKind::None,
                Some("a.txt"),
                Some("Not A Mime")
            ),
            Err(CapacityError::InvalidMimeType)
        );
    }
}
