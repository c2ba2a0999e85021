// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{
    BlockDataType, BlockSize, BlockType, EncryptedBlock, EphemeralBlock, Error, RandomBlock,
    RawDataBlock, WhitenedBlock,
};
use brightchain_encoding::{sha3_512, Checksum};
use chrono::{DateTime, Utc};

/// The shared header every block variant embeds.
#[derive(Debug, Clone)]
pub struct BlockMeta {
    pub block_size: BlockSize,
    pub block_type: BlockType,
    pub block_data_type: BlockDataType,
    /// SHA3-512 of the full padded data buffer.
    pub checksum: Checksum,
    pub date_created: DateTime<Utc>,
    /// Semantic payload length within the padded buffer; `None` means the
    /// whole buffer is the payload.
    pub length_before_encryption: Option<u32>,
    pub can_read: bool,
    pub can_persist: bool,
}

/// Owned, padded block storage plus its metadata.
///
/// Every variant wraps one of these; construction validates shape and date,
/// pads the payload with zeros up to the block size, and records the digest
/// (computing it when the caller did not supply one). The digest is never
/// silently recomputed afterwards; `validate` checks it explicitly.
#[derive(Debug, Clone)]
pub struct BlockCore {
    meta: BlockMeta,
    data: Vec<u8>,
}

impl BlockCore {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn build(
        block_size: BlockSize,
        block_type: BlockType,
        block_data_type: BlockDataType,
        data: &[u8],
        checksum: Option<Checksum>,
        date_created: Option<DateTime<Utc>>,
        length_before_encryption: Option<u32>,
        can_read: bool,
        can_persist: bool,
    ) -> Result<Self, Error> {
        let size = block_size.as_usize();
        if data.len() > size {
            return Err(Error::ExceedsBlockSize {
                data_length: data.len(),
                block_size: size,
            });
        }
        let date_created = date_created.unwrap_or_else(Utc::now);
        if date_created > Utc::now() {
            return Err(Error::FutureCreationDate);
        }
        if let Some(length) = length_before_encryption {
            if length as usize > size {
                return Err(Error::InvalidLengthBeforeEncryption {
                    length,
                    block_size: size,
                });
            }
        }

        let mut padded = vec![0u8; size];
        padded[..data.len()].copy_from_slice(data);
        let checksum = checksum.unwrap_or_else(|| sha3_512(&padded));

        Ok(BlockCore {
            meta: BlockMeta {
                block_size,
                block_type,
                block_data_type,
                checksum,
                date_created,
                length_before_encryption,
                can_read,
                can_persist,
            },
            data: padded,
        })
    }

    /// Getter for the shared metadata header.
    pub fn meta(&self) -> &BlockMeta {
        &self.meta
    }

    /// The full padded buffer; fails when the block is not readable.
    pub fn data(&self) -> Result<&[u8], Error> {
        if !self.meta.can_read {
            return Err(Error::NotReadable);
        }
        Ok(&self.data)
    }

    /// Consumes the block and yields the padded buffer.
    pub fn into_data(self) -> Result<Vec<u8>, Error> {
        if !self.meta.can_read {
            return Err(Error::NotReadable);
        }
        Ok(self.data)
    }

    /// Recomputes the digest over the padded buffer and compares it against
    /// the recorded checksum.
    pub fn validate(&self) -> Result<(), Error> {
        let actual = sha3_512(&self.data);
        if actual != self.meta.checksum {
            return Err(Error::ChecksumMismatch {
                expected: self.meta.checksum.clone(),
                actual,
            });
        }
        Ok(())
    }
}

/// Common accessor surface over every block variant.
pub trait Block {
    fn core(&self) -> &BlockCore;

    /// Getter for the metadata header.
    fn meta(&self) -> &BlockMeta {
        self.core().meta()
    }
    /// Getter for the block size.
    fn block_size(&self) -> BlockSize {
        self.meta().block_size
    }
    /// Getter for the block type tag.
    fn block_type(&self) -> BlockType {
        self.meta().block_type
    }
    /// Getter for the payload interpretation tag.
    fn block_data_type(&self) -> BlockDataType {
        self.meta().block_data_type
    }
    /// Getter for the content address.
    fn checksum(&self) -> &Checksum {
        &self.meta().checksum
    }
    /// Getter for the creation timestamp.
    fn date_created(&self) -> DateTime<Utc> {
        self.meta().date_created
    }
    /// Getter for the semantic payload length, when tracked.
    fn length_before_encryption(&self) -> Option<u32> {
        self.meta().length_before_encryption
    }
    /// Whether reads are permitted.
    fn can_read(&self) -> bool {
        self.meta().can_read
    }
    /// Whether persistence is permitted.
    fn can_persist(&self) -> bool {
        self.meta().can_persist
    }

    /// The full padded buffer.
    fn data(&self) -> Result<&[u8], Error> {
        self.core().data()
    }

    /// The semantic payload: the padded buffer truncated to
    /// `length_before_encryption` when present.
    fn payload(&self) -> Result<&[u8], Error> {
        let data = self.data()?;
        Ok(match self.length_before_encryption() {
            Some(length) => &data[..length as usize],
            None => data,
        })
    }

    /// Explicit integrity check against the recorded checksum.
    fn validate(&self) -> Result<(), Error> {
        self.core().validate()
    }
}

/// Tagged union over the block variants, for contexts (tuples, stores) that
/// hold heterogeneous members.
#[derive(Debug, Clone)]
pub enum AnyBlock {
    Raw(RawDataBlock),
    Random(RandomBlock),
    Whitened(WhitenedBlock),
    Ephemeral(EphemeralBlock),
    Encrypted(EncryptedBlock),
}

impl Block for AnyBlock {
    fn core(&self) -> &BlockCore {
        match self {
            AnyBlock::Raw(b) => b.core(),
            AnyBlock::Random(b) => b.core(),
            AnyBlock::Whitened(b) => b.core(),
            AnyBlock::Ephemeral(b) => b.core(),
            AnyBlock::Encrypted(b) => b.core(),
        }
    }
}

impl From<RawDataBlock> for AnyBlock {
    fn from(b: RawDataBlock) -> Self {
        AnyBlock::Raw(b)
    }
}

impl From<RandomBlock> for AnyBlock {
    fn from(b: RandomBlock) -> Self {
        AnyBlock::Random(b)
    }
}

impl From<WhitenedBlock> for AnyBlock {
    fn from(b: WhitenedBlock) -> Self {
        AnyBlock::Whitened(b)
    }
}

impl From<EphemeralBlock> for AnyBlock {
    fn from(b: EphemeralBlock) -> Self {
        AnyBlock::Ephemeral(b)
    }
}

impl From<EncryptedBlock> for AnyBlock {
    fn from(b: EncryptedBlock) -> Self {
        AnyBlock::Encrypted(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn oversized_payload_is_rejected() {
        let data = vec![0u8; 513];
        let err = RawDataBlock::new(BlockSize::Message, &data).unwrap_err();
        assert!(matches!(
            err,
            Error::ExceedsBlockSize {
                data_length: 513,
                block_size: 512
            }
        ));
    }

    #[test]
    fn future_date_is_rejected() {
        let future = Utc::now() + Duration::seconds(90);
        let err = RawDataBlock::with_options(BlockSize::Message, b"x", None, Some(future), true, true)
            .unwrap_err();
        assert!(matches!(err, Error::FutureCreationDate));
    }

    #[test]
    fn checksum_covers_padding() {
        let a = RawDataBlock::new(BlockSize::Message, b"payload").unwrap();
        let mut padded = vec![0u8; 512];
        padded[..7].copy_from_slice(b"payload");
        assert_eq!(a.checksum(), &brightchain_encoding::sha3_512(&padded));
        a.validate().unwrap();
    }

    #[test]
    fn explicit_checksum_is_recorded_not_recomputed() {
        let bogus = Checksum::zeroed();
        let block = RawDataBlock::with_options(
            BlockSize::Message,
            b"payload",
            Some(bogus.clone()),
            None,
            true,
            true,
        )
        .unwrap();
        assert_eq!(block.checksum(), &bogus);
        assert!(matches!(
            block.validate(),
            Err(Error::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn payload_respects_length_before_encryption() {
        let block = WhitenedBlock::from_parts(
            BlockSize::Message,
            b"semantic bytes",
            None,
            None,
            Some(8),
            true,
            true,
        )
        .unwrap();
        assert_eq!(block.payload().unwrap(), b"semantic");
    }
}
