// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{Block, BlockCore, BlockDataType, BlockSize, BlockType, Error};
use brightchain_crypto::{ECIES_NONCE_LEN, ECIES_OVERHEAD, ECIES_PUB_LEN, ECIES_TAG_LEN};
use brightchain_encoding::Checksum;
use chrono::{DateTime, Utc};

/// A block whose body is an ECIES-sealed message: ephemeral public key,
/// nonce, and authentication tag, followed by the ciphertext.
///
/// The sealing itself happens in the encryption collaborator; this type only
/// understands the prefix layout well enough to hand the components back out.
#[derive(Debug, Clone)]
pub struct EncryptedBlock {
    core: BlockCore,
}

impl EncryptedBlock {
    pub fn new(
        block_type: BlockType,
        block_size: BlockSize,
        sealed: &[u8],
        checksum: Option<Checksum>,
        date_created: Option<DateTime<Utc>>,
    ) -> Result<Self, Error> {
        if !block_type.is_encrypted() {
            return Err(Error::InvalidBlockType(block_type as u8));
        }
        if sealed.len() < ECIES_OVERHEAD {
            return Err(Error::InvalidEncryptedLength {
                length: sealed.len(),
            });
        }
        let core = BlockCore::build(
            block_size,
            block_type,
            BlockDataType::Encrypted,
            sealed,
            checksum,
            date_created,
            Some(sealed.len() as u32),
            true,
            true,
        )?;
        Ok(EncryptedBlock { core })
    }

    /// The whole sealed body, without block padding.
    pub fn sealed_body(&self) -> Result<&[u8], Error> {
        self.payload()
    }

    /// The 65-byte uncompressed ephemeral public key.
    pub fn ephemeral_public_key(&self) -> Result<&[u8], Error> {
        Ok(&self.payload()?[..ECIES_PUB_LEN])
    }

    /// The 24-byte sealing nonce.
    pub fn nonce(&self) -> Result<&[u8], Error> {
        Ok(&self.payload()?[ECIES_PUB_LEN..ECIES_PUB_LEN + ECIES_NONCE_LEN])
    }

    /// The 16-byte authentication tag.
    pub fn tag(&self) -> Result<&[u8], Error> {
        Ok(&self.payload()?[ECIES_PUB_LEN + ECIES_NONCE_LEN..ECIES_OVERHEAD])
    }

    /// The ciphertext following the prefix fields.
    pub fn ciphertext(&self) -> Result<&[u8], Error> {
        Ok(&self.payload()?[ECIES_OVERHEAD..])
    }
}

impl Block for EncryptedBlock {
    fn core(&self) -> &BlockCore {
        &self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brightchain_crypto::{EciesService, Member, SecpEcies};

    #[test]
    fn sealed_body_splits_into_components() {
        let member = Member::generate();
        let sealed = SecpEcies
            .encrypt(member.public_key(), b"secret payload")
            .unwrap();

        let block = EncryptedBlock::new(
            BlockType::EncryptedOwnedData,
            BlockSize::Message,
            &sealed,
            None,
            None,
        )
        .unwrap();

        assert_eq!(block.sealed_body().unwrap(), &sealed[..]);
        assert_eq!(block.ciphertext().unwrap().len(), b"secret payload".len());

        let mut ephemeral = [0u8; ECIES_PUB_LEN];
        ephemeral.copy_from_slice(block.ephemeral_public_key().unwrap());
        let mut nonce = [0u8; ECIES_NONCE_LEN];
        nonce.copy_from_slice(block.nonce().unwrap());
        let mut tag = [0u8; ECIES_TAG_LEN];
        tag.copy_from_slice(block.tag().unwrap());

        let opened = SecpEcies
            .decrypt_with_components(
                member.secret_key().unwrap(),
                &ephemeral,
                &nonce,
                &tag,
                block.ciphertext().unwrap(),
            )
            .unwrap();
        assert_eq!(opened, b"secret payload");
    }

    #[test]
    fn non_encrypted_type_is_rejected() {
        let err = EncryptedBlock::new(
            BlockType::RawData,
            BlockSize::Message,
            &[0u8; 200],
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidBlockType(1)));
    }

    #[test]
    fn short_body_is_rejected() {
        let err = EncryptedBlock::new(
            BlockType::EncryptedOwnedData,
            BlockSize::Message,
            &[0u8; 10],
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidEncryptedLength { length: 10 }));
    }
}
