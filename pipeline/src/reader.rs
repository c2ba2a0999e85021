// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::Error;
use brightchain_blocks::{Block, BlockSize, WhitenedBlock};
use brightchain_cbl::{
    address_bytes, is_super_cbl, parse_cbl_block, parse_super_cbl_block, resolve_list_block,
    CblError, MagnetUrl, SuperCblConfig,
};
use brightchain_crypto::{EciesService, Member};
use brightchain_encoding::{Checksum, ChecksumHasher};
use brightchain_store::{BlockStore, StoredBlock};
use brightchain_tuple::{xor_prime_whitened_to_owned, TUPLE_SIZE};
use futures::{AsyncWrite, AsyncWriteExt};
use log::warn;

/// What a completed read hands back alongside the emitted bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadReceipt {
    pub bytes_written: u64,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// The read pipeline: resolves a magnet URL to its root list block, walks
/// any Super-CBL hierarchy, and XORs each address tuple back into plaintext.
pub struct StreamReader<'a, BS> {
    store: &'a BS,
    creator: &'a Member,
    config: SuperCblConfig,
}

impl<'a, BS> StreamReader<'a, BS>
where
    BS: BlockStore,
{
    /// A reader recovering blocks owned by `creator`. The creator's public
    /// key checks root signatures; its secret key is only needed for sealed
    /// roots.
    pub fn new(store: &'a BS, creator: &'a Member) -> Self {
        StreamReader {
            store,
            creator,
            config: SuperCblConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SuperCblConfig) -> Self {
        self.config = config;
        self
    }

    /// Streams the file behind a magnet URL into `out`.
    pub async fn load<W>(&self, magnet: &MagnetUrl, out: &mut W) -> Result<ReadReceipt, Error>
    where
        W: AsyncWrite + Send + Unpin,
    {
        let root = self.load_bytes(magnet.checksum())?;
        self.emit(&root, magnet.block_size(), out).await
    }

    /// Streams a file whose root list block was sealed to the creator.
    pub async fn load_encrypted<W>(
        &self,
        ecies: &dyn EciesService,
        magnet: &MagnetUrl,
        out: &mut W,
    ) -> Result<ReadReceipt, Error>
    where
        W: AsyncWrite + Send + Unpin,
    {
        let at_rest = self.load_bytes(magnet.checksum())?;
        if at_rest.len() < 4 {
            return Err(CblError::InvalidStructure("sealed root too short".to_owned()).into());
        }
        let sealed_len = u32::from_be_bytes(
            at_rest[..4].try_into().expect("length checked above"),
        ) as usize;
        if 4 + sealed_len > at_rest.len() {
            return Err(CblError::InvalidStructure(
                "sealed root length exceeds block".to_owned(),
            )
            .into());
        }

        let secret = self
            .creator
            .secret_key()
            .ok_or(brightchain_crypto::Error::InvalidKey)?;
        let root = ecies.decrypt_with_header(secret, &at_rest[4..4 + sealed_len])?;
        self.emit(&root, magnet.block_size(), out).await
    }

    fn load_bytes(&self, id: &Checksum) -> Result<Vec<u8>, Error> {
        Ok(self.store.get_data(id)?.into_data())
    }

    fn load_constituent(&self, id: &Checksum) -> Result<Vec<u8>, Error> {
        self.store
            .get_data(id)
            .map(StoredBlock::into_data)
            .map_err(|e| {
                warn!("constituent block {} unavailable: {}", id, e);
                CblError::FailedToLoadBlock(id.clone()).into()
            })
    }

    /// Checks the root's signature when one is present; unsigned list
    /// blocks (zero signature) pass, their integrity being carried by the
    /// content address alone.
    fn verify_root(&self, root: &[u8], block_size: BlockSize) -> Result<(), Error> {
        if is_super_cbl(root) {
            let (header, subs) = parse_super_cbl_block(root)?;
            if !header.signature().is_zeroed() {
                header.verify_signature(self.creator, block_size, &address_bytes(&subs))?;
            }
        } else {
            let (header, addresses) = parse_cbl_block(root)?;
            if !header.signature().is_zeroed() {
                header.verify_signature(self.creator, block_size, &address_bytes(&addresses))?;
            }
        }
        Ok(())
    }

    async fn emit<W>(
        &self,
        root: &[u8],
        block_size: BlockSize,
        out: &mut W,
    ) -> Result<ReadReceipt, Error>
    where
        W: AsyncWrite + Send + Unpin,
    {
        self.verify_root(root, block_size)?;

        let resolved = resolve_list_block(
            root,
            &|id| self.store.get_data(id).ok().map(StoredBlock::into_data),
            &self.config,
        )?;
        if resolved.addresses.len() % TUPLE_SIZE != 0 {
            return Err(
                CblError::InvalidStructure("address list is not tuple aligned".to_owned()).into(),
            );
        }

        let mut remaining = resolved.original_data_length;
        let mut written: u64 = 0;
        let mut hasher = ChecksumHasher::new();

        for group in resolved.addresses.chunks(TUPLE_SIZE) {
            let semantic = remaining.min(block_size.as_usize() as u64) as u32;

            let prime_bytes = self.load_constituent(&group[0])?;
            let prime = WhitenedBlock::from_parts(
                block_size,
                &prime_bytes,
                None,
                None,
                Some(semantic),
                true,
                true,
            )?;
            let mut companions = Vec::with_capacity(TUPLE_SIZE - 1);
            for id in &group[1..] {
                companions.push(WhitenedBlock::from_parts(
                    block_size,
                    &self.load_constituent(id)?,
                    None,
                    None,
                    None,
                    true,
                    true,
                )?);
            }

            let owned =
                xor_prime_whitened_to_owned(self.creator.clone(), &prime, &companions, None)?;
            let payload = owned.payload()?;
            out.write_all(payload).await.map_err(Error::Source)?;
            hasher.update(payload);
            written += u64::from(semantic);
            remaining -= u64::from(semantic);
        }

        if remaining != 0 {
            return Err(Error::LengthMismatch {
                declared: resolved.original_data_length,
                actual: written,
            });
        }
        if let Some(expected) = &resolved.original_data_checksum {
            if &hasher.finalize() != expected {
                return Err(Error::PlaintextChecksumMismatch);
            }
        }
        out.flush().await.map_err(Error::Source)?;

        Ok(ReadReceipt {
            bytes_written: written,
            file_name: resolved.file_name,
            mime_type: resolved.mime_type,
        })
    }
}
