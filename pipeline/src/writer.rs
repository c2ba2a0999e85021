// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{
    Error, Frame, FrameChunker, RandomBlockSource, TuplePersister, WhitenedBlockSource,
};
use brightchain_blocks::{AnyBlock, Block, BlockSize, EphemeralBlock, RawDataBlock};
use brightchain_cbl::{
    build_list_block, is_super_cbl, parse_cbl_block, parse_super_cbl_block, EncryptionKind,
    MagnetUrl, SuperCblConfig, ADDRESS_LEN, SUPER_CBL_HEADER_LEN,
};
use brightchain_crypto::{EciesService, Member};
use brightchain_encoding::{sha3_512, Checksum, ChecksumHasher};
use brightchain_tuple::{make_tuple_from_source_xor, BlockTuple, MIN_RANDOM_BLOCKS, TUPLE_SIZE};
use chrono::Utc;
use futures::{Stream, StreamExt};
use log::debug;
use std::io;

/// What a completed write hands back: the root block id and the magnet URL
/// that resolves to it.
#[derive(Debug, Clone)]
pub struct WriteReceipt {
    pub root: Checksum,
    pub magnet: MagnetUrl,
    /// Tuples persisted, list-block tuples included.
    pub tuple_count: usize,
    /// Constituent addresses accumulated across data tuples.
    pub address_count: usize,
}

/// The write pipeline: frames a plaintext stream, whitens each frame into a
/// persisted tuple, and emits the signed root list block.
///
/// Tuple persistence is awaited before further source bytes are drawn, so a
/// slow store backpressures the source. Any failure is terminal: no list
/// block is produced, and already-persisted tuples are the caller's cleanup.
pub struct StreamWriter<'a, W, R, P: ?Sized> {
    creator: &'a Member,
    block_size: BlockSize,
    whiteners: &'a mut W,
    randoms: &'a mut R,
    persister: &'a P,
    config: SuperCblConfig,
}

impl<'a, W, R, P> StreamWriter<'a, W, R, P>
where
    W: WhitenedBlockSource,
    R: RandomBlockSource,
    P: TuplePersister + ?Sized,
{
    pub fn new(
        creator: &'a Member,
        block_size: BlockSize,
        whiteners: &'a mut W,
        randoms: &'a mut R,
        persister: &'a P,
    ) -> Self {
        StreamWriter {
            creator,
            block_size,
            whiteners,
            randoms,
            persister,
            config: SuperCblConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SuperCblConfig) -> Self {
        self.config = config;
        self
    }

    /// Stores a plaintext stream of `source_length` bytes and returns the
    /// root receipt. Supplying a filename and MIME type yields an extended
    /// CBL (when the list fits a single block) and a display name on the
    /// magnet URL.
    pub async fn write<S>(
        &mut self,
        source: S,
        source_length: u64,
        file_name: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<WriteReceipt, Error>
    where
        S: Stream<Item = io::Result<Vec<u8>>> + Unpin,
    {
        let (addresses, digest, data_tuples) = self.whiten_stream(source, source_length).await?;

        let mut pending: Vec<Vec<u8>> = Vec::new();
        let root_bytes = build_list_block(
            self.creator,
            Utc::now(),
            self.block_size,
            &addresses,
            source_length,
            digest,
            EncryptionKind::None,
            file_name,
            mime_type,
            &self.config,
            &mut |bytes| {
                pending.push(bytes.to_vec());
                Ok(sha3_512(bytes))
            },
        )?;

        let mut list_tuples = 0;
        for block in &pending {
            self.persist_list_block(block).await?;
            list_tuples += 1;
        }
        let root = self.persist_list_block(&root_bytes).await?;
        list_tuples += 1;

        debug!(
            "stored {} bytes as {} data tuples and {} list tuples",
            source_length, data_tuples, list_tuples
        );
        Ok(WriteReceipt {
            magnet: MagnetUrl::new(root.clone(), self.block_size, file_name.map(str::to_owned)),
            root,
            tuple_count: data_tuples + list_tuples,
            address_count: addresses.len(),
        })
    }

    /// Stores a stream whose root list block is sealed to the creator
    /// through the encryption collaborator. Data tuples and any sub-CBLs are
    /// whitened exactly as in the plaintext variant; only the root is
    /// sealed, and it carries no padding transform of its own.
    pub async fn write_encrypted<S>(
        &mut self,
        ecies: &dyn EciesService,
        source: S,
        source_length: u64,
    ) -> Result<WriteReceipt, Error>
    where
        S: Stream<Item = io::Result<Vec<u8>>> + Unpin,
    {
        let (addresses, digest, data_tuples) = self.whiten_stream(source, source_length).await?;

        let mut pending: Vec<Vec<u8>> = Vec::new();
        let root_bytes = build_list_block(
            self.creator,
            Utc::now(),
            self.block_size,
            &addresses,
            source_length,
            digest,
            EncryptionKind::Ecies,
            None,
            None,
            &self.config,
            &mut |bytes| {
                pending.push(bytes.to_vec());
                Ok(sha3_512(bytes))
            },
        )?;

        let mut list_tuples = 0;
        for block in &pending {
            self.persist_list_block(block).await?;
            list_tuples += 1;
        }

        let semantic = root_semantic_len(&root_bytes)?;
        let sealed = ecies.encrypt(self.creator.public_key(), &root_bytes[..semantic])?;
        if 4 + sealed.len() > self.block_size.as_usize() {
            return Err(Error::SealedRootTooLarge {
                sealed: sealed.len(),
                block_size: self.block_size.as_usize(),
            });
        }
        // At rest the sealed root leads with its own length; zero padding
        // cannot be told apart from ciphertext otherwise.
        let mut body = Vec::with_capacity(4 + sealed.len());
        body.extend_from_slice(&(sealed.len() as u32).to_be_bytes());
        body.extend_from_slice(&sealed);
        let root = self.persist_list_block(&body).await?;
        list_tuples += 1;

        Ok(WriteReceipt {
            magnet: MagnetUrl::new(root.clone(), self.block_size, None),
            root,
            tuple_count: data_tuples + list_tuples,
            address_count: addresses.len(),
        })
    }

    async fn whiten_stream<S>(
        &mut self,
        mut source: S,
        source_length: u64,
    ) -> Result<(Vec<Checksum>, Checksum, usize), Error>
    where
        S: Stream<Item = io::Result<Vec<u8>>> + Unpin,
    {
        let mut chunker = FrameChunker::new(self.block_size);
        let mut addresses: Vec<Checksum> = Vec::new();
        let mut hasher = ChecksumHasher::new();
        let mut actual: u64 = 0;
        let mut tuples = 0;

        while let Some(chunk) = source.next().await {
            let chunk = chunk?;
            actual += chunk.len() as u64;
            hasher.update(&chunk);
            chunker.push(&chunk);
            while let Some(frame) = chunker.next_frame() {
                self.process_frame(frame, &mut addresses).await?;
                tuples += 1;
            }
        }
        if let Some(frame) = chunker.finish() {
            self.process_frame(frame, &mut addresses).await?;
            tuples += 1;
        }

        if actual != source_length {
            return Err(Error::LengthMismatch {
                declared: source_length,
                actual,
            });
        }
        Ok((addresses, hasher.finalize(), tuples))
    }

    /// One frame: source block, companions, XOR, persist, index. The
    /// address list grows only after persistence resolves, which keeps the
    /// list consistent with what is actually durable.
    async fn process_frame(
        &mut self,
        frame: Frame,
        addresses: &mut Vec<Checksum>,
    ) -> Result<(), Error> {
        let source_block = EphemeralBlock::from_source_chunk(
            self.block_size,
            &frame.data[..frame.semantic_len as usize],
            self.creator.clone(),
        )?;

        let companions = TUPLE_SIZE - 1;
        let mut whiteners = Vec::new();
        while whiteners.len() < companions.saturating_sub(MIN_RANDOM_BLOCKS) {
            match self.whiteners.next_whitener(self.block_size)? {
                Some(whitener) => whiteners.push(whitener),
                None => break,
            }
        }
        let mut randoms = Vec::new();
        for _ in 0..companions - whiteners.len() {
            randoms.push(self.randoms.random_block(self.block_size)?);
        }

        let tuple = make_tuple_from_source_xor(&source_block, whiteners, randoms)?;
        self.persister.persist_tuple(&tuple).await?;
        addresses.extend(tuple.block_ids());
        Ok(())
    }

    /// Wraps a list block (CBL, Super-CBL, or sealed root) in a tuple with
    /// fresh random companions and persists it. The block itself is stored
    /// as-is, so its id resolves to directly parseable bytes.
    async fn persist_list_block(&mut self, content: &[u8]) -> Result<Checksum, Error> {
        let block = RawDataBlock::new(self.block_size, content)?;
        let id = block.checksum().clone();

        let mut blocks: Vec<AnyBlock> = Vec::with_capacity(TUPLE_SIZE);
        blocks.push(block.into());
        for _ in 0..TUPLE_SIZE - 1 {
            blocks.push(self.randoms.random_block(self.block_size)?.into());
        }
        let tuple = BlockTuple::new(blocks)?;
        self.persister.persist_tuple(&tuple).await?;
        Ok(id)
    }
}

/// Length of the meaningful prefix of a padded list block.
pub(crate) fn root_semantic_len(root: &[u8]) -> Result<usize, Error> {
    if is_super_cbl(root) {
        let (header, _) = parse_super_cbl_block(root)?;
        Ok(SUPER_CBL_HEADER_LEN + header.sub_cbl_count() as usize * ADDRESS_LEN)
    } else {
        let (header, _) = parse_cbl_block(root)?;
        Ok(header.encoded_len() + header.address_count() as usize * ADDRESS_LEN)
    }
}
