// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{BlockTuple, Error, MAX_RANDOM_BLOCKS, MIN_RANDOM_BLOCKS, RANDOM_BLOCK_DATA_UNIT, TUPLE_SIZE};
use brightchain_blocks::{
    AnyBlock, Block, BlockDataType, BlockType, EphemeralBlock, RandomBlock, WhitenedBlock,
};
use brightchain_crypto::Member;
use rand::RngCore;

fn xor_in_place(buf: &mut [u8], other: &[u8]) {
    for (b, o) in buf.iter_mut().zip(other) {
        *b ^= o;
    }
}

fn check_companion_counts(whiteners: usize, randoms: usize) -> Result<(), Error> {
    if whiteners + randoms + 1 != TUPLE_SIZE {
        return Err(Error::InvalidBlockCount { whiteners, randoms });
    }
    Ok(())
}

/// XORs a source block with its whiteners and randoms into the prime
/// whitened block that is actually stored.
///
/// The prime inherits the source's `length_before_encryption`, so the
/// pre-padding length survives a round trip through recovery.
pub fn xor_source_to_prime_whitened(
    source: &EphemeralBlock,
    whiteners: &[WhitenedBlock],
    randoms: &[RandomBlock],
) -> Result<WhitenedBlock, Error> {
    check_companion_counts(whiteners.len(), randoms.len())?;
    let size = source.block_size();
    if whiteners.iter().any(|w| w.block_size() != size)
        || randoms.iter().any(|r| r.block_size() != size)
    {
        return Err(Error::BlockSizeMismatch);
    }

    let mut buf = source.data()?.to_vec();
    for whitener in whiteners {
        xor_in_place(&mut buf, whitener.data()?);
    }
    for random in randoms {
        xor_in_place(&mut buf, random.data()?);
    }

    let prime = WhitenedBlock::from_parts(
        size,
        &buf,
        None,
        None,
        source.length_before_encryption(),
        true,
        true,
    )?;
    Ok(prime)
}

/// Builds the storable tuple for a source block: prime first, then the
/// whiteners and randoms in the order they were XORed in.
pub fn make_tuple_from_source_xor(
    source: &EphemeralBlock,
    whiteners: Vec<WhitenedBlock>,
    randoms: Vec<RandomBlock>,
) -> Result<BlockTuple, Error> {
    let prime = xor_source_to_prime_whitened(source, &whiteners, &randoms)?;

    let mut blocks: Vec<AnyBlock> = Vec::with_capacity(TUPLE_SIZE);
    blocks.push(prime.into());
    blocks.extend(whiteners.into_iter().map(AnyBlock::from));
    blocks.extend(randoms.into_iter().map(AnyBlock::from));
    BlockTuple::new(blocks)
}

/// Inverse of the forward XOR: recovers the owned ephemeral block from a
/// prime and its companions.
///
/// The output buffer starts from CSPRNG bytes before the prime is overlaid,
/// so bytes past `length_before_encryption` cannot be mined for the padding
/// structure of the original source.
pub fn xor_prime_whitened_to_owned(
    creator: Member,
    prime: &WhitenedBlock,
    whiteners: &[WhitenedBlock],
    randoms: Option<&[RandomBlock]>,
) -> Result<EphemeralBlock, Error> {
    let randoms = randoms.unwrap_or(&[]);
    check_companion_counts(whiteners.len(), randoms.len())?;
    let size = prime.block_size();
    if whiteners.iter().any(|w| w.block_size() != size)
        || randoms.iter().any(|r| r.block_size() != size)
    {
        return Err(Error::BlockSizeMismatch);
    }
    let length = prime
        .length_before_encryption()
        .ok_or(Error::MissingParameters("prime.length_before_encryption"))?;

    let mut buf = vec![0u8; size.as_usize()];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    let prime_data = prime.data()?;
    buf[..prime_data.len()].copy_from_slice(prime_data);
    for whitener in whiteners {
        xor_in_place(&mut buf, whitener.data()?);
    }
    for random in randoms {
        xor_in_place(&mut buf, random.data()?);
    }

    let owned = EphemeralBlock::new(
        BlockType::EphemeralOwnedData,
        BlockDataType::RawData,
        size,
        &buf,
        None,
        creator,
        None,
        Some(length),
    )?;
    Ok(owned)
}

/// How many random blocks a payload of `data_length` bytes warrants: one per
/// started KiB, clamped to `[MIN_RANDOM_BLOCKS, MAX_RANDOM_BLOCKS]`.
pub fn random_block_count(data_length: u64) -> usize {
    let scaled = data_length.div_ceil(RANDOM_BLOCK_DATA_UNIT) as usize;
    scaled.clamp(MIN_RANDOM_BLOCKS, MAX_RANDOM_BLOCKS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brightchain_blocks::BlockSize;
    use quickcheck_macros::quickcheck;

    fn source_block(data: &[u8], length: u32) -> EphemeralBlock {
        EphemeralBlock::new(
            BlockType::EphemeralOwnedData,
            BlockDataType::RawData,
            BlockSize::Message,
            data,
            None,
            Member::generate(),
            None,
            Some(length),
        )
        .unwrap()
    }

    #[test]
    fn known_xor_pattern() {
        // "A" * 500 zero-padded into a 512-byte message block, one constant
        // whitener and one constant random companion.
        let mut data = vec![b'A'; 500];
        data.resize(512, 0);
        let source = source_block(&data, 500);

        let whitener = WhitenedBlock::new(BlockSize::Message, &[0xAA; 512]).unwrap();
        let random = RandomBlock::from_data(BlockSize::Message, &[0x5A; 512]).unwrap();

        let prime =
            xor_source_to_prime_whitened(&source, &[whitener.clone()], &[random.clone()]).unwrap();
        let prime_data = prime.data().unwrap();
        for (i, byte) in prime_data.iter().enumerate() {
            assert_eq!(*byte, data[i] ^ 0xAA ^ 0x5A);
        }
        assert_eq!(prime.length_before_encryption(), Some(500));

        let owned = xor_prime_whitened_to_owned(
            Member::generate(),
            &prime,
            &[whitener],
            Some(&[random]),
        )
        .unwrap();
        assert_eq!(&owned.data().unwrap()[..500], &vec![b'A'; 500][..]);
        assert_eq!(owned.payload().unwrap(), &vec![b'A'; 500][..]);
    }

    #[test]
    fn tuple_order_is_prime_whiteners_randoms() {
        let source = source_block(b"chunk", 5);
        let whitener = WhitenedBlock::new(BlockSize::Message, &[1u8; 512]).unwrap();
        let random = RandomBlock::new(BlockSize::Message);

        let w_id = whitener.checksum().clone();
        let r_id = random.checksum().clone();

        let tuple = make_tuple_from_source_xor(&source, vec![whitener], vec![random]).unwrap();
        let ids = tuple.block_ids();
        assert_eq!(ids.len(), TUPLE_SIZE);
        assert_eq!(ids[1], w_id);
        assert_eq!(ids[2], r_id);
        assert_eq!(tuple.prime().checksum(), &ids[0]);
    }

    #[test]
    fn companion_count_must_fill_tuple() {
        let source = source_block(b"chunk", 5);
        let err = xor_source_to_prime_whitened(&source, &[], &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidBlockCount {
                whiteners: 0,
                randoms: 0
            }
        ));
    }

    #[test]
    fn companion_sizes_must_match() {
        let source = source_block(b"chunk", 5);
        let whitener = WhitenedBlock::new(BlockSize::Tiny, &[1u8; 1024]).unwrap();
        let random = RandomBlock::new(BlockSize::Message);
        assert!(matches!(
            xor_source_to_prime_whitened(&source, &[whitener], &[random]),
            Err(Error::BlockSizeMismatch)
        ));
    }

    #[test]
    fn recovery_requires_pre_padding_length() {
        let prime = WhitenedBlock::new(BlockSize::Message, &[1u8; 512]).unwrap();
        let whitener = WhitenedBlock::new(BlockSize::Message, &[2u8; 512]).unwrap();
        let random = RandomBlock::new(BlockSize::Message);
        assert!(matches!(
            xor_prime_whitened_to_owned(
                Member::generate(),
                &prime,
                &[whitener],
                Some(&[random])
            ),
            Err(Error::MissingParameters(_))
        ));
    }

    #[test]
    fn random_count_scales_with_length() {
        assert_eq!(random_block_count(0), MIN_RANDOM_BLOCKS);
        assert_eq!(random_block_count(1), 1);
        assert_eq!(random_block_count(1024), 1);
        assert_eq!(random_block_count(1025), 2);
        assert_eq!(random_block_count(u64::from(u32::MAX)), MAX_RANDOM_BLOCKS);
    }

    #[quickcheck]
    fn xor_round_trips_on_semantic_prefix(data: Vec<u8>) -> bool {
        let data = &data[..data.len().min(512)];
        let source = source_block(data, data.len() as u32);
        let whitener = WhitenedBlock::new(
            BlockSize::Message,
            RandomBlock::new(BlockSize::Message).data().unwrap(),
        )
        .unwrap();
        let random = RandomBlock::new(BlockSize::Message);

        let prime =
            xor_source_to_prime_whitened(&source, &[whitener.clone()], &[random.clone()]).unwrap();
        let owned = xor_prime_whitened_to_owned(
            Member::generate(),
            &prime,
            &[whitener],
            Some(&[random]),
        )
        .unwrap();
        owned.payload().unwrap() == data
    }
}
