// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use brightchain_blocks::BlockSize;
use brightchain_encoding::Checksum;
use brightchain_store::{BlockStore, Error, StoredBlock};

fn block(fill: u8) -> StoredBlock {
    StoredBlock::new(BlockSize::Message, vec![fill; 512]).unwrap()
}

pub fn write<BS>(store: &BS)
where
    BS: BlockStore,
{
    store.set_data(block(1)).unwrap();
}

pub fn read<BS>(store: &BS)
where
    BS: BlockStore,
{
    let b = block(1);
    let id = b.checksum().clone();
    store.set_data(b.clone()).unwrap();
    let res = store.get_data(&id).unwrap();
    assert_eq!(res, b);
}

pub fn exists<BS>(store: &BS)
where
    BS: BlockStore,
{
    let b = block(1);
    let id = b.checksum().clone();
    store.set_data(b).unwrap();
    assert!(store.has(&id).unwrap());
}

pub fn does_not_exist<BS>(store: &BS)
where
    BS: BlockStore,
{
    assert!(!store.has(&Checksum::zeroed()).unwrap());
    assert_eq!(
        store.get_data(&Checksum::zeroed()),
        Err(Error::KeyNotFound(Checksum::zeroed()))
    );
}

pub fn delete<BS>(store: &BS)
where
    BS: BlockStore,
{
    let b = block(1);
    let id = b.checksum().clone();
    store.set_data(b).unwrap();
    store.delete_data(&id).unwrap();
    assert!(!store.has(&id).unwrap());
    // Deleting an absent id stays a no-op.
    store.delete_data(&id).unwrap();
}

pub fn idempotent_rewrite<BS>(store: &BS)
where
    BS: BlockStore,
{
    let b = block(1);
    store.set_data(b.clone()).unwrap();
    store.set_data(b).unwrap();
}

pub fn one_byte_apart_blocks_get_distinct_ids<BS>(store: &BS)
where
    BS: BlockStore,
{
    let mut data = vec![0u8; 512];
    let a = StoredBlock::new(BlockSize::Message, data.clone()).unwrap();
    data[511] ^= 1;
    let b = StoredBlock::new(BlockSize::Message, data).unwrap();

    assert_ne!(a.checksum(), b.checksum());
    store.set_data(a.clone()).unwrap();
    store.set_data(b.clone()).unwrap();
    assert_eq!(store.get_data(a.checksum()).unwrap(), a);
    assert_eq!(store.get_data(b.checksum()).unwrap(), b);
}

pub fn bulk_round_trip<BS>(store: &BS)
where
    BS: BlockStore,
{
    let blocks: Vec<StoredBlock> = (0u8..3).map(block).collect();
    let ids: Vec<Checksum> = blocks.iter().map(|b| b.checksum().clone()).collect();

    store.bulk_set(blocks.clone()).unwrap();
    assert_eq!(store.bulk_get(&ids).unwrap(), blocks);
    store.bulk_delete(&ids).unwrap();
    for id in &ids {
        assert!(!store.has(id).unwrap());
    }
}
