// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use brightchain_blocks::{BlockSize, WhitenedBlock};
use brightchain_cbl::MagnetUrl;
use brightchain_crypto::{Member, SecpEcies};
use brightchain_pipeline::{
    CsprngRandomSource, Error, NoWhiteners, StorePersister, StreamReader, StreamWriter,
    WhitenerPool, WriteReceipt,
};
use brightchain_store::{BlockStore, MemoryBlockStore};
use brightchain_tuple::TUPLE_SIZE;
use futures::io::Cursor;
use futures::stream;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io;

fn seeded_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = vec![0u8; len];
    rng.fill_bytes(&mut data);
    data
}

fn chunked(data: &[u8], chunk: usize) -> Vec<io::Result<Vec<u8>>> {
    data.chunks(chunk).map(|c| Ok(c.to_vec())).collect()
}

async fn store_bytes(
    store: &MemoryBlockStore,
    creator: &Member,
    data: &[u8],
    file_name: Option<&str>,
    mime_type: Option<&str>,
) -> WriteReceipt {
    let persister = StorePersister::new(store.clone());
    let mut whiteners = NoWhiteners;
    let mut randoms = CsprngRandomSource;
    let mut writer = StreamWriter::new(
        creator,
        BlockSize::Message,
        &mut whiteners,
        &mut randoms,
        &persister,
    );
    writer
        .write(
            stream::iter(chunked(data, 200)),
            data.len() as u64,
            file_name,
            mime_type,
        )
        .await
        .unwrap()
}

async fn load_bytes(
    store: &MemoryBlockStore,
    creator: &Member,
    magnet: &MagnetUrl,
) -> (Vec<u8>, brightchain_pipeline::ReadReceipt) {
    let reader = StreamReader::new(store, creator);
    let mut out = Cursor::new(Vec::new());
    let receipt = reader.load(magnet, &mut out).await.unwrap();
    (out.into_inner(), receipt)
}

#[tokio::test]
async fn round_trips_a_small_file() {
    let store = MemoryBlockStore::default();
    let creator = Member::generate();
    let data = seeded_bytes(1, 1000);

    let receipt = store_bytes(&store, &creator, &data, None, None).await;
    // 1000 bytes in 512-byte frames: two data tuples plus the root tuple.
    assert_eq!(receipt.address_count, 2 * TUPLE_SIZE);
    assert_eq!(receipt.tuple_count, 3);

    let (bytes, read) = load_bytes(&store, &creator, &receipt.magnet).await;
    assert_eq!(bytes, data);
    assert_eq!(read.bytes_written, 1000);
    assert_eq!(read.file_name, None);
}

#[tokio::test]
async fn round_trips_an_exact_multiple_of_the_block_size() {
    let store = MemoryBlockStore::default();
    let creator = Member::generate();
    let data = seeded_bytes(2, 1024);

    let receipt = store_bytes(&store, &creator, &data, None, None).await;
    assert_eq!(receipt.address_count, 2 * TUPLE_SIZE);

    let (bytes, _) = load_bytes(&store, &creator, &receipt.magnet).await;
    assert_eq!(bytes, data);
}

#[tokio::test]
async fn round_trips_an_empty_file() {
    let store = MemoryBlockStore::default();
    let creator = Member::generate();

    let receipt = store_bytes(&store, &creator, &[], None, None).await;
    assert_eq!(receipt.address_count, 0);

    let (bytes, read) = load_bytes(&store, &creator, &receipt.magnet).await;
    assert!(bytes.is_empty());
    assert_eq!(read.bytes_written, 0);
}

#[tokio::test]
async fn extended_metadata_travels_with_the_magnet() {
    let store = MemoryBlockStore::default();
    let creator = Member::generate();
    let data = seeded_bytes(3, 700);

    let receipt = store_bytes(&store, &creator, &data, Some("a.txt"), Some("text/plain")).await;
    assert_eq!(receipt.magnet.display_name(), Some("a.txt"));

    // The magnet survives its own string form.
    let reparsed = MagnetUrl::parse(&receipt.magnet.to_string()).unwrap();
    let (bytes, read) = load_bytes(&store, &creator, &reparsed).await;
    assert_eq!(bytes, data);
    assert_eq!(read.file_name.as_deref(), Some("a.txt"));
    assert_eq!(read.mime_type.as_deref(), Some("text/plain"));
}

#[tokio::test]
async fn large_files_chain_through_super_cbls() {
    let store = MemoryBlockStore::default();
    let creator = Member::generate();
    // Message-size CBLs hold 6 addresses (two tuples); 5 frames exceed that.
    let data = seeded_bytes(4, 5 * 512);

    let receipt = store_bytes(&store, &creator, &data, None, None).await;
    assert_eq!(receipt.address_count, 5 * TUPLE_SIZE);

    let (bytes, read) = load_bytes(&store, &creator, &receipt.magnet).await;
    assert_eq!(bytes, data);
    assert_eq!(read.bytes_written, data.len() as u64);
}

#[tokio::test]
async fn whiteners_are_reused_across_tuples() {
    let store = MemoryBlockStore::default();
    let creator = Member::generate();
    let data = seeded_bytes(5, 1500);

    let mut pool = WhitenerPool::new();
    for i in 0u64..4 {
        let whitener =
            WhitenedBlock::new(BlockSize::Message, &seeded_bytes(100 + i, 512)).unwrap();
        pool.push(whitener);
    }

    let persister = StorePersister::new(store.clone());
    let mut randoms = CsprngRandomSource;
    let mut writer = StreamWriter::new(
        &creator,
        BlockSize::Message,
        &mut pool,
        &mut randoms,
        &persister,
    );
    let receipt = writer
        .write(stream::iter(chunked(&data, 512)), data.len() as u64, None, None)
        .await
        .unwrap();

    // Three data frames, each drawing one pooled whitener.
    assert_eq!(pool.len(), 1);

    let (bytes, _) = load_bytes(&store, &creator, &receipt.magnet).await;
    assert_eq!(bytes, data);
}

#[tokio::test]
async fn encrypted_roots_round_trip() {
    let store = MemoryBlockStore::default();
    let creator = Member::generate();
    let ecies = SecpEcies;
    let data = seeded_bytes(6, 900);

    let persister = StorePersister::new(store.clone());
    let mut whiteners = NoWhiteners;
    let mut randoms = CsprngRandomSource;
    let mut writer = StreamWriter::new(
        &creator,
        BlockSize::Message,
        &mut whiteners,
        &mut randoms,
        &persister,
    );
    let receipt = writer
        .write_encrypted(&ecies, stream::iter(chunked(&data, 300)), data.len() as u64)
        .await
        .unwrap();

    // The root at rest is opaque: a plaintext reader cannot parse it.
    let reader = StreamReader::new(&store, &creator);
    let mut out = Cursor::new(Vec::new());
    assert!(reader.load(&receipt.magnet, &mut out).await.is_err());

    let mut out = Cursor::new(Vec::new());
    let read = reader
        .load_encrypted(&ecies, &receipt.magnet, &mut out)
        .await
        .unwrap();
    assert_eq!(out.into_inner(), data);
    assert_eq!(read.bytes_written, 900);
}

#[tokio::test]
async fn encrypted_roots_need_the_secret_key() {
    let store = MemoryBlockStore::default();
    let creator = Member::generate();
    let ecies = SecpEcies;
    let data = seeded_bytes(7, 300);

    let persister = StorePersister::new(store.clone());
    let mut whiteners = NoWhiteners;
    let mut randoms = CsprngRandomSource;
    let mut writer = StreamWriter::new(
        &creator,
        BlockSize::Message,
        &mut whiteners,
        &mut randoms,
        &persister,
    );
    let receipt = writer
        .write_encrypted(&ecies, stream::iter(chunked(&data, 300)), data.len() as u64)
        .await
        .unwrap();

    let public = creator.to_public();
    let reader = StreamReader::new(&store, &public);
    let mut out = Cursor::new(Vec::new());
    assert!(matches!(
        reader.load_encrypted(&ecies, &receipt.magnet, &mut out).await,
        Err(Error::Crypto(_))
    ));
}

#[tokio::test]
async fn declared_length_is_enforced() {
    let store = MemoryBlockStore::default();
    let creator = Member::generate();
    let data = seeded_bytes(8, 700);

    let persister = StorePersister::new(store.clone());
    let mut whiteners = NoWhiteners;
    let mut randoms = CsprngRandomSource;
    let mut writer = StreamWriter::new(
        &creator,
        BlockSize::Message,
        &mut whiteners,
        &mut randoms,
        &persister,
    );
    let err = writer
        .write(stream::iter(chunked(&data, 200)), 9999, None, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::LengthMismatch {
            declared: 9999,
            actual: 700
        }
    ));
}

#[tokio::test]
async fn every_tuple_member_lands_in_the_store() {
    let store = MemoryBlockStore::default();
    let creator = Member::generate();
    let data = seeded_bytes(9, 512);

    let receipt = store_bytes(&store, &creator, &data, None, None).await;
    // One data tuple and one root tuple, all members distinct.
    assert_eq!(store.len(), 2 * TUPLE_SIZE);
    assert!(store.has(&receipt.root).unwrap());
}

#[tokio::test]
async fn missing_constituents_fail_the_read() {
    let store = MemoryBlockStore::default();
    let creator = Member::generate();
    let data = seeded_bytes(10, 512);

    let receipt = store_bytes(&store, &creator, &data, None, None).await;

    // Delete one data-tuple member; the root tuple stays intact.
    let victim = store
        .get_data(&receipt.root)
        .ok()
        .and_then(|root| {
            brightchain_cbl::parse_cbl_block(root.data()).ok().map(|(_, addresses)| addresses[1].clone())
        })
        .unwrap();
    store.delete_data(&victim).unwrap();

    let reader = StreamReader::new(&store, &creator);
    let mut out = Cursor::new(Vec::new());
    assert!(matches!(
        reader.load(&receipt.magnet, &mut out).await,
        Err(Error::Cbl(brightchain_cbl::CblError::FailedToLoadBlock(_)))
    ));
}
