// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::Checksum;
use futures::{Stream, StreamExt};
use sha3::{Digest, Sha3_512};
use std::io;

/// Generates the SHA3-512 digest of a byte buffer.
///
/// # Example
/// ```
/// use brightchain_encoding::sha3_512;
///
/// let ingest: Vec<u8> = vec![];
/// let hash = sha3_512(&ingest);
/// assert_eq!(hash.as_bytes().len(), 64);
/// ```
pub fn sha3_512(ingest: &[u8]) -> Checksum {
    let digest = Sha3_512::digest(ingest);

    let mut ret = [0u8; 64];
    ret.clone_from_slice(&digest);
    Checksum::new(ret)
}

/// Digests a sequence of chunks as if they were one concatenated buffer.
pub fn sha3_512_chunks<I, T>(chunks: I) -> Checksum
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut hasher = Sha3_512::new();
    for chunk in chunks {
        hasher.update(chunk.as_ref());
    }
    let mut ret = [0u8; 64];
    ret.clone_from_slice(&hasher.finalize());
    Checksum::new(ret)
}

/// Fully consumes a lazy byte stream and digests it.
pub async fn sha3_512_stream<S>(mut stream: S) -> io::Result<Checksum>
where
    S: Stream<Item = io::Result<Vec<u8>>> + Unpin,
{
    let mut hasher = Sha3_512::new();
    while let Some(chunk) = stream.next().await {
        hasher.update(&chunk?);
    }
    let mut ret = [0u8; 64];
    ret.clone_from_slice(&hasher.finalize());
    Ok(Checksum::new(ret))
}

/// Incremental SHA3-512 state for callers that see their bytes in pieces.
#[derive(Default)]
pub struct ChecksumHasher(Sha3_512);

impl ChecksumHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    pub fn finalize(self) -> Checksum {
        let mut ret = [0u8; 64];
        ret.clone_from_slice(&self.0.finalize());
        Checksum::new(ret)
    }
}
