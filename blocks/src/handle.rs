// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{BlockSize, Error};
use brightchain_encoding::{sha3_512, Checksum};
use log::warn;
use once_cell::sync::OnceCell;
use std::fs;
use std::io::{BufReader, Cursor, ErrorKind, Read};
use std::path::{Path, PathBuf};

/// A lazy reference to a block identified by checksum.
///
/// The handle optionally points at an on-disk file whose basename is the hex
/// form of the checksum; bytes are cached in memory on first read and served
/// from the cache until `clear_cache`. Read and persist permissions are
/// enforced at the accessor boundary.
#[derive(Debug)]
pub struct BlockHandle {
    checksum: Checksum,
    block_size: BlockSize,
    path: Option<PathBuf>,
    cache: OnceCell<Vec<u8>>,
    can_read: bool,
    can_persist: bool,
}

impl BlockHandle {
    /// A handle with no backing file; only useful once seeded via
    /// `with_cached_data`.
    pub fn new(checksum: Checksum, block_size: BlockSize, can_read: bool, can_persist: bool) -> Self {
        BlockHandle {
            checksum,
            block_size,
            path: None,
            cache: OnceCell::new(),
            can_read,
            can_persist,
        }
    }

    /// A handle backed by `<dir>/<hex checksum>`.
    pub fn in_dir(
        dir: &Path,
        checksum: Checksum,
        block_size: BlockSize,
        can_read: bool,
        can_persist: bool,
    ) -> Self {
        let path = dir.join(checksum.to_hex());
        BlockHandle {
            checksum,
            block_size,
            path: Some(path),
            cache: OnceCell::new(),
            can_read,
            can_persist,
        }
    }

    /// A handle whose cache is pre-seeded with in-memory bytes.
    pub fn with_cached_data(
        checksum: Checksum,
        block_size: BlockSize,
        data: Vec<u8>,
        can_read: bool,
        can_persist: bool,
    ) -> Self {
        let handle = Self::new(checksum, block_size, can_read, can_persist);
        let _ = handle.cache.set(data);
        handle
    }

    /// Getter for the content address.
    pub fn checksum(&self) -> &Checksum {
        &self.checksum
    }

    /// Getter for the block size.
    pub fn block_size(&self) -> BlockSize {
        self.block_size
    }

    /// Getter for the backing path, when file-backed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether reads are permitted.
    pub fn can_read(&self) -> bool {
        self.can_read
    }

    /// Whether persistence is permitted.
    pub fn can_persist(&self) -> bool {
        self.can_persist
    }

    /// Whether the bytes are currently held in memory.
    pub fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }

    fn missing_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.checksum.to_hex()))
    }

    /// Cache-or-disk byte access without a permission check; shared by the
    /// readable accessors and integrity validation.
    fn current_bytes(&self) -> Result<&[u8], Error> {
        if let Some(bytes) = self.cache.get() {
            return Ok(bytes);
        }
        let path = self.path.as_ref().ok_or_else(|| {
            Error::FileNotFound(self.missing_path())
        })?;
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::FileNotFound(path.clone()));
            }
            Err(e) => return Err(Error::Io(e)),
        };
        Ok(self.cache.get_or_init(|| bytes))
    }

    /// The block bytes, cached on first read.
    pub fn data(&self) -> Result<&[u8], Error> {
        if !self.can_read {
            return Err(Error::NotReadable);
        }
        self.current_bytes()
    }

    /// A chunked reader over the block bytes: the cache when hot, otherwise
    /// the backing file.
    pub fn read_stream(&self) -> Result<Box<dyn Read + '_>, Error> {
        if !self.can_read {
            return Err(Error::NotReadable);
        }
        if let Some(bytes) = self.cache.get() {
            return Ok(Box::new(Cursor::new(bytes.as_slice())));
        }
        let path = self.path.as_ref().ok_or_else(|| {
            Error::FileNotFound(self.missing_path())
        })?;
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::FileNotFound(path.clone()));
            }
            Err(e) => return Err(Error::Io(e)),
        };
        Ok(Box::new(BufReader::new(file)))
    }

    /// Writes the block bytes to the backing file.
    ///
    /// The bytes must hash to the handle's checksum; nothing with a divergent
    /// digest ever lands at rest under that name.
    pub fn persist(&self, data: &[u8]) -> Result<(), Error> {
        if !self.can_persist {
            return Err(Error::NotPersistable);
        }
        let path = self.path.as_ref().ok_or(Error::NotPersistable)?;
        let actual = sha3_512(data);
        if actual != self.checksum {
            return Err(Error::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual,
            });
        }
        fs::write(path, data)?;
        Ok(())
    }

    /// Recomputes the digest over the current bytes (cache or disk) and
    /// compares it to the handle's checksum; corruption at rest surfaces
    /// here.
    pub fn validate(&self) -> Result<(), Error> {
        let actual = sha3_512(self.current_bytes()?);
        if actual != self.checksum {
            warn!(
                "block {} failed integrity check at rest",
                self.checksum.to_hex()
            );
            return Err(Error::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// Drops the in-memory copy; the next access reloads from disk.
    pub fn clear_cache(&mut self) {
        self.cache.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn persisted_handle(dir: &Path, data: &[u8]) -> BlockHandle {
        let checksum = sha3_512(data);
        let handle = BlockHandle::in_dir(dir, checksum, BlockSize::Message, true, true);
        handle.persist(data).unwrap();
        handle
    }

    #[test]
    fn persist_and_read_back() {
        let dir = tempdir().unwrap();
        let data = vec![0x5au8; 512];
        let handle = persisted_handle(dir.path(), &data);

        assert_eq!(handle.data().unwrap(), data.as_slice());
        assert!(handle.is_cached());
        handle.validate().unwrap();

        let name = handle.path().unwrap().file_name().unwrap();
        assert_eq!(name.to_str().unwrap(), handle.checksum().to_hex());
    }

    #[test]
    fn unreadable_handle_denies_access() {
        let dir = tempdir().unwrap();
        let data = vec![1u8; 512];
        let checksum = sha3_512(&data);
        let writer = BlockHandle::in_dir(dir.path(), checksum.clone(), BlockSize::Message, true, true);
        writer.persist(&data).unwrap();

        let handle = BlockHandle::in_dir(dir.path(), checksum, BlockSize::Message, false, true);
        assert!(matches!(handle.data(), Err(Error::NotReadable)));
        assert!(matches!(handle.read_stream().err(), Some(Error::NotReadable)));
    }

    #[test]
    fn unpersistable_handle_denies_writes() {
        let dir = tempdir().unwrap();
        let data = vec![2u8; 512];
        let handle =
            BlockHandle::in_dir(dir.path(), sha3_512(&data), BlockSize::Message, true, false);
        assert!(matches!(handle.persist(&data), Err(Error::NotPersistable)));
    }

    #[test]
    fn persist_rejects_divergent_bytes() {
        let dir = tempdir().unwrap();
        let handle = BlockHandle::in_dir(
            dir.path(),
            sha3_512(b"expected"),
            BlockSize::Message,
            true,
            true,
        );
        assert!(matches!(
            handle.persist(b"different"),
            Err(Error::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn cache_survives_file_removal_until_cleared() {
        let dir = tempdir().unwrap();
        let data = vec![3u8; 512];
        let mut handle = persisted_handle(dir.path(), &data);

        // Warm the cache, then delete the backing file.
        assert_eq!(handle.data().unwrap(), data.as_slice());
        fs::remove_file(handle.path().unwrap()).unwrap();
        assert_eq!(handle.data().unwrap(), data.as_slice());

        handle.clear_cache();
        assert!(matches!(handle.data(), Err(Error::FileNotFound(_))));
    }

    #[test]
    fn corruption_at_rest_is_detected() {
        let dir = tempdir().unwrap();
        let data = vec![4u8; 512];
        let handle = persisted_handle(dir.path(), &data);
        let path = handle.path().unwrap().to_path_buf();
        drop(handle);

        let mut corrupted = data.clone();
        corrupted[0] ^= 0xff;
        fs::write(&path, &corrupted).unwrap();

        let handle = BlockHandle::in_dir(
            dir.path(),
            sha3_512(&data),
            BlockSize::Message,
            true,
            true,
        );
        assert!(matches!(
            handle.validate(),
            Err(Error::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn read_stream_drains_block() {
        let dir = tempdir().unwrap();
        let data = vec![7u8; 512];
        let handle = persisted_handle(dir.path(), &data);

        let mut out = Vec::new();
        handle.read_stream().unwrap().read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
    }
}
