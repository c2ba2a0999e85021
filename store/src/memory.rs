// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{BlockStore, Error, StoredBlock};
use brightchain_encoding::Checksum;
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

/// A thread-safe in-memory block store.
///
/// One write lock guards the mapping; a successful `set_data` is visible to
/// every later `get_data`/`has`, and readers proceed in parallel.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlockStore {
    db: Arc<RwLock<HashMap<Checksum, StoredBlock>>>,
}

impl MemoryBlockStore {
    /// Number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.db.read().len()
    }

    /// Whether the store holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.db.read().is_empty()
    }
}

impl BlockStore for MemoryBlockStore {
    fn get_data(&self, id: &Checksum) -> Result<StoredBlock, Error> {
        self.db
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::KeyNotFound(id.clone()))
    }

    fn set_data(&self, block: StoredBlock) -> Result<(), Error> {
        let mut db = self.db.write();
        match db.entry(block.checksum().clone()) {
            Entry::Occupied(occupied) => {
                // Identical bytes cannot collide with different content at
                // the same digest, so anything unequal here is a corrupt
                // write attempt.
                if occupied.get().data() == block.data() {
                    Ok(())
                } else {
                    Err(Error::BlockAlreadyExists(block.checksum().clone()))
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(block);
                Ok(())
            }
        }
    }

    fn delete_data(&self, id: &Checksum) -> Result<(), Error> {
        self.db.write().remove(id);
        Ok(())
    }

    fn has(&self, id: &Checksum) -> Result<bool, Error> {
        Ok(self.db.read().contains_key(id))
    }
}
