// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod errors;
mod memory;
mod stored;

pub use errors::Error;
pub use memory::MemoryBlockStore;
pub use stored::StoredBlock;

use brightchain_encoding::Checksum;

/// Store interface mapping content addresses to at-rest block payloads.
///
/// `set_data` is compare-and-set by construction: the id is the payload's own
/// digest, so a second write of identical bytes is idempotent and a divergent
/// write at an occupied id fails. The store never synthesizes data.
pub trait BlockStore {
    /// Read the block stored under `id`; `KeyNotFound` when absent.
    fn get_data(&self, id: &Checksum) -> Result<StoredBlock, Error>;

    /// Store a block under its own checksum.
    fn set_data(&self, block: StoredBlock) -> Result<(), Error>;

    /// Remove the block stored under `id`. Removing an absent id is a no-op.
    fn delete_data(&self, id: &Checksum) -> Result<(), Error>;

    /// Returns `Ok(true)` if a block exists under `id`.
    fn has(&self, id: &Checksum) -> Result<bool, Error>;

    /// Read a slice of ids and return their blocks, failing on the first
    /// absent id.
    fn bulk_get(&self, ids: &[Checksum]) -> Result<Vec<StoredBlock>, Error> {
        ids.iter().map(|id| self.get_data(id)).collect()
    }

    /// Store a batch of blocks.
    fn bulk_set(&self, blocks: Vec<StoredBlock>) -> Result<(), Error> {
        blocks.into_iter().try_for_each(|block| self.set_data(block))
    }

    /// Remove a batch of ids.
    fn bulk_delete(&self, ids: &[Checksum]) -> Result<(), Error> {
        ids.iter().try_for_each(|id| self.delete_data(id))
    }
}

impl<BS: BlockStore> BlockStore for &BS {
    fn get_data(&self, id: &Checksum) -> Result<StoredBlock, Error> {
        (*self).get_data(id)
    }

    fn set_data(&self, block: StoredBlock) -> Result<(), Error> {
        (*self).set_data(block)
    }

    fn delete_data(&self, id: &Checksum) -> Result<(), Error> {
        (*self).delete_data(id)
    }

    fn has(&self, id: &Checksum) -> Result<bool, Error> {
        (*self).has(id)
    }
}
