// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use async_trait::async_trait;
use brightchain_store::{BlockStore, Error as StoreError, StoredBlock};
use brightchain_tuple::BlockTuple;
use log::trace;

/// The persistence seam the write pipeline awaits between frames.
///
/// A tuple is durable once this resolves; the pipeline will not draw further
/// source bytes before then.
#[async_trait]
pub trait TuplePersister {
    async fn persist_tuple(&self, tuple: &BlockTuple) -> Result<(), StoreError>;
}

/// Persists every tuple member into a block store.
///
/// Reused whiteners arrive as duplicate identical writes, which the store's
/// compare-and-set treats as idempotent.
#[derive(Debug, Clone)]
pub struct StorePersister<BS> {
    store: BS,
}

impl<BS> StorePersister<BS> {
    pub fn new(store: BS) -> Self {
        StorePersister { store }
    }

    pub fn store(&self) -> &BS {
        &self.store
    }
}

#[async_trait]
impl<BS> TuplePersister for StorePersister<BS>
where
    BS: BlockStore + Send + Sync,
{
    async fn persist_tuple(&self, tuple: &BlockTuple) -> Result<(), StoreError> {
        for block in tuple.blocks() {
            self.store.set_data(StoredBlock::from_block(block)?)?;
        }
        trace!("persisted tuple of {} blocks", tuple.len());
        Ok(())
    }
}
