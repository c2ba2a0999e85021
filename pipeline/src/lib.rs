// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod chunker;
mod errors;
mod persist;
mod reader;
mod sources;
mod writer;

pub use self::chunker::{Frame, FrameChunker};
pub use self::errors::Error;
pub use self::persist::{StorePersister, TuplePersister};
pub use self::reader::{ReadReceipt, StreamReader};
pub use self::sources::{
    CsprngRandomSource, NoWhiteners, RandomBlockSource, WhitenedBlockSource, WhitenerPool,
};
pub use self::writer::{StreamWriter, WriteReceipt};
