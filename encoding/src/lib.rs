// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod checksum;
mod errors;
mod hash;

pub use self::checksum::*;
pub use self::errors::*;
pub use self::hash::*;
