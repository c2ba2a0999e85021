// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod ecies;
mod errors;
mod member;
mod signature;

pub use self::ecies::*;
pub use self::errors::Error;
pub use self::member::*;
pub use self::signature::*;

pub use libsecp256k1::{PublicKey, SecretKey};
