// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod capacity;
mod errors;
mod header;
mod magnet;
mod super_cbl;
mod validation;

pub use self::capacity::*;
pub use self::errors::*;
pub use self::header::*;
pub use self::magnet::*;
pub use self::super_cbl::*;
pub use self::validation::{validate_file_name, validate_mime_type};

/// Raw creator GUID length inside CBL headers.
pub const CREATOR_ID_LEN: usize = 16;
/// Address entry length: one SHA3-512 digest.
pub const ADDRESS_LEN: usize = brightchain_encoding::SHA3_512_LEN;
/// Base header fields through the extension flag, before any extended fields
/// or the signature.
pub const BASE_HEADER_FIELDS_LEN: usize = 34;
/// Non-extended header length including the trailing signature.
pub const BASE_HEADER_LEN: usize = BASE_HEADER_FIELDS_LEN + brightchain_crypto::SIGNATURE_LEN;
/// Longest encodable file name (u16 length prefix, bounded tighter).
pub const MAX_FILE_NAME_LENGTH: usize = 255;
/// Longest encodable MIME type (u8 length prefix, bounded tighter).
pub const MAX_MIME_TYPE_LENGTH: usize = 127;
