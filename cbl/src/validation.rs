// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{CblError, MAX_FILE_NAME_LENGTH, MAX_MIME_TYPE_LENGTH};
use once_cell::sync::Lazy;
use regex::Regex;

static FILE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9 ._()-]+$").expect("pattern is well formed"));

static MIME_TYPE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9!#$&^_.+-]*/[a-z0-9][a-z0-9!#$&^_.+-]*$")
        .expect("pattern is well formed")
});

/// Validates a file name destined for an extended CBL header.
pub fn validate_file_name(name: &str) -> Result<(), CblError> {
    if name.trim().is_empty() {
        return Err(CblError::FileNameEmpty);
    }
    if name.bytes().any(|b| b < 0x20) {
        return Err(CblError::FileNameControlCharacters);
    }
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(CblError::FileNamePathTraversal);
    }
    if name.len() > MAX_FILE_NAME_LENGTH {
        return Err(CblError::FileNameTooLong);
    }
    if !FILE_NAME_PATTERN.is_match(name) {
        return Err(CblError::FileNameInvalid);
    }
    // Dots alone never name a real file.
    if name.chars().all(|c| c == '.') {
        return Err(CblError::FileNameInvalid);
    }
    Ok(())
}

/// Validates a MIME type destined for an extended CBL header.
pub fn validate_mime_type(mime: &str) -> Result<(), CblError> {
    if mime.trim().is_empty() {
        return Err(CblError::MimeTypeEmpty);
    }
    if mime.trim() != mime {
        return Err(CblError::MimeTypeWhitespace);
    }
    if mime.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(CblError::MimeTypeNotLowercase);
    }
    if mime.len() > MAX_MIME_TYPE_LENGTH {
        return Err(CblError::MimeTypeTooLong);
    }
    if !MIME_TYPE_PATTERN.is_match(mime) {
        return Err(CblError::MimeTypeInvalid);
    }
    Ok(())
}
