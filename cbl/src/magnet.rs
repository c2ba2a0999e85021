// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::MagnetError;
use brightchain_blocks::BlockSize;
use brightchain_encoding::Checksum;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// URN prefix carried in a magnet URL's exact-topic parameter.
pub const MAGNET_URN_PREFIX: &str = "urn:brightchain:";

/// The external identifier of a root CBL: its checksum, the block size it
/// was stored at, and the display name for extended CBLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnetUrl {
    checksum: Checksum,
    block_size: BlockSize,
    display_name: Option<String>,
}

impl MagnetUrl {
    pub fn new(checksum: Checksum, block_size: BlockSize, display_name: Option<String>) -> Self {
        MagnetUrl {
            checksum,
            block_size,
            display_name,
        }
    }

    /// Getter for the root block checksum.
    pub fn checksum(&self) -> &Checksum {
        &self.checksum
    }

    /// Getter for the block size.
    pub fn block_size(&self) -> BlockSize {
        self.block_size
    }

    /// Getter for the display name, when carried.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Parses the `magnet:?xt=urn:brightchain:<hex>&xs=<size>[&dn=<name>]`
    /// form.
    pub fn parse(input: &str) -> Result<MagnetUrl, MagnetError> {
        let url = Url::parse(input).map_err(|e| MagnetError::InvalidScheme(e.to_string()))?;
        if url.scheme() != "magnet" {
            return Err(MagnetError::InvalidScheme(url.scheme().to_owned()));
        }

        let mut topic = None;
        let mut size = None;
        let mut name = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "xt" => topic = Some(value.into_owned()),
                "xs" => size = Some(value.into_owned()),
                "dn" => name = Some(value.into_owned()),
                _ => {}
            }
        }

        let topic = topic.ok_or(MagnetError::MissingTopic)?;
        let hex = topic
            .strip_prefix(MAGNET_URN_PREFIX)
            .ok_or_else(|| MagnetError::InvalidTopic(topic.clone()))?;
        let checksum =
            Checksum::from_hex(hex).map_err(|_| MagnetError::InvalidTopic(topic.clone()))?;

        let size = size.ok_or(MagnetError::MissingBlockSize)?;
        let length: usize = size
            .parse()
            .map_err(|_| MagnetError::InvalidBlockSize(size.clone()))?;
        let block_size =
            BlockSize::try_from(length).map_err(|_| MagnetError::InvalidBlockSize(size))?;

        Ok(MagnetUrl {
            checksum,
            block_size,
            display_name: name,
        })
    }
}

impl fmt::Display for MagnetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut url = Url::parse("magnet:").expect("static scheme always parses");
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(
                "xt",
                &format!("{}{}", MAGNET_URN_PREFIX, self.checksum.to_hex()),
            );
            pairs.append_pair("xs", &self.block_size.to_string());
            if let Some(name) = &self.display_name {
                pairs.append_pair("dn", name);
            }
        }
        write!(f, "{}", url)
    }
}

impl FromStr for MagnetUrl {
    type Err = MagnetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
