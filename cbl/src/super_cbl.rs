// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{
    assemble_cbl_block, cbl_address_capacity, parse_cbl_block, CblHeader, EncryptionKind,
    SuperCblError, ADDRESS_LEN,
};
use brightchain_blocks::BlockSize;
use brightchain_crypto::{Member, MemberId, Signature, SIGNATURE_LEN};
use brightchain_encoding::{sha3_512_chunks, Checksum};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::{self, Cursor, Read, Write};

/// Leading magic byte of a Super-CBL block.
pub const SUPER_CBL_MAGIC: u8 = 0xBC;
/// Type byte following the magic.
pub const SUPER_CBL_TYPE: u8 = 0x03;
/// Current Super-CBL wire version.
pub const SUPER_CBL_VERSION: u8 = 0x01;
/// Fixed Super-CBL header length, signature included.
pub const SUPER_CBL_HEADER_LEN: usize = 176;

/// Hierarchy bounds for Super-CBL chains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuperCblConfig {
    pub max_depth: u8,
}

impl Default for SuperCblConfig {
    fn default() -> Self {
        SuperCblConfig { max_depth: 3 }
    }
}

/// Detects the Super-CBL magic/type pair at the front of a block.
pub fn is_super_cbl(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == SUPER_CBL_MAGIC && data[1] == SUPER_CBL_TYPE
}

/// Header of a CBL whose trailing "address list" is a sequence of sub-CBL
/// checksums, used when a file outgrows a single CBL's capacity.
///
/// Carries the whole-plaintext digest so the reassembled file can be
/// integrity-checked end to end.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperCblHeader {
    creator_id: MemberId,
    date_created: DateTime<Utc>,
    sub_cbl_count: u32,
    total_block_count: u64,
    depth: u8,
    original_data_length: u64,
    original_data_checksum: Checksum,
    signature: Signature,
}

impl SuperCblHeader {
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        creator: &Member,
        date_created: DateTime<Utc>,
        total_block_count: u64,
        depth: u8,
        original_data_length: u64,
        original_data_checksum: Checksum,
        block_size: BlockSize,
        sub_cbls: &[Checksum],
        config: &SuperCblConfig,
    ) -> Result<SuperCblHeader, SuperCblError> {
        if depth > config.max_depth {
            return Err(SuperCblError::MaxDepthExceeded {
                depth,
                max: config.max_depth,
            });
        }
        if sub_cbls.len() > super_cbl_capacity(block_size) {
            return Err(SuperCblError::InvalidFormat(format!(
                "{} sub-CBLs exceed block capacity {}",
                sub_cbls.len(),
                super_cbl_capacity(block_size)
            )));
        }

        let mut header = SuperCblHeader {
            creator_id: creator.id(),
            date_created,
            sub_cbl_count: sub_cbls.len() as u32,
            total_block_count,
            depth,
            original_data_length,
            original_data_checksum,
            signature: Signature::zeroed(),
        };

        if creator.can_sign() {
            let digest = header.signing_digest(block_size, &crate::address_bytes(sub_cbls));
            header.signature = creator
                .sign_digest(digest.as_bytes())
                .map_err(crate::CblError::from)?;
        }
        Ok(header)
    }

    fn write_fields<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&[SUPER_CBL_MAGIC, SUPER_CBL_TYPE, SUPER_CBL_VERSION])?;
        w.write_all(&self.creator_id.to_bytes())?;
        let ms = self.date_created.timestamp_millis() as u64;
        w.write_u32::<BigEndian>((ms >> 32) as u32)?;
        w.write_u32::<BigEndian>(ms as u32)?;
        w.write_u32::<BigEndian>(self.sub_cbl_count)?;
        w.write_u64::<BigEndian>(self.total_block_count)?;
        w.write_u8(self.depth)?;
        w.write_u64::<BigEndian>(self.original_data_length)?;
        w.write_all(self.original_data_checksum.as_bytes())?;
        Ok(())
    }

    /// The header fields without the trailing signature.
    pub fn fields_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(SUPER_CBL_HEADER_LEN - SIGNATURE_LEN);
        self.write_fields(&mut buf)
            .expect("header serialization cannot fail");
        buf
    }

    /// The full wire header.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.fields_bytes();
        buf.extend_from_slice(self.signature.as_bytes());
        buf
    }

    /// The signing digest: header fields, enclosing block size, sub-CBL
    /// checksum list. Same preimage rule as the base CBL.
    pub fn signing_digest(&self, block_size: BlockSize, sub_cbl_list: &[u8]) -> Checksum {
        let size_context = (block_size.as_usize() as u32).to_be_bytes();
        sha3_512_chunks([self.fields_bytes().as_slice(), &size_context, sub_cbl_list])
    }

    /// Verifies the signature against the creator's public key.
    pub fn verify_signature(
        &self,
        creator: &Member,
        block_size: BlockSize,
        sub_cbl_list: &[u8],
    ) -> Result<(), SuperCblError> {
        if creator.id() != self.creator_id {
            return Err(crate::CblError::CreatorIdMismatch.into());
        }
        let digest = self.signing_digest(block_size, sub_cbl_list);
        if !creator.verify_digest(digest.as_bytes(), &self.signature) {
            return Err(crate::CblError::InvalidSignature.into());
        }
        Ok(())
    }

    /// Decodes a header from the front of a block buffer.
    pub fn parse(data: &[u8]) -> Result<SuperCblHeader, SuperCblError> {
        if !is_super_cbl(data) {
            return Err(SuperCblError::InvalidCblType);
        }
        if data.len() < SUPER_CBL_HEADER_LEN {
            return Err(SuperCblError::InvalidFormat("truncated header".to_owned()));
        }
        if data[2] != SUPER_CBL_VERSION {
            return Err(SuperCblError::InvalidFormat(format!(
                "unsupported version {}",
                data[2]
            )));
        }

        let mut cursor = Cursor::new(&data[3..]);
        let mut creator_id = [0u8; 16];
        cursor
            .read_exact(&mut creator_id)
            .expect("length checked above");
        let high = cursor.read_u32::<BigEndian>().expect("length checked above");
        let low = cursor.read_u32::<BigEndian>().expect("length checked above");
        let ms = (u64::from(high) << 32) | u64::from(low);
        let date_created = Utc
            .timestamp_millis_opt(ms as i64)
            .single()
            .ok_or_else(|| SuperCblError::InvalidFormat("timestamp out of range".to_owned()))?;
        let sub_cbl_count = cursor.read_u32::<BigEndian>().expect("length checked above");
        let total_block_count = cursor.read_u64::<BigEndian>().expect("length checked above");
        let depth = cursor.read_u8().expect("length checked above");
        let original_data_length = cursor.read_u64::<BigEndian>().expect("length checked above");
        let mut original_checksum = [0u8; 64];
        cursor
            .read_exact(&mut original_checksum)
            .expect("length checked above");
        let mut signature = [0u8; SIGNATURE_LEN];
        cursor
            .read_exact(&mut signature)
            .expect("length checked above");

        Ok(SuperCblHeader {
            creator_id: MemberId::from_bytes(creator_id),
            date_created,
            sub_cbl_count,
            total_block_count,
            depth,
            original_data_length,
            original_data_checksum: Checksum::new(original_checksum),
            signature: Signature::new(signature),
        })
    }

    /// Getter for the creator id.
    pub fn creator_id(&self) -> MemberId {
        self.creator_id
    }
    /// Getter for the creation timestamp.
    pub fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }
    /// Getter for the number of direct sub-CBLs.
    pub fn sub_cbl_count(&self) -> u32 {
        self.sub_cbl_count
    }
    /// Getter for the constituent address count under this node.
    pub fn total_block_count(&self) -> u64 {
        self.total_block_count
    }
    /// Getter for this node's hierarchy depth.
    pub fn depth(&self) -> u8 {
        self.depth
    }
    /// Getter for the reconstructed plaintext length.
    pub fn original_data_length(&self) -> u64 {
        self.original_data_length
    }
    /// Getter for the whole-plaintext digest.
    pub fn original_data_checksum(&self) -> &Checksum {
        &self.original_data_checksum
    }
    /// Getter for the signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// How many sub-CBL checksums one Super-CBL block can carry.
pub fn super_cbl_capacity(block_size: BlockSize) -> usize {
    block_size.as_usize().saturating_sub(SUPER_CBL_HEADER_LEN) / ADDRESS_LEN
}

/// Serializes a whole Super-CBL block: header, sub-CBL list, zero padding.
pub fn assemble_super_cbl_block(
    header: &SuperCblHeader,
    block_size: BlockSize,
    sub_cbls: &[Checksum],
) -> Result<Vec<u8>, SuperCblError> {
    if sub_cbls.len() != header.sub_cbl_count() as usize {
        return Err(SuperCblError::InvalidFormat(format!(
            "header says {} sub-CBLs, got {}",
            header.sub_cbl_count(),
            sub_cbls.len()
        )));
    }
    let header_bytes = header.to_bytes();
    let needed = header_bytes.len() + sub_cbls.len() * ADDRESS_LEN;
    if needed > block_size.as_usize() {
        return Err(SuperCblError::InvalidFormat(
            "sub-CBL list exceeds block size".to_owned(),
        ));
    }
    let mut block = vec![0u8; block_size.as_usize()];
    block[..header_bytes.len()].copy_from_slice(&header_bytes);
    block[header_bytes.len()..needed].copy_from_slice(&crate::address_bytes(sub_cbls));
    Ok(block)
}

/// Decodes a whole Super-CBL block into its header and sub-CBL checksums.
pub fn parse_super_cbl_block(
    data: &[u8],
) -> Result<(SuperCblHeader, Vec<Checksum>), SuperCblError> {
    let header = SuperCblHeader::parse(data)?;
    let count = header.sub_cbl_count() as usize;
    let end = SUPER_CBL_HEADER_LEN + count * ADDRESS_LEN;
    if end > data.len() {
        return Err(SuperCblError::InvalidFormat(format!(
            "sub-CBL list of {} entries exceeds block bounds",
            count
        )));
    }
    let mut subs = Vec::with_capacity(count);
    for i in 0..count {
        let start = SUPER_CBL_HEADER_LEN + i * ADDRESS_LEN;
        subs.push(
            Checksum::from_bytes(&data[start..start + ADDRESS_LEN])
                .expect("sub-CBL slices are exactly digest-sized"),
        );
    }
    Ok((header, subs))
}

/// Builds the root list block for an address list of any size.
///
/// Small lists become a single signed CBL; larger lists are partitioned into
/// sub-CBLs persisted through `persist`, chained under Super-CBL layers up
/// to the configured depth. Returns the root block bytes for the caller to
/// persist as it sees fit.
#[allow(clippy::too_many_arguments)]
pub fn build_list_block<F>(
    creator: &Member,
    date_created: DateTime<Utc>,
    block_size: BlockSize,
    addresses: &[Checksum],
    original_data_length: u64,
    original_data_checksum: Checksum,
    encryption: EncryptionKind,
    file_name: Option<&str>,
    mime_type: Option<&str>,
    config: &SuperCblConfig,
    persist: &mut F,
) -> Result<Vec<u8>, SuperCblError>
where
    F: FnMut(&[u8]) -> Result<Checksum, SuperCblError>,
{
    let capacity = cbl_address_capacity(block_size, encryption, file_name, mime_type)
        .map_err(crate::CblError::from)?;
    if capacity == 0 {
        return Err(SuperCblError::InvalidFormat(format!(
            "block size {} cannot hold one tuple of addresses",
            block_size
        )));
    }

    if addresses.len() <= capacity && original_data_length <= u64::from(u32::MAX) {
        let header = CblHeader::build(
            creator,
            date_created,
            original_data_length as u32,
            block_size,
            encryption,
            addresses,
            file_name,
            mime_type,
        )?;
        return Ok(assemble_cbl_block(&header, block_size, addresses)?);
    }

    // Leaf layer: plain CBLs over address ranges. The authoritative data
    // length lives in the root super header, so leaves carry zero.
    let leaf_capacity = cbl_address_capacity(block_size, EncryptionKind::None, None, None)
        .map_err(crate::CblError::from)?;
    let mut nodes: Vec<(Checksum, u64)> = Vec::new();
    for chunk in addresses.chunks(leaf_capacity) {
        let header = CblHeader::build(
            creator,
            date_created,
            0,
            block_size,
            EncryptionKind::None,
            chunk,
            None,
            None,
        )?;
        let block = assemble_cbl_block(&header, block_size, chunk)?;
        nodes.push((persist(&block)?, chunk.len() as u64));
    }
    debug!("partitioned {} addresses into {} sub-CBLs", addresses.len(), nodes.len());

    let super_capacity = super_cbl_capacity(block_size);
    // A sealed root pays the encryption overhead out of its sub-CBL budget.
    let root_capacity = block_size
        .as_usize()
        .saturating_sub(SUPER_CBL_HEADER_LEN + crate::encryption_overhead(encryption).map_err(crate::CblError::from)?)
        / ADDRESS_LEN;
    let mut depth: u8 = 1;
    loop {
        if nodes.len() <= root_capacity {
            let subs: Vec<Checksum> = nodes.iter().map(|(id, _)| id.clone()).collect();
            let header = SuperCblHeader::build(
                creator,
                date_created,
                addresses.len() as u64,
                depth,
                original_data_length,
                original_data_checksum,
                block_size,
                &subs,
                config,
            )?;
            return assemble_super_cbl_block(&header, block_size, &subs);
        }

        if depth >= config.max_depth {
            return Err(SuperCblError::MaxDepthExceeded {
                depth: depth + 1,
                max: config.max_depth,
            });
        }

        // Chain another layer of supers over the current nodes.
        let mut next: Vec<(Checksum, u64)> = Vec::new();
        for chunk in nodes.chunks(super_capacity) {
            let subs: Vec<Checksum> = chunk.iter().map(|(id, _)| id.clone()).collect();
            let covered: u64 = chunk.iter().map(|(_, count)| count).sum();
            let header = SuperCblHeader::build(
                creator,
                date_created,
                covered,
                depth,
                0,
                Checksum::zeroed(),
                block_size,
                &subs,
                config,
            )?;
            let block = assemble_super_cbl_block(&header, block_size, &subs)?;
            next.push((persist(&block)?, covered));
        }
        nodes = next;
        depth += 1;
    }
}

/// Everything a reader needs from a resolved root list block.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCbl {
    /// Flat constituent addresses in original insertion order.
    pub addresses: Vec<Checksum>,
    pub original_data_length: u64,
    /// Whole-plaintext digest, present on Super-CBL roots.
    pub original_data_checksum: Option<Checksum>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// Resolves a root block, walking Super-CBL hierarchies through `load`, into
/// the flat ordered address list and file metadata.
pub fn resolve_list_block<F>(
    root: &[u8],
    load: &F,
    config: &SuperCblConfig,
) -> Result<ResolvedCbl, SuperCblError>
where
    F: Fn(&Checksum) -> Option<Vec<u8>>,
{
    fn walk<F>(
        data: &[u8],
        load: &F,
        config: &SuperCblConfig,
        level: u8,
    ) -> Result<Vec<Checksum>, SuperCblError>
    where
        F: Fn(&Checksum) -> Option<Vec<u8>>,
    {
        if is_super_cbl(data) {
            if level >= config.max_depth {
                return Err(SuperCblError::MaxDepthExceeded {
                    depth: level + 1,
                    max: config.max_depth,
                });
            }
            let (header, subs) = parse_super_cbl_block(data)?;
            let mut addresses = Vec::new();
            for sub in subs {
                let bytes = load(&sub).ok_or_else(|| SuperCblError::MissingSubCbl(sub.clone()))?;
                addresses.extend(walk(&bytes, load, config, level + 1)?);
            }
            if addresses.len() as u64 != header.total_block_count() {
                return Err(SuperCblError::BlockCountMismatch {
                    expected: header.total_block_count(),
                    actual: addresses.len() as u64,
                });
            }
            Ok(addresses)
        } else {
            let (_, addresses) = parse_cbl_block(data)?;
            Ok(addresses)
        }
    }

    let addresses = walk(root, load, config, 0)?;
    if is_super_cbl(root) {
        let (header, _) = parse_super_cbl_block(root)?;
        Ok(ResolvedCbl {
            addresses,
            original_data_length: header.original_data_length(),
            original_data_checksum: Some(header.original_data_checksum().clone()),
            file_name: None,
            mime_type: None,
        })
    } else {
        let (header, _) = parse_cbl_block(root)?;
        Ok(ResolvedCbl {
            addresses,
            original_data_length: u64::from(header.original_data_length()),
            original_data_checksum: None,
            file_name: header.file_name().map(str::to_owned),
            mime_type: header.mime_type().map(str::to_owned),
        })
    }
}
