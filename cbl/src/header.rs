// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{
    cbl_address_capacity, validate_file_name, validate_mime_type, CblError, EncryptionKind,
    ADDRESS_LEN, BASE_HEADER_FIELDS_LEN, MAX_FILE_NAME_LENGTH, MAX_MIME_TYPE_LENGTH,
};
use brightchain_blocks::BlockSize;
use brightchain_crypto::{Member, MemberId, Signature, SIGNATURE_LEN};
use brightchain_encoding::{sha3_512_chunks, Checksum};
use brightchain_tuple::TUPLE_SIZE;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, TimeZone, Utc};
use std::io::{self, Cursor, Read, Write};

/// A constituent block list header: creator, dates, counts, optional
/// filename/MIME extension, and the creator's signature.
///
/// All multi-byte integers are big-endian on the wire; the millisecond
/// timestamp is written as a `(high32, low32)` pair. The signature covers
/// the header fields, the enclosing block size, and the trailing address
/// list, so no part of a CBL can be reshaped without re-signing.
#[derive(Debug, Clone, PartialEq)]
pub struct CblHeader {
    creator_id: MemberId,
    date_created: DateTime<Utc>,
    address_count: u32,
    original_data_length: u32,
    tuple_size: u8,
    file_name: Option<String>,
    mime_type: Option<String>,
    signature: Signature,
}

/// Concatenates checksums into the wire form of an address list.
pub fn address_bytes(addresses: &[Checksum]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(addresses.len() * ADDRESS_LEN);
    for address in addresses {
        buf.extend_from_slice(address.as_bytes());
    }
    buf
}

impl CblHeader {
    /// Assembles and signs a header over an address list.
    ///
    /// The capacity check runs first, so a malformed assembly is refused
    /// before any bytes are produced. Creators without a secret key yield an
    /// unsigned header carrying the zero signature.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        creator: &Member,
        date_created: DateTime<Utc>,
        original_data_length: u32,
        block_size: BlockSize,
        encryption: EncryptionKind,
        addresses: &[Checksum],
        file_name: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<CblHeader, CblError> {
        if file_name.is_some() != mime_type.is_some() {
            return Err(CblError::InvalidStructure(
                "extended header requires both file name and MIME type".to_owned(),
            ));
        }
        if let Some(name) = file_name {
            validate_file_name(name)?;
        }
        if let Some(mime) = mime_type {
            validate_mime_type(mime)?;
        }

        let capacity = cbl_address_capacity(block_size, encryption, file_name, mime_type)?;
        if addresses.len() > capacity {
            return Err(CblError::AddressCountExceedsCapacity {
                count: addresses.len(),
                capacity,
            });
        }

        let mut header = CblHeader {
            creator_id: creator.id(),
            date_created,
            address_count: addresses.len() as u32,
            original_data_length,
            tuple_size: TUPLE_SIZE as u8,
            file_name: file_name.map(str::to_owned),
            mime_type: mime_type.map(str::to_owned),
            signature: Signature::zeroed(),
        };

        if creator.can_sign() {
            let digest = header.signing_digest(block_size, &address_bytes(addresses));
            header.signature = creator.sign_digest(digest.as_bytes())?;
        }
        Ok(header)
    }

    fn write_fields<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.creator_id.to_bytes())?;
        let ms = self.date_created.timestamp_millis() as u64;
        w.write_u32::<BigEndian>((ms >> 32) as u32)?;
        w.write_u32::<BigEndian>(ms as u32)?;
        w.write_u32::<BigEndian>(self.address_count)?;
        w.write_u32::<BigEndian>(self.original_data_length)?;
        w.write_u8(self.tuple_size)?;
        w.write_u8(u8::from(self.is_extended()))?;
        if let (Some(name), Some(mime)) = (&self.file_name, &self.mime_type) {
            w.write_u16::<BigEndian>(name.len() as u16)?;
            w.write_all(name.as_bytes())?;
            w.write_u8(mime.len() as u8)?;
            w.write_all(mime.as_bytes())?;
        }
        Ok(())
    }

    /// The header fields, extended section included, without the signature.
    pub fn fields_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len() - SIGNATURE_LEN);
        self.write_fields(&mut buf)
            .expect("header serialization cannot fail");
        buf
    }

    /// The full wire header: fields followed by the signature.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.fields_bytes();
        buf.extend_from_slice(self.signature.as_bytes());
        buf
    }

    /// Encoded header length, signature included.
    pub fn encoded_len(&self) -> usize {
        let extended = match (&self.file_name, &self.mime_type) {
            (Some(name), Some(mime)) => 2 + name.len() + 1 + mime.len(),
            _ => 0,
        };
        BASE_HEADER_FIELDS_LEN + extended + SIGNATURE_LEN
    }

    /// The digest the creator signs: header fields, enclosing block size,
    /// then the raw address list.
    pub fn signing_digest(&self, block_size: BlockSize, address_list: &[u8]) -> Checksum {
        let size_context = (block_size.as_usize() as u32).to_be_bytes();
        sha3_512_chunks([
            self.fields_bytes().as_slice(),
            &size_context,
            address_list,
        ])
    }

    /// Verifies the signature against the creator's public key, over the
    /// same preimage `build` signed.
    pub fn verify_signature(
        &self,
        creator: &Member,
        block_size: BlockSize,
        address_list: &[u8],
    ) -> Result<(), CblError> {
        if creator.id() != self.creator_id {
            return Err(CblError::CreatorIdMismatch);
        }
        let digest = self.signing_digest(block_size, address_list);
        if !creator.verify_digest(digest.as_bytes(), &self.signature) {
            return Err(CblError::InvalidSignature);
        }
        Ok(())
    }

    /// Decodes a header from the front of a block buffer.
    pub fn parse(data: &[u8]) -> Result<CblHeader, CblError> {
        let mut cursor = Cursor::new(data);

        let mut creator_id = [0u8; 16];
        cursor
            .read_exact(&mut creator_id)
            .map_err(|_| truncated("creator id"))?;
        let high = cursor
            .read_u32::<BigEndian>()
            .map_err(|_| truncated("timestamp"))?;
        let low = cursor
            .read_u32::<BigEndian>()
            .map_err(|_| truncated("timestamp"))?;
        let ms = (u64::from(high) << 32) | u64::from(low);
        let date_created = Utc
            .timestamp_millis_opt(ms as i64)
            .single()
            .ok_or_else(|| CblError::InvalidStructure("timestamp out of range".to_owned()))?;
        let address_count = cursor
            .read_u32::<BigEndian>()
            .map_err(|_| truncated("address count"))?;
        let original_data_length = cursor
            .read_u32::<BigEndian>()
            .map_err(|_| truncated("original data length"))?;
        let tuple_size = cursor.read_u8().map_err(|_| truncated("tuple size"))?;
        if tuple_size == 0 {
            return Err(CblError::InvalidStructure("tuple size is zero".to_owned()));
        }
        let extended_flag = cursor
            .read_u8()
            .map_err(|_| truncated("extension flag"))?;

        let (file_name, mime_type) = match extended_flag {
            0 => (None, None),
            1 => {
                let name_len = cursor
                    .read_u16::<BigEndian>()
                    .map_err(|_| truncated("file name length"))?
                    as usize;
                if name_len > MAX_FILE_NAME_LENGTH {
                    return Err(CblError::FileNameTooLong);
                }
                let mut name = vec![0u8; name_len];
                cursor
                    .read_exact(&mut name)
                    .map_err(|_| truncated("file name"))?;
                let name = String::from_utf8(name)
                    .map_err(|_| CblError::InvalidStructure("file name is not UTF-8".to_owned()))?;

                let mime_len = cursor
                    .read_u8()
                    .map_err(|_| truncated("MIME type length"))? as usize;
                if mime_len > MAX_MIME_TYPE_LENGTH {
                    return Err(CblError::MimeTypeTooLong);
                }
                let mut mime = vec![0u8; mime_len];
                cursor
                    .read_exact(&mut mime)
                    .map_err(|_| truncated("MIME type"))?;
                let mime = String::from_utf8(mime)
                    .map_err(|_| CblError::InvalidStructure("MIME type is not ASCII".to_owned()))?;

                validate_file_name(&name)?;
                validate_mime_type(&mime)?;
                (Some(name), Some(mime))
            }
            other => {
                return Err(CblError::InvalidStructure(format!(
                    "invalid extension flag {}",
                    other
                )));
            }
        };

        let mut signature = [0u8; SIGNATURE_LEN];
        cursor
            .read_exact(&mut signature)
            .map_err(|_| truncated("signature"))?;

        Ok(CblHeader {
            creator_id: MemberId::from_bytes(creator_id),
            date_created,
            address_count,
            original_data_length,
            tuple_size,
            file_name,
            mime_type,
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
    /// Getter for the trailing address count.
    pub fn address_count(&self) -> u32 {
        self.address_count
    }
    /// Getter for the reconstructed plaintext length.
    pub fn original_data_length(&self) -> u32 {
        self.original_data_length
    }
    /// Getter for the tuple cardinality the list is aligned to.
    pub fn tuple_size(&self) -> u8 {
        self.tuple_size
    }
    /// Getter for the signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }
    /// Whether the filename/MIME extension is present.
    pub fn is_extended(&self) -> bool {
        self.file_name.is_some()
    }
    /// Getter for the extended file name, when present.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }
    /// Getter for the extended MIME type, when present.
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// The extension pair, failing on basic CBLs.
    pub fn extended_fields(&self) -> Result<(&str, &str), CblError> {
        match (&self.file_name, &self.mime_type) {
            (Some(name), Some(mime)) => Ok((name, mime)),
            _ => Err(CblError::NotExtendedCbl),
        }
    }
}

fn truncated(field: &str) -> CblError {
    CblError::InvalidStructure(format!("truncated header: {}", field))
}

/// Serializes a whole CBL block: header, address list, zero padding out to
/// the block size.
pub fn assemble_cbl_block(
    header: &CblHeader,
    block_size: BlockSize,
    addresses: &[Checksum],
) -> Result<Vec<u8>, CblError> {
    if addresses.len() != header.address_count() as usize {
        return Err(CblError::InvalidStructure(format!(
            "header says {} addresses, got {}",
            header.address_count(),
            addresses.len()
        )));
    }
    let header_bytes = header.to_bytes();
    let needed = header_bytes.len() + addresses.len() * ADDRESS_LEN;
    if needed > block_size.as_usize() {
        return Err(CblError::AddressCountExceedsCapacity {
            count: addresses.len(),
            capacity: (block_size.as_usize().saturating_sub(header_bytes.len())) / ADDRESS_LEN,
        });
    }

    let mut block = vec![0u8; block_size.as_usize()];
    block[..header_bytes.len()].copy_from_slice(&header_bytes);
    block[header_bytes.len()..needed].copy_from_slice(&address_bytes(addresses));
    Ok(block)
}

/// Decodes a whole CBL block back into its header and address list.
pub fn parse_cbl_block(data: &[u8]) -> Result<(CblHeader, Vec<Checksum>), CblError> {
    let header = CblHeader::parse(data)?;
    let offset = header.encoded_len();
    let count = header.address_count() as usize;
    let end = offset + count * ADDRESS_LEN;
    if end > data.len() {
        return Err(CblError::InvalidStructure(format!(
            "address list of {} entries exceeds block bounds",
            count
        )));
    }

    let mut addresses = Vec::with_capacity(count);
    for i in 0..count {
        let start = offset + i * ADDRESS_LEN;
        let address = Checksum::from_bytes(&data[start..start + ADDRESS_LEN])
            .expect("address slices are exactly digest-sized");
        addresses.push(address);
    }
    Ok((header, addresses))
}
