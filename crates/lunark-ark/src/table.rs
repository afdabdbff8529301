//! Entry table decoding.
//!
//! The table sits at the header's metadata offset and runs to the end of the
//! source. It is XXTEA-encrypted as one block and, depending on the version,
//! Zstandard-compressed underneath. Every descriptor is bounds-checked here
//! so a structurally broken archive is rejected before any payload is read.

use lunark_common::{BinaryReader, LegacyString, TextEncoding};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::crypto;
use crate::decompress;
use crate::format::{Codec, NAME_FIELD_SIZE, XXTEA_KEY};
use crate::{ArkDirectory, ArkEntry, ArkHeader, Error, Result};

/// One entry descriptor as stored in the decoded table.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct RawEntry {
    /// NUL-padded file name
    pub file_name: [u8; NAME_FIELD_SIZE],
    /// NUL-padded directory
    pub path_name: [u8; NAME_FIELD_SIZE],
    /// Absolute payload offset
    pub file_location: u32,
    /// Uncompressed size
    pub original_size: u32,
    /// Compressed size, equal to `original_size` when stored
    pub compressed_size: u32,
    /// Encrypted size, 0 when not encrypted
    pub encrypted_size: u32,
    /// Unix timestamp
    pub timestamp: u32,
    /// MD5 of the uncompressed payload
    pub md5: [u8; 16],
    /// Load priority
    pub priority: u32,
}

/// Decode the entry table described by `header`.
///
/// Seeks `reader` to the table and leaves it at the end of the source.
pub fn decode_entries(
    reader: &mut BinaryReader<'_>,
    header: &ArkHeader,
    encoding: TextEncoding,
) -> Result<ArkDirectory> {
    let source_len = reader.len() as u64;
    reader.seek(header.metadata_offset as usize)?;
    let region = reader.read_bytes(reader.remaining())?;

    if header.file_count == 0 && region.is_empty() {
        return Ok(ArkDirectory::default());
    }
    if region.is_empty() || region.len() % 4 != 0 {
        return Err(Error::CorruptHeader(format!(
            "entry table is {} bytes, not a whole number of cipher words",
            region.len()
        )));
    }

    let decrypted = crypto::decrypt(region, &XXTEA_KEY)
        .map_err(|e| Error::CorruptHeader(format!("entry table: {e}")))?;

    let expected = header.table_size();
    let table = match header.layout().table_codec {
        Codec::None => decrypted,
        codec => decompress::decompress(codec, &decrypted, expected)
            .map_err(|e| Error::CorruptHeader(format!("entry table: {e}")))?,
    };
    if table.len() < expected {
        return Err(Error::CorruptHeader(format!(
            "entry table holds {} bytes, {} entries need {expected}",
            table.len(),
            header.file_count
        )));
    }

    let mut table_reader = BinaryReader::new(&table);
    let mut entries = Vec::with_capacity(header.file_count as usize);
    for index in 0..header.file_count as usize {
        let raw: RawEntry = table_reader.read_struct()?;
        validate(index, &raw, source_len)?;
        entries.push(ArkEntry::new(
            index,
            LegacyString::from_nul_padded(&raw.file_name, encoding),
            LegacyString::from_nul_padded(&raw.path_name, encoding),
            raw.file_location,
            raw.original_size,
            raw.compressed_size,
            raw.encrypted_size,
            raw.timestamp,
            raw.md5,
            raw.priority,
        ));
    }

    tracing::debug!(
        version = %header.version,
        entries = entries.len(),
        "decoded entry table"
    );

    Ok(ArkDirectory::new(entries))
}

fn validate(index: usize, raw: &RawEntry, source_len: u64) -> Result<()> {
    let corrupt = |reason: String| Error::CorruptEntry { index, reason };

    let encrypted_size = raw.encrypted_size;
    let compressed_size = raw.compressed_size;
    let stored_size = if encrypted_size != 0 {
        if encrypted_size % 4 != 0 {
            return Err(corrupt(format!(
                "encrypted size {encrypted_size} is not a multiple of 4"
            )));
        }
        if encrypted_size < compressed_size {
            return Err(corrupt(format!(
                "encrypted size {encrypted_size} is smaller than compressed size {compressed_size}"
            )));
        }
        encrypted_size
    } else {
        compressed_size
    };

    let offset = raw.file_location as u64;
    let end = offset + stored_size as u64;
    if end > source_len {
        return Err(corrupt(format!(
            "payload {offset}..{end} overruns the {source_len}-byte source"
        )));
    }

    Ok(())
}
