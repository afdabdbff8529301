//! Payload extraction: decrypt, decompress, verify.

use lunark_common::BinaryReader;

use crate::crypto;
use crate::decompress;
use crate::format::{FormatLayout, XXTEA_KEY};
use crate::{ArkEntry, Error, Result};

/// Decode one entry's payload from `data`.
///
/// Each call works on its own slice of the source, so concurrent calls never
/// share a read position.
pub fn extract(
    data: &[u8],
    layout: &FormatLayout,
    entry: &ArkEntry,
    verify_checksum: bool,
) -> Result<Vec<u8>> {
    let expected = entry.uncompressed_size() as usize;

    let mut reader = BinaryReader::new_at(data, entry.offset() as usize)?;
    let stored = reader.read_bytes(entry.stored_size() as usize)?;

    let decrypted;
    let payload = if entry.is_encrypted() {
        decrypted = crypto::decrypt(stored, &XXTEA_KEY).map_err(|e| Error::CorruptEntry {
            index: entry.index(),
            reason: e.to_string(),
        })?;
        // Drop cipher padding past the compressed stream.
        let compressed_len = (entry.compressed_size() as usize).min(decrypted.len());
        &decrypted[..compressed_len]
    } else {
        stored
    };

    let output = if entry.is_stored() {
        payload.to_vec()
    } else {
        decompress::decompress(layout.payload_codec, payload, expected).map_err(|e| {
            Error::SizeMismatch {
                name: entry.name().to_string(),
                expected: expected as u64,
                actual: e.decoded as u64,
                source: Some(e.source),
            }
        })?
    };

    if output.len() != expected {
        return Err(Error::SizeMismatch {
            name: entry.name().to_string(),
            expected: expected as u64,
            actual: output.len() as u64,
            source: None,
        });
    }

    if verify_checksum {
        if let Some(md5) = entry.md5() {
            let digest = md5::compute(&output);
            if digest.0 != *md5 {
                return Err(Error::ChecksumMismatch {
                    name: entry.name().to_string(),
                    expected: format!("{:x}", md5::Digest(*md5)),
                    actual: format!("{digest:x}"),
                });
            }
        }
    }

    tracing::trace!(
        name = entry.name(),
        size = output.len(),
        encrypted = entry.is_encrypted(),
        stored = entry.is_stored(),
        "extracted entry"
    );

    Ok(output)
}
