//! Archive header parsing.
//!
//! The header has no magic bytes. It is three little-endian words (entry
//! count, table offset, version), followed by reserved bytes whose size
//! depends on the version. The version word selects a [`FormatLayout`] and
//! everything after it is normalized into one [`ArkHeader`].

use lunark_common::BinaryReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::format::{
    ArkVersion, FormatLayout, BASE_HEADER_SIZE, DESCRIPTOR_SIZE, MAX_PLAUSIBLE_VERSION,
    MAX_TABLE_SIZE,
};
use crate::{Error, Result};

/// Fields shared by every header version.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct RawHeader {
    /// Number of entries in the table
    pub file_count: u32,
    /// Absolute offset of the encrypted entry table
    pub metadata_offset: u32,
    /// Format version
    pub version: u32,
}

/// Normalized archive header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArkHeader {
    /// Format version.
    pub version: ArkVersion,
    /// Number of entries in the table.
    pub file_count: u32,
    /// Absolute offset of the entry table.
    pub metadata_offset: u32,
    /// Header bytes whose meaning is unknown (version 3 only).
    pub reserved: Vec<u8>,
}

impl ArkHeader {
    /// Layout parameters for this header's version.
    #[inline]
    pub fn layout(&self) -> &'static FormatLayout {
        self.version.layout()
    }

    /// Offset of the first payload byte.
    #[inline]
    pub fn data_offset(&self) -> usize {
        self.layout().header_size
    }

    /// Size of the decoded entry table.
    #[inline]
    pub fn table_size(&self) -> usize {
        self.file_count as usize * DESCRIPTOR_SIZE
    }
}

/// Parse and validate the header at the reader's current position.
pub fn parse_header(reader: &mut BinaryReader<'_>) -> Result<ArkHeader> {
    let source_len = reader.len();
    if reader.remaining() < BASE_HEADER_SIZE {
        return Err(Error::InvalidFormat(format!(
            "source has {} bytes, header needs {}",
            reader.remaining(),
            BASE_HEADER_SIZE
        )));
    }

    let raw: RawHeader = reader.read_struct()?;
    let version_word = raw.version;
    if version_word > MAX_PLAUSIBLE_VERSION {
        return Err(Error::InvalidFormat(format!(
            "implausible version word {version_word:#010x}"
        )));
    }
    let version = ArkVersion::try_from(version_word).map_err(Error::UnsupportedVersion)?;
    let layout = version.layout();

    let reserved = reader
        .read_bytes(layout.reserved_size)
        .map_err(|_| {
            Error::CorruptHeader(format!(
                "{version} header needs {} bytes, source has {source_len}",
                layout.header_size
            ))
        })?
        .to_vec();

    let header = ArkHeader {
        version,
        file_count: raw.file_count,
        metadata_offset: raw.metadata_offset,
        reserved,
    };

    let table_offset = header.metadata_offset as usize;
    if table_offset < layout.header_size {
        return Err(Error::CorruptHeader(format!(
            "entry table offset {table_offset} overlaps the {}-byte header",
            layout.header_size
        )));
    }
    if table_offset > source_len {
        return Err(Error::CorruptHeader(format!(
            "entry table offset {table_offset} is past the end of the {source_len}-byte source"
        )));
    }

    let table_size = (header.file_count as usize)
        .checked_mul(DESCRIPTOR_SIZE)
        .filter(|&size| size <= MAX_TABLE_SIZE)
        .ok_or_else(|| {
            Error::CorruptHeader(format!("implausible entry count {}", header.file_count))
        })?;

    // Compressed tables are checked after decompression.
    if layout.table_codec == crate::format::Codec::None && table_offset + table_size > source_len {
        return Err(Error::CorruptHeader(format!(
            "entry table of {} entries ({table_size} bytes) at offset {table_offset} overruns the {source_len}-byte source",
            header.file_count
        )));
    }

    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(file_count: u32, metadata_offset: u32, version: u32) -> Vec<u8> {
        RawHeader {
            file_count,
            metadata_offset,
            version,
        }
        .as_bytes()
        .to_vec()
    }

    #[test]
    fn test_parse_v1() {
        let mut data = header_bytes(1, 12, 1);
        data.resize(12 + DESCRIPTOR_SIZE, 0);

        let header = parse_header(&mut BinaryReader::new(&data)).unwrap();
        assert_eq!(header.version, ArkVersion::V1);
        assert_eq!(header.file_count, 1);
        assert_eq!(header.data_offset(), 12);
        assert!(header.reserved.is_empty());
    }

    #[test]
    fn test_parse_v3_keeps_reserved_bytes() {
        let mut data = header_bytes(0, 32, 3);
        data.extend(1..=20u8);

        let mut reader = BinaryReader::new(&data);
        let header = parse_header(&mut reader).unwrap();
        assert_eq!(header.version, ArkVersion::V3);
        assert_eq!(header.reserved, (1..=20u8).collect::<Vec<_>>());
        assert_eq!(reader.position(), 32);
    }

    #[test]
    fn test_short_source_is_invalid_format() {
        let err = parse_header(&mut BinaryReader::new(&[1, 0, 0])).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_implausible_version_is_invalid_format() {
        let data = b"<?xml version=\"1.0\"?>";
        let err = parse_header(&mut BinaryReader::new(data)).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_unknown_version() {
        let data = header_bytes(0, 12, 2);
        let err = parse_header(&mut BinaryReader::new(&data)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(2)));
    }

    #[test]
    fn test_truncated_v3_reserved() {
        let mut data = header_bytes(0, 32, 3);
        data.extend([0u8; 10]);
        let err = parse_header(&mut BinaryReader::new(&data)).unwrap_err();
        assert!(matches!(err, Error::CorruptHeader(_)));
    }

    #[test]
    fn test_table_offset_past_end() {
        let data = header_bytes(1, 4096, 1);
        let err = parse_header(&mut BinaryReader::new(&data)).unwrap_err();
        assert!(matches!(err, Error::CorruptHeader(_)));
    }

    #[test]
    fn test_table_offset_inside_header() {
        let mut data = header_bytes(0, 4, 1);
        data.resize(64, 0);
        let err = parse_header(&mut BinaryReader::new(&data)).unwrap_err();
        assert!(matches!(err, Error::CorruptHeader(_)));
    }

    #[test]
    fn test_v1_table_overrun() {
        let mut data = header_bytes(2, 12, 1);
        data.resize(12 + DESCRIPTOR_SIZE, 0);
        let err = parse_header(&mut BinaryReader::new(&data)).unwrap_err();
        assert!(matches!(err, Error::CorruptHeader(_)));
    }
}
