//! Format constants for ark archives.
//!
//! Every layout detail the reader depends on lives here: header sizes,
//! descriptor size, the supported versions and the cipher parameters.

use lunark_common::TextEncoding;

/// Size of the header fields shared by every version.
pub const BASE_HEADER_SIZE: usize = 12;

/// Size of one entry descriptor in the decoded table.
pub const DESCRIPTOR_SIZE: usize = 296;

/// Width of the NUL-padded file name and path name fields.
pub const NAME_FIELD_SIZE: usize = 128;

/// Version words above this are not treated as an ark header at all.
pub const MAX_PLAUSIBLE_VERSION: u32 = 0xFF;

/// Upper bound on the decoded entry table.
pub const MAX_TABLE_SIZE: usize = 256 << 20;

/// Default encoding of entry names.
pub const NAME_ENCODING: TextEncoding = TextEncoding::Windows1252;

/// XXTEA key shared by the entry table and encrypted payloads.
pub const XXTEA_KEY: [u32; 4] = [0x3d5b_2a34, 0x923f_ff10, 0x00e3_46a4, 0x0c74_902b];

/// XXTEA round constant.
pub const XXTEA_DELTA: u32 = 0x9e37_79b9;

/// Codec applied to a region of the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// No compression.
    None,
    /// zlib-wrapped DEFLATE.
    Zlib,
    /// Zstandard frame.
    Zstd,
}

/// Per-version layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatLayout {
    /// Total header size, base fields plus reserved bytes.
    pub header_size: usize,
    /// Bytes following the base fields whose meaning is unknown.
    pub reserved_size: usize,
    /// Codec of the (decrypted) entry table.
    pub table_codec: Codec,
    /// Codec of compressed payloads.
    pub payload_codec: Codec,
}

const LAYOUT_V1: FormatLayout = FormatLayout {
    header_size: BASE_HEADER_SIZE,
    reserved_size: 0,
    table_codec: Codec::None,
    payload_codec: Codec::Zlib,
};

const LAYOUT_V3: FormatLayout = FormatLayout {
    header_size: BASE_HEADER_SIZE + 20,
    reserved_size: 20,
    table_codec: Codec::Zstd,
    payload_codec: Codec::Zstd,
};

/// Supported archive versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ArkVersion {
    /// Plain table, zlib payloads.
    V1 = 1,
    /// Zstandard table and payloads, 20 reserved header bytes.
    V3 = 3,
}

impl ArkVersion {
    /// The layout selected by this version.
    pub const fn layout(self) -> &'static FormatLayout {
        match self {
            Self::V1 => &LAYOUT_V1,
            Self::V3 => &LAYOUT_V3,
        }
    }

    /// The version word as stored on disk.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for ArkVersion {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            3 => Ok(Self::V3),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for ArkVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.as_u32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_dispatch() {
        assert_eq!(ArkVersion::try_from(1), Ok(ArkVersion::V1));
        assert_eq!(ArkVersion::try_from(3), Ok(ArkVersion::V3));
        assert_eq!(ArkVersion::try_from(2), Err(2));
    }

    #[test]
    fn test_layouts() {
        assert_eq!(ArkVersion::V1.layout().header_size, 12);
        assert_eq!(ArkVersion::V3.layout().header_size, 32);
        assert_eq!(ArkVersion::V3.layout().payload_codec, Codec::Zstd);
    }

    #[test]
    fn test_descriptor_size_matches_fields() {
        assert_eq!(DESCRIPTOR_SIZE, 2 * NAME_FIELD_SIZE + 5 * 4 + 16 + 4);
    }
}
