//! Synthetic archive builder for tests.

use std::io::Write;
use std::ops::Range;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use zerocopy::IntoBytes;

use crate::crypto;
use crate::format::{ArkVersion, Codec, NAME_FIELD_SIZE, XXTEA_KEY};
use crate::header::RawHeader;
use crate::table::RawEntry;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Md5Mode {
    Correct,
    Absent,
    Wrong,
}

pub struct BuilderEntry {
    path_name: Vec<u8>,
    file_name: Vec<u8>,
    data: Vec<u8>,
    compress: bool,
    encrypt: bool,
    md5: Md5Mode,
    location: Option<u32>,
    original_size: Option<u32>,
    encrypted_size: Option<u32>,
}

impl BuilderEntry {
    pub fn new(name: &str, data: Vec<u8>) -> Self {
        let (path, file) = name.rsplit_once('/').unwrap_or(("", name));
        Self::new_raw(path.as_bytes(), file.as_bytes(), data)
    }

    pub fn new_raw(path_name: &[u8], file_name: &[u8], data: Vec<u8>) -> Self {
        Self {
            path_name: path_name.to_vec(),
            file_name: file_name.to_vec(),
            data,
            compress: true,
            encrypt: false,
            md5: Md5Mode::Correct,
            location: None,
            original_size: None,
            encrypted_size: None,
        }
    }

    pub fn stored(mut self) -> Self {
        self.compress = false;
        self
    }

    pub fn encrypted(mut self) -> Self {
        self.encrypt = true;
        self
    }

    pub fn without_md5(mut self) -> Self {
        self.md5 = Md5Mode::Absent;
        self
    }

    pub fn with_wrong_md5(mut self) -> Self {
        self.md5 = Md5Mode::Wrong;
        self
    }

    pub fn with_location(mut self, location: u32) -> Self {
        self.location = Some(location);
        self
    }

    /// Record `size` as the original size. Stored entries record it as the
    /// compressed size too, so they stay stored.
    pub fn with_original_size(mut self, size: u32) -> Self {
        self.original_size = Some(size);
        self
    }

    /// Record `size` as the encrypted size without changing the payload.
    pub fn with_encrypted_size(mut self, size: u32) -> Self {
        self.encrypted_size = Some(size);
        self
    }
}

pub struct BuiltArk {
    pub bytes: Vec<u8>,
    /// Byte range of each payload, in entry order.
    pub payloads: Vec<Range<usize>>,
    pub table_offset: usize,
}

pub struct ArkBuilder {
    version: ArkVersion,
    entries: Vec<BuilderEntry>,
}

impl ArkBuilder {
    pub fn new(version: ArkVersion) -> Self {
        Self {
            version,
            entries: Vec::new(),
        }
    }

    pub fn entry(mut self, entry: BuilderEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn build(self) -> BuiltArk {
        let layout = self.version.layout();
        let mut bytes = vec![0u8; layout.header_size];
        for (i, b) in bytes[12..].iter_mut().enumerate() {
            *b = i as u8 + 1;
        }

        let mut payloads = Vec::new();
        let mut table = Vec::new();

        for entry in &self.entries {
            let mut payload = if entry.compress {
                compress(layout.payload_codec, &entry.data)
            } else {
                entry.data.clone()
            };
            assert!(
                !entry.compress || payload.len() != entry.data.len(),
                "compressed payload must differ in size from the original"
            );
            let original_size = entry.original_size.unwrap_or(entry.data.len() as u32);
            let compressed_size = match entry.original_size {
                Some(size) if !entry.compress => size,
                _ => payload.len() as u32,
            };

            let encrypted_size = if entry.encrypt {
                payload = crypto::encrypt(&payload, &XXTEA_KEY);
                entry.encrypted_size.unwrap_or(payload.len() as u32)
            } else {
                0
            };

            let location = bytes.len();
            bytes.extend_from_slice(&payload);
            payloads.push(location..bytes.len());

            let md5 = match entry.md5 {
                Md5Mode::Correct => md5::compute(&entry.data).0,
                Md5Mode::Absent => [0; 16],
                Md5Mode::Wrong => [0x5a; 16],
            };

            let raw = RawEntry {
                file_name: name_field(&entry.file_name),
                path_name: name_field(&entry.path_name),
                file_location: entry.location.unwrap_or(location as u32),
                original_size,
                compressed_size,
                encrypted_size,
                timestamp: 1_500_000_000,
                md5,
                priority: 0,
            };
            table.extend_from_slice(raw.as_bytes());
        }

        let table_offset = bytes.len();
        let table = match layout.table_codec {
            Codec::None => table,
            codec => compress(codec, &table),
        };
        bytes.extend_from_slice(&crypto::encrypt(&table, &XXTEA_KEY));

        let header = RawHeader {
            file_count: self.entries.len() as u32,
            metadata_offset: table_offset as u32,
            version: self.version.as_u32(),
        };
        bytes[..12].copy_from_slice(header.as_bytes());

        BuiltArk {
            bytes,
            payloads,
            table_offset,
        }
    }
}

fn name_field(name: &[u8]) -> [u8; NAME_FIELD_SIZE] {
    let mut field = [0u8; NAME_FIELD_SIZE];
    field[..name.len()].copy_from_slice(name);
    field
}

fn compress(codec: Codec, data: &[u8]) -> Vec<u8> {
    match codec {
        Codec::None => data.to_vec(),
        Codec::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }
        Codec::Zstd => zstd::bulk::compress(data, 9).unwrap(),
    }
}
