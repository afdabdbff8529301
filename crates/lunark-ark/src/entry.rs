//! Ark archive entry.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use lunark_common::LegacyString;

/// An entry (file) within an ark archive.
///
/// This contains metadata about the file, not the file data itself.
/// Use [`ArkArchive::extract_entry`](crate::ArkArchive::extract_entry) to get
/// the actual file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArkEntry {
    /// Position in the on-disk table.
    index: usize,
    /// Full path, `path_name` joined with `file_name`.
    name: String,
    /// File name as stored.
    file_name: LegacyString,
    /// Directory as stored.
    path_name: LegacyString,
    /// Absolute payload offset.
    file_location: u32,
    /// Size after decompression.
    original_size: u32,
    /// Size of the compressed payload.
    compressed_size: u32,
    /// Size of the encrypted payload, 0 when not encrypted.
    encrypted_size: u32,
    /// Unix timestamp.
    timestamp: u32,
    /// MD5 of the decompressed payload.
    md5: Option<[u8; 16]>,
    /// Load priority.
    priority: u32,
}

impl ArkEntry {
    /// Create a new ark entry.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        index: usize,
        file_name: LegacyString,
        path_name: LegacyString,
        file_location: u32,
        original_size: u32,
        compressed_size: u32,
        encrypted_size: u32,
        timestamp: u32,
        md5: [u8; 16],
        priority: u32,
    ) -> Self {
        let name = join_path(path_name.as_str(), file_name.as_str());
        Self {
            index,
            name,
            file_name,
            path_name,
            file_location,
            original_size,
            compressed_size,
            encrypted_size,
            timestamp,
            md5: (md5 != [0u8; 16]).then_some(md5),
            priority,
        }
    }

    /// Position of this entry in the on-disk table.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the full path within the archive.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The file name field, raw and decoded.
    #[inline]
    pub fn file_name(&self) -> &LegacyString {
        &self.file_name
    }

    /// The path name field, raw and decoded.
    #[inline]
    pub fn path_name(&self) -> &LegacyString {
        &self.path_name
    }

    /// The full path as the original bytes.
    pub fn raw_name(&self) -> Vec<u8> {
        let dir = self.path_name.raw();
        let file = self.file_name.raw();
        let mut raw = Vec::with_capacity(dir.len() + file.len() + 1);
        raw.extend_from_slice(dir);
        if !dir.is_empty() && !dir.ends_with(b"/") {
            raw.push(b'/');
        }
        raw.extend_from_slice(file);
        raw
    }

    /// Whether decoding either name field replaced bytes.
    #[inline]
    pub fn has_lossy_name(&self) -> bool {
        self.file_name.is_lossy() || self.path_name.is_lossy()
    }

    /// Absolute offset of the payload.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.file_location as u64
    }

    /// Get the compressed size in bytes.
    #[inline]
    pub fn compressed_size(&self) -> u64 {
        self.compressed_size as u64
    }

    /// Get the uncompressed size in bytes.
    #[inline]
    pub fn uncompressed_size(&self) -> u64 {
        self.original_size as u64
    }

    /// Get the encrypted size in bytes, 0 when not encrypted.
    #[inline]
    pub fn encrypted_size(&self) -> u64 {
        self.encrypted_size as u64
    }

    /// Bytes the payload occupies in the archive.
    #[inline]
    pub fn stored_size(&self) -> u64 {
        if self.encrypted_size != 0 {
            self.encrypted_size as u64
        } else {
            self.compressed_size as u64
        }
    }

    /// Check if the entry is encrypted.
    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.encrypted_size != 0
    }

    /// Check if the payload is stored without compression.
    #[inline]
    pub fn is_stored(&self) -> bool {
        self.compressed_size == self.original_size
    }

    /// Get the MD5 of the uncompressed data, if recorded.
    #[inline]
    pub fn md5(&self) -> Option<&[u8; 16]> {
        self.md5.as_ref()
    }

    /// Get the load priority.
    #[inline]
    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Get the raw Unix timestamp.
    #[inline]
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Get the last modification time as a SystemTime.
    ///
    /// Returns None if no timestamp was recorded.
    pub fn last_modified(&self) -> Option<SystemTime> {
        if self.timestamp == 0 {
            return None;
        }
        UNIX_EPOCH.checked_add(Duration::from_secs(self.timestamp as u64))
    }

    /// Get the relative output path for extraction.
    ///
    /// Leading separators and `..` components are dropped so the path always
    /// stays inside the extraction directory.
    pub fn output_path(&self) -> PathBuf {
        self.name
            .split(['/', '\\'])
            .filter(|part| !part.is_empty() && *part != "." && *part != "..")
            .collect()
    }

    /// Get the file extension, if any.
    pub fn extension(&self) -> Option<&str> {
        Path::new(self.file_name.as_str())
            .extension()
            .and_then(|ext| ext.to_str())
    }
}

/// Join a directory and file name with `/`.
fn join_path(dir: &str, file: &str) -> String {
    if dir.is_empty() {
        file.to_string()
    } else if dir.ends_with('/') {
        format!("{dir}{file}")
    } else {
        format!("{dir}/{file}")
    }
}
