//! Ark archive reader.
//!
//! Opening an archive parses the header and the whole entry table up front.
//! Payloads are decoded on demand and never cached here; wrap the archive in
//! [`CachedArchive`](crate::CachedArchive) for that.

use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use lunark_common::{BinaryReader, TextEncoding};
use memmap2::Mmap;

use crate::extract;
use crate::format::{ArkVersion, NAME_ENCODING};
use crate::header::parse_header;
use crate::table::decode_entries;
use crate::{ArkDirectory, ArkEntry, ArkHeader, Error, Result};

/// Options controlling how an archive is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Verify recorded MD5 checksums on extraction.
    pub verify_checksums: bool,
    /// Encoding used to decode entry names.
    pub name_encoding: TextEncoding,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            verify_checksums: true,
            name_encoding: NAME_ENCODING,
        }
    }
}

/// The archive bytes, mapped from disk or owned.
enum Source {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for Source {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        match self {
            Self::Mapped(mmap) => &mmap[..],
            Self::Owned(bytes) => &bytes[..],
        }
    }
}

/// A read-only ark archive.
pub struct ArkArchive {
    /// Archive bytes
    source: Source,
    /// Archive file name
    name: String,
    header: ArkHeader,
    directory: ArkDirectory,
    options: ReadOptions,
}

impl ArkArchive {
    /// Open an ark archive from disk with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ReadOptions::default())
    }

    /// Open an ark archive from disk.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Self::from_source(Source::Mapped(mmap), name, options)
    }

    /// Open an archive held in memory with default options.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with_options(bytes, ReadOptions::default())
    }

    /// Open an archive held in memory.
    pub fn from_bytes_with_options(bytes: Vec<u8>, options: ReadOptions) -> Result<Self> {
        Self::from_source(Source::Owned(bytes), "memory".to_string(), options)
    }

    fn from_source(source: Source, name: String, options: ReadOptions) -> Result<Self> {
        let mut reader = BinaryReader::new(&source);
        let header = parse_header(&mut reader)?;
        let directory = decode_entries(&mut reader, &header, options.name_encoding)?;

        tracing::debug!(
            archive = %name,
            version = %header.version,
            entries = directory.len(),
            duplicates = directory.duplicate_count(),
            "opened ark archive"
        );

        Ok(Self {
            source,
            name,
            header,
            directory,
            options,
        })
    }

    /// Get the archive name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the parsed header.
    #[inline]
    pub fn header(&self) -> &ArkHeader {
        &self.header
    }

    #[inline]
    pub fn version(&self) -> ArkVersion {
        self.header.version
    }

    /// Get the options the archive was opened with.
    #[inline]
    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Get the entry directory.
    #[inline]
    pub fn directory(&self) -> &ArkDirectory {
        &self.directory
    }

    /// Size of the underlying source in bytes.
    #[inline]
    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    /// Get the number of entries.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.directory.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// Entry names in on-disk order.
    pub fn list(&self) -> Vec<&str> {
        self.directory.names()
    }

    /// Iterate over entries in on-disk order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, ArkEntry> {
        self.directory.iter()
    }

    /// Look up an entry by exact name. Duplicates resolve to the first one.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&ArkEntry> {
        self.directory.get(name)
    }

    /// Get entry by index.
    #[inline]
    pub fn get_index(&self, index: usize) -> Option<&ArkEntry> {
        self.directory.get_index(index)
    }

    /// Find an entry by name (case-insensitive).
    #[inline]
    pub fn find(&self, name: &str) -> Option<&ArkEntry> {
        self.directory.find(name)
    }

    /// Number of entries shadowed by an earlier entry of the same name.
    #[inline]
    pub fn duplicate_count(&self) -> usize {
        self.directory.duplicate_count()
    }

    /// Read entry contents by name.
    pub fn extract(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .get(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        self.extract_entry(entry)
    }

    /// Read entry by index.
    pub fn extract_index(&self, index: usize) -> Result<Vec<u8>> {
        let entry = self
            .get_index(index)
            .ok_or_else(|| Error::EntryNotFound(format!("#{index}")))?;
        self.extract_entry(entry)
    }

    /// Read entry contents - handles decryption, decompression and verification.
    pub fn extract_entry(&self, entry: &ArkEntry) -> Result<Vec<u8>> {
        extract::extract(
            &self.source,
            self.header.layout(),
            entry,
            self.options.verify_checksums,
        )
    }

    /// Lazily extract every entry accepted by `predicate`, in on-disk order.
    ///
    /// A failing entry yields its error and iteration continues with the
    /// next one. Call again to start over.
    pub fn extract_all<F>(&self, predicate: F) -> ExtractAll<'_, F>
    where
        F: FnMut(&ArkEntry) -> bool,
    {
        ExtractAll {
            archive: self,
            entries: self.directory.iter(),
            predicate,
        }
    }

    /// Parallel extraction of multiple entries.
    #[cfg(feature = "parallel")]
    pub fn extract_parallel(&self, entries: &[&ArkEntry]) -> Vec<Result<Vec<u8>>> {
        use rayon::prelude::*;

        entries
            .par_iter()
            .map(|entry| self.extract_entry(entry))
            .collect()
    }
}

impl std::fmt::Debug for ArkArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArkArchive")
            .field("name", &self.name)
            .field("version", &self.header.version)
            .field("entries", &self.directory.len())
            .finish()
    }
}

impl<'a> IntoIterator for &'a ArkArchive {
    type Item = &'a ArkEntry;
    type IntoIter = std::slice::Iter<'a, ArkEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`ArkArchive::extract_all`].
pub struct ExtractAll<'a, F> {
    archive: &'a ArkArchive,
    entries: std::slice::Iter<'a, ArkEntry>,
    predicate: F,
}

impl<'a, F> Iterator for ExtractAll<'a, F>
where
    F: FnMut(&ArkEntry) -> bool,
{
    type Item = (&'a ArkEntry, Result<Vec<u8>>);

    fn next(&mut self) -> Option<Self::Item> {
        let predicate = &mut self.predicate;
        let entry = self.entries.find(|e| predicate(*e))?;
        let result = self.archive.extract_entry(entry);
        if let Err(e) = &result {
            tracing::warn!(name = entry.name(), error = %e, "failed to extract entry");
        }
        Some((entry, result))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.entries.len()))
    }
}
