//! Ark archive reader for a mobile game's resource containers.
//!
//! An ark file is a flat container of named resources. It supports:
//!
//! - Two header versions (1 and 3) selecting the table and payload codecs
//! - An XXTEA-encrypted entry table, Zstandard-compressed in version 3
//! - zlib (version 1) or Zstandard (version 3) compressed payloads
//! - Optional per-entry XXTEA encryption
//! - MD5 checksums of the uncompressed data
//!
//! The header and entry table are parsed and validated when the archive is
//! opened. Payloads are decoded lazily and independently, so one corrupt
//! entry never affects its siblings.
//!
//! # Example
//!
//! ```no_run
//! use lunark_ark::ArkArchive;
//!
//! let archive = ArkArchive::open("ponies.ark")?;
//!
//! for entry in archive.iter() {
//!     println!("{}: {} bytes", entry.name(), entry.uncompressed_size());
//! }
//!
//! let xml = archive.extract("gameobjectdata.xml")?;
//!
//! // Keep going past broken entries
//! for (entry, result) in archive.extract_all(|e| e.extension() == Some("png")) {
//!     match result {
//!         Ok(data) => println!("{}: {} bytes", entry.name(), data.len()),
//!         Err(e) => eprintln!("{}: {e}", entry.name()),
//!     }
//! }
//! # Ok::<(), lunark_ark::Error>(())
//! ```

mod archive;
mod cache;
mod crypto;
mod decompress;
mod directory;
mod entry;
mod error;
mod extract;
pub mod format;
mod header;
mod table;

#[cfg(test)]
mod testutil;

pub use archive::{ArkArchive, ExtractAll, ReadOptions};
pub use cache::CachedArchive;
pub use directory::ArkDirectory;
pub use entry::ArkEntry;
pub use error::{Error, Result};
pub use format::ArkVersion;
pub use header::{parse_header, ArkHeader, RawHeader};
pub use table::{decode_entries, RawEntry};
