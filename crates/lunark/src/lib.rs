//! Lunark - ark archive extraction library.
//!
//! This crate provides a unified interface to the Lunark crates:
//!
//! - [`lunark_common`] - Common utilities (binary reading, legacy text)
//! - [`lunark_ark`] - Ark archive reading (XXTEA + zlib/Zstd + MD5)
//!
//! # Example
//!
//! ```no_run
//! use lunark::prelude::*;
//!
//! let archive = ArkArchive::open("ponies.ark")?;
//!
//! if let Some(entry) = archive.find("gameobjectdata.xml") {
//!     let data = archive.extract_entry(entry)?;
//!     println!("{}: {} bytes", entry.name(), data.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use lunark_ark as ark;
pub use lunark_common as common;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use lunark_ark::{ArkArchive, ArkEntry, ArkVersion, CachedArchive, ReadOptions};
    pub use lunark_common::{BinaryReader, LegacyString, TextEncoding};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
