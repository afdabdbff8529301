//! Common utilities for Lunark.
//!
//! This crate provides the foundational pieces shared by the Lunark crates:
//!
//! - [`BinaryReader`] - Bounds-checked, zero-copy reading from byte slices
//! - [`LegacyString`] - Raw bytes plus best-effort decoded text
//! - [`TextEncoding`] - The encodings names and strings are decoded from

mod error;
mod reader;
mod text;

pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use text::{LegacyString, TextEncoding};

/// Re-export byteorder so callers can name an endianness for [`BinaryReader::read_uint`].
pub use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
