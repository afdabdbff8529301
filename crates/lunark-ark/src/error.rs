//! Error types for the ark crate.

use thiserror::Error;

/// Errors that can occur when working with ark archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cursor error (truncated data or out-of-range seek).
    #[error(transparent)]
    Common(#[from] lunark_common::Error),

    /// The source is not an ark archive.
    #[error("not an ark archive: {0}")]
    InvalidFormat(String),

    /// The source looks like an ark archive but uses an unknown version.
    #[error("unsupported ark version: {0}")]
    UnsupportedVersion(u32),

    /// Header fields or the entry table are structurally invalid.
    #[error("corrupt header: {0}")]
    CorruptHeader(String),

    /// An entry descriptor is structurally invalid.
    #[error("corrupt entry #{index}: {reason}")]
    CorruptEntry { index: usize, reason: String },

    /// Decoded payload length differs from the recorded size.
    ///
    /// A codec stream that breaks part way through lands here too, with
    /// `actual` counting the bytes decoded before the break.
    #[error("size mismatch for {name}: expected {expected} bytes, got {actual}{}", codec_detail(.source))]
    SizeMismatch {
        name: String,
        expected: u64,
        actual: u64,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Decoded payload does not match its recorded MD5.
    #[error("checksum mismatch for {name}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// Entry not found.
    #[error("entry not found: {0}")]
    EntryNotFound(String),
}

impl Error {
    /// Whether the error concerns a single entry, leaving the rest of the
    /// archive usable.
    pub fn is_entry_scoped(&self) -> bool {
        matches!(
            self,
            Self::SizeMismatch { .. }
                | Self::ChecksumMismatch { .. }
                | Self::EntryNotFound(_)
        )
    }
}

fn codec_detail(source: &Option<std::io::Error>) -> String {
    source
        .as_ref()
        .map(|e| format!(" (codec: {e})"))
        .unwrap_or_default()
}

/// Result type for ark operations.
pub type Result<T> = std::result::Result<T, Error>;
