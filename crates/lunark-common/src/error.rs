//! Error types for lunark-common.

use thiserror::Error;

/// Common error type for Lunark operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Fewer bytes remain than a read requested.
    #[error("truncated data: needed {needed} bytes but only {available} available")]
    TruncatedData { needed: usize, available: usize },

    /// A seek target lies outside the buffer.
    #[error("offset {offset} out of range for buffer of {len} bytes")]
    OutOfRange { offset: usize, len: usize },

    /// Unsupported integer width for a variable-width read.
    #[error("unsupported integer width: {0} bytes")]
    InvalidWidth(usize),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
