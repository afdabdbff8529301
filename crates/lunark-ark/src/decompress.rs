//! Decompression utilities for ark archives.
//!
//! Output is always bounded by the size recorded in the archive: the decoder
//! stops one byte past the expected size so oversized output is detectable
//! without decoding all of it.

use std::io::{self, Read};

use flate2::read::ZlibDecoder;
use thiserror::Error;

use crate::format::Codec;

/// Largest buffer reserved up front, regardless of the recorded size.
const MAX_PREALLOCATION: usize = 16 << 20;

/// Smallest and largest Zstandard window accepted, as log2 of the byte size.
const MIN_WINDOW_LOG: u32 = 10;
const MAX_WINDOW_LOG: u32 = 27;

/// A codec stream that failed part way through.
#[derive(Debug, Error)]
#[error("codec stream failed after {decoded} bytes: {source}")]
pub struct DecodeError {
    /// Bytes of output produced before the failure.
    pub decoded: usize,
    pub source: io::Error,
}

impl DecodeError {
    fn before_output(source: io::Error) -> Self {
        Self { decoded: 0, source }
    }
}

pub type DecodeResult = std::result::Result<Vec<u8>, DecodeError>;

fn read_bounded<R: Read>(decoder: R, expected_size: usize) -> DecodeResult {
    let mut output = Vec::with_capacity(expected_size.min(MAX_PREALLOCATION));
    // read_to_end keeps whatever was decoded before an error.
    match decoder
        .take(expected_size as u64 + 1)
        .read_to_end(&mut output)
    {
        Ok(_) => Ok(output),
        Err(source) => Err(DecodeError {
            decoded: output.len(),
            source,
        }),
    }
}

/// log2 of the smallest window that can hold `expected_size` bytes.
fn window_log(expected_size: usize) -> u32 {
    let log = usize::BITS - expected_size.saturating_sub(1).leading_zeros();
    log.clamp(MIN_WINDOW_LOG, MAX_WINDOW_LOG)
}

/// Decompress a single Zstandard frame, reading at most `expected_size + 1`
/// bytes of output. Trailing bytes after the frame are ignored.
///
/// Frames asking for a window larger than `expected_size` needs are rejected
/// before the decoder allocates it.
pub fn decompress_zstd_bounded(data: &[u8], expected_size: usize) -> DecodeResult {
    let mut decoder = zstd::Decoder::new(data).map_err(DecodeError::before_output)?;
    decoder
        .window_log_max(window_log(expected_size))
        .map_err(DecodeError::before_output)?;
    read_bounded(decoder.single_frame(), expected_size)
}

/// Decompress a zlib stream, reading at most `expected_size + 1` bytes of
/// output.
pub fn decompress_zlib_bounded(data: &[u8], expected_size: usize) -> DecodeResult {
    read_bounded(ZlibDecoder::new(data), expected_size)
}

/// Decompress `data` with `codec`.
pub fn decompress(codec: Codec, data: &[u8], expected_size: usize) -> DecodeResult {
    match codec {
        Codec::None => Ok(data.to_vec()),
        Codec::Zlib => decompress_zlib_bounded(data, expected_size),
        Codec::Zstd => decompress_zstd_bounded(data, expected_size),
    }
}
