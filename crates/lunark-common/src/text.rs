//! Best-effort decoding of legacy single-byte text.
//!
//! Archive names are stored as raw bytes with no declared encoding. Decoding
//! never fails: undecodable bytes become U+FFFD and the raw bytes are kept so
//! the original name can always be recovered.

use std::borrow::Cow;
use std::fmt;

/// Encodings a [`LegacyString`] can be decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// 7-bit ASCII. Bytes above 0x7F decode to U+FFFD.
    Ascii,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    /// Windows-1252, the usual legacy encoding of Western tooling.
    #[default]
    Windows1252,
    /// UTF-8, with invalid sequences replaced.
    Utf8,
}

impl TextEncoding {
    /// Decode `bytes`, returning the text and whether any byte was replaced.
    pub fn decode<'a>(self, bytes: &'a [u8]) -> (Cow<'a, str>, bool) {
        match self {
            Self::Ascii => match std::str::from_utf8(bytes) {
                Ok(s) if bytes.is_ascii() => (Cow::Borrowed(s), false),
                _ => {
                    let text = bytes
                        .iter()
                        .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
                        .collect();
                    (Cow::Owned(text), true)
                }
            },
            Self::Latin1 => match std::str::from_utf8(bytes) {
                Ok(s) if bytes.is_ascii() => (Cow::Borrowed(s), false),
                _ => (Cow::Owned(bytes.iter().map(|&b| b as char).collect()), false),
            },
            Self::Windows1252 => {
                let (text, had_errors) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
                (text, had_errors)
            }
            Self::Utf8 => {
                let text = String::from_utf8_lossy(bytes);
                let lossy = matches!(text, Cow::Owned(_));
                (text, lossy)
            }
        }
    }
}

/// A string read from a binary source: the raw bytes plus decoded text.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegacyString {
    raw: Vec<u8>,
    text: String,
    lossy: bool,
}

impl LegacyString {
    /// Decode `raw` with `encoding`. Never fails.
    pub fn decode(raw: &[u8], encoding: TextEncoding) -> Self {
        let (text, lossy) = encoding.decode(raw);
        Self {
            raw: raw.to_vec(),
            text: text.into_owned(),
            lossy,
        }
    }

    /// Decode a NUL-padded fixed-width field, keeping the bytes before the
    /// first NUL.
    pub fn from_nul_padded(field: &[u8], encoding: TextEncoding) -> Self {
        let end = memchr::memchr(0, field).unwrap_or(field.len());
        Self::decode(&field[..end], encoding)
    }

    /// The bytes exactly as stored.
    #[inline]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The decoded text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether decoding replaced any byte.
    #[inline]
    pub fn is_lossy(&self) -> bool {
        self.lossy
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Debug for LegacyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.text, f)
    }
}

impl fmt::Display for LegacyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for LegacyString {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
