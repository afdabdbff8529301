//! Binary reader for zero-copy parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor that reads typed values
//! from a byte slice. Every read is bounds-checked and the position only
//! moves when a read succeeds.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use zerocopy::FromBytes;

use crate::{Error, LegacyString, Result, TextEncoding};

/// A binary reader that provides zero-copy reading from a byte slice.
///
/// # Example
///
/// ```
/// use lunark_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.read_u32().unwrap(), 0x08070605);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Create a new reader starting at a specific position.
    pub fn new_at(data: &'a [u8], position: usize) -> Result<Self> {
        let mut reader = Self::new(data);
        reader.seek(position)?;
        Ok(reader)
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Seek to an absolute position in `[0, len]`.
    #[inline]
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.data.len() {
            return Err(Error::OutOfRange {
                offset: position,
                len: self.data.len(),
            });
        }
        self.position = position;
        Ok(())
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::TruncatedData {
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read an unsigned integer of `width` bytes (1 to 8) in byte order `B`.
    pub fn read_uint<B: ByteOrder>(&mut self, width: usize) -> Result<u64> {
        if width == 0 || width > 8 {
            return Err(Error::InvalidWidth(width));
        }
        let bytes = self.peek_bytes(width)?;
        let value = B::read_uint(bytes, width);
        self.position += width;
        Ok(value)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_bytes(2).map(LittleEndian::read_u16)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_bytes(4).map(LittleEndian::read_u32)
    }

    /// Read a little-endian u64.
    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_bytes(8).map(LittleEndian::read_u64)
    }

    /// Read a big-endian u16.
    #[inline]
    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.read_bytes(2).map(BigEndian::read_u16)
    }

    /// Read a big-endian u32.
    #[inline]
    pub fn read_u32_be(&mut self) -> Result<u32> {
        self.read_bytes(4).map(BigEndian::read_u32)
    }

    /// Read a string from a fixed-size buffer, stopping at the first null.
    ///
    /// All `size` bytes are consumed. Only the bytes before the first null
    /// are decoded and kept as the raw value.
    pub fn read_fixed_string(&mut self, size: usize, encoding: TextEncoding) -> Result<LegacyString> {
        let bytes = self.read_bytes(size)?;
        Ok(LegacyString::from_nul_padded(bytes, encoding))
    }

    /// Read a string preceded by its byte length, stored as a `width`-byte
    /// integer in byte order `B`.
    ///
    /// On failure the position is left where it was before the length.
    pub fn read_length_prefixed_string<B: ByteOrder>(
        &mut self,
        width: usize,
        encoding: TextEncoding,
    ) -> Result<LegacyString> {
        let start = self.position;
        let length = self.read_uint::<B>(width)?;
        let length = usize::try_from(length).unwrap_or(usize::MAX);
        match self.read_bytes(length) {
            Ok(bytes) => Ok(LegacyString::decode(bytes, encoding)),
            Err(e) => {
                self.position = start;
                Err(e)
            }
        }
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.peek_bytes(size)?;
        let value = T::read_from_bytes(bytes).map_err(|_| Error::TruncatedData {
            needed: size,
            available: bytes.len(),
        })?;
        self.position += size;
        Ok(value)
    }

    /// Peek at a value without advancing.
    #[inline]
    pub fn peek_u32(&self) -> Result<u32> {
        self.peek_bytes(4).map(LittleEndian::read_u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x04030201
            0xFF, 0xFF, 0xFF, 0xFF, // u32: 0xFFFFFFFF
            0x7F, // u8
            0x34, 0x12, // u16: 0x1234
            0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, // u64
        ];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.read_u32().unwrap(), 0xFFFFFFFF);
        assert_eq!(reader.read_u8().unwrap(), 0x7F);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_u64().unwrap(), 0x0102030405060708);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_uint_both_orders() {
        let data = [0x01u8, 0x02, 0x03];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_uint::<LittleEndian>(3).unwrap(), 0x030201);

        reader.seek(0).unwrap();
        assert_eq!(reader.read_uint::<BigEndian>(3).unwrap(), 0x010203);
        assert!(matches!(
            reader.read_uint::<LittleEndian>(9),
            Err(Error::InvalidWidth(9))
        ));

        let data = [0x12u8, 0x34, 0x56, 0x78, 0x9A, 0xBC];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_u16_be().unwrap(), 0x1234);
        assert_eq!(reader.read_u32_be().unwrap(), 0x56789ABC);
        assert!(reader.read_u16_be().is_err());
    }

    #[test]
    fn test_fixed_string_consumes_whole_field() {
        let mut data = [0u8; 16];
        data[..5].copy_from_slice(b"hello");
        data[6] = b'x';
        let mut reader = BinaryReader::new(&data);

        let s = reader.read_fixed_string(16, TextEncoding::Ascii).unwrap();
        assert_eq!(s.as_str(), "hello");
        assert_eq!(s.raw(), b"hello");
        assert_eq!(reader.position(), 16);
    }

    #[test]
    fn test_fixed_string_without_terminator() {
        let mut reader = BinaryReader::new(b"abcd");
        let s = reader.read_fixed_string(4, TextEncoding::Ascii).unwrap();
        assert_eq!(s.as_str(), "abcd");
    }

    #[test]
    fn test_fixed_string_at_boundary() {
        let data = *b"name\0\0xy";
        let mut reader = BinaryReader::new(&data);
        reader.read_fixed_string(6, TextEncoding::Ascii).unwrap();

        let err = reader.read_fixed_string(6, TextEncoding::Ascii).unwrap_err();
        assert!(matches!(err, Error::TruncatedData { needed: 6, available: 2 }));
        assert_eq!(reader.position(), 6);

        let s = reader.read_fixed_string(2, TextEncoding::Ascii).unwrap();
        assert_eq!(s.as_str(), "xy");
        assert!(reader.is_empty());
    }

    #[test]
    fn test_new_at_past_end() {
        let data = [0u8; 8];
        assert!(matches!(
            BinaryReader::new_at(&data, 9),
            Err(Error::OutOfRange { offset: 9, len: 8 })
        ));

        let mut reader = BinaryReader::new_at(&data, 8).unwrap();
        assert!(matches!(
            reader.read_fixed_string(1, TextEncoding::Ascii),
            Err(Error::TruncatedData { needed: 1, available: 0 })
        ));
    }

    #[test]
    fn test_length_prefixed_string() {
        let data = [0x00u8, 0x03, b'a', b'b', b'c'];
        let mut reader = BinaryReader::new(&data);
        let s = reader
            .read_length_prefixed_string::<BigEndian>(2, TextEncoding::Utf8)
            .unwrap();
        assert_eq!(s.as_str(), "abc");
        assert!(reader.is_empty());
    }

    #[test]
    fn test_length_prefixed_string_truncated_restores_position() {
        let data = [0x09u8, b'a', b'b'];
        let mut reader = BinaryReader::new(&data);
        let err = reader
            .read_length_prefixed_string::<LittleEndian>(1, TextEncoding::Ascii)
            .unwrap_err();
        assert!(matches!(err, Error::TruncatedData { needed: 9, available: 2 }));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.peek_u32().unwrap(), 0x04030201);
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_truncated_read_does_not_advance() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert!(matches!(
            reader.read_u32(),
            Err(Error::TruncatedData { needed: 4, available: 2 })
        ));
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.remaining(), 2);
    }

    #[test]
    fn test_seek_bounds() {
        let data = [0u8; 4];
        let mut reader = BinaryReader::new(&data);

        assert!(reader.seek(4).is_ok());
        assert!(reader.is_empty());
        assert!(matches!(
            reader.seek(5),
            Err(Error::OutOfRange { offset: 5, len: 4 })
        ));
        assert_eq!(reader.position(), 4);
    }
}
