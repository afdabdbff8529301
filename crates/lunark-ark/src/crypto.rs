//! XXTEA decryption for ark tables and payloads.
//!
//! Data is processed as little-endian u32 words with a fixed 128-bit key.
//! The key is embedded in the game client and is not a secret.

use byteorder::{ByteOrder, LittleEndian};

use crate::format::XXTEA_DELTA;

#[inline]
fn mx(sum: u32, y: u32, z: u32, p: usize, e: u32, key: &[u32; 4]) -> u32 {
    (((z >> 5) ^ (y << 2)).wrapping_add((y >> 3) ^ (z << 4)))
        ^ ((sum ^ y).wrapping_add(key[(p & 3) ^ e as usize] ^ z))
}

/// Decrypt a block of words in place.
pub fn decrypt_words(v: &mut [u32], key: &[u32; 4]) {
    let n = v.len();
    if n == 0 {
        return;
    }

    let mut rounds = 6 + 52 / n as u32;
    let mut sum = rounds.wrapping_mul(XXTEA_DELTA);
    let mut y = v[0];

    while rounds > 0 {
        let e = (sum >> 2) & 3;
        for p in (1..n).rev() {
            let z = v[p - 1];
            v[p] = v[p].wrapping_sub(mx(sum, y, z, p, e, key));
            y = v[p];
        }
        let z = v[n - 1];
        v[0] = v[0].wrapping_sub(mx(sum, y, z, 0, e, key));
        y = v[0];
        sum = sum.wrapping_sub(XXTEA_DELTA);
        rounds -= 1;
    }
}

/// Decrypt data to a new buffer.
///
/// The data length must be a multiple of 4 bytes. The output has the same
/// length as the input; callers trim cipher padding themselves.
pub fn decrypt(data: &[u8], key: &[u32; 4]) -> Result<Vec<u8>, &'static str> {
    if data.len() % 4 != 0 {
        return Err("data length must be a multiple of 4 bytes");
    }

    let mut words = vec![0u32; data.len() / 4];
    LittleEndian::read_u32_into(data, &mut words);
    decrypt_words(&mut words, key);

    let mut out = vec![0u8; data.len()];
    LittleEndian::write_u32_into(&words, &mut out);
    Ok(out)
}

/// Encrypt data, zero-padding it to a multiple of 4 bytes.
#[cfg(test)]
pub(crate) fn encrypt(data: &[u8], key: &[u32; 4]) -> Vec<u8> {
    let mut padded = data.to_vec();
    padded.resize(data.len().div_ceil(4) * 4, 0);

    let mut v = vec![0u32; padded.len() / 4];
    LittleEndian::read_u32_into(&padded, &mut v);

    let n = v.len();
    if n > 0 {
        let mut rounds = 6 + 52 / n as u32;
        let mut sum = 0u32;
        let mut z = v[n - 1];
        while rounds > 0 {
            sum = sum.wrapping_add(XXTEA_DELTA);
            let e = (sum >> 2) & 3;
            for p in 0..n - 1 {
                let y = v[p + 1];
                v[p] = v[p].wrapping_add(mx(sum, y, z, p, e, key));
                z = v[p];
            }
            let y = v[0];
            v[n - 1] = v[n - 1].wrapping_add(mx(sum, y, z, n - 1, e, key));
            z = v[n - 1];
            rounds -= 1;
        }
    }

    LittleEndian::write_u32_into(&v, &mut padded);
    padded
}
