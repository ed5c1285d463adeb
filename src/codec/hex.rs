// Upper-case hexadecimal encoding/decoding
// The modem only ever emits and accepts 0-9 and A-F, so lower-case input is rejected

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexError {
    #[error("Invalid hex digit {byte:#04x} at position {position}")]
    InvalidDigit { position: usize, byte: u8 },

    #[error("Hex string has odd length: {0}")]
    OddLength(usize),

    #[error("Output buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, HexError>;

/// Digit table, indexed by nibble value
const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Convert a single ASCII digit to its nibble value
/// Returns None for anything outside 0-9 / A-F
fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Encode one byte as two upper-case hex digits, high nibble first
/// Example: 0x3C -> [b'3', b'C']
pub fn encode_byte(byte: u8) -> [u8; 2] {
    [DIGITS[(byte >> 4) as usize], DIGITS[(byte & 0x0F) as usize]]
}

/// Encode `bytes` into `out` as upper-case hex
///
/// Returns the number of characters written (always `2 * bytes.len()`).
pub fn encode(bytes: &[u8], out: &mut [u8]) -> Result<usize> {
    let needed = bytes.len() * 2;
    if out.len() < needed {
        return Err(HexError::BufferTooSmall {
            needed,
            available: out.len(),
        });
    }

    for (i, &byte) in bytes.iter().enumerate() {
        let [hi, lo] = encode_byte(byte);
        out[i * 2] = hi;
        out[i * 2 + 1] = lo;
    }

    Ok(needed)
}

/// Encode bytes into an owned String
pub fn encode_to_string(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        let [hi, lo] = encode_byte(byte);
        s.push(hi as char);
        s.push(lo as char);
    }
    s
}

/// Decode a pair of hex digits into one byte
///
/// `position` is only used for error reporting and should be the offset of
/// `hi` within the string being decoded.
pub fn decode_pair_at(hi: u8, lo: u8, position: usize) -> Result<u8> {
    let h = nibble(hi).ok_or(HexError::InvalidDigit { position, byte: hi })?;
    let l = nibble(lo).ok_or(HexError::InvalidDigit {
        position: position + 1,
        byte: lo,
    })?;
    Ok((h << 4) | l)
}

/// Decode a pair of hex digits into one byte
/// Example: (b'E', b'A') -> 0xEA
pub fn decode_pair(hi: u8, lo: u8) -> Result<u8> {
    decode_pair_at(hi, lo, 0)
}

/// Decode an upper-case hex string into `out`
///
/// Returns the number of bytes written. Nothing is guaranteed about the
/// contents of `out` when an error is returned.
pub fn decode(ascii: &[u8], out: &mut [u8]) -> Result<usize> {
    if ascii.len() % 2 != 0 {
        return Err(HexError::OddLength(ascii.len()));
    }

    let needed = ascii.len() / 2;
    if out.len() < needed {
        return Err(HexError::BufferTooSmall {
            needed,
            available: out.len(),
        });
    }

    for (i, pair) in ascii.chunks_exact(2).enumerate() {
        out[i] = decode_pair_at(pair[0], pair[1], i * 2)?;
    }

    Ok(needed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_values() {
        let mut out = [0u8; 8];
        let n = encode(&[0x12, 0x34, 0xAB, 0x0F], &mut out).unwrap();
        assert_eq!(n, 8);
        assert_eq!(&out, b"1234AB0F");

        assert_eq!(encode_to_string(&[0x00, 0xFF, 0xEA]), "00FFEA");
        assert_eq!(encode_byte(0x3C), [b'3', b'C']);
    }

    #[test]
    fn test_encode_output_is_upper_hex() {
        let bytes: Vec<u8> = (0..=255).collect();
        let s = encode_to_string(&bytes);
        assert_eq!(s.len(), 512);
        assert!(s.bytes().all(|c| c.is_ascii_digit() || (b'A'..=b'F').contains(&c)));
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut out = [0u8; 3];
        assert_eq!(
            encode(&[0x01, 0x02], &mut out),
            Err(HexError::BufferTooSmall {
                needed: 4,
                available: 3
            })
        );
    }

    #[test]
    fn test_decode_all_bytes() {
        let bytes: Vec<u8> = (0..=255).collect();
        let s = encode_to_string(&bytes);
        let mut out = [0u8; 256];
        assert_eq!(decode(s.as_bytes(), &mut out).unwrap(), 256);
        assert_eq!(&out[..], &bytes[..]);
    }

    #[test]
    fn test_decode_rejects_lower_case() {
        let mut out = [0u8; 1];
        assert_eq!(
            decode(b"ab", &mut out),
            Err(HexError::InvalidDigit {
                position: 0,
                byte: b'a'
            })
        );
    }

    #[test]
    fn test_decode_rejects_out_of_range() {
        // Characters just past the digit and letter ranges
        for bad in [b':', b'G', b'/', b'@', b' ', b','] {
            assert!(decode_pair(b'1', bad).is_err(), "accepted {:?}", bad as char);
        }

        let mut out = [0u8; 2];
        assert_eq!(
            decode(b"12G4", &mut out),
            Err(HexError::InvalidDigit {
                position: 2,
                byte: b'G'
            })
        );
    }

    #[test]
    fn test_decode_odd_length() {
        let mut out = [0u8; 4];
        assert_eq!(decode(b"123", &mut out), Err(HexError::OddLength(3)));
    }

    #[test]
    fn test_decode_pair() {
        assert_eq!(decode_pair(b'E', b'A').unwrap(), 0xEA);
        assert_eq!(decode_pair(b'0', b'0').unwrap(), 0x00);
        assert_eq!(decode_pair(b'F', b'F').unwrap(), 0xFF);
    }
}
