// Receive body validation and decoding
// Bodies are either packed ("12345678") or comma-separated ("12,34,56,78")

use super::payload::PayloadSize;
use super::{MAX_PAYLOAD_SIZE, PAIR_SEPARATOR};
use crate::codec::hex::{self, HexError};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Body length {actual} invalid: expected {packed} or {separated}")]
    LengthInvalid {
        packed: usize,
        separated: usize,
        actual: usize,
    },

    #[error("Body is not valid hex: {0}")]
    DataInvalid(#[from] HexError),

    #[error("Output buffer too small: need {needed} bytes, have {available}")]
    OutputTooSmall { needed: usize, available: usize },
}

/// Longest body the receiver will buffer for a payload of `size`
///
/// One character of slack over the comma-separated form, so a body that is
/// a single character too long is still reported as a length error rather
/// than an overrun.
pub const fn body_cap(size: PayloadSize) -> usize {
    size.separated_hex_len() + 1
}

/// Decode a received hex body into `out`
///
/// `out` must be at least `size` bytes long. It is only written once the whole
/// body has been validated, so a failed decode never leaves a partial payload.
pub fn decode_body(body: &[u8], size: PayloadSize, out: &mut [u8]) -> Result<(), DecodeError> {
    let n = size.get();
    if out.len() < n {
        return Err(DecodeError::OutputTooSmall {
            needed: n,
            available: out.len(),
        });
    }
    let packed = size.packed_hex_len();
    let separated = size.separated_hex_len();

    if body.len() != packed && body.len() != separated {
        return Err(DecodeError::LengthInvalid {
            packed,
            separated,
            actual: body.len(),
        });
    }
    let has_separators = n > 1 && body.len() == separated;

    let mut scratch = [0u8; MAX_PAYLOAD_SIZE];
    let mut pos = 0;
    for (i, slot) in scratch[..n].iter_mut().enumerate() {
        *slot = hex::decode_pair_at(body[pos], body[pos + 1], pos)?;
        pos += 2;

        if has_separators && i + 1 < n {
            if body[pos] != PAIR_SEPARATOR {
                return Err(HexError::InvalidDigit {
                    position: pos,
                    byte: body[pos],
                }
                .into());
            }
            pos += 1;
        }
    }

    out[..n].copy_from_slice(&scratch[..n]);
    Ok(())
}

/// Validate a body without keeping the decoded bytes
pub fn validate_body(body: &[u8], size: PayloadSize) -> Result<(), DecodeError> {
    let mut sink = [0u8; MAX_PAYLOAD_SIZE];
    decode_body(body, size, &mut sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::hex::encode_to_string;

    fn size(n: usize) -> PayloadSize {
        PayloadSize::new(n).unwrap()
    }

    #[test]
    fn test_decode_packed_and_separated() {
        let mut out = [0u8; 4];
        decode_body(b"12345678", size(4), &mut out).unwrap();
        assert_eq!(out, [0x12, 0x34, 0x56, 0x78]);

        let mut out = [0u8; 4];
        decode_body(b"12,34,56,78", size(4), &mut out).unwrap();
        assert_eq!(out, [0x12, 0x34, 0x56, 0x78]);

        let mut out = [0u8; 2];
        decode_body(b"0A,0B", size(2), &mut out).unwrap();
        assert_eq!(out, [0x0A, 0x0B]);
    }

    #[test]
    fn test_round_trip_all_sizes() {
        for n in 1..=MAX_PAYLOAD_SIZE {
            let payload: Vec<u8> = (0..n).map(|i| (i as u8).wrapping_mul(37) ^ 0xA5).collect();
            let packed = encode_to_string(&payload);
            let separated = payload
                .iter()
                .map(|b| encode_to_string(&[*b]))
                .collect::<Vec<_>>()
                .join(",");

            let mut out = vec![0u8; n];
            decode_body(packed.as_bytes(), size(n), &mut out).unwrap();
            assert_eq!(out, payload, "packed, size {}", n);

            let mut out = vec![0u8; n];
            decode_body(separated.as_bytes(), size(n), &mut out).unwrap();
            assert_eq!(out, payload, "separated, size {}", n);
        }
    }

    #[test]
    fn test_length_off_by_one() {
        let mut out = [0u8; 4];
        for body in [&b"1234567"[..], b"123456789", b"12,34,56,7", b"12,34,56,789"] {
            assert!(
                matches!(
                    decode_body(body, size(4), &mut out),
                    Err(DecodeError::LengthInvalid { .. })
                ),
                "accepted {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_lower_case_is_data_invalid() {
        let mut out = [0u8; 1];
        assert_eq!(
            decode_body(b"ab", size(1), &mut out),
            Err(DecodeError::DataInvalid(HexError::InvalidDigit {
                position: 0,
                byte: b'a'
            }))
        );
    }

    #[test]
    fn test_failed_decode_leaves_output_untouched() {
        let mut out = [0xEEu8; 4];
        assert!(decode_body(b"12,34,56,7G", size(4), &mut out).is_err());
        assert_eq!(out, [0xEE; 4]);
    }

    #[test]
    fn test_misplaced_separator() {
        let mut out = [0u8; 4];
        // Right length for the separated form, wrong layout
        let err = decode_body(b"123,456,78", size(4), &mut out);
        assert!(err.is_err());
        let err = decode_body(b"1234567,", size(4), &mut out);
        assert!(matches!(err, Err(DecodeError::DataInvalid(_))));
    }

    #[test]
    fn test_short_output_is_an_error() {
        let mut out = [0xEEu8; 2];
        assert_eq!(
            decode_body(b"12345678", size(4), &mut out),
            Err(DecodeError::OutputTooSmall {
                needed: 4,
                available: 2
            })
        );
        assert_eq!(out, [0xEE; 2]);

        // Longer output is fine; only the first `size` bytes are written
        let mut out = [0u8; 3];
        decode_body(b"0A", size(1), &mut out).unwrap();
        assert_eq!(out, [0x0A, 0, 0]);
    }

    #[test]
    fn test_validate_body() {
        assert!(validate_body(b"FF", size(1)).is_ok());
        assert!(validate_body(b"F", size(1)).is_err());
    }

    #[test]
    fn test_body_cap() {
        assert_eq!(body_cap(size(4)), 12);
        assert_eq!(body_cap(size(32)), 96);
    }
}
