// Fixed-size payload records carried in a single frame
// Payload values are serialized explicitly (little-endian for numbers), never reinterpreted in place

use super::{MAX_PAYLOAD_SIZE, MIN_PAYLOAD_SIZE};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeError {
    #[error("Payload is empty")]
    Empty,

    #[error("Payload too large: {0} bytes (max 32)")]
    TooLarge(usize),
}

/// A validated payload size (1..=32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PayloadSize(usize);

impl PayloadSize {
    /// Validate a payload size known only at runtime
    pub const fn new(size: usize) -> Result<Self, SizeError> {
        if size < MIN_PAYLOAD_SIZE {
            Err(SizeError::Empty)
        } else if size > MAX_PAYLOAD_SIZE {
            Err(SizeError::TooLarge(size))
        } else {
            Ok(Self(size))
        }
    }

    /// Payload size checked at compile time
    pub const fn of<const N: usize>() -> Self {
        const {
            assert!(
                N >= MIN_PAYLOAD_SIZE && N <= MAX_PAYLOAD_SIZE,
                "payload size must be between 1 and 32 bytes"
            );
        }
        Self(N)
    }

    /// Size in bytes
    pub const fn get(self) -> usize {
        self.0
    }

    /// Length of the packed hex body ("12345678")
    pub const fn packed_hex_len(self) -> usize {
        self.0 * 2
    }

    /// Length of the comma-separated hex body ("12,34,56,78")
    pub const fn separated_hex_len(self) -> usize {
        self.0 * 3 - 1
    }
}

impl TryFrom<usize> for PayloadSize {
    type Error = SizeError;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl fmt::Display for PayloadSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes", self.0)
    }
}

/// A record that fits in one frame
///
/// Implementors describe their exact wire size and how to move to and from
/// bytes. `read_bytes` is only ever handed a slice of exactly `SIZE` bytes.
pub trait Payload: Sized {
    /// Encoded size of this record
    const SIZE: PayloadSize;

    /// Serialize into `out`, which is exactly `SIZE` bytes long
    fn write_bytes(&self, out: &mut [u8]);

    /// Deserialize from `bytes`, which is exactly `SIZE` bytes long
    fn read_bytes(bytes: &[u8]) -> Self;
}

impl<const N: usize> Payload for [u8; N] {
    const SIZE: PayloadSize = PayloadSize::of::<N>();

    fn write_bytes(&self, out: &mut [u8]) {
        out[..N].copy_from_slice(self);
    }

    fn read_bytes(bytes: &[u8]) -> Self {
        let mut value = [0u8; N];
        value.copy_from_slice(&bytes[..N]);
        value
    }
}

macro_rules! impl_le_payload {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Payload for $ty {
                const SIZE: PayloadSize = PayloadSize::of::<{ std::mem::size_of::<$ty>() }>();

                fn write_bytes(&self, out: &mut [u8]) {
                    let raw = self.to_le_bytes();
                    out[..raw.len()].copy_from_slice(&raw);
                }

                fn read_bytes(bytes: &[u8]) -> Self {
                    const LEN: usize = std::mem::size_of::<$ty>();
                    let mut raw = [0u8; LEN];
                    raw.copy_from_slice(&bytes[..LEN]);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_le_payload!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);
