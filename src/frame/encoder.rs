// Transmit frame construction: "TXDA " + HEX + "\r\n"

use super::payload::{PayloadSize, SizeError};
use super::{LINE_END, MAX_FRAME_SIZE, TX_PREFIX};
use crate::codec::hex;
use std::fmt;

/// Total wire length of a transmit frame for a payload of `size`
pub const fn frame_len(size: PayloadSize) -> usize {
    TX_PREFIX.len() + size.packed_hex_len() + LINE_END.len()
}

/// A fully built transmit frame held on the stack
#[derive(Clone, Copy)]
pub struct FrameBuffer {
    buf: [u8; MAX_FRAME_SIZE],
    len: usize,
}

impl FrameBuffer {
    /// The encoded frame, terminator included
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for FrameBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Frames are plain ASCII, show them escaped
        write!(f, "FrameBuffer(\"{}\")", self.as_bytes().escape_ascii())
    }
}

/// Build the transmit frame for `payload`
pub fn encode_frame(payload: &[u8]) -> Result<FrameBuffer, SizeError> {
    let size = PayloadSize::new(payload.len())?;
    let mut buf = [0u8; MAX_FRAME_SIZE];

    let mut pos = TX_PREFIX.len();
    buf[..pos].copy_from_slice(TX_PREFIX);

    let hex_len = size.packed_hex_len();
    for (i, &byte) in payload.iter().enumerate() {
        let [hi, lo] = hex::encode_byte(byte);
        buf[pos + i * 2] = hi;
        buf[pos + i * 2 + 1] = lo;
    }
    pos += hex_len;

    buf[pos..pos + LINE_END.len()].copy_from_slice(LINE_END);
    pos += LINE_END.len();

    debug_assert_eq!(pos, frame_len(size));
    Ok(FrameBuffer { buf, len: pos })
}
