// Receive line header: "NN,SSSS,RR" ahead of the ':' marker
// NN = relay node id, SSSS = sender id, RR = RSSI, all upper-case hex

use crate::codec::hex;
use regex::bytes::Regex;
use std::fmt;

lazy_static::lazy_static! {
    static ref HEADER_RE: Regex =
        Regex::new(r"([0-9A-F]{2}),([0-9A-F]{4}),([0-9A-F]{2})$").expect("header pattern is valid");
}

/// Metadata the modem prepends to every received payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxHeader {
    /// Node the frame was relayed through (00 for direct reception)
    pub node: u8,
    /// Transmitting module's id
    pub sender: u16,
    /// Received signal strength, raw modem value
    pub rssi: u8,
}

impl RxHeader {
    /// Parse the header from the bytes preceding ':'
    ///
    /// Anything before the header (leftover noise, modem status lines) is
    /// ignored. Returns None when the prefix does not end in a header.
    pub fn parse(prefix: &[u8]) -> Option<Self> {
        let caps = HEADER_RE.captures(prefix)?;

        let node = hex::decode_pair(caps[1][0], caps[1][1]).ok()?;
        let sender_hi = hex::decode_pair(caps[2][0], caps[2][1]).ok()?;
        let sender_lo = hex::decode_pair(caps[2][2], caps[2][3]).ok()?;
        let rssi = hex::decode_pair(caps[3][0], caps[3][1]).ok()?;

        Some(Self {
            node,
            sender: u16::from_be_bytes([sender_hi, sender_lo]),
            rssi,
        })
    }
}

impl fmt::Display for RxHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "node={:02X} sender={:04X} rssi={:02X}",
            self.node, self.sender, self.rssi
        )
    }
}
