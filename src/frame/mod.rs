// IM920 wire framing
// Outgoing: "TXDA " + HEX + "\r\n"   Incoming: <prefix> ":" <hex-body> "\r" ["\n"]

pub mod decoder;
pub mod encoder;
pub mod header;
pub mod payload;

pub use decoder::{decode_body, body_cap, DecodeError};
pub use encoder::{encode_frame, frame_len, FrameBuffer};
pub use header::RxHeader;
pub use payload::{Payload, PayloadSize, SizeError};

/// Transmit command prefix
pub const TX_PREFIX: &[u8] = b"TXDA ";

/// Line terminator emitted after every command
pub const LINE_END: &[u8] = b"\r\n";

/// Marks the start of the hex body on received lines
pub const PAYLOAD_MARKER: u8 = b':';

/// Optional separator between hex pairs on received lines
pub const PAIR_SEPARATOR: u8 = b',';

/// Minimum payload size in bytes
pub const MIN_PAYLOAD_SIZE: usize = 1;

/// Maximum payload size in bytes accepted by the modem
pub const MAX_PAYLOAD_SIZE: usize = 32;

/// Largest complete transmit frame ("TXDA " + 64 hex digits + CRLF)
pub const MAX_FRAME_SIZE: usize = TX_PREFIX.len() + MAX_PAYLOAD_SIZE * 2 + LINE_END.len();

/// Largest hex body accepted on receive, in characters
pub const MAX_BODY_SIZE: usize = MAX_PAYLOAD_SIZE * 3;
