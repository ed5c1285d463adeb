// Text codecs used on the modem's command interface
pub mod hex;

pub use hex::{decode, decode_pair, encode, encode_byte, encode_to_string, HexError};
