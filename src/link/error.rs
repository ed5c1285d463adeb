// Error types for the send and receive paths

use crate::codec::HexError;
use crate::frame::{DecodeError, SizeError};
use crate::serial::SerialError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SendError {
    #[error("Payload is empty")]
    PayloadEmpty,

    #[error("Payload too large: {0} bytes (max 32)")]
    PayloadTooLarge(usize),

    #[error("Transmit buffer full: need {required} bytes, {available} free")]
    Busy { required: usize, available: usize },

    #[error("Serial communication error: {0}")]
    Serial(#[from] SerialError),
}

impl From<SizeError> for SendError {
    fn from(err: SizeError) -> Self {
        match err {
            SizeError::Empty => SendError::PayloadEmpty,
            SizeError::TooLarge(size) => SendError::PayloadTooLarge(size),
        }
    }
}

impl SendError {
    /// True when the port is untouched and the caller may carry on
    ///
    /// `Busy` can be retried as is; `PayloadTooLarge` needs a smaller payload.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SendError::Busy { .. } | SendError::PayloadTooLarge(_))
    }
}

#[derive(Error, Debug)]
pub enum ReceiveError {
    #[error("No data available")]
    NoDataAvailable,

    #[error("Input ran out before ':' was found")]
    ColonNotFound,

    #[error("Line exceeds {limit} characters without a carriage return")]
    LineTooLong { limit: usize },

    #[error("Body length {actual} invalid: expected {packed} or {separated}")]
    LengthInvalid {
        packed: usize,
        separated: usize,
        actual: usize,
    },

    #[error("Received data is not valid hex: {0}")]
    DataInvalid(HexError),

    #[error("Payload is empty")]
    PayloadEmpty,

    #[error("Payload too large: {0} bytes (max 32)")]
    PayloadTooLarge(usize),

    #[error("Output buffer is {actual} bytes, frame payload is {expected}")]
    OutputSize { expected: usize, actual: usize },

    #[error("Serial communication error: {0}")]
    Serial(#[from] SerialError),
}

impl From<SizeError> for ReceiveError {
    fn from(err: SizeError) -> Self {
        match err {
            SizeError::Empty => ReceiveError::PayloadEmpty,
            SizeError::TooLarge(size) => ReceiveError::PayloadTooLarge(size),
        }
    }
}

impl From<DecodeError> for ReceiveError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::LengthInvalid {
                packed,
                separated,
                actual,
            } => ReceiveError::LengthInvalid {
                packed,
                separated,
                actual,
            },
            DecodeError::DataInvalid(hex) => ReceiveError::DataInvalid(hex),
            DecodeError::OutputTooSmall { needed, available } => ReceiveError::OutputSize {
                expected: needed,
                actual: available,
            },
        }
    }
}

impl ReceiveError {
    /// True when the caller can simply poll again later
    ///
    /// Framing and decoding failures are also recoverable: the bad line has
    /// been consumed and the next call starts on fresh input.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ReceiveError::Serial(_)
                | ReceiveError::PayloadEmpty
                | ReceiveError::PayloadTooLarge(_)
                | ReceiveError::OutputSize { .. }
        )
    }

    /// True when nothing was consumed or the input ran dry while scanning
    pub fn is_idle(&self) -> bool {
        matches!(self, ReceiveError::NoDataAvailable | ReceiveError::ColonNotFound)
    }
}
