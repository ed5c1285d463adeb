// IM920-RS: serial framing for IM920 series radio modems
// Copyright 2024 - Licensed under GPLv3

pub mod codec;
pub mod config;
pub mod frame;
pub mod link;
pub mod serial;

// Re-export commonly used types
pub use codec::HexError;
pub use config::{ConfigError, LinkConfig};
pub use frame::{Payload, PayloadSize, RxHeader, SizeError};
pub use link::{
    spawn_frame_pump, FramePump, Im920, LinkCallback, ReceiveError, ReceivePolicy,
    ReceivedFrame, SendError, SendPolicy, SharedModem, TokioWatchdog, WatchdogTimer,
};
pub use serial::{SerialConfig, SerialError, SerialPort, SerialTransport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
