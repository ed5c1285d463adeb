// Modem link: sender, receiver, liveness hooks and the hosted frame pump
pub mod error;
pub mod modem;
pub mod pump;
pub mod receiver;
pub mod sender;
pub mod watchdog;

pub use error::{ReceiveError, SendError};
pub use modem::Im920;
pub use pump::{shared, spawn_frame_pump, FramePump, ReceivedFrame, SharedModem};
pub use receiver::{ReceivePolicy, Receiver};
pub use sender::{SendPolicy, Sender, SenderConfig, DEFAULT_CARRIER_SENSE_DELAY};
pub use watchdog::{
    LinkCallback, LinkMonitor, NoopWatchdog, TokioWatchdog, WatchdogTimer,
    DEFAULT_NOT_RECEIVED_INTERVAL,
};
