// Transmit side: flow control and frame emission

use super::error::SendError;
use crate::frame::{encode_frame, frame_len, Payload, PayloadSize, MAX_PAYLOAD_SIZE};
use crate::serial::SerialTransport;
use std::time::Duration;

/// Default pause before transmitting under `SendPolicy::DelayForCarrierSense`
pub const DEFAULT_CARRIER_SENSE_DELAY: Duration = Duration::from_millis(60);

/// How `send` behaves when the transport cannot take a whole frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendPolicy {
    /// Spin until the transmit buffer has room for the frame
    BlockUntilSpace,
    /// Return `SendError::Busy` without writing anything
    AbortIfFull,
    /// Sleep a fixed interval before writing to let the channel clear
    DelayForCarrierSense,
}

/// Sender settings
#[derive(Debug, Clone, Copy)]
pub struct SenderConfig {
    pub carrier_sense_delay: Duration,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            carrier_sense_delay: DEFAULT_CARRIER_SENSE_DELAY,
        }
    }
}

/// Emits "TXDA" frames onto a transport
///
/// Holds no buffers between calls; each frame is built on the stack.
#[derive(Debug, Clone, Default)]
pub struct Sender {
    config: SenderConfig,
}

impl Sender {
    pub fn new(config: SenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// Send a typed payload
    pub fn send<T, P>(&self, transport: &mut T, payload: &P, policy: SendPolicy) -> Result<(), SendError>
    where
        T: SerialTransport + ?Sized,
        P: Payload,
    {
        let size = P::SIZE.get();
        let mut raw = [0u8; MAX_PAYLOAD_SIZE];
        payload.write_bytes(&mut raw[..size]);
        self.send_bytes(transport, &raw[..size], policy)
    }

    /// Send raw bytes whose length is only known at runtime
    pub fn send_bytes<T>(&self, transport: &mut T, payload: &[u8], policy: SendPolicy) -> Result<(), SendError>
    where
        T: SerialTransport + ?Sized,
    {
        let size = PayloadSize::new(payload.len())?;
        let required = frame_len(size);

        match policy {
            SendPolicy::AbortIfFull => {
                let available = transport.available_for_write()?;
                if available < required {
                    tracing::debug!(
                        "Transmit buffer full ({} free, {} needed), not sending",
                        available,
                        required
                    );
                    return Err(SendError::Busy {
                        required,
                        available,
                    });
                }
            }
            SendPolicy::BlockUntilSpace => {
                while transport.available_for_write()? < required {
                    std::hint::spin_loop();
                }
            }
            SendPolicy::DelayForCarrierSense => {
                std::thread::sleep(self.config.carrier_sense_delay);
            }
        }

        let frame = encode_frame(payload)?;
        tracing::trace!("TX {:?}", frame);
        transport.write_all(frame.as_bytes())?;

        tracing::debug!("Sent {} payload", size);
        Ok(())
    }
}
