// Hosted receive loop: polls a shared modem on a blocking worker and forwards frames

use super::error::ReceiveError;
use super::modem::Im920;
use super::receiver::ReceivePolicy;
use crate::frame::{PayloadSize, RxHeader, MAX_PAYLOAD_SIZE};
use crate::serial::{SerialError, SerialTransport};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

/// A modem shared between the pump and application senders
pub type SharedModem<T> = Arc<Mutex<Im920<T>>>;

/// Wrap a modem for sharing with a frame pump
pub fn shared<T: SerialTransport>(modem: Im920<T>) -> SharedModem<T> {
    Arc::new(Mutex::new(modem))
}

/// One decoded payload plus the header of the line it arrived on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFrame {
    pub payload: Vec<u8>,
    pub header: Option<RxHeader>,
}

/// Handle to a running frame pump
pub struct FramePump {
    frames: mpsc::Receiver<ReceivedFrame>,
    task: JoinHandle<()>,
}

impl FramePump {
    /// Wait for the next frame; `None` once the pump has stopped
    pub async fn recv(&mut self) -> Option<ReceivedFrame> {
        self.frames.recv().await
    }

    /// Take the next frame if one is already queued
    pub fn try_recv(&mut self) -> Option<ReceivedFrame> {
        self.frames.try_recv().ok()
    }

    /// Stop the pump and wait for its worker to exit
    ///
    /// The worker notices the closed channel before its next poll.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        let FramePump { frames, task } = self;
        drop(frames);
        task.await
    }
}

/// Start polling `modem` for `size`-byte frames
///
/// The modem lock is taken for one receive at a time, so other tasks may
/// send between polls. Must be called from within a tokio runtime.
pub fn spawn_frame_pump<T>(
    modem: SharedModem<T>,
    size: PayloadSize,
    poll_interval: Duration,
    capacity: usize,
) -> FramePump
where
    T: SerialTransport + Send + 'static,
{
    let (tx, frames) = mpsc::channel(capacity.max(1));

    let task = tokio::task::spawn_blocking(move || {
        tracing::debug!("Frame pump started for {} frames", size);
        let mut buf = [0u8; MAX_PAYLOAD_SIZE];

        while !tx.is_closed() {
            let result = {
                let mut guard = match modem.lock() {
                    Ok(guard) => guard,
                    Err(_) => {
                        tracing::error!("Modem lock poisoned, stopping frame pump");
                        break;
                    }
                };
                let received = guard.receive_bytes(&mut buf[..size.get()], ReceivePolicy::ReturnIfEmpty);
                received.map(|()| ReceivedFrame {
                    payload: buf[..size.get()].to_vec(),
                    header: guard.last_header(),
                })
            };

            match result {
                Ok(frame) => {
                    if tx.blocking_send(frame).is_err() {
                        break;
                    }
                }
                Err(e) if e.is_idle() => std::thread::sleep(poll_interval),
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("Dropped frame: {}", e);
                }
                Err(ReceiveError::Serial(SerialError::Timeout(t))) => {
                    tracing::warn!("Line stalled for {:?}, dropped", t);
                }
                Err(e) => {
                    tracing::error!("Frame pump stopping: {}", e);
                    break;
                }
            }
        }

        tracing::debug!("Frame pump stopped");
    });

    FramePump { frames, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::sender::SendPolicy;
    use crate::serial::mock::MockTransport;
    use tokio::time::timeout;

    const POLL: Duration = Duration::from_millis(1);
    const WAIT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn test_pump_forwards_frames() {
        let port = MockTransport::with_input(b"00,0001,EA:12,34\r\n00,0002,C0:ABCD\r\n");
        let modem = shared(Im920::new(port));
        let mut pump = spawn_frame_pump(modem, PayloadSize::of::<2>(), POLL, 4);

        let first = timeout(WAIT, pump.recv()).await.unwrap().unwrap();
        assert_eq!(first.payload, vec![0x12, 0x34]);
        assert_eq!(first.header.unwrap().sender, 0x0001);

        let second = timeout(WAIT, pump.recv()).await.unwrap().unwrap();
        assert_eq!(second.payload, vec![0xAB, 0xCD]);
        assert_eq!(second.header.unwrap().rssi, 0xC0);

        pump.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_pump_skips_bad_lines() {
        let port = MockTransport::with_input(b"00,0001,EA:ZZ\r\n00,0001,EA:123\r\nNOISE:0F\r\n");
        let modem = shared(Im920::new(port));
        let mut pump = spawn_frame_pump(modem, PayloadSize::of::<1>(), POLL, 4);

        let frame = timeout(WAIT, pump.recv()).await.unwrap().unwrap();
        assert_eq!(frame.payload, vec![0x0F]);
        assert_eq!(frame.header, None);

        pump.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_pump_picks_up_late_data_and_allows_sends() {
        let port = MockTransport::new();
        let mut feeder = port.clone();
        let modem = shared(Im920::new(port));
        let mut pump = spawn_frame_pump(modem.clone(), PayloadSize::of::<1>(), POLL, 4);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(pump.try_recv().is_none());

        modem
            .lock()
            .unwrap()
            .send_bytes(&[0x42], SendPolicy::AbortIfFull)
            .unwrap();
        assert_eq!(feeder.get_written_data(), b"TXDA 42\r\n");

        feeder.push_read_data(b"00,0003,80:7F\r\n");
        let frame = timeout(WAIT, pump.recv()).await.unwrap().unwrap();
        assert_eq!(frame.payload, vec![0x7F]);

        pump.shutdown().await.unwrap();
    }
}
