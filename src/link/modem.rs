// IM920 modem facade: one transport shared by a Sender and a Receiver

use super::error::{ReceiveError, SendError};
use super::receiver::{ReceivePolicy, Receiver};
use super::sender::{SendPolicy, Sender, SenderConfig};
use super::watchdog::{LinkCallback, LinkMonitor, NoopWatchdog, TokioWatchdog, WatchdogTimer};
use crate::config::LinkConfig;
use crate::frame::{Payload, PayloadSize, RxHeader};
use crate::serial::{SerialError, SerialPort, SerialTransport};
use std::time::Duration;

/// An IM920 modem attached to a serial transport
pub struct Im920<T: SerialTransport> {
    transport: T,
    sender: Sender,
    receiver: Receiver,
}

impl<T: SerialTransport> Im920<T> {
    /// Wrap a transport with default settings and no watchdog timer
    pub fn new(transport: T) -> Self {
        Self::with_parts(transport, SenderConfig::default(), Box::new(NoopWatchdog))
    }

    /// Wrap a transport with explicit sender settings and watchdog timer
    pub fn with_parts(transport: T, sender: SenderConfig, timer: Box<dyn WatchdogTimer>) -> Self {
        Self {
            transport,
            sender: Sender::new(sender),
            receiver: Receiver::new(LinkMonitor::new(timer)),
        }
    }

    /// Bytes waiting to be read from the modem
    pub fn available(&mut self) -> Result<usize, SerialError> {
        self.transport.available()
    }

    /// Transmit a typed payload
    pub fn send<P: Payload>(&mut self, payload: &P, policy: SendPolicy) -> Result<(), SendError> {
        self.sender.send(&mut self.transport, payload, policy)
    }

    /// Transmit raw bytes (1..=32)
    pub fn send_bytes(&mut self, payload: &[u8], policy: SendPolicy) -> Result<(), SendError> {
        self.sender.send_bytes(&mut self.transport, payload, policy)
    }

    /// Receive a typed payload
    pub fn receive<P: Payload>(&mut self, policy: ReceivePolicy) -> Result<P, ReceiveError> {
        self.receiver.receive(&mut self.transport, policy)
    }

    /// Receive `out.len()` bytes into `out`
    pub fn receive_bytes(&mut self, out: &mut [u8], policy: ReceivePolicy) -> Result<(), ReceiveError> {
        self.receiver.receive_bytes(&mut self.transport, out, policy)
    }

    /// Consume and validate one frame without keeping its payload
    pub fn drain(&mut self, size: PayloadSize, policy: ReceivePolicy) -> Result<(), ReceiveError> {
        self.receiver.drain(&mut self.transport, size, policy)
    }

    /// Run `callback` whenever a frame start is seen
    pub fn on_data_received(&mut self, callback: LinkCallback) {
        self.receiver.monitor_mut().on_data_received(callback);
    }

    /// Run `callback` each time `interval` passes without a frame start
    pub fn on_data_not_received(&mut self, callback: LinkCallback, interval: Duration) {
        self.receiver
            .monitor_mut()
            .on_data_not_received(callback, interval);
    }

    /// Header of the last received line
    pub fn last_header(&self) -> Option<RxHeader> {
        self.receiver.last_header()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }
}

impl Im920<SerialPort> {
    /// Open the port named in `config`
    ///
    /// Uses a tokio watchdog timer when called inside a runtime.
    pub fn open(config: &LinkConfig) -> Result<Self, SerialError> {
        config
            .validate()
            .map_err(|e| SerialError::InvalidConfig(e.to_string()))?;

        let port = SerialPort::open(&config.port, config.serial_config())?;
        let timer: Box<dyn WatchdogTimer> = match TokioWatchdog::current() {
            Some(timer) => Box::new(timer),
            None => Box::new(NoopWatchdog),
        };

        Ok(Self::with_parts(port, config.sender_config(), timer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::watchdog::testing::CountingWatchdog;
    use crate::serial::mock::MockTransport;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_send_and_receive_scenario() {
        let port = MockTransport::new();
        let mut feeder = port.clone();
        let mut modem = Im920::new(port);

        modem
            .send(&[0x12u8, 0x34, 0x56, 0x78], SendPolicy::AbortIfFull)
            .unwrap();
        assert_eq!(feeder.get_written_data(), b"TXDA 12345678\r\n");

        feeder.push_read_data(b"00,0001,EA:12,34,56,78\r\n");
        assert_eq!(modem.available().unwrap(), 24);

        let data: [u8; 4] = modem.receive(ReceivePolicy::ReturnIfEmpty).unwrap();
        assert_eq!(data, [0x12, 0x34, 0x56, 0x78]);
        assert_eq!(modem.last_header().unwrap().node, 0);
    }

    #[test]
    fn test_callbacks_through_facade() {
        let timer = CountingWatchdog::default();
        let port = MockTransport::with_input(b"00,0001,EA:01\r\n00,0001,EA:02\r\n");
        let mut modem = Im920::with_parts(port, SenderConfig::default(), Box::new(timer.clone()));

        let received = Arc::new(AtomicUsize::new(0));
        let r = received.clone();
        modem.on_data_received(Box::new(move || {
            r.fetch_add(1, Ordering::SeqCst);
        }));
        modem.on_data_not_received(Box::new(|| {}), Duration::from_millis(500));
        assert_eq!(timer.arms(), 1);

        modem.drain(PayloadSize::of::<1>(), ReceivePolicy::ReturnIfEmpty).unwrap();
        let value: u8 = modem.receive(ReceivePolicy::ReturnIfEmpty).unwrap();

        assert_eq!(value, 0x02);
        assert_eq!(received.load(Ordering::SeqCst), 2);
        assert_eq!(timer.restarts(), 2);
    }

    #[test]
    fn test_busy_is_recoverable() {
        let port = MockTransport::new().with_writable(0);
        let handle = port.clone();
        let mut modem = Im920::new(port);

        let err = modem.send_bytes(&[1, 2, 3], SendPolicy::AbortIfFull).unwrap_err();
        assert!(err.is_recoverable());

        handle.set_writable(64);
        modem.send_bytes(&[1, 2, 3], SendPolicy::AbortIfFull).unwrap();
        assert_eq!(modem.into_inner().get_written_data(), b"TXDA 010203\r\n");
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let config = LinkConfig {
            baud_rate: 0,
            ..LinkConfig::default()
        };
        assert!(matches!(Im920::open(&config), Err(SerialError::InvalidConfig(_))));
    }
}
