// Receive side: prefix scan, bounded line read, body decode
// Lines look like "00,0001,EA:12,34,56,78\r\n"; everything before ':' is modem metadata

use super::error::ReceiveError;
use super::watchdog::LinkMonitor;
use crate::frame::{
    body_cap, decode_body, decoder::validate_body, Payload, PayloadSize, RxHeader, MAX_BODY_SIZE,
    MAX_PAYLOAD_SIZE, PAYLOAD_MARKER,
};
use crate::serial::SerialTransport;

/// How `receive` behaves when the transport has nothing to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceivePolicy {
    /// Spin until the next byte arrives
    BlockUntilData,
    /// Return `NoDataAvailable` / `ColonNotFound` as soon as input runs dry
    ReturnIfEmpty,
}

/// Prefix bytes kept for header parsing
const PREFIX_KEEP: usize = 16;

/// Parses received lines into payloads
///
/// Owns one scratch line buffer, so a single receiver must not be used for
/// two receives at once.
pub struct Receiver {
    line: [u8; MAX_BODY_SIZE + 1],
    prefix: [u8; PREFIX_KEEP],
    prefix_len: usize,
    held: Option<u8>,
    last_header: Option<RxHeader>,
    monitor: LinkMonitor,
}

impl Receiver {
    pub fn new(monitor: LinkMonitor) -> Self {
        Self {
            line: [0u8; MAX_BODY_SIZE + 1],
            prefix: [0u8; PREFIX_KEEP],
            prefix_len: 0,
            held: None,
            last_header: None,
            monitor,
        }
    }

    /// Access the liveness hooks (callbacks and watchdog)
    pub fn monitor_mut(&mut self) -> &mut LinkMonitor {
        &mut self.monitor
    }

    /// Header of the most recent line whose ':' was seen, if it had one
    pub fn last_header(&self) -> Option<RxHeader> {
        self.last_header
    }

    /// Receive a typed payload
    pub fn receive<T, P>(&mut self, transport: &mut T, policy: ReceivePolicy) -> Result<P, ReceiveError>
    where
        T: SerialTransport + ?Sized,
        P: Payload,
    {
        let size = P::SIZE;
        let mut raw = [0u8; MAX_PAYLOAD_SIZE];
        self.receive_frame(transport, size, Some(&mut raw[..size.get()]), policy)?;
        Ok(P::read_bytes(&raw[..size.get()]))
    }

    /// Receive a payload of `out.len()` bytes into `out`
    pub fn receive_bytes<T>(
        &mut self,
        transport: &mut T,
        out: &mut [u8],
        policy: ReceivePolicy,
    ) -> Result<(), ReceiveError>
    where
        T: SerialTransport + ?Sized,
    {
        let size = PayloadSize::new(out.len())?;
        self.receive_frame(transport, size, Some(out), policy)
    }

    /// Parse and validate one frame of `size` bytes, discarding the payload
    ///
    /// Still advances the stream and fires the liveness hooks.
    pub fn drain<T>(&mut self, transport: &mut T, size: PayloadSize, policy: ReceivePolicy) -> Result<(), ReceiveError>
    where
        T: SerialTransport + ?Sized,
    {
        self.receive_frame(transport, size, None, policy)
    }

    /// Core receive path. `out`, when given, is exactly `size` bytes.
    pub fn receive_frame<T>(
        &mut self,
        transport: &mut T,
        size: PayloadSize,
        out: Option<&mut [u8]>,
        policy: ReceivePolicy,
    ) -> Result<(), ReceiveError>
    where
        T: SerialTransport + ?Sized,
    {
        if let Some(out) = out.as_deref() {
            if out.len() != size.get() {
                return Err(ReceiveError::OutputSize {
                    expected: size.get(),
                    actual: out.len(),
                });
            }
        }

        self.scan_prefix(transport, policy)?;

        self.last_header = RxHeader::parse(&self.prefix[..self.prefix_len]);
        tracing::debug!(
            "Frame start ({})",
            self.last_header
                .map(|h| h.to_string())
                .unwrap_or_else(|| "no header".to_string())
        );
        self.monitor.frame_started();

        let len = self.read_body(transport, size)?;
        let body = &self.line[..len];
        tracing::trace!("RX body \"{}\"", body.escape_ascii());

        let result = match out {
            Some(out) => decode_body(body, size, out),
            None => validate_body(body, size),
        };
        if let Err(e) = result {
            tracing::debug!("Dropping frame: {}", e);
            return Err(e.into());
        }

        tracing::debug!("Received {} payload", size);
        Ok(())
    }

    /// Discard input up to and including ':'
    fn scan_prefix<T>(&mut self, transport: &mut T, policy: ReceivePolicy) -> Result<(), ReceiveError>
    where
        T: SerialTransport + ?Sized,
    {
        self.prefix_len = 0;
        let mut consumed = false;

        loop {
            let byte = match self.held.take() {
                Some(byte) => byte,
                None => {
                    if !Self::wait_for_data(transport, policy)? {
                        return Err(if consumed {
                            ReceiveError::ColonNotFound
                        } else {
                            ReceiveError::NoDataAvailable
                        });
                    }
                    transport.read_byte()?
                }
            };
            consumed = true;

            match byte {
                PAYLOAD_MARKER => return Ok(()),
                b'\n' => self.prefix_len = 0,
                _ => self.push_prefix(byte),
            }
        }
    }

    /// Returns false if the policy says to give up on an empty transport
    fn wait_for_data<T>(transport: &mut T, policy: ReceivePolicy) -> Result<bool, ReceiveError>
    where
        T: SerialTransport + ?Sized,
    {
        loop {
            if transport.available()? > 0 {
                return Ok(true);
            }
            match policy {
                ReceivePolicy::ReturnIfEmpty => return Ok(false),
                ReceivePolicy::BlockUntilData => std::hint::spin_loop(),
            }
        }
    }

    fn push_prefix(&mut self, byte: u8) {
        if self.prefix_len == PREFIX_KEEP {
            self.prefix.copy_within(1.., 0);
            self.prefix_len -= 1;
        }
        self.prefix[self.prefix_len] = byte;
        self.prefix_len += 1;
    }

    /// Read the body into the line buffer, returning its length
    fn read_body<T>(&mut self, transport: &mut T, size: PayloadSize) -> Result<usize, ReceiveError>
    where
        T: SerialTransport + ?Sized,
    {
        let cap = body_cap(size);

        // One byte past the cap: filling it means no CR within the limit
        let len = transport.read_until(b'\r', &mut self.line[..cap + 1])?;
        if len > cap {
            tracing::debug!("Line exceeds {} characters, dropping", cap);
            return Err(ReceiveError::LineTooLong { limit: cap });
        }

        // CR may or may not be followed by LF; anything else belongs to the next line
        if transport.available()? > 0 {
            let next = transport.read_byte()?;
            if next != b'\n' {
                self.held = Some(next);
            }
        }

        Ok(len)
    }
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new(LinkMonitor::default())
    }
}
