// Mock serial transport for testing without a modem

use super::comm::{SerialError, Result};
use super::transport::SerialTransport;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock serial transport for testing
///
/// Clones share the same buffers, so a test can keep a handle while the
/// link layer owns another.
#[derive(Clone)]
pub struct MockTransport {
    /// Data to be read (simulates modem output)
    read_buffer: Arc<Mutex<VecDeque<u8>>>,

    /// Data that was written (simulates commands sent to the modem)
    write_buffer: Arc<Mutex<Vec<u8>>>,

    /// Number of write calls made
    write_calls: Arc<AtomicUsize>,

    /// Writable space reported to senders
    writable: Arc<AtomicUsize>,

    /// Timeout reported when a read finds no data
    timeout: Duration,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self {
            read_buffer: Arc::new(Mutex::new(VecDeque::new())),
            write_buffer: Arc::new(Mutex::new(Vec::new())),
            write_calls: Arc::new(AtomicUsize::new(0)),
            writable: Arc::new(AtomicUsize::new(usize::MAX)),
            timeout: Duration::from_millis(10),
        }
    }

    /// Create a transport with pre-loaded input
    pub fn with_input(data: &[u8]) -> Self {
        let mut port = Self::new();
        port.push_read_data(data);
        port
    }

    /// Set the writable space reported to senders
    pub fn with_writable(self, space: usize) -> Self {
        self.set_writable(space);
        self
    }

    /// Change the writable space reported to senders
    pub fn set_writable(&self, space: usize) {
        self.writable.store(space, Ordering::SeqCst);
    }

    /// Push data to be read (simulates the modem sending a line)
    pub fn push_read_data(&mut self, data: &[u8]) {
        self.read_buffer.lock().unwrap().extend(data.iter().copied());
    }

    /// Get data that was written
    pub fn get_written_data(&self) -> Vec<u8> {
        self.write_buffer.lock().unwrap().clone()
    }

    /// Number of write calls made so far
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Clear written data
    pub fn clear_written_data(&mut self) {
        self.write_buffer.lock().unwrap().clear();
        self.write_calls.store(0, Ordering::SeqCst);
    }

    /// Number of unread input bytes
    pub fn bytes_available(&self) -> usize {
        self.read_buffer.lock().unwrap().len()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialTransport for MockTransport {
    fn available(&mut self) -> Result<usize> {
        Ok(self.bytes_available())
    }

    fn available_for_write(&mut self) -> Result<usize> {
        Ok(self.writable.load(Ordering::SeqCst))
    }

    fn read_byte(&mut self) -> Result<u8> {
        self.read_buffer
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(SerialError::Timeout(self.timeout))
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.write_buffer.lock().unwrap().extend_from_slice(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_transport_basic() {
        let mut port = MockTransport::with_input(b"Hi");
        assert_eq!(port.available().unwrap(), 2);
        assert_eq!(port.read_byte().unwrap(), b'H');
        assert_eq!(port.read_byte().unwrap(), b'i');
        assert!(matches!(port.read_byte(), Err(SerialError::Timeout(_))));

        port.write_all(b"TXDA ").unwrap();
        port.write_all(b"00\r\n").unwrap();
        assert_eq!(port.get_written_data(), b"TXDA 00\r\n");
        assert_eq!(port.write_calls(), 2);
    }

    #[test]
    fn test_mock_clones_share_state() {
        let mut port = MockTransport::new().with_writable(8);
        let mut handle = port.clone();

        handle.push_read_data(b"X");
        assert_eq!(port.read_byte().unwrap(), b'X');

        handle.set_writable(0);
        assert_eq!(port.available_for_write().unwrap(), 0);

        port.write_all(b"A").unwrap();
        assert_eq!(handle.get_written_data(), b"A");
        handle.clear_written_data();
        assert_eq!(port.write_calls(), 0);
    }
}
