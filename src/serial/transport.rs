// Byte-stream capability the link layer is written against
// Implemented by the hosted SerialPort and by MockTransport in tests

use super::comm::Result;

/// A byte-oriented serial device
///
/// Queries never block. `read_byte` blocks until a byte arrives or the
/// device's own timeout expires, in which case it returns
/// `SerialError::Timeout`.
pub trait SerialTransport {
    /// Number of bytes that can be read without blocking
    fn available(&mut self) -> Result<usize>;

    /// Number of bytes that can be written without blocking
    fn available_for_write(&mut self) -> Result<usize>;

    /// Read a single byte
    fn read_byte(&mut self) -> Result<u8>;

    /// Write the whole buffer
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Push buffered output to the device
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Read into `buf` until `terminator` is seen or `buf` is full
    ///
    /// The terminator is consumed but not stored. Returns the number of
    /// bytes stored; a return value equal to `buf.len()` means the
    /// terminator may not have been reached.
    fn read_until(&mut self, terminator: u8, buf: &mut [u8]) -> Result<usize> {
        let mut len = 0;
        while len < buf.len() {
            let byte = self.read_byte()?;
            if byte == terminator {
                break;
            }
            buf[len] = byte;
            len += 1;
        }
        Ok(len)
    }

    /// Write `line` followed by CRLF
    fn write_line(&mut self, line: &[u8]) -> Result<()> {
        self.write_all(line)?;
        self.write_all(b"\r\n")
    }
}

impl<T: SerialTransport + ?Sized> SerialTransport for &mut T {
    fn available(&mut self) -> Result<usize> {
        (**self).available()
    }

    fn available_for_write(&mut self) -> Result<usize> {
        (**self).available_for_write()
    }

    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_all(data)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn read_until(&mut self, terminator: u8, buf: &mut [u8]) -> Result<usize> {
        (**self).read_until(terminator, buf)
    }
}

impl<T: SerialTransport + ?Sized> SerialTransport for Box<T> {
    fn available(&mut self) -> Result<usize> {
        (**self).available()
    }

    fn available_for_write(&mut self) -> Result<usize> {
        (**self).available_for_write()
    }

    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_all(data)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn read_until(&mut self, terminator: u8, buf: &mut [u8]) -> Result<usize> {
        (**self).read_until(terminator, buf)
    }
}
