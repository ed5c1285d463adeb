// Serial port abstraction for the modem link
// Wraps the serialport crate and exposes it as a SerialTransport

use super::transport::SerialTransport;
use crate::frame::MAX_FRAME_SIZE;
use std::io::{self, Read, Write};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SerialError {
    #[error("Serial port error: {0}")]
    Port(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Port not open")]
    NotOpen,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SerialError>;

/// Default modem baud rate
pub const DEFAULT_BAUD_RATE: u32 = 19200;

/// Serial port configuration
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Baud rate (the modem ships at 19200)
    pub baud_rate: u32,

    /// Data bits (5, 6, 7, 8)
    pub data_bits: serialport::DataBits,

    /// Stop bits
    pub stop_bits: serialport::StopBits,

    /// Parity
    pub parity: serialport::Parity,

    /// Flow control
    pub flow_control: serialport::FlowControl,

    /// Read/write timeout
    pub timeout: Duration,

    /// Size of the driver's transmit buffer, used to report writable space
    pub tx_buffer_size: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: serialport::DataBits::Eight,
            stop_bits: serialport::StopBits::One,
            parity: serialport::Parity::None,
            flow_control: serialport::FlowControl::None,
            timeout: Duration::from_secs(1),
            tx_buffer_size: 256,
        }
    }
}

impl SerialConfig {
    /// Create a new configuration with specified baud rate
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Default::default()
        }
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set hardware flow control (RTS/CTS)
    pub fn with_hardware_flow(mut self) -> Self {
        self.flow_control = serialport::FlowControl::Hardware;
        self
    }

    /// Set the transmit buffer size reported to senders
    pub fn with_tx_buffer_size(mut self, size: usize) -> Self {
        self.tx_buffer_size = size;
        self
    }
}

/// Blocking serial port wrapper
pub struct SerialPort {
    port: Option<Box<dyn serialport::SerialPort>>,
    config: SerialConfig,
    port_name: String,
}

impl SerialPort {
    /// Open a serial port with the given configuration
    pub fn open(port_name: &str, config: SerialConfig) -> Result<Self> {
        if config.tx_buffer_size < MAX_FRAME_SIZE {
            return Err(SerialError::InvalidConfig(format!(
                "transmit buffer size {} is smaller than a full frame ({} bytes)",
                config.tx_buffer_size, MAX_FRAME_SIZE
            )));
        }

        let port = serialport::new(port_name, config.baud_rate)
            .data_bits(config.data_bits)
            .stop_bits(config.stop_bits)
            .parity(config.parity)
            .flow_control(config.flow_control)
            .timeout(config.timeout)
            .open()
            .map_err(|e| SerialError::Port(e.to_string()))?;

        tracing::debug!("Opened {} at {} baud", port_name, config.baud_rate);

        Ok(Self {
            port: Some(port),
            config,
            port_name: port_name.to_string(),
        })
    }

    /// Get the port name
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Get the configuration
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn serialport::SerialPort>> {
        self.port.as_mut().ok_or(SerialError::NotOpen)
    }

    /// Clear input buffer
    pub fn clear_input(&mut self) -> Result<()> {
        self.port_mut()?
            .clear(serialport::ClearBuffer::Input)
            .map_err(|e| SerialError::Port(e.to_string()))
    }

    /// Clear both input and output buffers
    pub fn clear_all(&mut self) -> Result<()> {
        self.port_mut()?
            .clear(serialport::ClearBuffer::All)
            .map_err(|e| SerialError::Port(e.to_string()))
    }

    /// Change the baud rate
    pub fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        self.port_mut()?.set_baud_rate(baud_rate).map_err(|e| {
            SerialError::Port(format!("Failed to set baud rate to {}: {}", baud_rate, e))
        })?;
        self.config.baud_rate = baud_rate;
        Ok(())
    }

    /// Close the port
    pub fn close(mut self) -> Result<()> {
        self.port.take();
        Ok(())
    }
}

impl SerialTransport for SerialPort {
    fn available(&mut self) -> Result<usize> {
        let pending = self
            .port_mut()?
            .bytes_to_read()
            .map_err(|e| SerialError::Port(e.to_string()))?;
        Ok(pending as usize)
    }

    fn available_for_write(&mut self) -> Result<usize> {
        let capacity = self.config.tx_buffer_size;
        let queued = self
            .port_mut()?
            .bytes_to_write()
            .map_err(|e| SerialError::Port(e.to_string()))?;
        Ok(capacity.saturating_sub(queued as usize))
    }

    fn read_byte(&mut self) -> Result<u8> {
        let timeout = self.config.timeout;
        let port = self.port_mut()?;

        let mut byte = [0u8; 1];
        loop {
            match port.read(&mut byte) {
                Ok(0) => {
                    return Err(SerialError::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "Port closed",
                    )))
                }
                Ok(_) => return Ok(byte[0]),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(ref e) if e.kind() == io::ErrorKind::TimedOut => {
                    return Err(SerialError::Timeout(timeout))
                }
                Err(e) => return Err(SerialError::Io(e)),
            }
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let timeout = self.config.timeout;
        self.port_mut()?.write_all(data).map_err(|e| {
            if e.kind() == io::ErrorKind::TimedOut {
                SerialError::Timeout(timeout)
            } else {
                SerialError::Io(e)
            }
        })
    }

    fn flush(&mut self) -> Result<()> {
        self.port_mut()?.flush().map_err(SerialError::Io)
    }
}

/// List available serial ports
pub fn list_ports() -> Result<Vec<String>> {
    serialport::available_ports()
        .map_err(|e| SerialError::Port(e.to_string()))?
        .into_iter()
        .map(|p| Ok(p.port_name))
        .collect()
}
