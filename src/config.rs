// Link configuration, loadable from JSON

use crate::frame::MAX_FRAME_SIZE;
use crate::link::sender::{SenderConfig, DEFAULT_CARRIER_SENSE_DELAY};
use crate::link::watchdog::DEFAULT_NOT_RECEIVED_INTERVAL;
use crate::serial::comm::DEFAULT_BAUD_RATE;
use crate::serial::SerialConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Settings for one modem link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Serial device, e.g. /dev/ttyUSB0 or COM3
    pub port: String,

    /// Baud rate
    pub baud_rate: u32,

    /// Port read/write timeout in milliseconds
    pub timeout_ms: u64,

    /// Driver transmit buffer size in bytes
    pub tx_buffer_size: usize,

    /// Pause before transmitting under carrier-sense policy, in milliseconds
    pub carrier_sense_delay_ms: u64,

    /// Silence before the not-received callback fires, in milliseconds
    pub not_received_interval_ms: u64,

    /// Sleep between empty polls in the frame pump, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: 1000,
            tx_buffer_size: 256,
            carrier_sense_delay_ms: DEFAULT_CARRIER_SENSE_DELAY.as_millis() as u64,
            not_received_interval_ms: DEFAULT_NOT_RECEIVED_INTERVAL.as_millis() as u64,
            poll_interval_ms: 5,
        }
    }
}

impl LinkConfig {
    /// Create a configuration for `port` with defaults elsewhere
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Default::default()
        }
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud_rate == 0 {
            return Err(ConfigError::Invalid("baud_rate must be non-zero".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be non-zero".to_string()));
        }
        if self.tx_buffer_size < MAX_FRAME_SIZE {
            return Err(ConfigError::Invalid(format!(
                "tx_buffer_size must be at least {} (one full frame)",
                MAX_FRAME_SIZE
            )));
        }
        if self.not_received_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "not_received_interval_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig::new(self.baud_rate)
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_tx_buffer_size(self.tx_buffer_size)
    }

    pub fn sender_config(&self) -> SenderConfig {
        SenderConfig {
            carrier_sense_delay: Duration::from_millis(self.carrier_sense_delay_ms),
        }
    }

    pub fn not_received_interval(&self) -> Duration {
        Duration::from_millis(self.not_received_interval_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
