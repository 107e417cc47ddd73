use std::time::Duration;

use serde::{Deserialize, Serialize};
use serialport::{DataBits, StopBits};
use tracing::info;

use crate::error::{Result, TransportError};

/// Baud rate the controller firmware ships with.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Parity setting for the serial line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

impl Parity {
    fn to_serialport(self) -> serialport::Parity {
        match self {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }

    fn as_char(self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
        }
    }
}

/// Serial line settings. Defaults to 9600 8N1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: Parity,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::None,
        }
    }
}

impl SerialConfig {
    /// Settings for `port` at the default line parameters.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    /// Override the baud rate.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Short `9600 8N1` style description for logs.
    pub fn line_settings(&self) -> String {
        format!(
            "{} {}{}{}",
            self.baud_rate,
            self.data_bits,
            self.parity.as_char(),
            self.stop_bits
        )
    }

    fn data_bits(&self) -> Result<DataBits> {
        match self.data_bits {
            5 => Ok(DataBits::Five),
            6 => Ok(DataBits::Six),
            7 => Ok(DataBits::Seven),
            8 => Ok(DataBits::Eight),
            other => Err(TransportError::InvalidSetting(format!(
                "data bits must be 5-8, got {other}"
            ))),
        }
    }

    fn stop_bits(&self) -> Result<StopBits> {
        match self.stop_bits {
            1 => Ok(StopBits::One),
            2 => Ok(StopBits::Two),
            other => Err(TransportError::InvalidSetting(format!(
                "stop bits must be 1 or 2, got {other}"
            ))),
        }
    }

    /// Open the port with these settings.
    pub(crate) fn open(&self, timeout: Duration) -> Result<Box<dyn serialport::SerialPort>> {
        if self.port.is_empty() {
            return Err(TransportError::InvalidSetting(
                "serial port path is empty".to_string(),
            ));
        }
        if self.baud_rate == 0 {
            return Err(TransportError::InvalidSetting(
                "baud rate must be greater than zero".to_string(),
            ));
        }

        let port = serialport::new(&self.port, self.baud_rate)
            .data_bits(self.data_bits()?)
            .stop_bits(self.stop_bits()?)
            .parity(self.parity.to_serialport())
            .timeout(timeout)
            .open()
            .map_err(|err| TransportError::Open {
                target: self.port.clone(),
                source: err.into(),
            })?;

        info!(port = %self.port, settings = %self.line_settings(), "opened serial port");
        Ok(port)
    }
}
