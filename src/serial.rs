//! Serial port transport for desktop using serialport crate

use crate::transport::ReaderTransport;
use std::io::{self, Read, Write};
use std::time::Duration;

/// Line settings for the module's UART
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: serialport::DataBits,
    pub parity: serialport::Parity,
    pub stop_bits: serialport::StopBits,
    pub flow_control: serialport::FlowControl,
    /// Initial read timeout; each read overrides it with its own
    pub timeout: Duration,
    /// Wait after opening before the line is considered quiet
    pub open_delay: Duration,
}

impl Default for SerialConfig {
    /// 115200 8N1, the module's factory setting
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            data_bits: serialport::DataBits::Eight,
            parity: serialport::Parity::None,
            stop_bits: serialport::StopBits::One,
            flow_control: serialport::FlowControl::None,
            timeout: Duration::from_secs(1),
            open_delay: Duration::from_millis(500),
        }
    }
}

impl SerialConfig {
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_open_delay(mut self, open_delay: Duration) -> Self {
        self.open_delay = open_delay;
        self
    }
}

pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// Open `port_name` at `baud_rate` with the remaining factory settings
    pub fn new(port_name: &str, baud_rate: u32) -> Result<Self, serialport::Error> {
        Self::open(port_name, &SerialConfig::new(baud_rate))
    }

    pub fn open(port_name: &str, config: &SerialConfig) -> Result<Self, serialport::Error> {
        let port = serialport::new(port_name, config.baud_rate)
            .data_bits(config.data_bits)
            .parity(config.parity)
            .stop_bits(config.stop_bits)
            .flow_control(config.flow_control)
            .timeout(config.timeout)
            .open()?;
        std::thread::sleep(config.open_delay);
        port.clear(serialport::ClearBuffer::Input)?;

        Ok(Self { port })
    }
}

impl ReaderTransport for SerialTransport {
    type Error = io::Error;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        self.port.write_all(data)?;
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error> {
        self.port
            .set_timeout(Duration::from_millis(timeout_ms as u64))
            .map_err(io::Error::other)?;
        match self.port.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            result => result,
        }
    }

    fn clear_input(&mut self) -> Result<(), Self::Error> {
        self.port
            .clear(serialport::ClearBuffer::Input)
            .map_err(io::Error::other)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Write::flush(&mut self.port)
    }
}
