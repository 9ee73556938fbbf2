//! Serial port transport for the host logger

use crate::error::{HostError, Result};
use loadlink_hal::{ConfigurableStream, SerialStream, UartConfig};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{Read, Write};
use std::time::Duration;

/// [`SerialStream`] over an OS serial port
pub struct SerialPortStream {
    port: Box<dyn SerialPort>,
}

impl SerialPortStream {
    /// Open a serial port with the given line settings
    ///
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/ttyACM0", "COM4")
    /// * `config` - Bit rate and read timeout
    pub fn open(path: &str, config: &UartConfig) -> Result<Self> {
        let port = serialport::new(path, config.baudrate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(u64::from(config.read_timeout_ms)))
            .open()?;

        log::info!("Opened serial port: {} at {} baud", path, config.baudrate);

        Ok(SerialPortStream { port })
    }
}

impl SerialStream for SerialPortStream {
    type Error = HostError;

    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.port.bytes_to_read()? == 0 {
            return Ok(None);
        }

        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.port.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.port.flush()?;
        Ok(())
    }
}

impl ConfigurableStream for SerialPortStream {
    fn configure(&mut self, config: &UartConfig) -> Result<()> {
        self.port.set_baud_rate(config.baudrate)?;
        self.port
            .set_timeout(Duration::from_millis(u64::from(config.read_timeout_ms)))?;
        log::debug!(
            "Serial line set to {} baud, {} ms timeout",
            config.baudrate,
            config.read_timeout_ms
        );
        Ok(())
    }
}
