//! Serial stream capability
//!
//! The protocol needs four things from a transport: how many bytes are
//! waiting, one byte at a time, write a buffer, flush. Everything else
//! (baud rate, buffering, interrupts) stays behind the implementation.

use crate::uart::UartConfig;

/// Duplex byte stream
///
/// Reads are opportunistic: [`read_byte`](SerialStream::read_byte) must not
/// block when nothing is pending.
pub trait SerialStream {
    /// Error type for stream operations
    type Error;

    /// Number of bytes waiting to be read
    ///
    /// Implementations that can only tell "something" from "nothing"
    /// report `1` or `0`.
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Read a single byte, `None` if nothing is pending
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Write all of `data` to the stream
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Stream whose line settings can be applied at startup
pub trait ConfigurableStream: SerialStream {
    /// Apply bit rate and read timeout
    fn configure(&mut self, config: &UartConfig) -> Result<(), Self::Error>;
}

impl<T: SerialStream + ?Sized> SerialStream for &mut T {
    type Error = T::Error;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        T::bytes_available(self)
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        T::read_byte(self)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::write_bytes(self, data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        T::flush(self)
    }
}

impl<T: ConfigurableStream + ?Sized> ConfigurableStream for &mut T {
    fn configure(&mut self, config: &UartConfig) -> Result<(), Self::Error> {
        T::configure(self, config)
    }
}
