//! `embedded-io` adapter
//!
//! Chip HAL UARTs (embassy buffered UARTs and friends) implement the
//! `embedded-io` traits. [`IoStream`] turns any such peripheral into a
//! [`SerialStream`].

use embedded_io::{Read, ReadReady, Write};

use crate::stream::SerialStream;

/// [`SerialStream`] over an `embedded-io` reader/writer
///
/// `ReadReady` only tells whether at least one byte is waiting, so
/// [`bytes_available`](SerialStream::bytes_available) reports `0` or `1`.
pub struct IoStream<T> {
    inner: T,
}

impl<T> IoStream<T> {
    /// Wrap an `embedded-io` peripheral
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Access the wrapped peripheral
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwrap the peripheral
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> SerialStream for IoStream<T>
where
    T: Read + ReadReady + Write,
{
    type Error = T::Error;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        Ok(usize::from(self.inner.read_ready()?))
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if !self.inner.read_ready()? {
            return Ok(None);
        }

        let mut buf = [0u8; 1];
        match self.inner.read(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}
