//! In-memory serial stream for tests
//!
//! Inbound bytes are queued with [`MockStream::push_rx`]; everything the
//! code under test writes is captured in [`MockStream::tx`]. Polls can be
//! muted to simulate a peer that has not answered yet.

use heapless::{Deque, Vec};

use crate::stream::{ConfigurableStream, SerialStream};
use crate::uart::UartConfig;

/// Capacity of the inbound queue
pub const MOCK_RX_CAPACITY: usize = 64;

/// Capacity of the captured outbound bytes
pub const MOCK_TX_CAPACITY: usize = 2048;

/// Errors produced by [`MockStream`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MockError {
    /// Write rejected (injected failure)
    WriteFailed,
    /// Captured output is full
    TxOverflow,
}

/// Scriptable in-memory stream
#[derive(Debug, Default)]
pub struct MockStream {
    rx: Deque<u8, MOCK_RX_CAPACITY>,
    tx: Vec<u8, MOCK_TX_CAPACITY>,
    /// Polls that report nothing available regardless of `rx`
    silent_polls: usize,
    /// Silent polls armed after every successful read
    silence_after_read: usize,
    fail_writes: bool,
    polls: usize,
    reads: usize,
    writes: usize,
    flushes: usize,
    config: Option<UartConfig>,
    configure_calls: usize,
}

impl MockStream {
    /// Create an empty stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue inbound bytes
    ///
    /// # Panics
    /// If the inbound queue overflows (test setup error).
    pub fn push_rx(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            assert!(self.rx.push_back(byte).is_ok(), "mock rx queue full");
        }
    }

    /// Report zero available for the next `polls` availability checks
    pub fn mute_polls(&mut self, polls: usize) {
        self.silent_polls = polls;
    }

    /// After every byte read, report zero available for `polls` checks
    pub fn mute_after_read(&mut self, polls: usize) {
        self.silence_after_read = polls;
    }

    /// Make every subsequent write fail
    pub fn fail_writes(&mut self) {
        self.fail_writes = true;
    }

    /// Bytes written so far
    pub fn tx(&self) -> &[u8] {
        &self.tx
    }

    /// Forget captured output
    pub fn clear_tx(&mut self) {
        self.tx.clear();
    }

    /// Bytes still queued for reading
    pub fn rx_pending(&self) -> usize {
        self.rx.len()
    }

    /// Number of availability checks
    pub fn polls(&self) -> usize {
        self.polls
    }

    /// Number of bytes read
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Number of `write_bytes` calls
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Number of `flush` calls
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Last applied line configuration
    pub fn config(&self) -> Option<UartConfig> {
        self.config
    }

    /// Number of `configure` calls
    pub fn configure_calls(&self) -> usize {
        self.configure_calls
    }
}

impl SerialStream for MockStream {
    type Error = MockError;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        self.polls += 1;
        if self.silent_polls > 0 {
            self.silent_polls -= 1;
            return Ok(0);
        }
        Ok(self.rx.len())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        let byte = self.rx.pop_front();
        if byte.is_some() {
            self.reads += 1;
            self.silent_polls = self.silence_after_read;
        }
        Ok(byte)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MockError::WriteFailed);
        }
        self.writes += 1;
        self.tx
            .extend_from_slice(data)
            .map_err(|_| MockError::TxOverflow)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}

impl ConfigurableStream for MockStream {
    fn configure(&mut self, config: &UartConfig) -> Result<(), Self::Error> {
        self.configure_calls += 1;
        self.config = Some(*config);
        Ok(())
    }
}
