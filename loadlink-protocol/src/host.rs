//! Host side of the sample link
//!
//! [`HostSession`] is fed raw bytes from the serial port and reports
//! protocol events. It never touches the port itself: on
//! [`HostEvent::Contact`] and after every completed sample the caller
//! sends [`HANDSHAKE`] to request the next one.
//!
//! ```text
//!   ┌─────────────────┐   'C'    ┌───────────┐
//!   │ AwaitingContact │ ───────▶ │ Streaming │ ──┐ line → value
//!   └─────────────────┘          └───────────┘ ◀─┘ N values → Sample
//!            ▲                         │
//!            └────── disconnect() ─────┘
//! ```

use heapless::Vec;

use crate::command::{HANDSHAKE, QUIT, READY_SIGNAL};

/// Most channels one sample can carry
pub const MAX_CHANNELS: usize = 16;

/// Longest accepted data line, terminator excluded
pub const MAX_LINE_LEN: usize = 32;

/// One decoded sample vector
pub type Sample = Vec<f32, MAX_CHANNELS>;

/// Session construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// Channel count is zero or above [`MAX_CHANNELS`]
    InvalidChannelCount(usize),
}

/// Host session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostState {
    /// Listening for the device's ready signal
    AwaitingContact,
    /// Collecting data lines
    Streaming,
}

/// Protocol events reported by [`HostSession::feed`]
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Device is signalling; discard stale input and send [`HANDSHAKE`]
    Contact,
    /// A full sample arrived; send [`HANDSHAKE`] for the next one
    Sample(Sample),
    /// A full sample's worth of lines arrived but some did not parse
    Malformed {
        /// Lines that failed to parse
        bad_lines: usize,
    },
}

/// Byte-fed decoder for the host half of the protocol
#[derive(Debug, Clone)]
pub struct HostSession {
    channel_count: usize,
    state: HostState,
    line: Vec<u8, MAX_LINE_LEN>,
    line_overflow: bool,
    pending: Sample,
    lines_seen: usize,
    bad_lines: usize,
}

impl HostSession {
    /// Create a session expecting `channel_count` values per sample
    pub fn new(channel_count: usize) -> Result<Self, SessionError> {
        if channel_count == 0 || channel_count > MAX_CHANNELS {
            return Err(SessionError::InvalidChannelCount(channel_count));
        }

        Ok(Self {
            channel_count,
            state: HostState::AwaitingContact,
            line: Vec::new(),
            line_overflow: false,
            pending: Vec::new(),
            lines_seen: 0,
            bad_lines: 0,
        })
    }

    /// Values expected per sample
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Current state
    pub fn state(&self) -> HostState {
        self.state
    }

    /// Byte requesting the next sample
    pub fn request(&self) -> u8 {
        HANDSHAKE
    }

    /// Drop back to waiting for contact
    ///
    /// Returns the byte to send so the device restarts its handshake.
    pub fn disconnect(&mut self) -> u8 {
        self.state = HostState::AwaitingContact;
        self.reset_frame();
        QUIT
    }

    /// Feed one received byte
    pub fn feed(&mut self, byte: u8) -> Option<HostEvent> {
        match self.state {
            HostState::AwaitingContact => {
                if byte == READY_SIGNAL {
                    self.state = HostState::Streaming;
                    self.reset_frame();
                    return Some(HostEvent::Contact);
                }
                None
            }
            HostState::Streaming => match byte {
                b'\r' => None,
                b'\n' => self.finish_line(),
                _ => {
                    if self.line.push(byte).is_err() {
                        self.line_overflow = true;
                    }
                    None
                }
            },
        }
    }

    fn finish_line(&mut self) -> Option<HostEvent> {
        match self.parse_line() {
            Some(value) => {
                // Capacity is channel_count <= MAX_CHANNELS
                let _ = self.pending.push(value);
            }
            None => self.bad_lines += 1,
        }
        self.line.clear();
        self.line_overflow = false;
        self.lines_seen += 1;

        if self.lines_seen < self.channel_count {
            return None;
        }

        let event = if self.bad_lines == 0 {
            HostEvent::Sample(self.pending.clone())
        } else {
            HostEvent::Malformed {
                bad_lines: self.bad_lines,
            }
        };
        self.reset_frame();
        Some(event)
    }

    fn parse_line(&self) -> Option<f32> {
        if self.line_overflow {
            return None;
        }
        let text = core::str::from_utf8(&self.line).ok()?;
        // Ready signals sent just before the host answered end up in
        // front of the first line
        let text = text.trim().trim_start_matches(READY_SIGNAL as char);
        text.parse::<f32>().ok()
    }

    fn reset_frame(&mut self) {
        self.line.clear();
        self.line_overflow = false;
        self.pending.clear();
        self.lines_seen = 0;
        self.bad_lines = 0;
    }
}
