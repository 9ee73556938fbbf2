//! Device-side link state machine
//!
//! ```text
//!               establish / establish_step
//!   ┌──────────────┐  (byte available)  ┌───────────┐
//!   │ Disconnected │ ─────────────────▶ │ Connected │
//!   └──────────────┘ ◀───────────────── └───────────┘
//!                       'Q' during write
//! ```
//!
//! The connection state only records whether the device believes it is
//! synchronized with a host. Writes are gated by the host's command byte,
//! not by the state.

use core::fmt;

use embedded_hal::delay::DelayNs;
use loadlink_hal::SerialStream;

use crate::command::{Command, READY_SIGNAL};
use crate::config::LinkConfig;
use crate::format;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// Waiting for the host to answer the ready signal
    #[default]
    Disconnected,
    /// Host answered; samples flow on request
    Connected,
}

/// Errors surfaced by the link
///
/// Protocol conditions (silence, unknown commands) are never errors; only
/// the transport and an exhausted retry bound are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// Underlying stream failed
    Stream(E),
    /// Retry bound reached without an answer from the host
    NoResponse {
        /// Ready signals sent
        attempts: u32,
    },
}

impl<E> From<E> for LinkError<E> {
    fn from(err: E) -> Self {
        LinkError::Stream(err)
    }
}

impl<E: fmt::Debug> fmt::Display for LinkError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Stream(err) => write!(f, "stream error: {:?}", err),
            LinkError::NoResponse { attempts } => {
                write!(f, "no response after {} ready signals", attempts)
            }
        }
    }
}

/// Result of one establishment poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EstablishStep {
    /// Nothing pending; one ready signal was sent
    Signalled,
    /// Host answered; the pending byte was left unread
    Connected,
}

/// Result of one gated write attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Exchange {
    /// No command pending; nothing read or written
    Idle,
    /// Handshake answered with this many lines
    Sent(usize),
    /// Quit received; the link is now disconnected
    Quit,
    /// Unrecognized command byte, discarded
    Ignored(u8),
}

/// Device side of the sample link
///
/// Owns the stream exclusively for its whole lifetime; [`release`]
/// hands it back.
///
/// [`release`]: LinkProtocol::release
pub struct LinkProtocol<S, D> {
    stream: S,
    delay: D,
    config: LinkConfig,
    state: LinkState,
}

impl<S: SerialStream, D> LinkProtocol<S, D> {
    /// Create a link with the default configuration
    pub fn new(stream: S, delay: D) -> Self {
        Self::with_config(stream, delay, LinkConfig::default())
    }

    /// Create a link with an explicit configuration
    pub fn with_config(stream: S, delay: D, config: LinkConfig) -> Self {
        Self {
            stream,
            delay,
            config,
            state: LinkState::Disconnected,
        }
    }

    /// Current connection state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Whether the host has answered the ready signal
    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Link configuration
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Borrow the stream
    pub fn stream(&self) -> &S {
        &self.stream
    }

    /// Mutably borrow the stream
    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Give back the stream and delay
    pub fn release(self) -> (S, D) {
        (self.stream, self.delay)
    }

    /// One establishment poll
    ///
    /// If the host has sent anything, the link becomes connected and the
    /// byte stays in the stream for the next read. Otherwise one ready
    /// signal is written. The caller owns the pacing between polls.
    pub fn establish_step(&mut self) -> Result<EstablishStep, LinkError<S::Error>> {
        if self.stream.bytes_available()? > 0 {
            if self.state != LinkState::Connected {
                #[cfg(feature = "defmt")]
                defmt::debug!("Host answered, link connected");
            }
            self.state = LinkState::Connected;
            return Ok(EstablishStep::Connected);
        }

        self.stream.write_bytes(&[READY_SIGNAL])?;
        self.stream.flush()?;
        Ok(EstablishStep::Signalled)
    }

    /// Async establishment for executor-driven firmware
    ///
    /// Same loop as [`establish`](LinkProtocol::establish), yielding to
    /// the executor between ready signals.
    pub async fn establish_async<A>(&mut self, delay: &mut A) -> Result<(), LinkError<S::Error>>
    where
        A: embedded_hal_async::delay::DelayNs,
    {
        self.state = LinkState::Disconnected;
        let mut attempts = 0u32;

        loop {
            match self.establish_step()? {
                EstablishStep::Connected => return Ok(()),
                EstablishStep::Signalled => {
                    attempts = attempts.saturating_add(1);
                    self.check_retry(attempts)?;
                    delay.delay_ms(self.config.ready_interval_ms).await;
                }
            }
        }
    }

    /// Print the human-readable diagnostic line
    ///
    /// Unconditional: no handshake, no reads, no state change. Fields run
    /// over `0..=count`, one past the data lines; see [`format`].
    pub fn diagnostic_print(
        &mut self,
        data: &[f32],
        count: usize,
    ) -> Result<(), LinkError<S::Error>> {
        format::write_diagnostic_line(&mut self.stream, data, count)?;
        self.stream.flush()?;
        Ok(())
    }

    /// One gated write attempt that never blocks
    ///
    /// Reads at most one byte. On [`Exchange::Quit`] the link is left
    /// disconnected; the caller drives [`establish_step`] (or
    /// [`establish`]) to reconnect.
    ///
    /// [`establish_step`]: LinkProtocol::establish_step
    /// [`establish`]: LinkProtocol::establish
    pub fn exchange(&mut self, data: &[f32], count: usize) -> Result<Exchange, LinkError<S::Error>> {
        if self.stream.bytes_available()? == 0 {
            return Ok(Exchange::Idle);
        }

        let Some(byte) = self.stream.read_byte()? else {
            return Ok(Exchange::Idle);
        };

        match Command::from_byte(byte) {
            Command::Handshake => {
                let lines = format::write_data_lines(&mut self.stream, data, count)?;
                self.stream.flush()?;
                #[cfg(feature = "defmt")]
                defmt::trace!("Sent sample: {} lines", lines);
                Ok(Exchange::Sent(lines))
            }
            Command::Quit => {
                #[cfg(feature = "defmt")]
                defmt::debug!("Quit received, link disconnected");
                self.state = LinkState::Disconnected;
                Ok(Exchange::Quit)
            }
            Command::Unknown(other) => {
                #[cfg(feature = "defmt")]
                defmt::trace!("Ignoring command byte {=u8:#x}", other);
                Ok(Exchange::Ignored(other))
            }
        }
    }

    fn check_retry(&self, attempts: u32) -> Result<(), LinkError<S::Error>> {
        if self.config.retry.is_exhausted(attempts) {
            #[cfg(feature = "defmt")]
            defmt::warn!("No answer after {} ready signals", attempts);
            return Err(LinkError::NoResponse { attempts });
        }
        Ok(())
    }
}

impl<S: SerialStream, D: DelayNs> LinkProtocol<S, D> {
    /// Block until the host answers
    ///
    /// Sends the ready signal every `ready_interval_ms` while nothing is
    /// pending. Unbounded unless the configured [`RetryPolicy`] says
    /// otherwise. The answering byte is not consumed.
    ///
    /// [`RetryPolicy`]: crate::RetryPolicy
    pub fn establish(&mut self) -> Result<(), LinkError<S::Error>> {
        self.state = LinkState::Disconnected;
        let mut attempts = 0u32;

        loop {
            match self.establish_step()? {
                EstablishStep::Connected => return Ok(()),
                EstablishStep::Signalled => {
                    attempts = attempts.saturating_add(1);
                    self.check_retry(attempts)?;
                    self.delay.delay_ms(self.config.ready_interval_ms);
                }
            }
        }
    }

    /// Gated write
    ///
    /// - nothing pending: returns at once
    /// - `'H'`: sends `data[..count]`, one value per line
    /// - `'Q'`: re-runs [`establish`](LinkProtocol::establish) before returning
    /// - anything else: discarded
    pub fn write(&mut self, data: &[f32], count: usize) -> Result<(), LinkError<S::Error>> {
        if self.exchange(data, count)? == Exchange::Quit {
            self.establish()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use loadlink_hal::mock::{MockError, MockStream};

    /// Records requested delays instead of sleeping
    #[derive(Default)]
    struct MockDelay {
        calls: usize,
        total_ns: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.calls += 1;
            self.total_ns += u64::from(ns);
        }
    }

    impl embedded_hal_async::delay::DelayNs for MockDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.calls += 1;
            self.total_ns += u64::from(ns);
        }
    }

    fn link(stream: MockStream) -> LinkProtocol<MockStream, MockDelay> {
        LinkProtocol::new(stream, MockDelay::default())
    }

    fn count(tx: &[u8], byte: u8) -> usize {
        tx.iter().filter(|&&b| b == byte).count()
    }

    #[test]
    fn test_starts_disconnected() {
        let link = link(MockStream::new());
        assert_eq!(link.state(), LinkState::Disconnected);
        assert!(!link.is_connected());
    }

    #[test]
    fn test_establish_signals_once_per_empty_poll() {
        let mut stream = MockStream::new();
        stream.push_rx(b"H");
        stream.mute_polls(4);

        let mut link = link(stream);
        link.establish().unwrap();

        assert!(link.is_connected());
        let (stream, delay) = link.release();
        assert_eq!(stream.tx(), b"CCCC");
        assert_eq!(stream.flushes(), 4);
        assert_eq!(stream.polls(), 5);
        assert_eq!(delay.calls, 4);
        assert_eq!(delay.total_ns, 4 * 200 * 1_000_000);
    }

    #[test]
    fn test_establish_does_not_consume_answer() {
        let mut stream = MockStream::new();
        stream.push_rx(b"H");

        let mut link = link(stream);
        link.establish().unwrap();

        assert!(link.is_connected());
        assert_eq!(link.stream().rx_pending(), 1);
        assert_eq!(link.stream().reads(), 0);
        assert!(link.stream().tx().is_empty());
    }

    #[test]
    fn test_establish_uses_configured_interval() {
        let mut stream = MockStream::new();
        stream.push_rx(b"x");
        stream.mute_polls(2);

        let config = LinkConfig {
            ready_interval_ms: 50,
            ..LinkConfig::default()
        };
        let mut link = LinkProtocol::with_config(stream, MockDelay::default(), config);
        link.establish().unwrap();

        let (_, delay) = link.release();
        assert_eq!(delay.total_ns, 2 * 50 * 1_000_000);
    }

    #[test]
    fn test_establish_bounded_gives_up() {
        let config = LinkConfig {
            retry: RetryPolicy::bounded(3),
            ..LinkConfig::default()
        };
        let mut link = LinkProtocol::with_config(MockStream::new(), MockDelay::default(), config);

        assert_eq!(link.establish(), Err(LinkError::NoResponse { attempts: 3 }));
        assert_eq!(link.state(), LinkState::Disconnected);
        assert_eq!(link.stream().tx(), b"CCC");
    }

    #[test]
    fn test_establish_step_is_single_poll() {
        let mut link = link(MockStream::new());

        assert_eq!(link.establish_step().unwrap(), EstablishStep::Signalled);
        assert_eq!(link.establish_step().unwrap(), EstablishStep::Signalled);
        assert_eq!(link.state(), LinkState::Disconnected);

        link.stream_mut().push_rx(b"H");
        assert_eq!(link.establish_step().unwrap(), EstablishStep::Connected);
        assert!(link.is_connected());
        assert_eq!(link.stream().tx(), b"CC");
    }

    #[test]
    fn test_establish_async() {
        let mut stream = MockStream::new();
        stream.push_rx(b"H");
        stream.mute_polls(2);

        let mut link = link(stream);
        let mut delay = MockDelay::default();
        embassy_futures::block_on(link.establish_async(&mut delay)).unwrap();

        assert!(link.is_connected());
        assert_eq!(link.stream().tx(), b"CC");
        assert_eq!(link.stream().flushes(), 2);
        assert_eq!(delay.calls, 2);
    }

    #[test]
    fn test_establish_async_bounded_gives_up() {
        let config = LinkConfig {
            retry: RetryPolicy::bounded(2),
            ..LinkConfig::default()
        };
        let mut link = LinkProtocol::with_config(MockStream::new(), MockDelay::default(), config);
        let mut delay = MockDelay::default();

        assert_eq!(
            embassy_futures::block_on(link.establish_async(&mut delay)),
            Err(LinkError::NoResponse { attempts: 2 })
        );
        assert_eq!(link.state(), LinkState::Disconnected);
        assert_eq!(link.stream().tx(), b"CC");
        // No pause after the last ready signal
        assert_eq!(delay.calls, 1);
    }

    #[test]
    fn test_write_noop_without_pending_byte() {
        let mut link = link(MockStream::new());
        link.write(&[1.0, 2.0], 2).unwrap();

        assert_eq!(link.stream().reads(), 0);
        assert_eq!(link.stream().writes(), 0);
        assert_eq!(link.state(), LinkState::Disconnected);
    }

    #[test]
    fn test_handshake_sends_one_line_per_value() {
        let mut stream = MockStream::new();
        stream.push_rx(b"H");

        let mut link = link(stream);
        link.establish().unwrap();
        link.write(&[1.0, 2.5, 3.125], 3).unwrap();

        assert_eq!(link.stream().tx(), b"1.000\r\n2.500\r\n3.125\r\n");
        assert_eq!(link.stream().flushes(), 1);
        assert_eq!(link.stream().reads(), 1);
        assert!(link.is_connected());
    }

    #[test]
    fn test_handshake_answers_each_request_once() {
        let mut stream = MockStream::new();
        stream.push_rx(b"HH");

        let mut link = link(stream);
        assert_eq!(link.exchange(&[7.0], 1).unwrap(), Exchange::Sent(1));
        assert_eq!(link.exchange(&[8.0], 1).unwrap(), Exchange::Sent(1));
        assert_eq!(link.exchange(&[9.0], 1).unwrap(), Exchange::Idle);

        assert_eq!(link.stream().tx(), b"7.000\r\n8.000\r\n");
        assert_eq!(link.stream().flushes(), 2);
    }

    #[test]
    fn test_handshake_pads_short_sample() {
        let mut stream = MockStream::new();
        stream.push_rx(b"H");

        let mut link = link(stream);
        assert_eq!(link.exchange(&[1.0, 2.0], 3).unwrap(), Exchange::Sent(3));
        assert_eq!(link.stream().tx(), b"1.000\r\n2.000\r\n0.000\r\n");
    }

    #[test]
    fn test_write_quit_runs_connect_loop() {
        let mut stream = MockStream::new();
        stream.push_rx(b"QH");
        stream.mute_after_read(2);

        let mut link = link(stream);
        link.write(&[1.0, 2.0], 2).unwrap();

        // Two silent polls after 'Q' -> two ready signals, then 'H' seen
        assert_eq!(link.stream().tx(), b"CC");
        assert!(link.is_connected());
        assert_eq!(link.stream().rx_pending(), 1);
    }

    #[test]
    fn test_exchange_quit_does_not_block() {
        let mut stream = MockStream::new();
        stream.push_rx(b"Q");

        let mut link = link(stream);
        link.establish().unwrap();
        assert_eq!(link.exchange(&[1.0], 1).unwrap(), Exchange::Quit);
        assert_eq!(link.state(), LinkState::Disconnected);
        assert!(link.stream().tx().is_empty());
    }

    #[test]
    fn test_unknown_byte_is_inert() {
        let mut stream = MockStream::new();
        stream.push_rx(b"Z");

        let mut link = link(stream);
        link.establish().unwrap();
        assert_eq!(link.exchange(&[1.0], 1).unwrap(), Exchange::Ignored(0x5A));

        assert!(link.stream().tx().is_empty());
        assert_eq!(link.stream().flushes(), 0);
        assert!(link.is_connected());
        assert_eq!(link.stream().rx_pending(), 0);
    }

    #[test]
    fn test_write_ignores_connection_state() {
        let mut stream = MockStream::new();
        stream.push_rx(b"H");

        let mut link = link(stream);
        link.write(&[0.5], 1).unwrap();

        assert_eq!(link.stream().tx(), b"0.500\r\n");
        assert_eq!(link.state(), LinkState::Disconnected);
    }

    #[test]
    fn test_diagnostic_print_off_by_one() {
        let mut link = link(MockStream::new());
        link.diagnostic_print(&[1.0, 2.0], 1).unwrap();

        assert_eq!(link.stream().tx(), b"param0=1.000 || param1=2.000 || \r\n");
        assert_eq!(link.stream().flushes(), 1);
        assert_eq!(link.stream().reads(), 0);
        assert_eq!(link.stream().polls(), 0);
    }

    #[test]
    fn test_diagnostic_print_past_end_does_not_panic() {
        let mut link = link(MockStream::new());
        link.diagnostic_print(&[1.0, 2.0], 2).unwrap();

        assert_eq!(
            link.stream().tx(),
            b"param0=1.000 || param1=2.000 || param2=0.000 || \r\n"
        );
    }

    #[test]
    fn test_diagnostic_print_idempotent() {
        let data = [3.5, -1.25, 0.0];

        let mut link = link(MockStream::new());
        link.diagnostic_print(&data, 2).unwrap();
        let mut first = [0u8; 128];
        let len = link.stream().tx().len();
        first[..len].copy_from_slice(link.stream().tx());

        link.stream_mut().clear_tx();
        link.diagnostic_print(&data, 2).unwrap();
        assert_eq!(link.stream().tx(), &first[..len]);
    }

    #[test]
    fn test_diagnostic_print_leaves_state_alone() {
        let mut stream = MockStream::new();
        stream.push_rx(b"H");

        let mut link = link(stream);
        link.establish().unwrap();
        link.diagnostic_print(&[1.0], 0).unwrap();

        assert!(link.is_connected());
        assert_eq!(link.stream().rx_pending(), 1);
    }

    #[test]
    fn test_stream_error_propagates() {
        let mut stream = MockStream::new();
        stream.fail_writes();

        let mut link = link(stream);
        assert_eq!(
            link.establish(),
            Err(LinkError::Stream(MockError::WriteFailed))
        );
    }
}
