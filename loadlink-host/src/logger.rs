//! Host logging loop
//!
//! Drives the host half of the protocol over any [`SerialStream`]:
//!
//! 1. wait for the device's ready signal, send 'H'
//! 2. collect one sample, record it, send 'H' again
//!
//! Stale input is discarded before every 'H', so ready signals left over
//! from a device reset never leak into the next frame.
//! 3. on shutdown send 'Q' so the device drops back to its handshake

use crate::error::{HostError, Result};
use crate::recorder::Recorder;
use loadlink_hal::SerialStream;
use loadlink_protocol::{HostEvent, HostSession, HostState};
use std::io::Write;
use std::time::{Duration, Instant};

/// Host side of one logging session
pub struct Logger<S, W: Write> {
    stream: S,
    session: HostSession,
    recorder: Recorder<W>,
    labels: Vec<String>,
    contact_at: Option<Instant>,
    malformed: u64,
}

impl<S, W> Logger<S, W>
where
    S: SerialStream,
    HostError: From<S::Error>,
    W: Write,
{
    /// Create a logger; nothing is sent until the device signals
    pub fn new(stream: S, recorder: Recorder<W>, labels: Vec<String>) -> Result<Self> {
        let session = HostSession::new(labels.len())?;
        Ok(Self {
            stream,
            session,
            recorder,
            labels,
            contact_at: None,
            malformed: 0,
        })
    }

    /// Whether the device has been contacted
    pub fn is_streaming(&self) -> bool {
        self.session.state() == HostState::Streaming
    }

    /// Time since contact
    pub fn elapsed(&self) -> Option<Duration> {
        self.contact_at.map(|t| t.elapsed())
    }

    /// Samples recorded so far
    pub fn samples(&self) -> u64 {
        self.recorder.rows()
    }

    /// Frames dropped because a line did not parse
    pub fn malformed(&self) -> u64 {
        self.malformed
    }

    /// Borrow the stream
    pub fn stream(&self) -> &S {
        &self.stream
    }

    /// Mutably borrow the stream
    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Process everything currently waiting on the stream
    ///
    /// Never blocks. Returns the number of samples recorded.
    pub fn poll(&mut self) -> Result<usize> {
        let mut recorded = 0;

        while let Some(byte) = self.stream.read_byte()? {
            match self.session.feed(byte) {
                Some(HostEvent::Contact) => self.on_contact()?,
                Some(HostEvent::Sample(values)) => {
                    self.on_sample(&values)?;
                    recorded += 1;
                }
                Some(HostEvent::Malformed { bad_lines }) => {
                    self.malformed += 1;
                    log::warn!("Dropped sample with {} unparseable line(s)", bad_lines);
                    self.request()?;
                }
                None => {}
            }
        }

        Ok(recorded)
    }

    /// Send 'Q', flush the recording and hand back the writer
    pub fn shutdown(mut self) -> Result<(S, W)> {
        let quit = self.session.disconnect();
        self.stream.write_bytes(&[quit])?;
        self.stream.flush()?;
        self.recorder.flush()?;

        log::info!(
            "Session closed: {} samples recorded, {} dropped",
            self.recorder.rows(),
            self.malformed
        );
        Ok((self.stream, self.recorder.into_inner()))
    }

    fn on_contact(&mut self) -> Result<()> {
        log::info!("Connection established");
        self.contact_at = Some(Instant::now());
        self.request()
    }

    fn on_sample(&mut self, values: &[f32]) -> Result<()> {
        let elapsed = self.elapsed().unwrap_or_default().as_secs_f64();
        self.recorder.record(elapsed, values)?;

        let summary = self
            .labels
            .iter()
            .zip(values)
            .map(|(label, value)| format!("{}: {:.2}", label, value))
            .collect::<Vec<_>>()
            .join(", ");
        log::info!("{}", summary);

        self.request()
    }

    fn request(&mut self) -> Result<()> {
        self.discard_input()?;
        self.stream.write_bytes(&[self.session.request()])?;
        self.stream.flush()?;
        Ok(())
    }

    fn discard_input(&mut self) -> Result<()> {
        let mut stale = 0usize;
        while self.stream.read_byte()?.is_some() {
            stale += 1;
        }
        if stale > 0 {
            log::debug!("Discarded {} stale byte(s)", stale);
        }
        Ok(())
    }
}
