//! Device-facing facade
//!
//! Usage:
//! ```ignore
//! let mut station = Station::new(uart, delay, LinkConfig::default());
//! station.initiate()?;          // apply bit rate and read timeout
//! station.establish_contact()?; // wait for the host
//! loop {
//!     let forces = read_load_cells();
//!     station.write(&forces, forces.len())?;
//! }
//! ```

use embedded_hal::delay::DelayNs;
use loadlink_hal::ConfigurableStream;

use crate::config::LinkConfig;
use crate::link::{LinkError, LinkProtocol, LinkState};

/// One link bound to one configurable stream
///
/// Adds line configuration on top of [`LinkProtocol`]; everything else is
/// direct delegation.
pub struct Station<S, D> {
    link: LinkProtocol<S, D>,
    initiated: bool,
}

impl<S: ConfigurableStream, D: DelayNs> Station<S, D> {
    /// Bind a stream; nothing is sent or configured yet
    pub fn new(stream: S, delay: D, config: LinkConfig) -> Self {
        Self {
            link: LinkProtocol::with_config(stream, delay, config),
            initiated: false,
        }
    }

    /// Apply the line configuration
    ///
    /// Only the first call touches the stream.
    pub fn initiate(&mut self) -> Result<(), LinkError<S::Error>> {
        if self.initiated {
            return Ok(());
        }
        let uart = self.link.config().uart;
        self.link.stream_mut().configure(&uart)?;
        self.initiated = true;
        Ok(())
    }

    /// Whether [`initiate`](Station::initiate) has run
    pub fn is_initiated(&self) -> bool {
        self.initiated
    }

    /// See [`LinkProtocol::establish`]
    pub fn establish_contact(&mut self) -> Result<(), LinkError<S::Error>> {
        self.link.establish()
    }

    /// See [`LinkProtocol::diagnostic_print`]
    pub fn print(&mut self, data: &[f32], count: usize) -> Result<(), LinkError<S::Error>> {
        self.link.diagnostic_print(data, count)
    }

    /// See [`LinkProtocol::write`]
    pub fn write(&mut self, data: &[f32], count: usize) -> Result<(), LinkError<S::Error>> {
        self.link.write(data, count)
    }

    /// Current connection state
    pub fn state(&self) -> LinkState {
        self.link.state()
    }

    /// Access the underlying link
    pub fn link(&self) -> &LinkProtocol<S, D> {
        &self.link
    }

    /// Unwrap the underlying link
    pub fn into_link(self) -> LinkProtocol<S, D> {
        self.link
    }
}
