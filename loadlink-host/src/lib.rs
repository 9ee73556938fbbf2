//! LoadLink host logger
//!
//! Reads sample vectors from a LoadLink device over a serial port and
//! records them to CSV. The wire protocol lives in `loadlink-protocol`;
//! this crate adds the OS serial port, configuration and recording.

pub mod config;
pub mod error;
pub mod logger;
pub mod recorder;
pub mod serial;

pub use config::LoggerConfig;
pub use error::{HostError, Result};
pub use logger::Logger;
pub use recorder::Recorder;
pub use serial::SerialPortStream;
