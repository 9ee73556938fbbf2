//! LoadLink Hardware Abstraction Layer
//!
//! This crate defines the serial capability the protocol core is written
//! against. Chip HALs, host serial ports and test fakes all implement the
//! same trait, so the protocol never touches a concrete transport.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  loadlink-protocol (state machine)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  loadlink-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┼───────────────┐
//!         ▼           ▼               ▼
//! ┌─────────────┐ ┌──────────────┐ ┌────────────┐
//! │  IoStream   │ │ serialport   │ │ MockStream │
//! │ (embedded)  │ │ (host)       │ │ (tests)    │
//! └─────────────┘ └──────────────┘ └────────────┘
//! ```
//!
//! # Traits
//!
//! - [`stream::SerialStream`] - byte-level read/write with an "available" predicate
//! - [`stream::ConfigurableStream`] - one-time line configuration (bit rate, read timeout)

#![no_std]
#![deny(unsafe_code)]

pub mod io;
#[cfg(feature = "mock")]
pub mod mock;
pub mod stream;
pub mod uart;

// Re-export key types at crate root for convenience
pub use io::IoStream;
pub use stream::{ConfigurableStream, SerialStream};
pub use uart::UartConfig;
