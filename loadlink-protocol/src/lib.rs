//! LoadLink sample link protocol
//!
//! A half-duplex, byte-oriented handshake for streaming sample vectors
//! (load-cell forces, temperatures, ...) from a device to a host over a
//! serial line. The device side is [`LinkProtocol`]; the host side is
//! [`HostSession`].
//!
//! # Protocol Overview
//!
//! ```text
//!  Device                                Host
//!    │── 'C' ──────────────────────────────▶│  every 200 ms until the host
//!    │── 'C' ──────────────────────────────▶│  sends anything
//!    │◀──────────────────────────────── 'H' ─│  request one sample
//!    │── "1.000\r\n" "2.500\r\n" ... ──────▶│  one line per value
//!    │◀──────────────────────────────── 'H' ─│
//!    │── ... ──────────────────────────────▶│
//!    │◀──────────────────────────────── 'Q' ─│  drop back to handshake
//!    │── 'C' ──────────────────────────────▶│
//! ```
//!
//! The host paces every transmission: the device only answers when a
//! command byte is waiting, and never blocks otherwise.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod config;
pub mod format;
pub mod host;
pub mod link;
pub mod station;

pub use command::{Command, HANDSHAKE, QUIT, READY_SIGNAL};
pub use config::{LinkConfig, RetryPolicy};
pub use host::{HostEvent, HostSession, HostState, Sample, SessionError, MAX_CHANNELS};
pub use link::{EstablishStep, Exchange, LinkError, LinkProtocol, LinkState};
pub use station::Station;

pub use loadlink_hal::{ConfigurableStream, SerialStream, UartConfig};
