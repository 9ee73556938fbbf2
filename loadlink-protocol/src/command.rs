//! Command bytes exchanged on the link
//!
//! - Device → Host: [`READY_SIGNAL`] while waiting for contact
//! - Host → Device: [`HANDSHAKE`] to request a sample, [`QUIT`] to restart

/// Ready signal repeated by the device until the host answers
pub const READY_SIGNAL: u8 = b'C';

/// Host request: send the current sample now
pub const HANDSHAKE: u8 = b'H';

/// Host request: disconnect and restart the handshake
pub const QUIT: u8 = b'Q';

/// Decoded host command
///
/// The command set is open: unknown bytes are carried through so callers
/// can log them, but the link ignores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Send one sample vector
    Handshake,
    /// Return to the disconnected state
    Quit,
    /// Anything else
    Unknown(u8),
}

impl Command {
    /// Decode a command byte
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            HANDSHAKE => Command::Handshake,
            QUIT => Command::Quit,
            other => Command::Unknown(other),
        }
    }

    /// Wire byte for this command
    pub fn as_byte(self) -> u8 {
        match self {
            Command::Handshake => HANDSHAKE,
            Command::Quit => QUIT,
            Command::Unknown(byte) => byte,
        }
    }
}

impl From<u8> for Command {
    fn from(byte: u8) -> Self {
        Command::from_byte(byte)
    }
}
