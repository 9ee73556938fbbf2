//! UART line configuration
//!
//! Bit rate and read timeout are fixed at startup and applied once,
//! before the link is used.

/// Default bit rate of the sample link
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// Default read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u32 = 10;

/// UART configuration
///
/// Framing is always 8 data bits, no parity, one stop bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Read timeout in milliseconds
    pub read_timeout_ms: u32,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUDRATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl UartConfig {
    /// Config with the given bit rate and the default read timeout
    pub fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_115200() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 115_200);
        assert_eq!(config.read_timeout_ms, 10);
    }

    #[test]
    fn test_with_baudrate_keeps_timeout() {
        let config = UartConfig::with_baudrate(9600);
        assert_eq!(config.baudrate, 9600);
        assert_eq!(config.read_timeout_ms, DEFAULT_READ_TIMEOUT_MS);
    }
}
