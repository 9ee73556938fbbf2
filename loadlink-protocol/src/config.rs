//! Link configuration
//!
//! Fixed at startup; nothing here is tunable once the link is running.

use loadlink_hal::UartConfig;

/// Default pause between ready signals
pub const DEFAULT_READY_INTERVAL_MS: u32 = 200;

/// How long [`establish`](crate::LinkProtocol::establish) keeps signalling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    /// Give up after this many ready signals (`None` = never)
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Signal until the host answers, however long that takes
    pub const fn unbounded() -> Self {
        Self { max_attempts: None }
    }

    /// Give up after `attempts` ready signals
    pub const fn bounded(attempts: u32) -> Self {
        Self {
            max_attempts: Some(attempts),
        }
    }

    /// Whether `attempts` signals without an answer exhaust the policy
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// Device-side link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkConfig {
    /// Line settings applied once by [`Station::initiate`](crate::Station::initiate)
    pub uart: UartConfig,
    /// Pause between ready signals (ms)
    pub ready_interval_ms: u32,
    /// Connection retry bound
    pub retry: RetryPolicy,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            uart: UartConfig::default(),
            ready_interval_ms: DEFAULT_READY_INTERVAL_MS,
            retry: RetryPolicy::unbounded(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.ready_interval_ms, 200);
        assert_eq!(config.uart.baudrate, 115_200);
        assert_eq!(config.uart.read_timeout_ms, 10);
        assert_eq!(config.retry, RetryPolicy::unbounded());
    }

    #[test]
    fn test_unbounded_never_exhausts() {
        assert!(!RetryPolicy::unbounded().is_exhausted(u32::MAX));
    }

    #[test]
    fn test_bounded_exhausts_at_limit() {
        let policy = RetryPolicy::bounded(3);
        assert!(!policy.is_exhausted(2));
        assert!(policy.is_exhausted(3));
    }
}
