//! Configuration for the host logger
//!
//! Loaded from a TOML file; every field has a default so an empty file is
//! a valid (two-channel, `experiment.csv`) configuration.
//!
//! ```toml
//! [serial]
//! port = "/dev/ttyACM0"
//! baud_rate = 115200
//!
//! [recording]
//! channel_names = ["Load Cell 1 (N)", "Load Cell 2 (N)"]
//! output = "experiment.csv"
//! max_duration_s = 10.0
//! ```

use crate::error::{HostError, Result};
use loadlink_hal::UartConfig;
use loadlink_protocol::MAX_CHANNELS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level logger configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub serial: SerialConfig,
    pub recording: RecordingConfig,
}

/// Serial port settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Serial port path (e.g. "/dev/ttyACM0", "COM4")
    pub port: String,
    /// Bit rate; must match the device
    pub baud_rate: u32,
    /// Read timeout (ms)
    pub read_timeout_ms: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyACM0".to_string(),
            baud_rate: 115_200,
            read_timeout_ms: 100,
        }
    }
}

impl SerialConfig {
    /// Line settings for [`ConfigurableStream::configure`](loadlink_hal::ConfigurableStream::configure)
    pub fn uart(&self) -> UartConfig {
        UartConfig {
            read_timeout_ms: self.read_timeout_ms,
            ..UartConfig::with_baudrate(self.baud_rate)
        }
    }
}

/// What to record and for how long
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Values per sample; must match the device
    pub channel_count: usize,
    /// Column headers; empty means "Channel 1", "Channel 2", ...
    pub channel_names: Vec<String>,
    /// CSV output file
    pub output: PathBuf,
    /// Stop after this many seconds (runs until Ctrl-C when absent)
    pub max_duration_s: Option<f64>,
    /// Pause between serial polls (ms)
    pub poll_interval_ms: u64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            channel_count: 2,
            channel_names: Vec::new(),
            output: PathBuf::from("experiment.csv"),
            max_duration_s: None,
            poll_interval_ms: 1,
        }
    }
}

impl RecordingConfig {
    /// Header for channel `index`
    pub fn channel_label(&self, index: usize) -> String {
        self.channel_names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("Channel {}", index + 1))
    }

    /// Headers for all channels
    pub fn channel_labels(&self) -> Vec<String> {
        (0..self.channel_count)
            .map(|i| self.channel_label(i))
            .collect()
    }

    /// Recording time limit, if any
    ///
    /// Fails for zero, negative, non-finite or unrepresentable limits.
    pub fn max_duration(&self) -> Result<Option<Duration>> {
        let Some(max) = self.max_duration_s else {
            return Ok(None);
        };
        let invalid = || {
            HostError::InvalidConfig(format!(
                "max_duration_s must be a positive finite number of seconds, got {}",
                max
            ))
        };
        if !max.is_finite() || max <= 0.0 {
            return Err(invalid());
        }
        Duration::try_from_secs_f64(max)
            .map(Some)
            .map_err(|_| invalid())
    }
}

impl LoggerConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config = Self::parse(&contents)?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: LoggerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that TOML types alone cannot
    pub fn validate(&self) -> Result<()> {
        let rec = &self.recording;
        if rec.channel_count == 0 || rec.channel_count > MAX_CHANNELS {
            return Err(HostError::InvalidConfig(format!(
                "channel_count must be 1..={}, got {}",
                MAX_CHANNELS, rec.channel_count
            )));
        }
        if !rec.channel_names.is_empty() && rec.channel_names.len() != rec.channel_count {
            return Err(HostError::InvalidConfig(format!(
                "{} channel_names given for {} channels",
                rec.channel_names.len(),
                rec.channel_count
            )));
        }
        if self.serial.baud_rate == 0 {
            return Err(HostError::InvalidConfig("baud_rate must be non-zero".into()));
        }
        rec.max_duration()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = LoggerConfig::parse("").unwrap();
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.recording.channel_count, 2);
        assert_eq!(config.recording.output, PathBuf::from("experiment.csv"));
        assert!(config.recording.max_duration_s.is_none());
    }

    #[test]
    fn test_parse_full_file() {
        let config = LoggerConfig::parse(
            r#"
            [serial]
            port = "COM4"
            baud_rate = 57600
            read_timeout_ms = 50

            [recording]
            channel_count = 2
            channel_names = ["Fz (N)", "Fx (N)"]
            output = "run1.csv"
            max_duration_s = 10.0
            "#,
        )
        .unwrap();

        assert_eq!(config.serial.port, "COM4");
        let uart = config.serial.uart();
        assert_eq!(uart.baudrate, 57_600);
        assert_eq!(uart.read_timeout_ms, 50);
        assert_eq!(config.recording.channel_labels(), vec!["Fz (N)", "Fx (N)"]);
        assert_eq!(config.recording.max_duration_s, Some(10.0));
    }

    #[test]
    fn test_default_channel_labels() {
        let config = LoggerConfig::default();
        assert_eq!(
            config.recording.channel_labels(),
            vec!["Channel 1", "Channel 2"]
        );
    }

    #[test]
    fn test_rejects_zero_channels() {
        let err = LoggerConfig::parse("[recording]\nchannel_count = 0\n").unwrap_err();
        assert!(matches!(err, HostError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_mismatched_names() {
        let err = LoggerConfig::parse(
            "[recording]\nchannel_count = 3\nchannel_names = [\"a\", \"b\"]\n",
        )
        .unwrap_err();
        assert!(matches!(err, HostError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        for value in ["0.0", "-1.5", "inf", "-inf", "nan", "1e300"] {
            let text = format!("[recording]\nmax_duration_s = {}\n", value);
            let err = LoggerConfig::parse(&text).unwrap_err();
            assert!(matches!(err, HostError::InvalidConfig(_)), "{} accepted", value);
        }
    }

    #[test]
    fn test_duration_override_is_revalidated() {
        let mut config = LoggerConfig::default();
        config.recording.max_duration_s = Some(f64::INFINITY);
        assert!(matches!(config.validate(), Err(HostError::InvalidConfig(_))));

        config.recording.max_duration_s = Some(2.5);
        assert_eq!(
            config.recording.max_duration().unwrap(),
            Some(Duration::from_millis(2500))
        );
    }

    #[test]
    fn test_syntax_error() {
        let err = LoggerConfig::parse("[serial\nport = ").unwrap_err();
        assert!(matches!(err, HostError::ConfigParse(_)));
    }
}
