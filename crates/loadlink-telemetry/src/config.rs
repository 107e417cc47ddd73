use std::path::Path;
use std::time::Duration;

use loadlink_frame::{FrameConfig, DEFAULT_MAX_PENDING, DEFAULT_WRITE_TIMEOUT};
use loadlink_transport::StreamTimeouts;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables for a controller link.
///
/// Every field has a default, so a config file only lists what it changes:
///
/// ```json
/// { "write_timeout_ms": 500, "max_pending": 4096 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Outbound write timeout.
    pub write_timeout_ms: u64,
    /// Idle tick of the reader thread; `0` blocks until data arrives.
    pub read_timeout_ms: u64,
    /// Bytes requested per read call.
    pub read_chunk_size: usize,
    /// Chunks buffered between the reader thread and the consumer.
    pub channel_capacity: usize,
    /// Pending bytes the assembler keeps before discarding them.
    pub max_pending: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT.as_millis() as u64,
            read_timeout_ms: 100,
            read_chunk_size: 256,
            channel_capacity: 64,
            max_pending: DEFAULT_MAX_PENDING,
        }
    }
}

impl LinkConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_chunk_size == 0 {
            return Err(ConfigError::Invalid("read_chunk_size must be > 0".into()));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be > 0".into()));
        }
        if self.write_timeout_ms == 0 {
            return Err(ConfigError::Invalid("write_timeout_ms must be > 0".into()));
        }
        Ok(())
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }

    /// Timeouts applied to the stream halves at connect time.
    pub fn timeouts(&self) -> StreamTimeouts {
        StreamTimeouts {
            read: self.read_timeout(),
            write: Some(self.write_timeout()),
        }
    }

    /// Equivalent settings for the frame layer.
    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            max_pending: self.max_pending,
            read_chunk_size: self.read_chunk_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_controller_link() {
        let config = LinkConfig::default();
        assert_eq!(config.write_timeout(), Duration::from_millis(1000));
        assert_eq!(config.read_chunk_size, 256);
        assert_eq!(config.channel_capacity, 64);
        assert_eq!(config.max_pending, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = LinkConfig::from_json(r#"{ "max_pending": 4096 }"#).unwrap();
        assert_eq!(config.max_pending, 4096);
        assert_eq!(config.write_timeout_ms, 1000);
        assert_eq!(config.frame_config().max_pending, 4096);
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(matches!(
            LinkConfig::from_json(r#"{ "baud": 9600 }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_zero_capacity() {
        assert!(matches!(
            LinkConfig::from_json(r#"{ "channel_capacity": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn zero_read_timeout_blocks() {
        let config = LinkConfig {
            read_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.timeouts().read, None);
        assert_eq!(config.timeouts().write, Some(Duration::from_secs(1)));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = LinkConfig::load("/nonexistent/loadlink.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
