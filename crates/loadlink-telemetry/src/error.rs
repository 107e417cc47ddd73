use std::path::PathBuf;

use loadlink_frame::{EncodeError, FrameError};
use loadlink_transport::TransportError;

/// Errors that can occur in link operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// The link is not connected; nothing was sent or processed.
    #[error("link is not connected")]
    NotConnected,

    /// Opening the transport failed.
    #[error("connect to {target} failed: {source}")]
    Connect {
        target: String,
        #[source]
        source: TransportError,
    },

    /// The outbound command was rejected before transmission.
    #[error("command rejected: {0}")]
    Encode(#[from] EncodeError),

    /// Writing to the transport failed.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The controller link went away while reading.
    #[error("link disconnected: {0}")]
    Disconnected(String),

    /// The read half was already handed to a reader thread.
    #[error("reader already started for this connection")]
    ReaderTaken,

    /// The reader thread could not be spawned.
    #[error("failed to start reader thread: {0}")]
    Pump(std::io::Error),
}

/// Errors that can occur while loading link configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for `LinkConfig`.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, LinkError>;
