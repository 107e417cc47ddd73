/// Errors that can occur in link transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the configured target.
    #[error("failed to open {target}: {source}")]
    Open {
        target: String,
        source: std::io::Error,
    },

    /// The serial driver rejected an operation.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// A serial setting cannot be expressed on the wire.
    #[error("invalid serial setting: {0}")]
    InvalidSetting(String),

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
