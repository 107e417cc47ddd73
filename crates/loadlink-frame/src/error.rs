use crate::code::{ReceiveCode, SendCommand};

/// Why a single received frame could not be turned into a reading.
///
/// Always local to one frame: the assembler keeps going.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Fewer bytes than `<` + code + one value byte + `>`.
    #[error("frame too short ({len} bytes, min 7)")]
    TooShort { len: usize },

    /// The four code characters are not a known receive code.
    #[error("unknown receive code {0:?}")]
    UnknownCode(String),

    /// The value is not a decimal integer.
    #[error("malformed value {value:?} for {code}")]
    MalformedValue { code: ReceiveCode, value: String },
}

/// Why an outbound command was refused before touching the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// The command has no wire code assigned.
    #[error("{command} has no defined wire code")]
    UndefinedCode { command: SendCommand },

    /// The payload would break framing.
    #[error("payload for {command} contains a frame delimiter ('<' or '>')")]
    IllegalCharacter { command: SendCommand },

    /// The payload is not 7-bit ASCII.
    #[error("payload for {command} contains non-ASCII characters")]
    NonAscii { command: SendCommand },

    /// The command must carry a non-blank payload.
    #[error("{command} requires a payload")]
    MissingRequiredData { command: SendCommand },
}

/// Errors that can occur while reading or writing frames on a stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// An outbound command was rejected by the encoder.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream reached EOF.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
