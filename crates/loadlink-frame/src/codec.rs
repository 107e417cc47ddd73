use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

use crate::assembler::{RawFrame, DEFAULT_MAX_PENDING, FRAME_END, FRAME_START, MIN_FRAME_LEN};
use crate::code::{DataRule, ReceiveCode, Scale, SendCommand};
use crate::error::{DecodeError, EncodeError};

/// Write timeout the controller link has always used for outbound commands.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(1000);

const CODE_LEN: usize = 4;

/// A decoded integer together with the scale of the field it populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScaledValue {
    /// Integer exactly as it appeared on the wire.
    pub raw: i32,
    pub scale: Scale,
}

impl ScaledValue {
    pub fn new(raw: i32, scale: Scale) -> Self {
        Self { raw, scale }
    }

    /// Value in physical units.
    pub fn value(&self) -> f64 {
        self.scale.apply(self.raw)
    }
}

/// Controller status bit field (`AD00`/`AD01`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StatusFlags(u8);

impl StatusFlags {
    /// Bit the controller sets to report a fault.
    pub const FAULT: u8 = 0;

    /// Status word from the low eight bits of a raw value.
    pub fn from_raw(raw: i32) -> Self {
        Self((raw & 0xFF) as u8)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_set(self, bit: u8) -> bool {
        bit < 8 && self.0 & (1 << bit) != 0
    }

    /// True when the controller reports a fault condition.
    pub fn fault(self) -> bool {
        self.is_set(Self::FAULT)
    }

    /// Indices of the set bits, lowest first.
    pub fn set_bits(self) -> impl Iterator<Item = u8> {
        (0..8).filter(move |&bit| self.is_set(bit))
    }
}

/// One decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reading {
    pub code: ReceiveCode,
    pub value: ScaledValue,
}

impl Reading {
    /// Status bit field, for the status codes only.
    pub fn status(&self) -> Option<StatusFlags> {
        self.code
            .is_status()
            .then(|| StatusFlags::from_raw(self.value.raw))
    }
}

/// Decode one assembled frame into a typed reading.
///
/// Never panics on hostile input: any frame that is too short, carries an
/// unknown code or a non-numeric value is reported as a [`DecodeError`].
pub fn decode(frame: &RawFrame) -> Result<Reading, DecodeError> {
    let bytes = frame.as_bytes();
    if bytes.len() < MIN_FRAME_LEN {
        return Err(DecodeError::TooShort { len: bytes.len() });
    }

    let code_bytes = &bytes[1..1 + CODE_LEN];
    let code = ReceiveCode::from_code(code_bytes).ok_or_else(|| {
        DecodeError::UnknownCode(String::from_utf8_lossy(code_bytes).into_owned())
    })?;

    let value_bytes = &bytes[1 + CODE_LEN..bytes.len() - 1];
    let raw = std::str::from_utf8(value_bytes)
        .ok()
        .and_then(|text| text.parse::<i32>().ok())
        .ok_or_else(|| DecodeError::MalformedValue {
            code,
            value: String::from_utf8_lossy(value_bytes).into_owned(),
        })?;

    Ok(Reading {
        code,
        value: ScaledValue::new(raw, code.scale()),
    })
}

/// Validate an outbound command and append its frame to `dst`.
///
/// Nothing is written to `dst` when validation fails.
pub fn encode_command(
    command: SendCommand,
    data: &str,
    dst: &mut BytesMut,
) -> Result<(), EncodeError> {
    let code = command
        .code()
        .ok_or(EncodeError::UndefinedCode { command })?;
    if data.bytes().any(|b| b == FRAME_START || b == FRAME_END) {
        return Err(EncodeError::IllegalCharacter { command });
    }
    if !data.is_ascii() {
        return Err(EncodeError::NonAscii { command });
    }
    if command.data_rule() == DataRule::Required && data.trim().is_empty() {
        return Err(EncodeError::MissingRequiredData { command });
    }

    dst.reserve(2 + code.len() + data.len());
    dst.put_u8(FRAME_START);
    dst.put_slice(code.as_bytes());
    dst.put_slice(data.as_bytes());
    dst.put_u8(FRAME_END);
    Ok(())
}

/// Validate an outbound command and return its wire bytes.
///
/// ```text
/// ┌─────┬──────────────┬──────────────────┬─────┐
/// │ '<' │ Code (4 B)   │ Data (0..n ASCII)│ '>' │
/// └─────┴──────────────┴──────────────────┴─────┘
/// ```
pub fn encode(command: SendCommand, data: &str) -> Result<Bytes, EncodeError> {
    let mut buf = BytesMut::new();
    encode_command(command, data, &mut buf)?;
    Ok(buf.freeze())
}

/// A command queued for transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCommand {
    pub command: SendCommand,
    pub data: String,
}

impl OutboundCommand {
    pub fn new(command: SendCommand, data: impl Into<String>) -> Self {
        Self {
            command,
            data: data.into(),
        }
    }

    /// A command without payload.
    pub fn bare(command: SendCommand) -> Self {
        Self::new(command, String::new())
    }
}

/// Configuration for frame readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Pending-buffer bound handed to the assembler.
    pub max_pending: usize,
    /// Bytes requested per read call.
    pub read_chunk_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_pending: DEFAULT_MAX_PENDING,
            read_chunk_size: 256,
        }
    }
}
