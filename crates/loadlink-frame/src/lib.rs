//! Delimited ASCII framing and codec for the loadlink controller link.
//!
//! The controller speaks a tiny line protocol where every message is
//! `<` CODE VALUE `>`:
//! - CODE is exactly four ASCII characters (`AD11`, `CA11`, ...)
//! - VALUE is an optional signed decimal integer, fixed-point scaled per code
//!
//! The serial line delivers arbitrary chunks, so [`FrameAssembler`] turns the
//! unbounded byte stream back into whole frames, [`decode`] turns a frame into
//! a typed [`Reading`], and [`encode`] builds outbound command frames.

pub mod assembler;
pub mod code;
pub mod codec;
pub mod error;
#[cfg(feature = "async")]
pub mod framed;
pub mod reader;
pub mod writer;

pub use assembler::{
    AssemblerStats, FrameAssembler, RawFrame, DEFAULT_MAX_PENDING, FRAME_END, FRAME_START,
    MIN_FRAME_LEN,
};
pub use code::{DataRule, ParseCodeError, ReceiveCode, Scale, SendCommand};
pub use codec::{
    decode, encode, encode_command, FrameConfig, OutboundCommand, Reading, ScaledValue,
    StatusFlags, DEFAULT_WRITE_TIMEOUT,
};
pub use error::{DecodeError, EncodeError, FrameError, Result};
#[cfg(feature = "async")]
pub use framed::LinkCodec;
pub use reader::FrameReader;
pub use writer::CommandWriter;
