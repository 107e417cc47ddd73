//! `tokio_util::codec` adapter for async transports.

use std::collections::VecDeque;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::assembler::{AssemblerStats, FrameAssembler, RawFrame};
use crate::codec::{encode_command, OutboundCommand};
use crate::error::FrameError;

/// Frames the controller byte stream for `FramedRead`/`FramedWrite`.
///
/// Decoding drains every byte handed to it into the assembler, so nothing is
/// ever left in the framed buffer at EOF; an unterminated trailing frame is
/// simply dropped with the codec.
#[derive(Debug, Default)]
pub struct LinkCodec {
    assembler: FrameAssembler,
    ready: VecDeque<RawFrame>,
}

impl LinkCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec whose assembler drops pending data past `max_pending` bytes.
    pub fn with_max_pending(max_pending: usize) -> Self {
        Self {
            assembler: FrameAssembler::with_max_pending(max_pending),
            ready: VecDeque::new(),
        }
    }

    pub fn stats(&self) -> AssemblerStats {
        self.assembler.stats()
    }
}

impl Decoder for LinkCodec {
    type Item = RawFrame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<RawFrame>, FrameError> {
        if !src.is_empty() {
            let chunk = src.split();
            self.ready.extend(self.assembler.process(&chunk));
        }
        Ok(self.ready.pop_front())
    }
}

impl Encoder<OutboundCommand> for LinkCodec {
    type Error = FrameError;

    fn encode(&mut self, item: OutboundCommand, dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_command(item.command, &item.data, dst)?;
        Ok(())
    }
}
