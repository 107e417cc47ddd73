use std::collections::VecDeque;
use std::io::{ErrorKind, Read};


use crate::assembler::{AssemblerStats, FrameAssembler, RawFrame};
use crate::codec::FrameConfig;
use crate::error::{FrameError, Result};

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete frames.
pub struct FrameReader<T> {
    inner: T,
    assembler: FrameAssembler,
    ready: VecDeque<RawFrame>,
    chunk: Vec<u8>,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            assembler: FrameAssembler::with_max_pending(config.max_pending),
            ready: VecDeque::new(),
            chunk: vec![0u8; config.read_chunk_size.max(1)],
            config,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<RawFrame> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return Ok(frame);
            }
            let frames = self.read_chunk()?;
            self.ready.extend(frames);
        }
    }

    /// Perform one read and return the frames that chunk completed.
    ///
    /// May return an empty list when the chunk only extended a partial frame.
    pub fn read_chunk(&mut self) -> Result<Vec<RawFrame>> {
        loop {
            let read = match self.inner.read(&mut self.chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            return Ok(self.assembler.process(&self.chunk[..read]));
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Assembler counters for this stream.
    pub fn stats(&self) -> AssemblerStats {
        self.assembler.stats()
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
