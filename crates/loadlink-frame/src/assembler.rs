use std::fmt;

use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, warn};

/// Opening frame delimiter.
pub const FRAME_START: u8 = b'<';

/// Closing frame delimiter.
pub const FRAME_END: u8 = b'>';

/// Shortest frame the codec accepts: `<` + 4-char code + 1 value byte + `>`.
pub const MIN_FRAME_LEN: usize = 7;

/// Default bound on retained bytes that have not yet formed a frame.
pub const DEFAULT_MAX_PENDING: usize = 1024;

const INITIAL_BUFFER_CAPACITY: usize = 256;

fn is_delimiter(byte: u8) -> bool {
    byte == FRAME_START || byte == FRAME_END
}

/// One complete `<...>` span cut from the byte stream.
///
/// Always starts with `<`, ends with `>` and contains no other delimiter.
/// Length is not checked here; the codec rejects frames that are too short.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RawFrame(Bytes);

impl RawFrame {
    /// Wrap bytes that already form a single well-delimited frame.
    ///
    /// Returns `None` if the delimiters are missing or nested.
    pub fn from_wire(bytes: impl Into<Bytes>) -> Option<Self> {
        let bytes = bytes.into();
        let well_formed = bytes.len() >= 2
            && bytes[0] == FRAME_START
            && bytes[bytes.len() - 1] == FRAME_END
            && !bytes[1..bytes.len() - 1].iter().copied().any(is_delimiter);
        well_formed.then_some(Self(bytes))
    }

    /// Frame bytes including both delimiters.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for an assembled frame; present for API completeness.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawFrame({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl AsRef<[u8]> for RawFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Running counters for one assembler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblerStats {
    /// Frames emitted.
    pub frames: u64,
    /// Bytes dropped as garbage (orphans, broken frames, overflow).
    pub discarded_bytes: u64,
    /// Times the buffer had to be resynchronized on a frame boundary.
    pub recoveries: u64,
}

/// Reassembles `<...>` frames from arbitrarily chunked input.
///
/// Owns the pending buffer: bytes that have not yet formed a complete frame
/// are kept until the next [`process`](Self::process) call. Chunks must be fed
/// strictly in arrival order from a single consumer.
#[derive(Debug)]
pub struct FrameAssembler {
    pending: BytesMut,
    max_pending: usize,
    stats: AssemblerStats,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    /// Create an assembler with the default pending bound.
    pub fn new() -> Self {
        Self::with_max_pending(DEFAULT_MAX_PENDING)
    }

    /// Create an assembler that drops its pending buffer once it grows past
    /// `max_pending` bytes without completing a frame.
    pub fn with_max_pending(max_pending: usize) -> Self {
        Self {
            pending: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            max_pending,
            stats: AssemblerStats::default(),
        }
    }

    /// Feed one chunk and return every frame it completed, in stream order.
    pub fn process(&mut self, chunk: &[u8]) -> Vec<RawFrame> {
        if chunk.is_empty() {
            return Vec::new();
        }
        self.pending.extend_from_slice(chunk);
        self.resync();

        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame() {
            debug!(frame = %frame, "frame assembled");
            frames.push(frame);
        }

        if self.pending.len() > self.max_pending {
            warn!(
                pending = self.pending.len(),
                max = self.max_pending,
                "pending buffer overflow; dropping unterminated data"
            );
            self.discard(self.pending.len());
            self.stats.recoveries += 1;
        }

        frames
    }

    /// Bytes retained for the next call.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    pub fn stats(&self) -> AssemblerStats {
        self.stats
    }

    pub fn max_pending(&self) -> usize {
        self.max_pending
    }

    /// Drop the pending buffer. Returns how many bytes were dropped.
    pub fn reset(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// A buffer that does not open with `<` starts with the tail of a frame
    /// whose head was never seen. Cut it back to the next frame boundary.
    fn resync(&mut self) {
        if self.pending.first().is_none_or(|&b| b == FRAME_START) {
            return;
        }
        match self.pending.iter().position(|&b| is_delimiter(b)) {
            Some(end) if self.pending[end] == FRAME_END => {
                warn!(
                    orphan = %String::from_utf8_lossy(&self.pending[..=end]),
                    "discarding orphaned frame tail"
                );
                self.discard(end + 1);
                self.stats.recoveries += 1;
            }
            Some(start) => {
                debug!(bytes = start, "discarding unframed bytes before frame start");
                self.discard(start);
            }
            // Delimiter-free fragment: keep it until a delimiter shows up.
            None => {}
        }
    }

    fn next_frame(&mut self) -> Option<RawFrame> {
        loop {
            let start = self.pending.iter().position(|&b| b == FRAME_START)?;
            if start > 0 {
                debug!(bytes = start, "discarding unframed bytes between frames");
                self.discard(start);
            }

            let end = self.pending[1..].iter().position(|&b| is_delimiter(b))? + 1;
            if self.pending[end] == FRAME_START {
                warn!(
                    broken = %String::from_utf8_lossy(&self.pending[..end]),
                    "discarding unterminated frame"
                );
                self.discard(end);
                self.stats.recoveries += 1;
                continue;
            }
            // Same bound as the pending buffer, so a span too long to have
            // been held across chunks is dropped when it arrives whole too.
            if end + 1 > self.max_pending {
                warn!(
                    len = end + 1,
                    max = self.max_pending,
                    "discarding oversized frame"
                );
                self.discard(end + 1);
                self.stats.recoveries += 1;
                continue;
            }

            self.stats.frames += 1;
            return Some(RawFrame(self.pending.split_to(end + 1).freeze()));
        }
    }

    fn discard(&mut self, n: usize) {
        self.pending.advance(n);
        self.stats.discarded_bytes += n as u64;
    }
}
