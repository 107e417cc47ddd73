use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tracing::debug;

use crate::code::SendCommand;
use crate::codec::{encode_command, FrameConfig, OutboundCommand};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 64;

/// Writes validated command frames to any `Write` stream.
pub struct CommandWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> CommandWriter<T> {
    /// Create a new command writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new command writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write a queued command (blocking).
    pub fn write_command(&mut self, command: &OutboundCommand) -> Result<()> {
        self.send(command.command, &command.data)
    }

    /// Encode and send a command with its payload.
    ///
    /// The command is validated before any byte reaches the stream. A write
    /// that times out surfaces as an I/O error; the controller protocol has
    /// no retransmission.
    pub fn send(&mut self, command: SendCommand, data: &str) -> Result<()> {
        self.buf.clear();
        encode_command(command, data, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        debug!(command = %command, bytes = self.buf.len(), "command written");

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
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

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current command writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::error::EncodeError;

    fn written(writer: CommandWriter<Cursor<Vec<u8>>>) -> Vec<u8> {
        writer.into_inner().into_inner()
    }

    #[test]
    fn write_single_command() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send(SendCommand::SetTareWeight, "100").unwrap();
        assert_eq!(written(writer), b"<ASTW100>");
    }

    #[test]
    fn write_multiple_commands() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send(SendCommand::EnterCalibration, "").unwrap();
        writer.send(SendCommand::StartCalibrationX1, "500").unwrap();
        writer.send(SendCommand::SaveCalibration, "").unwrap();
        assert_eq!(written(writer), b"<CA02><CA11500><CA19>");
    }

    #[test]
    fn write_command_method() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::<u8>::new()));
        writer
            .write_command(&OutboundCommand::bare(SendCommand::ClearWholeLoad))
            .unwrap();
        assert_eq!(written(writer), b"<ACWL>");
    }

    #[test]
    fn invalid_command_writes_nothing() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::<u8>::new()));
        let err = writer.send(SendCommand::SetTareWeight, "1<2").unwrap_err();
        assert!(matches!(
            err,
            FrameError::Encode(EncodeError::IllegalCharacter { .. })
        ));
        let err = writer.send(SendCommand::SetAdditionPoint, "").unwrap_err();
        assert!(matches!(
            err,
            FrameError::Encode(EncodeError::UndefinedCode { .. })
        ));
        assert!(written(writer).is_empty());
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = CommandWriter::new(sink);

        writer.send(SendCommand::PauseProcessLoad, "").unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_interrupted_write() {
        let mut writer = CommandWriter::new(InterruptedOnce {
            interrupted: false,
            data: Vec::new(),
        });
        writer.send(SendCommand::ClearLastBucket, "").unwrap();
        assert_eq!(writer.into_inner().data, b"<ACLB>");
    }

    #[test]
    fn timed_out_write_is_an_error() {
        let mut writer = CommandWriter::new(TimedOutWriter);
        let err = writer.send(SendCommand::ClearLastBucket, "").unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::TimedOut));
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let mut writer = CommandWriter::new(ZeroWriter);
        let err = writer.send(SendCommand::PauseProcessLoad, "").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut writer = CommandWriter::new(Cursor::new(Vec::<u8>::new()));

        let _ = writer.get_ref();
        let _ = writer.get_mut();
        assert_eq!(writer.config().max_pending, crate::DEFAULT_MAX_PENDING);
        let _inner = writer.into_inner();
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct InterruptedOnce {
        interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedOnce {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct TimedOutWriter;

    impl Write for TimedOutWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::TimedOut))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
