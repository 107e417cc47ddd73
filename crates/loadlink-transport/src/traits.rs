use std::io::{Read, Write};
#[cfg(unix)]
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;
use crate::serial::SerialConfig;

/// Poll interval used for serial reads when no read timeout is configured.
const SERIAL_IDLE_TIMEOUT: Duration = Duration::from_millis(100);

/// A connected link stream. Implements Read + Write.
///
/// This is the fundamental I/O type returned by transport operations.
/// It wraps either a serial port handle or a Unix domain socket stream.
pub struct LinkStream {
    inner: LinkStreamInner,
}

enum LinkStreamInner {
    Serial(Box<dyn serialport::SerialPort>),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for LinkStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            LinkStreamInner::Serial(port) => port.read(buf),
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for LinkStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            LinkStreamInner::Serial(port) => port.write(buf),
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            LinkStreamInner::Serial(port) => port.flush(),
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl LinkStream {
    pub(crate) fn from_serial(port: Box<dyn serialport::SerialPort>) -> Self {
        Self {
            inner: LinkStreamInner::Serial(port),
        }
    }

    #[cfg(unix)]
    pub(crate) fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: LinkStreamInner::Unix(stream),
        }
    }

    /// Set read timeout on the underlying stream.
    ///
    /// Serial handles share one timeout for reads and writes per handle, so
    /// `None` leaves a serial handle untouched.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        match &mut self.inner {
            LinkStreamInner::Serial(port) => match timeout {
                Some(timeout) => port.set_timeout(timeout).map_err(Into::into),
                None => Ok(()),
            },
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        match &mut self.inner {
            LinkStreamInner::Serial(port) => match timeout {
                Some(timeout) => port.set_timeout(timeout).map_err(Into::into),
                None => Ok(()),
            },
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
        }
    }

    /// Try to clone this stream (creates a new handle to the same device).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            LinkStreamInner::Serial(port) => Ok(Self::from_serial(port.try_clone()?)),
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => Ok(Self::from_unix(stream.try_clone()?)),
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            LinkStreamInner::Serial(_) => "serial",
            #[cfg(unix)]
            LinkStreamInner::Unix(_) => "unix-domain-socket",
        }
    }
}

impl std::fmt::Debug for LinkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            LinkStreamInner::Serial(port) => f
                .debug_struct("LinkStream")
                .field("type", &"serial")
                .field("port", &port.name())
                .finish(),
            #[cfg(unix)]
            LinkStreamInner::Unix(_) => f.debug_struct("LinkStream").field("type", &"unix").finish(),
        }
    }
}

/// Per-direction timeouts applied when a connection is established.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamTimeouts {
    pub read: Option<Duration>,
    pub write: Option<Duration>,
}

/// Something that can open the controller link.
///
/// `connect` hands back independent read and write halves so receiving and
/// sending never contend on one handle.
pub trait Connector {
    /// Read half, moved into the reader thread.
    type Source: Read + Send + 'static;
    /// Write half, kept by the link for outbound commands.
    type Sink: Write;

    /// Open the link and apply `timeouts` to the returned halves.
    fn connect(&self, timeouts: StreamTimeouts) -> Result<(Self::Source, Self::Sink)>;

    /// Human-readable target description for logs and errors.
    fn describe(&self) -> String;
}

/// Where the controller link lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// A USB/RS-232 serial adapter.
    Serial(SerialConfig),
    /// A Unix domain socket served by a controller simulator.
    #[cfg(unix)]
    Unix(PathBuf),
}

impl LinkTarget {
    /// Open a single stream to the target.
    pub fn open(&self) -> Result<LinkStream> {
        match self {
            LinkTarget::Serial(cfg) => cfg.open(SERIAL_IDLE_TIMEOUT).map(LinkStream::from_serial),
            #[cfg(unix)]
            LinkTarget::Unix(path) => crate::uds::UnixSocketLink::connect(path),
        }
    }
}

impl Connector for LinkTarget {
    type Source = LinkStream;
    type Sink = LinkStream;

    fn connect(&self, timeouts: StreamTimeouts) -> Result<(LinkStream, LinkStream)> {
        let mut sink = self.open()?;
        let mut source = sink.try_clone()?;
        source.set_read_timeout(timeouts.read)?;
        sink.set_write_timeout(timeouts.write)?;
        Ok((source, sink))
    }

    fn describe(&self) -> String {
        match self {
            LinkTarget::Serial(cfg) => format!("serial:{} ({})", cfg.port, cfg.line_settings()),
            #[cfg(unix)]
            LinkTarget::Unix(path) => format!("unix:{}", path.display()),
        }
    }
}
