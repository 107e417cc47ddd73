//! Byte stream plumbing for the loadlink controller link.
//!
//! The sensor controller is reached either over a USB serial adapter or, for
//! simulators and bench rigs, over a Unix domain socket. Both are exposed as a
//! [`LinkStream`] so the layers above only ever see `Read + Write`.
//!
//! This is the lowest layer of loadlink. Nothing here knows about frames.

pub mod error;
pub mod serial;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use serial::{Parity, SerialConfig, DEFAULT_BAUD_RATE};
pub use traits::{Connector, LinkStream, LinkTarget, StreamTimeouts};

#[cfg(unix)]
pub use uds::UnixSocketLink;
