//! Controller link management and telemetry state.
//!
//! This is the "just works" layer. Connect to the sensor controller, send
//! validated commands, and feed received bytes through assembly, decoding and
//! dispatch into a [`TelemetrySnapshot`].
//!
//! ```no_run
//! use loadlink_telemetry::{Link, LinkConfig};
//! use loadlink_transport::{LinkTarget, SerialConfig};
//!
//! let target = LinkTarget::Serial(SerialConfig::new("/dev/ttyUSB0"));
//! let mut link = Link::with_config(target, LinkConfig::default());
//! link.connect()?;
//! let pump = link.start_pump()?;
//! while let Some(event) = pump.recv() {
//!     link.handle(event)?;
//!     println!("load: {} kg", link.snapshot().load_weight);
//! }
//! # Ok::<(), loadlink_telemetry::LinkError>(())
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod link;
pub mod pump;
pub mod snapshot;
pub mod state;

pub use config::LinkConfig;
pub use dispatch::{apply, StatusEvent};
pub use error::{ConfigError, LinkError, Result};
pub use link::{Link, ProcessReport};
pub use pump::{ChunkPump, PumpEvent};
pub use snapshot::{SystemErrors, TelemetrySnapshot};
pub use state::ConnectionState;
