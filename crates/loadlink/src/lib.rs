//! Host-side link to the loader-scale sensor controller.
//!
//! The controller streams `<CODE VALUE>` ASCII frames over a 9600 8N1 serial
//! line and accepts commands in the same shape. loadlink reassembles frames
//! from arbitrary chunks, decodes them into typed readings and keeps the
//! latest value of every field in a telemetry snapshot.
//!
//! # Crate Structure
//!
//! - [`transport`]: Serial port and Unix socket streams
//! - [`frame`]: Frame assembly, receive/send code tables, encode/decode
//! - [`telemetry`]: Connection state, snapshot, dispatch (behind `telemetry` feature)

/// Re-export transport types.
pub mod transport {
    pub use loadlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use loadlink_frame::*;
}

/// Re-export telemetry types (requires `telemetry` feature).
#[cfg(feature = "telemetry")]
pub mod telemetry {
    pub use loadlink_telemetry::*;
}
