//! Routes decoded readings into the telemetry snapshot.

use loadlink_frame::{ReceiveCode, Reading, StatusFlags};
use serde::Serialize;
use tracing::{trace, warn};

use crate::snapshot::TelemetrySnapshot;

/// Something the dispatcher noticed that the caller may want to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StatusEvent {
    /// A status word arrived with the controller's fault bit set.
    Fault {
        code: ReceiveCode,
        flags: StatusFlags,
    },
}

/// Apply one reading to the snapshot.
///
/// Exactly one field changes per reading, except for the placeholder codes
/// (`AD06`, `AD16`) which change nothing. A fault bit in a status word is
/// reported as an event; it never stops processing.
pub fn apply(reading: &Reading, snapshot: &mut TelemetrySnapshot) -> Option<StatusEvent> {
    let value = reading.value.value();
    match reading.code {
        ReceiveCode::SystemStatus => {
            let flags = StatusFlags::from_raw(reading.value.raw);
            snapshot.system_status = flags;
            return fault_event(reading.code, flags);
        }
        ReceiveCode::CalibrationStatus => {
            let flags = StatusFlags::from_raw(reading.value.raw);
            snapshot.calibration_status = flags;
            return fault_event(reading.code, flags);
        }
        ReceiveCode::CalibrationRunNumber => snapshot.calibration_run_number = reading.value.raw,
        ReceiveCode::CabAngleOffset => snapshot.cab_angle_offset = value,
        ReceiveCode::AngleLimitLow => snapshot.angle_limit_low = value,
        ReceiveCode::AngleResetPoint => snapshot.angle_reset_point = value,
        ReceiveCode::AngleLimitHigh => snapshot.angle_limit_high = value,
        ReceiveCode::TareWeight => snapshot.tare_weight = reading.value.raw,
        ReceiveCode::ProcessPressure => snapshot.process_pressure = value,
        ReceiveCode::ProcessAngle => snapshot.process_angle = value,
        ReceiveCode::CabAngle => snapshot.cab_angle = value,
        ReceiveCode::AngleSpeed => snapshot.angle_speed = value,
        ReceiveCode::CompFactor => snapshot.comp_factor = value,
        ReceiveCode::CurrentWeight => snapshot.current_weight = value,
        ReceiveCode::LoadWeight => snapshot.load_weight = value,
        ReceiveCode::AngleAddPoint | ReceiveCode::AddWeight => {
            trace!(code = reading.code.code(), raw = reading.value.raw, "no field for code");
        }
    }
    None
}

fn fault_event(code: ReceiveCode, flags: StatusFlags) -> Option<StatusEvent> {
    if !flags.fault() {
        return None;
    }
    warn!(code = code.code(), flags = flags.bits(), "controller reports fault");
    Some(StatusEvent::Fault { code, flags })
}
