use loadlink_frame::{ReceiveCode, StatusFlags};
use serde::Serialize;

/// Eight host-side error flags kept alongside the controller's own status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SystemErrors([bool; 8]);

impl SystemErrors {
    /// Raised while the link is down or failed to open.
    pub const LINK_FAILURE: usize = 0;

    pub fn set(&mut self, bit: usize) {
        if let Some(flag) = self.0.get_mut(bit) {
            *flag = true;
        }
    }

    pub fn clear(&mut self, bit: usize) {
        if let Some(flag) = self.0.get_mut(bit) {
            *flag = false;
        }
    }

    pub fn is_set(&self, bit: usize) -> bool {
        self.0.get(bit).copied().unwrap_or(false)
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|flag| *flag)
    }

    pub fn as_array(&self) -> [bool; 8] {
        self.0
    }
}

/// Latest known value of every field the controller reports.
///
/// Recreated with zeroed fields each time the link connects. Angles, weights,
/// pressures and factors are in physical units with the fixed-point scale
/// already applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub system_status: StatusFlags,
    pub calibration_status: StatusFlags,
    pub calibration_run_number: i32,
    pub cab_angle_offset: f64,
    pub angle_limit_low: f64,
    pub angle_reset_point: f64,
    pub angle_limit_high: f64,
    pub tare_weight: i32,
    pub process_pressure: f64,
    pub process_angle: f64,
    pub cab_angle: f64,
    pub angle_speed: f64,
    pub comp_factor: f64,
    pub current_weight: f64,
    pub load_weight: f64,
    pub system_errors: SystemErrors,
}

impl TelemetrySnapshot {
    /// Current value of the field a receive code populates.
    ///
    /// `None` for codes that carry no stored value.
    pub fn field(&self, code: ReceiveCode) -> Option<f64> {
        let value = match code {
            ReceiveCode::SystemStatus => f64::from(self.system_status.bits()),
            ReceiveCode::CalibrationStatus => f64::from(self.calibration_status.bits()),
            ReceiveCode::CalibrationRunNumber => f64::from(self.calibration_run_number),
            ReceiveCode::CabAngleOffset => self.cab_angle_offset,
            ReceiveCode::AngleLimitLow => self.angle_limit_low,
            ReceiveCode::AngleResetPoint => self.angle_reset_point,
            ReceiveCode::AngleLimitHigh => self.angle_limit_high,
            ReceiveCode::TareWeight => f64::from(self.tare_weight),
            ReceiveCode::ProcessPressure => self.process_pressure,
            ReceiveCode::ProcessAngle => self.process_angle,
            ReceiveCode::CabAngle => self.cab_angle,
            ReceiveCode::AngleSpeed => self.angle_speed,
            ReceiveCode::CompFactor => self.comp_factor,
            ReceiveCode::CurrentWeight => self.current_weight,
            ReceiveCode::LoadWeight => self.load_weight,
            ReceiveCode::AngleAddPoint | ReceiveCode::AddWeight => return None,
        };
        Some(value)
    }
}
