//! Closed tables of wire codes.
//!
//! Receive codes are reported by the controller (`AD00`..`AD16`); send
//! commands are issued by the host (`APPL`, `ACWL`, `CA01`..`CA29`, ...).

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Fixed-point scale applied to a raw decoded integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// Value is used as-is (counts, kilograms, bit fields).
    Unit,
    /// Value is in tenths (degrees, bar, kilograms, factors).
    Tenth,
}

impl Scale {
    /// Apply the scale to a raw wire integer.
    pub fn apply(self, raw: i32) -> f64 {
        match self {
            Scale::Unit => f64::from(raw),
            Scale::Tenth => f64::from(raw) / 10.0,
        }
    }

    /// Multiplier this scale represents.
    pub fn factor(self) -> f64 {
        match self {
            Scale::Unit => 1.0,
            Scale::Tenth => 0.1,
        }
    }
}

/// Codes the controller sends to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReceiveCode {
    SystemStatus,
    CalibrationStatus,
    CalibrationRunNumber,
    CabAngleOffset,
    AngleLimitLow,
    AngleResetPoint,
    AngleAddPoint,
    AngleLimitHigh,
    TareWeight,
    ProcessPressure,
    ProcessAngle,
    CabAngle,
    AngleSpeed,
    CompFactor,
    CurrentWeight,
    LoadWeight,
    AddWeight,
}

impl ReceiveCode {
    /// Every receive code in wire order.
    pub const ALL: [ReceiveCode; 17] = [
        ReceiveCode::SystemStatus,
        ReceiveCode::CalibrationStatus,
        ReceiveCode::CalibrationRunNumber,
        ReceiveCode::CabAngleOffset,
        ReceiveCode::AngleLimitLow,
        ReceiveCode::AngleResetPoint,
        ReceiveCode::AngleAddPoint,
        ReceiveCode::AngleLimitHigh,
        ReceiveCode::TareWeight,
        ReceiveCode::ProcessPressure,
        ReceiveCode::ProcessAngle,
        ReceiveCode::CabAngle,
        ReceiveCode::AngleSpeed,
        ReceiveCode::CompFactor,
        ReceiveCode::CurrentWeight,
        ReceiveCode::LoadWeight,
        ReceiveCode::AddWeight,
    ];

    /// Four-character wire code.
    pub const fn code(self) -> &'static str {
        match self {
            ReceiveCode::SystemStatus => "AD00",
            ReceiveCode::CalibrationStatus => "AD01",
            ReceiveCode::CalibrationRunNumber => "AD02",
            ReceiveCode::CabAngleOffset => "AD03",
            ReceiveCode::AngleLimitLow => "AD04",
            ReceiveCode::AngleResetPoint => "AD05",
            ReceiveCode::AngleAddPoint => "AD06",
            ReceiveCode::AngleLimitHigh => "AD07",
            ReceiveCode::TareWeight => "AD08",
            ReceiveCode::ProcessPressure => "AD09",
            ReceiveCode::ProcessAngle => "AD10",
            ReceiveCode::CabAngle => "AD11",
            ReceiveCode::AngleSpeed => "AD12",
            ReceiveCode::CompFactor => "AD13",
            ReceiveCode::CurrentWeight => "AD14",
            ReceiveCode::LoadWeight => "AD15",
            ReceiveCode::AddWeight => "AD16",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ReceiveCode::SystemStatus => "SystemStatus",
            ReceiveCode::CalibrationStatus => "CalibrationStatus",
            ReceiveCode::CalibrationRunNumber => "CalibrationRunNumber",
            ReceiveCode::CabAngleOffset => "CabAngleOffset",
            ReceiveCode::AngleLimitLow => "AngleLimitLow",
            ReceiveCode::AngleResetPoint => "AngleResetPoint",
            ReceiveCode::AngleAddPoint => "AngleAddPoint",
            ReceiveCode::AngleLimitHigh => "AngleLimitHigh",
            ReceiveCode::TareWeight => "TareWeight",
            ReceiveCode::ProcessPressure => "ProcessPressure",
            ReceiveCode::ProcessAngle => "ProcessAngle",
            ReceiveCode::CabAngle => "CabAngle",
            ReceiveCode::AngleSpeed => "AngleSpeed",
            ReceiveCode::CompFactor => "CompFactor",
            ReceiveCode::CurrentWeight => "CurrentWeight",
            ReceiveCode::LoadWeight => "LoadWeight",
            ReceiveCode::AddWeight => "AddWeight",
        }
    }

    /// Fixed-point scale of the value carried by this code.
    pub const fn scale(self) -> Scale {
        match self {
            ReceiveCode::SystemStatus
            | ReceiveCode::CalibrationStatus
            | ReceiveCode::CalibrationRunNumber
            | ReceiveCode::AngleAddPoint
            | ReceiveCode::TareWeight
            | ReceiveCode::AddWeight => Scale::Unit,
            ReceiveCode::CabAngleOffset
            | ReceiveCode::AngleLimitLow
            | ReceiveCode::AngleResetPoint
            | ReceiveCode::AngleLimitHigh
            | ReceiveCode::ProcessPressure
            | ReceiveCode::ProcessAngle
            | ReceiveCode::CabAngle
            | ReceiveCode::AngleSpeed
            | ReceiveCode::CompFactor
            | ReceiveCode::CurrentWeight
            | ReceiveCode::LoadWeight => Scale::Tenth,
        }
    }

    /// True for the codes whose value is a status bit field.
    pub const fn is_status(self) -> bool {
        matches!(
            self,
            ReceiveCode::SystemStatus | ReceiveCode::CalibrationStatus
        )
    }

    /// Look up the code for four wire bytes.
    pub fn from_code(code: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.code().as_bytes() == code)
    }
}

impl fmt::Display for ReceiveCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

/// Whether a command frame carries a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataRule {
    /// Payload may be empty.
    Optional,
    /// Payload must be non-blank.
    Required,
}

/// Commands the host sends to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SendCommand {
    PauseProcessLoad,
    ClearWholeLoad,
    ClearLastBucket,
    SetTareWeight,
    ExitCalibration,
    EnterCalibration,
    SetCalibrationToZero,
    SetLowerLimit,
    SetResetPoint,
    SetAdditionPoint,
    SetHigherLimit,
    SaveStaticFactor,
    SetStaticFactor,
    StartCalibration0,
    StartCalibrationX1,
    SaveCalibration,
    StartLowDynFactorCalibration,
    StartMedDynFactorCalibration,
    SaveDynFactor,
}

impl SendCommand {
    /// Every send command in table order.
    pub const ALL: [SendCommand; 19] = [
        SendCommand::PauseProcessLoad,
        SendCommand::ClearWholeLoad,
        SendCommand::ClearLastBucket,
        SendCommand::SetTareWeight,
        SendCommand::ExitCalibration,
        SendCommand::EnterCalibration,
        SendCommand::SetCalibrationToZero,
        SendCommand::SetLowerLimit,
        SendCommand::SetResetPoint,
        SendCommand::SetAdditionPoint,
        SendCommand::SetHigherLimit,
        SendCommand::SaveStaticFactor,
        SendCommand::SetStaticFactor,
        SendCommand::StartCalibration0,
        SendCommand::StartCalibrationX1,
        SendCommand::SaveCalibration,
        SendCommand::StartLowDynFactorCalibration,
        SendCommand::StartMedDynFactorCalibration,
        SendCommand::SaveDynFactor,
    ];

    /// Four-character wire code, or `None` when the controller documentation
    /// assigns none.
    ///
    /// `StartMedDynFactorCalibration` and `SaveDynFactor` share `CA29` in the
    /// controller's command table.
    pub const fn code(self) -> Option<&'static str> {
        match self {
            SendCommand::PauseProcessLoad => Some("APPL"),
            SendCommand::ClearWholeLoad => Some("ACWL"),
            SendCommand::ClearLastBucket => Some("ACLB"),
            SendCommand::SetTareWeight => Some("ASTW"),
            SendCommand::ExitCalibration => Some("CA01"),
            SendCommand::EnterCalibration => Some("CA02"),
            SendCommand::SetCalibrationToZero => Some("CA03"),
            SendCommand::SetLowerLimit => Some("CA04"),
            SendCommand::SetResetPoint => Some("CA05"),
            SendCommand::SetAdditionPoint => None,
            SendCommand::SetHigherLimit => Some("CA07"),
            SendCommand::SaveStaticFactor => Some("CA08"),
            SendCommand::SetStaticFactor => Some("CA09"),
            SendCommand::StartCalibration0 => Some("CA10"),
            SendCommand::StartCalibrationX1 => Some("CA11"),
            SendCommand::SaveCalibration => Some("CA19"),
            SendCommand::StartLowDynFactorCalibration => Some("CA21"),
            SendCommand::StartMedDynFactorCalibration => Some("CA29"),
            SendCommand::SaveDynFactor => Some("CA29"),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SendCommand::PauseProcessLoad => "PauseProcessLoad",
            SendCommand::ClearWholeLoad => "ClearWholeLoad",
            SendCommand::ClearLastBucket => "ClearLastBucket",
            SendCommand::SetTareWeight => "SetTareWeight",
            SendCommand::ExitCalibration => "ExitCalibration",
            SendCommand::EnterCalibration => "EnterCalibration",
            SendCommand::SetCalibrationToZero => "SetCalibrationToZero",
            SendCommand::SetLowerLimit => "SetLowerLimit",
            SendCommand::SetResetPoint => "SetResetPoint",
            SendCommand::SetAdditionPoint => "SetAdditionPoint",
            SendCommand::SetHigherLimit => "SetHigherLimit",
            SendCommand::SaveStaticFactor => "SaveStaticFactor",
            SendCommand::SetStaticFactor => "SetStaticFactor",
            SendCommand::StartCalibration0 => "StartCalibration0",
            SendCommand::StartCalibrationX1 => "StartCalibrationX1",
            SendCommand::SaveCalibration => "SaveCalibration",
            SendCommand::StartLowDynFactorCalibration => "StartLowDynFactorCalibration",
            SendCommand::StartMedDynFactorCalibration => "StartMedDynFactorCalibration",
            SendCommand::SaveDynFactor => "SaveDynFactor",
        }
    }

    pub const fn data_rule(self) -> DataRule {
        match self {
            SendCommand::StartCalibrationX1 => DataRule::Required,
            _ => DataRule::Optional,
        }
    }
}

impl fmt::Display for SendCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code() {
            Some(code) => write!(f, "{} ({code})", self.name()),
            None => write!(f, "{} (no code)", self.name()),
        }
    }
}

/// A string that names no known code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown code {0:?}")]
pub struct ParseCodeError(pub String);

impl FromStr for SendCommand {
    type Err = ParseCodeError;

    /// Accepts a wire code (`CA11`) or a command name (`StartCalibrationX1`),
    /// both case-insensitive. A shared wire code resolves to the first command
    /// in table order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|cmd| {
                cmd.code()
                    .is_some_and(|code| code.eq_ignore_ascii_case(needle))
                    || cmd.name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ParseCodeError(s.to_string()))
    }
}

impl FromStr for ReceiveCode {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|code| {
                code.code().eq_ignore_ascii_case(needle) || code.name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ParseCodeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receive_codes_are_four_ascii_chars_and_unique() {
        for (i, code) in ReceiveCode::ALL.iter().enumerate() {
            assert_eq!(code.code().len(), 4);
            assert!(code.code().is_ascii());
            for other in &ReceiveCode::ALL[i + 1..] {
                assert_ne!(code.code(), other.code());
            }
        }
    }

    #[test]
    fn receive_code_lookup_by_wire_bytes() {
        assert_eq!(ReceiveCode::from_code(b"AD11"), Some(ReceiveCode::CabAngle));
        assert_eq!(ReceiveCode::from_code(b"AD16"), Some(ReceiveCode::AddWeight));
        assert_eq!(ReceiveCode::from_code(b"AD17"), None);
        assert_eq!(ReceiveCode::from_code(b"ad11"), None);
    }

    #[test]
    fn integer_fields_are_unscaled() {
        assert_eq!(ReceiveCode::TareWeight.scale(), Scale::Unit);
        assert_eq!(ReceiveCode::CalibrationRunNumber.scale(), Scale::Unit);
        assert_eq!(ReceiveCode::LoadWeight.scale(), Scale::Tenth);
        assert_eq!(ReceiveCode::CabAngle.scale(), Scale::Tenth);
    }

    #[test]
    fn tenth_scale_is_exact_for_whole_tenths() {
        assert_eq!(Scale::Tenth.apply(150), 15.0);
        assert_eq!(Scale::Tenth.apply(-5), -0.5);
        assert_eq!(Scale::Unit.apply(-5), -5.0);
    }

    #[test]
    fn addition_point_has_no_wire_code() {
        assert_eq!(SendCommand::SetAdditionPoint.code(), None);
        assert_eq!(
            SendCommand::SetAdditionPoint.to_string(),
            "SetAdditionPoint (no code)"
        );
    }

    #[test]
    fn only_calibration_x1_requires_data() {
        let required: Vec<_> = SendCommand::ALL
            .into_iter()
            .filter(|cmd| cmd.data_rule() == DataRule::Required)
            .collect();
        assert_eq!(required, vec![SendCommand::StartCalibrationX1]);
    }

    #[test]
    fn parse_command_by_code_or_name() {
        assert_eq!("ASTW".parse(), Ok(SendCommand::SetTareWeight));
        assert_eq!("astw".parse(), Ok(SendCommand::SetTareWeight));
        assert_eq!(
            "startcalibrationx1".parse(),
            Ok(SendCommand::StartCalibrationX1)
        );
        assert_eq!("CA29".parse(), Ok(SendCommand::StartMedDynFactorCalibration));
        assert!("CA99".parse::<SendCommand>().is_err());
        assert!("".parse::<SendCommand>().is_err());
    }

    #[test]
    fn parse_receive_code_by_code_or_name() {
        assert_eq!("AD15".parse(), Ok(ReceiveCode::LoadWeight));
        assert_eq!("loadweight".parse(), Ok(ReceiveCode::LoadWeight));
        assert!("AD99".parse::<ReceiveCode>().is_err());
    }
}
