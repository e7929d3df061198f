//! Reply lines

use core::fmt::{self, Write};

use heapless::String;
use louver_core::axis::{AxisError, AxisStatus};
use louver_core::motion::MotionPhase;

use crate::line::LineError;
use crate::request::ParseError;

/// Longest reply line, including the terminator
pub const MAX_REPLY_LEN: usize = 192;

/// Reason carried by an `ERR` reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorCode {
    /// The request line could not be parsed
    Parse(ParseError),
    /// The request line was too long
    Line(LineError),
    /// The axis rejected the operation
    Axis(AxisError),
}

impl ErrorCode {
    /// Short reason used in `ERR` replies
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Parse(e) => e.as_str(),
            ErrorCode::Line(LineError::TooLong) => "line-too-long",
            ErrorCode::Axis(AxisError::OutOfRange) => "out-of-range",
            ErrorCode::Axis(AxisError::Disabled) => "disabled",
            ErrorCode::Axis(AxisError::InvalidTuning) => "invalid-tuning",
        }
    }
}

impl From<ParseError> for ErrorCode {
    fn from(e: ParseError) -> Self {
        ErrorCode::Parse(e)
    }
}

impl From<LineError> for ErrorCode {
    fn from(e: LineError) -> Self {
        ErrorCode::Line(e)
    }
}

impl From<AxisError> for ErrorCode {
    fn from(e: AxisError) -> Self {
        ErrorCode::Axis(e)
    }
}

/// One reply line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reply {
    /// Every operation in the request succeeded
    Ok,
    /// The request was rejected
    Error(ErrorCode),
    /// Axis snapshot
    Status(AxisStatus),
}

impl Reply {
    /// Render the reply with a trailing `\n`
    pub fn to_line(&self) -> Result<String<MAX_REPLY_LEN>, fmt::Error> {
        let mut line = String::new();
        writeln!(line, "{}", self)?;
        Ok(line)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => f.write_str("OK"),
            Reply::Error(code) => write!(f, "ERR {}", code.as_str()),
            Reply::Status(status) => write!(
                f,
                "STATUS pos={} mm={:.2} target={} enabled={} auto={} speed={:.1} phase={}",
                status.position_steps,
                status.position_mm,
                status.target_steps,
                status.enabled() as u8,
                status.auto_mode as u8,
                status.speed_steps_per_s,
                phase_name(status.phase),
            ),
        }
    }
}

fn phase_name(phase: MotionPhase) -> &'static str {
    match phase {
        MotionPhase::Idle => "idle",
        MotionPhase::Accelerating => "accelerating",
        MotionPhase::Cruising => "cruising",
        MotionPhase::Decelerating => "decelerating",
        MotionPhase::Stopped => "stopped",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use louver_core::axis::AxisState;

    #[test]
    fn test_ok_and_errors() {
        assert_eq!(Reply::Ok.to_line().unwrap().as_str(), "OK\n");
        assert_eq!(
            Reply::Error(AxisError::OutOfRange.into()).to_line().unwrap().as_str(),
            "ERR out-of-range\n"
        );
        assert_eq!(
            Reply::Error(LineError::TooLong.into()).to_line().unwrap().as_str(),
            "ERR line-too-long\n"
        );
        assert_eq!(
            Reply::Error(ParseError::UnknownKey.into()).to_line().unwrap().as_str(),
            "ERR unknown-key\n"
        );
    }

    #[test]
    fn test_status_line() {
        let status = AxisStatus {
            position_steps: 1000,
            position_mm: 2.5,
            target_steps: 4000,
            state: AxisState::Moving,
            auto_mode: true,
            going_forward_next: true,
            speed_steps_per_s: -1500.0,
            phase: MotionPhase::Cruising,
        };
        assert_eq!(
            Reply::Status(status).to_line().unwrap().as_str(),
            "STATUS pos=1000 mm=2.50 target=4000 enabled=1 auto=1 speed=-1500.0 phase=cruising\n"
        );
    }

    #[test]
    fn test_widest_status_fits() {
        let status = AxisStatus {
            position_steps: i32::MIN,
            position_mm: -f32::MAX,
            target_steps: i32::MIN,
            state: AxisState::Disabled,
            auto_mode: false,
            going_forward_next: false,
            speed_steps_per_s: -3000.0,
            phase: MotionPhase::Decelerating,
        };
        assert!(Reply::Status(status).to_line().is_ok());
    }
}
