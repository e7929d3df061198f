//! Applying parsed requests to the axis

use louver_core::axis::{AxisController, AxisError, JogDirection};
use louver_core::motion::MoveEstimate;
use louver_core::traits::StepPulseSink;

use crate::reply::Reply;
use crate::request::{ControlRequest, MoveRequest};

/// Result of executing one request line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    /// Reply to send back
    pub reply: Reply,
    /// Estimate of the last move started by this request
    pub estimate: Option<MoveEstimate>,
    /// Speed or acceleration changed and should be persisted
    pub tuning_changed: bool,
}

/// Execute the operations of one request in order
///
/// Stops at the first rejected operation; operations before it stay
/// applied. A request containing `status` replies with the snapshot
/// taken after all operations ran.
pub fn execute<S: StepPulseSink>(
    axis: &mut AxisController<S>,
    request: &[ControlRequest],
) -> Outcome {
    let mut outcome = Outcome {
        reply: Reply::Ok,
        estimate: None,
        tuning_changed: false,
    };
    let mut wants_status = false;

    for op in request {
        let result = match *op {
            ControlRequest::Enable(on) => {
                axis.set_enabled(on);
                Ok(None)
            }
            ControlRequest::Move(MoveRequest::Left) => axis.jog(JogDirection::Left).map(Some),
            ControlRequest::Move(MoveRequest::Right) => axis.jog(JogDirection::Right).map(Some),
            ControlRequest::Move(MoveRequest::Home) => axis.home().map(Some),
            ControlRequest::Move(MoveRequest::Steps(delta)) => {
                axis.request_relative_move(delta).map(Some)
            }
            ControlRequest::Move(MoveRequest::Millimeters(delta)) => {
                axis.request_relative_move_mm(delta).map(Some)
            }
            ControlRequest::Position(target) => axis.request_move(target).map(Some),
            ControlRequest::Speed(v) => tune(axis.set_max_speed(v), &mut outcome),
            ControlRequest::Acceleration(a) => tune(axis.set_acceleration(a), &mut outcome),
            ControlRequest::Stop => {
                axis.stop();
                Ok(None)
            }
            ControlRequest::Auto(on) => axis.set_auto_mode(on).map(|()| None),
            ControlRequest::Status => {
                wants_status = true;
                Ok(None)
            }
        };

        match result {
            Ok(Some(estimate)) => outcome.estimate = Some(estimate),
            Ok(None) => {}
            Err(e) => {
                outcome.reply = Reply::Error(e.into());
                return outcome;
            }
        }
    }

    if wants_status {
        outcome.reply = Reply::Status(axis.status());
    }
    outcome
}

fn tune(
    result: Result<(), AxisError>,
    outcome: &mut Outcome,
) -> Result<Option<MoveEstimate>, AxisError> {
    result?;
    outcome.tuning_changed = true;
    Ok(None)
}
