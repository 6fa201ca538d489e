use std::thread;
use std::time::Duration;

use log::trace;
use serde::{Deserialize, Serialize};

use pickplace_core::RobotPose;

use crate::arm::Arm;

/// Arrival-confirmation settings.
///
/// The defaults give a ~9 s budget (30 polls at 300 ms) with a 5 mm
/// position tolerance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrivalParams {
    /// Per-axis position tolerance in millimeters.
    pub tolerance_mm: f64,
    /// Number of pose reads before giving up.
    pub max_polls: u32,
    pub poll_interval: Duration,
}

impl Default for ArrivalParams {
    fn default() -> Self {
        Self {
            tolerance_mm: 5.0,
            max_polls: 30,
            poll_interval: Duration::from_millis(300),
        }
    }
}

/// Poll the arm until its reported position matches `target`.
///
/// Only x, y and z are checked; orientation readback on this class of arm
/// is too noisy to gate on. A failed pose read counts as a non-match for
/// that poll. Returns `false` once the poll budget is exhausted; the
/// caller decides whether that is fatal.
pub fn await_arrival<A: Arm + ?Sized>(
    arm: &mut A,
    target: &RobotPose,
    params: &ArrivalParams,
) -> bool {
    for poll in 0..params.max_polls {
        if let Some(pose) = arm.current_pose() {
            if position_within(&pose, target, params.tolerance_mm) {
                trace!("arrival confirmed on poll {}", poll + 1);
                return true;
            }
        }
        thread::sleep(params.poll_interval);
    }
    false
}

fn position_within(pose: &RobotPose, target: &RobotPose, tol: f64) -> bool {
    (pose.x - target.x).abs() < tol
        && (pose.y - target.y).abs() < tol
        && (pose.z - target.z).abs() < tol
}
