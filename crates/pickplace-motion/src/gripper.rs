use std::thread;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::arm::Arm;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum GripperAction {
    Open,
    Close,
}

/// Open-loop repetition settings for gripper actuation.
///
/// The gripper acknowledges nothing, so every open/close is issued a fixed
/// number of times with a pause in between. This is a reliability margin,
/// not an error-driven retry; do not conflate the two.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GripperCycle {
    pub attempts: u32,
    pub pause: Duration,
}

impl Default for GripperCycle {
    fn default() -> Self {
        Self {
            attempts: 4,
            pause: Duration::from_secs(2),
        }
    }
}

/// Issue a gripper command `params.attempts` times unconditionally.
pub fn cycle_gripper<A: Arm + ?Sized>(arm: &mut A, action: GripperAction, params: &GripperCycle) {
    debug!("gripper {:?} x{}", action, params.attempts);
    for _ in 0..params.attempts {
        match action {
            GripperAction::Open => arm.gripper_open(),
            GripperAction::Close => arm.gripper_close(),
        }
        thread::sleep(params.pause);
    }
}
