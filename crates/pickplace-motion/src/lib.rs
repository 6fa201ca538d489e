//! Actuator seam and motion-confirmation primitives.
//!
//! Motion commands are fire-and-forget: the device accepts a target and
//! returns nothing. Completion is confirmed separately by bounded pose
//! polling, and gripper actuation is repeated open-loop because the device
//! reports no success signal at all.

mod arm;
mod arrival;
mod gripper;

pub use arm::Arm;
pub use arrival::{await_arrival, ArrivalParams};
pub use gripper::{cycle_gripper, GripperAction, GripperCycle};
