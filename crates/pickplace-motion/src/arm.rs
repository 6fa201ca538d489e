use pickplace_core::{JointAngles, RobotPose};

/// The robot actuator, as exposed by its vendor SDK.
///
/// Every command is fire-and-forget; the only feedback channel is
/// [`Arm::current_pose`], and even that can come back empty on a busy
/// serial link. Callers that need completion or grip confidence compose
/// [`crate::await_arrival`] and [`crate::cycle_gripper`] on top.
pub trait Arm {
    /// Command a Cartesian move. Non-blocking.
    fn move_to_pose(&mut self, pose: &RobotPose, speed: u8);

    /// Command a joint-space move. Non-blocking.
    fn move_to_joints(&mut self, angles: &JointAngles, speed: u8);

    /// Last pose reported by the device, `None` when the read fails.
    fn current_pose(&mut self) -> Option<RobotPose>;

    fn gripper_open(&mut self);

    fn gripper_close(&mut self);
}
