//! High-level facade crate for the `pickplace-*` workspace.
//!
//! Converts a camera-observed scene into pick-and-place motion for a small
//! cobot arm: a reference frame located in the image anchors a
//! pixel-to-millimeter transform, a colored-object detection picks the
//! target, and a sequenced state machine drives approach, grip, transport
//! and placement with arrival confirmation and open-loop gripper retries.
//!
//! Perception routines, the actuator SDK and the operator UI are
//! collaborators implemented by the embedding application; see the
//! [`Perception`], [`Arm`] and [`Host`] traits and the simulated rig in
//! `examples/sim_cycle.rs`.
//!
//! ## API map
//! - [`core`](pickplace_core): reference frame, poses, the coordinate transform.
//! - [`motion`](pickplace_motion): actuator seam, arrival monitor, gripper cycler.
//! - [`auto`](pickplace_auto): detection latch and the sequencing state machine.

pub use pickplace_auto as auto;
pub use pickplace_core as core;
pub use pickplace_motion as motion;

pub use pickplace_auto::{
    DetectionLatch, Host, Perception, PickPlaceSequencer, SequenceError, SequenceParams,
    SequenceState, SlotTable,
};
pub use pickplace_core::{
    pixel_to_robot, Detection, GeometryError, JointAngles, PlaceSlot, QuadrantGains,
    ReferenceFrame, RobotPose, TransformParams,
};
pub use pickplace_motion::{
    await_arrival, cycle_gripper, Arm, ArrivalParams, GripperAction, GripperCycle,
};
