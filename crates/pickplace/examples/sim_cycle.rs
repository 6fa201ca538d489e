//! Run one automatic pick-and-place cycle against a simulated rig.
//!
//! The simulated arm arrives wherever it is sent, the simulated camera
//! always sees the reference markers plus one red object, and status lines
//! go to stdout. `RUST_LOG=debug` shows the motion diagnostics.

use std::time::Duration;

use log::info;
use nalgebra::Point2;

use pickplace::{
    Arm, ArrivalParams, Detection, GripperCycle, Host, JointAngles, Perception,
    PickPlaceSequencer, ReferenceFrame, RobotPose, SequenceParams,
};

/// Arm that instantly reports whatever Cartesian pose was last commanded.
#[derive(Default)]
struct SimArm {
    pose: Option<RobotPose>,
}

impl Arm for SimArm {
    fn move_to_pose(&mut self, pose: &RobotPose, speed: u8) {
        info!("move_to_pose x={:.1} y={:.1} z={:.1} speed={speed}", pose.x, pose.y, pose.z);
        self.pose = Some(*pose);
    }

    fn move_to_joints(&mut self, angles: &JointAngles, speed: u8) {
        info!("move_to_joints {:?} speed={speed}", angles.0);
    }

    fn current_pose(&mut self) -> Option<RobotPose> {
        self.pose
    }

    fn gripper_open(&mut self) {
        info!("gripper open");
    }

    fn gripper_close(&mut self) {
        info!("gripper close");
    }
}

/// Camera that always sees the two corner markers and one red object a
/// little right and above the work-area center.
struct SimCamera;

impl Perception for SimCamera {
    fn locate_reference_frame(&mut self) -> Option<(Point2<f64>, Point2<f64>)> {
        Some((Point2::new(170.0, 90.0), Point2::new(470.0, 390.0)))
    }

    fn detect_objects(&mut self, _roi: &ReferenceFrame) -> Vec<Detection> {
        vec![Detection::new("red", Point2::new(360.0, 200.0))]
    }
}

struct Console;

impl Host for Console {
    fn report_status(&mut self, text: &str) {
        println!("status: {text}");
    }
}

fn main() {
    env_logger::init();

    // The simulated rig needs no physical settling time.
    let params = SequenceParams {
        arrival: ArrivalParams {
            poll_interval: Duration::from_millis(1),
            ..ArrivalParams::default()
        },
        gripper: GripperCycle {
            pause: Duration::from_millis(1),
            ..GripperCycle::default()
        },
        detection_poll: Duration::from_millis(1),
        place_settle: Duration::from_millis(1),
        ..SequenceParams::default()
    };

    let mut sequencer = PickPlaceSequencer::new(SimArm::default(), SimCamera, Console, params);
    match sequencer.run_auto() {
        Ok(()) => println!("final state: {:?}", sequencer.state()),
        Err(err) => println!("cycle failed: {err}"),
    }
}
