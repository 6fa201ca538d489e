use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use pickplace_core::{pixel_to_robot, GeometryError, PlaceSlot, ReferenceFrame, RobotPose};
use pickplace_motion::{await_arrival, cycle_gripper, Arm, GripperAction};

use crate::latch::DetectionLatch;
use crate::params::SequenceParams;
use crate::traits::{Host, Perception};

/// Why a run stopped before `Done`.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SequenceError {
    #[error("no object detected within {0:?}")]
    DetectionTimeout(Duration),
    #[error("missing ROI or object coordinates")]
    MissingObservation,
    #[error("rotation computation failed: {0}")]
    Geometry(#[from] GeometryError),
    #[error("label {0:?} not classified for placement")]
    UnclassifiedLabel(String),
}

/// Phase of the pick-and-place cycle.
///
/// `Done` and `Failed` are terminal for the run; the operator starts a new
/// traversal with [`PickPlaceSequencer::start_homing`] or
/// [`PickPlaceSequencer::run_auto`].
#[derive(Clone, Debug, PartialEq)]
pub enum SequenceState {
    Idle,
    Homing,
    AwaitingDetection,
    Approaching,
    PickingUp,
    SelectingSlot,
    Placing,
    Done,
    Failed(SequenceError),
}

/// Drives one arm through home -> detect -> approach -> pick -> place.
///
/// Owns the detection latch and pulls perception itself, so there is a
/// single writer for every piece of state. Arrival confirmation is
/// best-effort by design: an unconfirmed motion is logged and the sequence
/// proceeds, because the actuator offers no hard failure signal.
pub struct PickPlaceSequencer<A, P, H> {
    arm: A,
    perception: P,
    host: H,
    params: SequenceParams,
    latch: DetectionLatch,
    state: SequenceState,
    /// Hover pose committed by the last approach; pickup retracts to it.
    hover: Option<RobotPose>,
    held_label: Option<String>,
}

impl<A: Arm, P: Perception, H: Host> PickPlaceSequencer<A, P, H> {
    pub fn new(arm: A, perception: P, host: H, params: SequenceParams) -> Self {
        Self {
            arm,
            perception,
            host,
            params,
            latch: DetectionLatch::default(),
            state: SequenceState::Idle,
            hover: None,
            held_label: None,
        }
    }

    pub fn state(&self) -> &SequenceState {
        &self.state
    }

    pub fn params(&self) -> &SequenceParams {
        &self.params
    }

    pub fn latch(&self) -> &DetectionLatch {
        &self.latch
    }

    /// Release the collaborators, e.g. to inspect a simulated rig.
    pub fn into_parts(self) -> (A, P, H) {
        (self.arm, self.perception, self.host)
    }

    /// One perception update cycle.
    ///
    /// Refreshes the reference frame (keeping the previous one when the
    /// locator fails) and offers the first detection to the latch. Hosts
    /// with a frame timer call this at their own cadence; the detection
    /// wait calls it between polls.
    pub fn poll_perception(&mut self) {
        if let Some((p0, p1)) = self.perception.locate_reference_frame() {
            self.latch.update_frame(ReferenceFrame::from_markers(p0, p1));
        }
        let Some(frame) = self.latch.frame().copied() else {
            return;
        };
        if let Some(detection) = self.perception.detect_objects(&frame).into_iter().next() {
            self.latch.offer(detection);
        }
    }

    /// Close the gripper to a known state and command the home posture.
    ///
    /// Fire-and-forget: the sequence advances without waiting for the home
    /// motion to finish.
    pub fn start_homing(&mut self) {
        self.state = SequenceState::Homing;
        cycle_gripper(&mut self.arm, GripperAction::Close, &self.params.gripper);
        self.arm
            .move_to_joints(&self.params.home_angles, self.params.home_speed);
        info!("home posture commanded");
        self.host.report_status("moving to home posture");
        self.state = SequenceState::AwaitingDetection;
    }

    /// Lock the live observation, move above the object and release the
    /// gripper there.
    pub fn start_approach(&mut self) -> Result<(), SequenceError> {
        match self.approach() {
            Ok(_) => Ok(()),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Descend onto the locked target, grip, and retract to hover height.
    pub fn start_pickup(&mut self) -> Result<(), SequenceError> {
        match self.pickup() {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Place at an operator-chosen slot, bypassing label routing.
    pub fn start_place(&mut self, slot: PlaceSlot) {
        self.place(slot);
    }

    /// Full automatic traversal: home, detect, approach, pick, route,
    /// place. On failure the state machine lands in `Failed` with an
    /// operator-readable reason and must be restarted explicitly.
    pub fn run_auto(&mut self) -> Result<(), SequenceError> {
        match self.auto() {
            Ok(()) => {
                self.host.report_status("automatic cycle complete");
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn auto(&mut self) -> Result<(), SequenceError> {
        self.start_homing();
        self.host.report_status("awaiting object detection");
        self.wait_for_detection()?;
        self.approach()?;
        self.pickup()?;
        let slot = self.select_slot()?;
        self.place(slot);
        Ok(())
    }

    /// Poll until a detection appears, servicing host events in between so
    /// the embedding application stays responsive.
    fn wait_for_detection(&mut self) -> Result<(), SequenceError> {
        self.state = SequenceState::AwaitingDetection;
        let started = Instant::now();
        while started.elapsed() < self.params.detection_timeout {
            self.poll_perception();
            if self.latch.live().is_some() {
                return Ok(());
            }
            self.host.process_events();
            thread::sleep(self.params.detection_poll);
        }
        Err(SequenceError::DetectionTimeout(self.params.detection_timeout))
    }

    fn approach(&mut self) -> Result<RobotPose, SequenceError> {
        self.state = SequenceState::Approaching;
        let snapshot = self.latch.lock();
        let (detection, frame) = match (snapshot.detection, snapshot.frame) {
            (Some(detection), Some(frame)) => (detection, frame),
            _ => {
                self.latch.unlock();
                return Err(SequenceError::MissingObservation);
            }
        };

        let pose = match pixel_to_robot(detection.centroid, &frame, &self.params.transform) {
            Ok(pose) => pose,
            Err(err) => {
                self.latch.unlock();
                return Err(err.into());
            }
        };

        info!(
            "approach target x={:.1} y={:.1} z={:.1} for {:?}",
            pose.x, pose.y, pose.z, detection.label
        );
        self.arm.move_to_pose(&pose, self.params.approach_speed);
        self.host
            .report_status(&format!("approaching object at x={:.1} y={:.1}", pose.x, pose.y));
        self.held_label = Some(detection.label);
        self.hover = Some(pose);
        // live updates may resume; the motion keeps using the snapshot
        self.latch.unlock();

        if !await_arrival(&mut self.arm, &pose, &self.params.arrival) {
            warn!("approach arrival unconfirmed, proceeding");
        }
        cycle_gripper(&mut self.arm, GripperAction::Open, &self.params.gripper);
        self.state = SequenceState::PickingUp;
        Ok(pose)
    }

    fn pickup(&mut self) -> Result<(), SequenceError> {
        self.state = SequenceState::PickingUp;
        let hover = self.hover.ok_or(SequenceError::MissingObservation)?;
        let grip_z = (hover.z - self.params.descent_mm).max(self.params.min_z_mm);
        let grip = hover.with_z(grip_z);

        self.arm.move_to_pose(&grip, self.params.pick_speed);
        if !await_arrival(&mut self.arm, &grip, &self.params.arrival) {
            warn!("grip-depth arrival unconfirmed, proceeding");
        }
        cycle_gripper(&mut self.arm, GripperAction::Close, &self.params.gripper);
        self.arm.move_to_pose(&hover, self.params.pick_speed);
        self.state = SequenceState::SelectingSlot;
        Ok(())
    }

    fn select_slot(&mut self) -> Result<PlaceSlot, SequenceError> {
        self.state = SequenceState::SelectingSlot;
        let label = self.held_label.clone().unwrap_or_default();
        self.params
            .slots
            .slot_for(&label)
            .ok_or_else(|| SequenceError::UnclassifiedLabel(label))
    }

    fn place(&mut self, slot: PlaceSlot) {
        self.state = SequenceState::Placing;
        let angles = self.params.slots.angles(slot);
        self.arm.move_to_joints(&angles, self.params.place_speed);
        thread::sleep(self.params.place_settle);
        self.host.report_status(&format!("placed at slot {slot}"));
        cycle_gripper(&mut self.arm, GripperAction::Open, &self.params.gripper);
        self.state = SequenceState::Done;
    }

    fn fail(&mut self, err: SequenceError) -> SequenceError {
        warn!("sequence failed: {err}");
        self.host.report_status(&err.to_string());
        self.state = SequenceState::Failed(err.clone());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;
    use pickplace_core::{Detection, JointAngles};
    use pickplace_motion::{ArrivalParams, GripperCycle};
    use std::collections::VecDeque;

    #[derive(Clone, Debug, PartialEq)]
    enum Cmd {
        Pose(RobotPose, u8),
        Joints(JointAngles, u8),
        Open,
        Close,
    }

    /// Simulated arm: records every command; pose reads report the last
    /// commanded Cartesian target (instant arrival) unless blind.
    struct RigArm {
        log: Vec<Cmd>,
        last_pose: Option<RobotPose>,
        blind: bool,
    }

    impl RigArm {
        fn tracking() -> Self {
            Self {
                log: Vec::new(),
                last_pose: None,
                blind: false,
            }
        }

        fn blind() -> Self {
            Self {
                blind: true,
                ..Self::tracking()
            }
        }
    }

    impl Arm for RigArm {
        fn move_to_pose(&mut self, pose: &RobotPose, speed: u8) {
            self.last_pose = Some(*pose);
            self.log.push(Cmd::Pose(*pose, speed));
        }
        fn move_to_joints(&mut self, angles: &JointAngles, speed: u8) {
            self.log.push(Cmd::Joints(*angles, speed));
        }
        fn current_pose(&mut self) -> Option<RobotPose> {
            if self.blind {
                None
            } else {
                self.last_pose
            }
        }
        fn gripper_open(&mut self) {
            self.log.push(Cmd::Open);
        }
        fn gripper_close(&mut self) {
            self.log.push(Cmd::Close);
        }
    }

    /// Scripted perception: fixed markers plus per-cycle detection lists.
    struct Scene {
        markers: Option<(Point2<f64>, Point2<f64>)>,
        script: VecDeque<Vec<Detection>>,
    }

    impl Scene {
        fn with_object(label: &str) -> Self {
            Self {
                markers: Some((Point2::new(0.0, 0.0), Point2::new(300.0, 300.0))),
                script: VecDeque::from([vec![Detection::new(
                    label,
                    Point2::new(150.0, 150.0),
                )]]),
            }
        }

        fn empty() -> Self {
            Self {
                markers: None,
                script: VecDeque::new(),
            }
        }
    }

    impl Perception for Scene {
        fn locate_reference_frame(&mut self) -> Option<(Point2<f64>, Point2<f64>)> {
            self.markers
        }
        fn detect_objects(&mut self, _roi: &ReferenceFrame) -> Vec<Detection> {
            self.script.pop_front().unwrap_or_default()
        }
    }

    #[derive(Default)]
    struct RecordingHost {
        statuses: Vec<String>,
        yields: u32,
    }

    impl Host for RecordingHost {
        fn report_status(&mut self, text: &str) {
            self.statuses.push(text.to_owned());
        }
        fn process_events(&mut self) {
            self.yields += 1;
        }
    }

    fn fast_params() -> SequenceParams {
        SequenceParams {
            arrival: ArrivalParams {
                poll_interval: Duration::ZERO,
                ..ArrivalParams::default()
            },
            gripper: GripperCycle {
                pause: Duration::ZERO,
                ..GripperCycle::default()
            },
            detection_timeout: Duration::from_secs(5),
            detection_poll: Duration::ZERO,
            place_settle: Duration::ZERO,
            ..SequenceParams::default()
        }
    }

    fn sequencer(
        arm: RigArm,
        scene: Scene,
        params: SequenceParams,
    ) -> PickPlaceSequencer<RigArm, Scene, RecordingHost> {
        PickPlaceSequencer::new(arm, scene, RecordingHost::default(), params)
    }

    #[test]
    fn auto_cycle_completes_and_routes_yellow_to_slot_a() {
        let params = fast_params();
        let mut seq = sequencer(RigArm::tracking(), Scene::with_object("yellow"), params.clone());

        seq.run_auto().unwrap();
        assert_eq!(*seq.state(), SequenceState::Done);
        assert!(!seq.latch().is_locked());

        let hover = RobotPose::new(250.0, 0.0, 280.0, 180.0, 0.0, 0.0);
        let grip = hover.with_z(170.0);
        let mut expected = vec![Cmd::Close; 4];
        expected.push(Cmd::Joints(params.home_angles, 30));
        expected.push(Cmd::Pose(hover, 30));
        expected.extend(vec![Cmd::Open; 4]);
        expected.push(Cmd::Pose(grip, 40));
        expected.extend(vec![Cmd::Close; 4]);
        expected.push(Cmd::Pose(hover, 40));
        expected.push(Cmd::Joints(params.slots.slot_a, 40));
        expected.extend(vec![Cmd::Open; 4]);

        let (arm, _, host) = seq.into_parts();
        assert_eq!(arm.log, expected);
        assert_eq!(
            host.statuses,
            vec![
                "moving to home posture",
                "awaiting object detection",
                "approaching object at x=250.0 y=0.0",
                "placed at slot A",
                "automatic cycle complete",
            ]
        );
    }

    #[test]
    fn each_route_places_at_its_own_slot() {
        for (label, slot) in [
            ("yellow", PlaceSlot::A),
            ("red", PlaceSlot::B),
            ("green", PlaceSlot::C),
            ("purple", PlaceSlot::D),
        ] {
            let params = fast_params();
            let expected = params.slots.angles(slot);
            let mut seq = sequencer(RigArm::tracking(), Scene::with_object(label), params);
            seq.run_auto().unwrap();

            let (arm, _, _) = seq.into_parts();
            let last_joints = arm
                .log
                .iter()
                .rev()
                .find_map(|cmd| match cmd {
                    Cmd::Joints(angles, _) => Some(*angles),
                    _ => None,
                })
                .unwrap();
            assert_eq!(last_joints, expected, "label {label:?}");
        }
    }

    #[test]
    fn detection_timeout_fails_the_run() {
        let params = SequenceParams {
            detection_timeout: Duration::ZERO,
            ..fast_params()
        };
        let mut seq = sequencer(RigArm::tracking(), Scene::empty(), params);

        let err = seq.run_auto().unwrap_err();
        assert_eq!(err, SequenceError::DetectionTimeout(Duration::ZERO));
        assert_eq!(*seq.state(), SequenceState::Failed(err.clone()));

        let (arm, _, host) = seq.into_parts();
        // homed, but never commanded a Cartesian motion
        assert!(arm.log.iter().all(|cmd| !matches!(cmd, Cmd::Pose(..))));
        assert!(host
            .statuses
            .last()
            .unwrap()
            .contains("no object detected"));
    }

    #[test]
    fn detection_wait_services_host_events_between_polls() {
        let mut scene = Scene::with_object("red");
        // first perception cycle sees nothing, second sees the object
        scene.script.push_front(Vec::new());
        let mut seq = sequencer(RigArm::tracking(), scene, fast_params());

        seq.run_auto().unwrap();
        let (_, _, host) = seq.into_parts();
        assert_eq!(host.yields, 1);
    }

    #[test]
    fn unroutable_label_aborts_before_any_place_motion() {
        let mut seq = sequencer(RigArm::tracking(), Scene::with_object("sky"), fast_params());

        let err = seq.run_auto().unwrap_err();
        assert_eq!(err, SequenceError::UnclassifiedLabel("sky".to_owned()));
        assert!(matches!(seq.state(), SequenceState::Failed(_)));

        let (arm, _, host) = seq.into_parts();
        let joints_cmds = arm
            .log
            .iter()
            .filter(|cmd| matches!(cmd, Cmd::Joints(..)))
            .count();
        assert_eq!(joints_cmds, 1, "only the homing joint move is allowed");
        assert!(host
            .statuses
            .last()
            .unwrap()
            .contains("not classified for placement"));
    }

    #[test]
    fn approach_without_observation_fails() {
        let mut seq = sequencer(RigArm::tracking(), Scene::empty(), fast_params());

        let err = seq.start_approach().unwrap_err();
        assert_eq!(err, SequenceError::MissingObservation);
        assert_eq!(*seq.state(), SequenceState::Failed(err));
        assert!(!seq.latch().is_locked());

        let (_, _, host) = seq.into_parts();
        assert!(host
            .statuses
            .last()
            .unwrap()
            .contains("missing ROI or object coordinates"));
    }

    #[test]
    fn degenerate_frame_fails_the_rotation_step() {
        // markers on a horizontal line: zero-height frame
        let scene = Scene {
            markers: Some((Point2::new(100.0, 100.0), Point2::new(400.0, 100.0))),
            script: VecDeque::from([vec![Detection::new("red", Point2::new(250.0, 100.0))]]),
        };
        let mut seq = sequencer(RigArm::tracking(), scene, fast_params());

        let err = seq.run_auto().unwrap_err();
        assert!(matches!(err, SequenceError::Geometry(_)));
        assert!(err.to_string().contains("rotation computation failed"));
        assert!(matches!(seq.state(), SequenceState::Failed(_)));
    }

    #[test]
    fn pickup_without_prior_approach_fails() {
        let mut seq = sequencer(RigArm::tracking(), Scene::empty(), fast_params());

        let err = seq.start_pickup().unwrap_err();
        assert_eq!(err, SequenceError::MissingObservation);
        assert!(matches!(seq.state(), SequenceState::Failed(_)));
    }

    #[test]
    fn grip_descent_clamps_to_the_minimum_safe_height() {
        for (hover_z, expected_grip_z) in [(280.0, 170.0), (150.0, 100.0), (100.0, 100.0)] {
            let mut params = fast_params();
            params.transform.hover_z_mm = hover_z;
            let mut seq = sequencer(RigArm::tracking(), Scene::with_object("green"), params);
            seq.run_auto().unwrap();

            let (arm, _, _) = seq.into_parts();
            let min_commanded = arm
                .log
                .iter()
                .filter_map(|cmd| match cmd {
                    Cmd::Pose(pose, _) => Some(pose.z),
                    _ => None,
                })
                .fold(f64::INFINITY, f64::min);
            assert_eq!(min_commanded, expected_grip_z, "hover {hover_z}");
        }
    }

    #[test]
    fn unconfirmed_arrival_is_not_fatal() {
        let mut seq = sequencer(RigArm::blind(), Scene::with_object("purple"), fast_params());
        seq.run_auto().unwrap();
        assert_eq!(*seq.state(), SequenceState::Done);
    }

    #[test]
    fn failed_run_restarts_via_homing() {
        let params = SequenceParams {
            detection_timeout: Duration::ZERO,
            ..fast_params()
        };
        let mut seq = sequencer(RigArm::tracking(), Scene::empty(), params);
        seq.run_auto().unwrap_err();
        assert!(matches!(seq.state(), SequenceState::Failed(_)));

        seq.start_homing();
        assert_eq!(*seq.state(), SequenceState::AwaitingDetection);
    }

    #[test]
    fn manual_place_bypasses_label_routing() {
        let params = fast_params();
        let expected = params.slots.angles(PlaceSlot::D);
        let mut seq = sequencer(RigArm::tracking(), Scene::empty(), params);

        seq.start_place(PlaceSlot::D);
        assert_eq!(*seq.state(), SequenceState::Done);

        let (arm, _, _) = seq.into_parts();
        assert_eq!(arm.log[0], Cmd::Joints(expected, 40));
        assert_eq!(arm.log[1..].to_vec(), vec![Cmd::Open; 4]);
    }
}
