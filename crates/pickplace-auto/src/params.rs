use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use pickplace_core::{JointAngles, PlaceSlot, TransformParams};
use pickplace_motion::{ArrivalParams, GripperCycle};

/// Label routing plus the joint configuration of each drop-off slot.
///
/// The joint angles are rig calibration data, taught by jogging the arm to
/// each physical bin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotTable {
    /// Detected-label -> slot routes. Labels outside this table cannot be
    /// placed and fail the sequence.
    pub routes: BTreeMap<String, PlaceSlot>,
    pub slot_a: JointAngles,
    pub slot_b: JointAngles,
    pub slot_c: JointAngles,
    pub slot_d: JointAngles,
}

impl SlotTable {
    pub fn slot_for(&self, label: &str) -> Option<PlaceSlot> {
        self.routes.get(label).copied()
    }

    pub fn angles(&self, slot: PlaceSlot) -> JointAngles {
        match slot {
            PlaceSlot::A => self.slot_a,
            PlaceSlot::B => self.slot_b,
            PlaceSlot::C => self.slot_c,
            PlaceSlot::D => self.slot_d,
        }
    }
}

impl Default for SlotTable {
    fn default() -> Self {
        let routes = [
            ("yellow", PlaceSlot::A),
            ("red", PlaceSlot::B),
            ("green", PlaceSlot::C),
            ("purple", PlaceSlot::D),
        ]
        .into_iter()
        .map(|(label, slot)| (label.to_owned(), slot))
        .collect();

        Self {
            routes,
            slot_a: JointAngles([54.58, -42.89, -11.16, -12.3, 90.61, -80.0]),
            slot_b: JointAngles([103.18, 9.75, -75.32, -11.16, 90.76, -30.0]),
            slot_c: JointAngles([-26.0, -33.92, -30.75, 0.66, 90.08, -155.0]),
            slot_d: JointAngles([-65.15, 8.17, -75.56, -8.0, 93.86, -10.0]),
        }
    }
}

/// Everything the sequencer needs for one pick-and-place cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceParams {
    pub transform: TransformParams,
    pub arrival: ArrivalParams,
    pub gripper: GripperCycle,
    /// Window within which a detection must appear before the run fails.
    pub detection_timeout: Duration,
    pub detection_poll: Duration,
    pub home_angles: JointAngles,
    pub home_speed: u8,
    pub approach_speed: u8,
    pub pick_speed: u8,
    pub place_speed: u8,
    /// Descent below the hover height for the grip, mm.
    pub descent_mm: f64,
    /// Hard floor for the grip descent, mm.
    pub min_z_mm: f64,
    /// Pause between the place motion and the release cycle.
    pub place_settle: Duration,
    pub slots: SlotTable,
}

impl Default for SequenceParams {
    fn default() -> Self {
        Self {
            transform: TransformParams::default(),
            arrival: ArrivalParams::default(),
            gripper: GripperCycle::default(),
            detection_timeout: Duration::from_secs(10),
            detection_poll: Duration::from_millis(100),
            home_angles: JointAngles([0.0, 45.0, -90.0, -45.0, 90.0, -90.0]),
            home_speed: 30,
            approach_speed: 30,
            pick_speed: 40,
            place_speed: 40,
            descent_mm: 110.0,
            min_z_mm: 100.0,
            place_settle: Duration::from_secs(6),
            slots: SlotTable::default(),
        }
    }
}
