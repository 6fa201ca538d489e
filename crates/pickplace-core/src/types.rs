use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// Cartesian pose of the tool head in the robot base frame.
///
/// Position in millimeters, orientation in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl RobotPose {
    pub const fn new(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self {
            x,
            y,
            z,
            roll,
            pitch,
            yaw,
        }
    }

    /// Same x/y and orientation at a different height.
    pub fn with_z(self, z: f64) -> Self {
        Self { z, ..self }
    }

    /// Position part of the pose.
    pub fn position(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }
}

/// Six joint values in degrees, base to wrist.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointAngles(pub [f64; 6]);

/// One colored-object detection reported by the perception collaborator.
///
/// Ephemeral, produced per frame; the sequencer snapshots the one it
/// commits to (see the detection latch).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    /// Pixel centroid in full-frame coordinates.
    pub centroid: Point2<f64>,
}

impl Detection {
    pub fn new(label: impl Into<String>, centroid: Point2<f64>) -> Self {
        Self {
            label: label.into(),
            centroid,
        }
    }
}

/// Predefined drop-off position, each bound to a joint configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PlaceSlot {
    A,
    B,
    C,
    D,
}

impl PlaceSlot {
    pub const ALL: [PlaceSlot; 4] = [PlaceSlot::A, PlaceSlot::B, PlaceSlot::C, PlaceSlot::D];
}

impl std::fmt::Display for PlaceSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlaceSlot::A => "A",
            PlaceSlot::B => "B",
            PlaceSlot::C => "C",
            PlaceSlot::D => "D",
        };
        f.write_str(name)
    }
}
