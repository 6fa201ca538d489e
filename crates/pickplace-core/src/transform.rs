use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::frame::ReferenceFrame;
use crate::types::RobotPose;

/// Errors from the pixel-to-robot conversion.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("degenerate reference frame ({width:.1} x {height:.1} px)")]
    DegenerateFrame { width: f64, height: f64 },
    #[error("reference frame rotation is undefined")]
    RotationUndefined,
}

/// Empirical per-direction multipliers correcting non-uniform
/// camera-to-robot mapping error.
///
/// Calibration data, tuned against one physical rig. The quadrant names
/// follow image rows (y grows downward); selection uses the offsets after
/// rotation into the frame's own axes. Re-tune on hardware changes instead
/// of editing the transform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuadrantGains {
    /// `dx >= 0, dy <= 0`.
    pub upper_right: [f64; 2],
    /// `dx < 0, dy <= 0`.
    pub upper_left: [f64; 2],
    /// `dx < 0, dy > 0`.
    pub lower_left: [f64; 2],
    /// `dx >= 0, dy > 0`.
    pub lower_right: [f64; 2],
}

impl QuadrantGains {
    /// Gain pair for a rotated offset.
    ///
    /// A zero component resolves to the non-negative-x / non-positive-y
    /// branch, so every offset selects exactly one pair.
    pub fn select(&self, dx: f64, dy: f64) -> [f64; 2] {
        if dx >= 0.0 {
            if dy <= 0.0 {
                self.upper_right
            } else {
                self.lower_right
            }
        } else if dy <= 0.0 {
            self.upper_left
        } else {
            self.lower_left
        }
    }
}

impl Default for QuadrantGains {
    fn default() -> Self {
        Self {
            upper_right: [-0.1, 0.8],
            upper_left: [0.8, -1.5],
            lower_left: [-1.5, 0.5],
            lower_right: [0.8, 1.5],
        }
    }
}

/// Parameters of the pixel-to-robot conversion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformParams {
    /// Physical extent the reference frame spans, mm (x, y).
    pub span_mm: [f64; 2],
    /// Robot-frame position that corresponds to the frame center, mm (x, y).
    pub base_mm: [f64; 2],
    /// Approach height above the work surface, mm.
    pub hover_z_mm: f64,
    /// Fixed downward-facing tool orientation (roll, pitch, yaw), degrees.
    pub orientation_deg: [f64; 3],
    #[serde(default)]
    pub gains: QuadrantGains,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            span_mm: [200.0, 200.0],
            base_mm: [250.0, 0.0],
            hover_z_mm: 280.0,
            orientation_deg: [180.0, 0.0, 0.0],
            gains: QuadrantGains::default(),
        }
    }
}

/// Convert a pixel centroid into a hover pose in the robot base frame.
///
/// The offset from the frame center is rotated by `-rotation` into the
/// frame's own axes, corrected by the quadrant gain table, and scaled from
/// pixels to millimeters using the frame's physical span. This is a
/// deliberately piecewise-linear empirical calibration, not a camera
/// homography.
pub fn pixel_to_robot(
    centroid: Point2<f64>,
    frame: &ReferenceFrame,
    params: &TransformParams,
) -> Result<RobotPose, GeometryError> {
    if !frame.width.is_finite() || !frame.height.is_finite() || frame.width <= 0.0 || frame.height <= 0.0 {
        return Err(GeometryError::DegenerateFrame {
            width: frame.width,
            height: frame.height,
        });
    }
    if !frame.rotation.is_finite() {
        return Err(GeometryError::RotationUndefined);
    }

    let offset = centroid - frame.center;
    let (sin, cos) = frame.rotation.sin_cos();
    let rotated = Vector2::new(
        offset.x * cos + offset.y * sin,
        -offset.x * sin + offset.y * cos,
    );

    let [gx, gy] = params.gains.select(rotated.x, rotated.y);
    let dx_mm = rotated.x * gx * (params.span_mm[0] / frame.width);
    let dy_mm = rotated.y * gy * (params.span_mm[1] / frame.height);

    let [roll, pitch, yaw] = params.orientation_deg;
    Ok(RobotPose::new(
        params.base_mm[0] + dx_mm,
        params.base_mm[1] + dy_mm,
        params.hover_z_mm,
        roll,
        pitch,
        yaw,
    ))
}
