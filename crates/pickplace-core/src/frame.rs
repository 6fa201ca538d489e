use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// The calibrated work area located in the image via two reference markers.
///
/// Defines the origin, extent and rotation used to convert pixel offsets
/// into millimeters. `rotation` is the angle of the `p0 -> p1` marker
/// vector; for the physical rig the markers sit on opposite corners of the
/// work area, so the angle tracks how the area is turned relative to the
/// camera.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFrame {
    /// Frame center in pixel coordinates.
    pub center: Point2<f64>,
    /// Horizontal pixel extent.
    pub width: f64,
    /// Vertical pixel extent.
    pub height: f64,
    /// Marker-vector angle in radians.
    pub rotation: f64,
}

impl ReferenceFrame {
    pub fn new(center: Point2<f64>, width: f64, height: f64, rotation: f64) -> Self {
        Self {
            center,
            width,
            height,
            rotation,
        }
    }

    /// Derive the frame from two marker centroids.
    pub fn from_markers(p0: Point2<f64>, p1: Point2<f64>) -> Self {
        let center = Point2::new((p0.x + p1.x) / 2.0, (p0.y + p1.y) / 2.0);
        Self {
            center,
            width: (p1.x - p0.x).abs(),
            height: (p1.y - p0.y).abs(),
            rotation: (p1.y - p0.y).atan2(p1.x - p0.x),
        }
    }
}
