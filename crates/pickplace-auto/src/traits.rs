use nalgebra::Point2;

use pickplace_core::{Detection, ReferenceFrame};

/// Perception collaborators, consumed once per update cycle.
///
/// The sequencer never sees frames or detector internals, only their
/// output: two reference-marker centroids and a list of labeled blob
/// centroids.
pub trait Perception {
    /// Centroids of two reference markers, when at least two are visible
    /// in the current frame.
    fn locate_reference_frame(&mut self) -> Option<(Point2<f64>, Point2<f64>)>;

    /// Colored-object detections inside the work area, best first.
    ///
    /// The sequencer commits to the first entry: first match wins.
    fn detect_objects(&mut self, roi: &ReferenceFrame) -> Vec<Detection>;
}

/// The embedding application.
///
/// A status-text sink for the operator plus a cooperative yield point that
/// the sequencer services during its bounded waits, so the host's own
/// event loop stays responsive.
pub trait Host {
    /// Human-readable progress or failure line.
    fn report_status(&mut self, text: &str);

    /// Run pending host events. Default: nothing to service.
    fn process_events(&mut self) {}
}
