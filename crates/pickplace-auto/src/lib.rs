//! Pick-and-place sequencing: the state machine that turns perception
//! output into arm motion.
//!
//! Single logical thread of control. The sequencer *pulls* perception once
//! per update cycle, shares exactly one value with it (the detection
//! latch), and blocks only in bounded waits: the detection window, the
//! arrival poll, and the fixed place settle.

mod latch;
mod params;
mod sequencer;
mod traits;

pub use latch::{DetectionLatch, LockSnapshot};
pub use params::{SequenceParams, SlotTable};
pub use sequencer::{PickPlaceSequencer, SequenceError, SequenceState};
pub use traits::{Host, Perception};
