use pickplace_core::{Detection, ReferenceFrame};

/// The single value shared between the perception feed and the sequencer.
///
/// Perception writes while unlocked; the sequencer freezes a copy when it
/// commits to an approach, so in-flight detector noise cannot re-target a
/// motion that is already under way. Frame updates are never gated, only
/// the live detection is.
#[derive(Debug, Default)]
pub struct DetectionLatch {
    live: Option<Detection>,
    frame: Option<ReferenceFrame>,
    locked: bool,
}

/// Detection and reference frame frozen at lock time.
#[derive(Clone, Debug)]
pub struct LockSnapshot {
    pub detection: Option<Detection>,
    pub frame: Option<ReferenceFrame>,
}

impl DetectionLatch {
    /// Replace the live detection. Ignored while locked.
    pub fn offer(&mut self, detection: Detection) {
        if !self.locked {
            self.live = Some(detection);
        }
    }

    /// Replace the reference frame.
    ///
    /// Called only on locator success, so a flickering locator leaves the
    /// previous frame in place indefinitely.
    pub fn update_frame(&mut self, frame: ReferenceFrame) {
        self.frame = Some(frame);
    }

    pub fn live(&self) -> Option<&Detection> {
        self.live.as_ref()
    }

    pub fn frame(&self) -> Option<&ReferenceFrame> {
        self.frame.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Freeze the current observation and stop live-detection updates.
    pub fn lock(&mut self) -> LockSnapshot {
        self.locked = true;
        LockSnapshot {
            detection: self.live.clone(),
            frame: self.frame,
        }
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }
}
