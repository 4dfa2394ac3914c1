//! Frame scheduler
//!
//! Explicit arm/cancel gate for the render loop. The window loop asks for
//! redraws unconditionally; [`FrameScheduler::begin_frame`] decides whether
//! a frame actually runs. Cancelling flips the gate without touching any
//! in-flight frame, so a frame that already began completes normally and no
//! further ones start.

/// Gate deciding whether render frames may begin.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    armed: bool,
    frame_index: u64,
}

impl FrameScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows frames to begin.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Stops any further frame from beginning. Idempotent.
    pub fn cancel(&mut self) {
        self.armed = false;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Claims the next frame. Returns its index while armed, `None` once
    /// cancelled.
    pub fn begin_frame(&mut self) -> Option<u64> {
        if !self.armed {
            return None;
        }
        let index = self.frame_index;
        self.frame_index += 1;
        Some(index)
    }

    /// Number of frames that have begun since construction.
    #[must_use]
    pub fn frames_begun(&self) -> u64 {
        self.frame_index
    }
}
