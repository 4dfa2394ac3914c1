use std::time::{Duration, Instant};

/// Per-frame clock: tracks the delta between ticks and the total time
/// since construction.
pub struct Timer {
    started: Instant,
    last_tick: Instant,
    dt: Duration,
    elapsed: Duration,
    /// Ticks recorded so far.
    pub frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last_tick: now,
            dt: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advances the clock by one frame.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.dt = now - self.last_tick;
        self.elapsed = now - self.started;
        self.last_tick = now;
        self.frame_count += 1;
    }

    /// Seconds between the two most recent ticks.
    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.dt.as_secs_f32()
    }

    /// Seconds from construction to the most recent tick.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}
