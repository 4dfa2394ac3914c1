use std::time::{Duration, Instant};

/// Frame rate meter averaging over roughly one-second windows.
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    /// Rate measured over the last completed window.
    pub current_fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
            current_fps: 0.0,
        }
    }

    /// Counts one frame; returns the refreshed rate when a window closes.
    pub fn update(&mut self) -> Option<f32> {
        self.frames += 1;
        let window = self.window_start.elapsed();
        if window < Duration::from_secs(1) {
            return None;
        }
        self.current_fps = self.frames as f32 / window.as_secs_f32();
        self.window_start = Instant::now();
        self.frames = 0;
        Some(self.current_fps)
    }
}
