//! Frame timing

use std::thread;
use std::time::{Duration, Instant};

use crate::consts::{FRAME_DT, MAX_FRAME_DT};

/// Measures frame time and paces the loop to a fixed budget
#[derive(Debug)]
pub struct FrameClock {
    last: Instant,
    budget: Duration,
    frames: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(FRAME_DT)
    }
}

impl FrameClock {
    pub fn new(frame_dt: f32) -> Self {
        Self {
            last: Instant::now(),
            budget: Duration::from_secs_f32(frame_dt.max(0.0)),
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Seconds since the previous tick, clamped to `MAX_FRAME_DT`
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        self.frames += 1;
        clamp_dt(dt)
    }

    /// Sleep for whatever is left of this frame's budget
    pub fn sleep_remaining(&self) {
        let elapsed = self.last.elapsed();
        if elapsed < self.budget {
            thread::sleep(self.budget - elapsed);
        }
    }
}

/// Clamp a raw frame delta into `[0, MAX_FRAME_DT]`
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_nan() {
        return 0.0;
    }
    dt.clamp(0.0, MAX_FRAME_DT)
}
