use std::time::Instant;

/// Timing of one frame: the step since the previous frame plus the absolute
/// time on the same timeline
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Raw seconds since the previous frame, unsanitized
    pub delta: f32,
    /// Seconds since the timeline started
    pub elapsed: f64,
}

impl FrameTime {
    pub const ZERO: FrameTime = FrameTime {
        delta: 0.0,
        elapsed: 0.0,
    };

    /// Next frame on a simulated timeline. Negative or non-finite steps do not move `elapsed`.
    pub fn advanced(self, delta: f32) -> FrameTime {
        let step = if delta.is_finite() && delta > 0.0 { delta as f64 } else { 0.0 };
        FrameTime {
            delta,
            elapsed: self.elapsed + step,
        }
    }
}

/// Wall clock for a canvas: absolute time since start plus per-frame deltas
#[derive(Debug)]
pub struct Clock {
    start: Instant,
    last_tick: Instant,
}

impl Clock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
        }
    }

    /// Seconds since creation or the last reset
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        FrameTime {
            delta,
            elapsed: now.duration_since(self.start).as_secs_f64(),
        }
    }

    /// Restart the timeline, so animation begins at zero once the asset is ready
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
