//! Time sources for driving the engine.
//!
//! The engine itself never reads the wall clock. A driver asks a
//! [`FrameClock`] for the current time and waits on it between frames,
//! so tests can swap in a deterministic clock.

use std::time::{Duration, Instant};

pub trait FrameClock {
    /// Monotonic milliseconds since the clock was created.
    fn now_ms(&self) -> f64;

    /// Block (or advance) until the next frame is due.
    fn wait_next_frame(&mut self);
}

/// Wall clock paced to a target frame rate.
pub struct SystemClock {
    origin: Instant,
    frame_duration: Duration,
    next_frame: Instant,
}

impl SystemClock {
    pub fn new(target_fps: f64) -> Self {
        let origin = Instant::now();
        let frame_duration = if target_fps > 0.0 {
            Duration::from_secs_f64(1.0 / target_fps)
        } else {
            Duration::ZERO
        };
        Self {
            origin,
            frame_duration,
            next_frame: origin,
        }
    }
}

impl FrameClock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn wait_next_frame(&mut self) {
        let now = Instant::now();
        if self.next_frame > now {
            std::thread::sleep(self.next_frame - now);
        }
        // Fell behind: resync instead of bursting to catch up.
        self.next_frame = self.next_frame.max(now) + self.frame_duration;
    }
}

/// Deterministic clock that advances a fixed step per frame.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_ms: f64,
    step_ms: f64,
    started: bool,
}

impl ManualClock {
    pub fn new(start_ms: f64, step_ms: f64) -> Self {
        Self {
            now_ms: start_ms,
            step_ms,
            started: false,
        }
    }

    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms;
    }
}

impl FrameClock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn wait_next_frame(&mut self) {
        // The first frame is due immediately.
        if self.started {
            self.now_ms += self.step_ms;
        }
        self.started = true;
    }
}

/// Clock whose time is whatever the last replayed frame said.
#[derive(Debug, Clone, Default)]
pub struct ReplayClock {
    now_ms: f64,
}

impl ReplayClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, timestamp_ms: f64) {
        self.now_ms = timestamp_ms;
    }
}

impl FrameClock for ReplayClock {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn wait_next_frame(&mut self) {}
}
