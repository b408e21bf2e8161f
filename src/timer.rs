//! Monotonic clock and frame pacing.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.  Never goes backwards.
    fn now_ms(&self) -> u64;
    /// Block for `ms` milliseconds.  Zero or negative returns immediately.
    fn sleep_ms(&self, ms: i64);
}

/// Wall clock backed by [`Instant`].
#[derive(Clone, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn sleep_ms(&self, ms: i64) {
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(ms as u64));
        }
    }
}

/// Deterministic clock for tests and replays.  Clones share the same time, and
/// sleeping simply advances it.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self { now: Rc::new(Cell::new(start_ms)) }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn sleep_ms(&self, ms: i64) {
        if ms > 0 {
            self.advance(ms as u64);
        }
    }
}

// ── Frame timer ──────────────────────────────────────────────────────────────

/// Tracks loop timing: per-frame delta, the FPS sample window, and the sleep
/// needed to hold the target frame rate.
#[derive(Clone, Debug)]
pub struct FrameTimer {
    last_loop_time: u64,
    fps_window_ms: u64,
    window_elapsed: u64,
    frames: u32,
}

impl FrameTimer {
    pub fn new(now: u64, fps_window_ms: u64) -> Self {
        Self {
            last_loop_time: now,
            fps_window_ms,
            window_elapsed: 0,
            frames: 0,
        }
    }

    /// Start a new iteration: returns the milliseconds since the previous one.
    pub fn begin(&mut self, now: u64) -> u64 {
        let delta = now.saturating_sub(self.last_loop_time);
        self.last_loop_time = now;
        delta
    }

    /// Count a frame.  Returns the frame count once a full window has elapsed.
    pub fn record_frame(&mut self, delta: u64) -> Option<u32> {
        self.window_elapsed += delta;
        self.frames += 1;
        if self.window_elapsed >= self.fps_window_ms {
            let fps = self.frames;
            self.window_elapsed = 0;
            self.frames = 0;
            Some(fps)
        } else {
            None
        }
    }

    /// Sleep until `frame_ms` after the start of this iteration.  An overrun
    /// frame skips the sleep.
    pub fn pace(&self, clock: &impl Clock, frame_ms: u64) {
        let target = self.last_loop_time as i64 + frame_ms as i64;
        clock.sleep_ms(target - clock.now_ms() as i64);
    }

    pub fn last_loop_time(&self) -> u64 {
        self.last_loop_time
    }
}

