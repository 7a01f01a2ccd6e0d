// src/time.rs
//! Wall-clock side of the frame loop.
//!
//! The simulation itself only knows its fixed step size. Everything here is
//! pacing: a `Clock` abstraction, a pacer that sleeps out the rest of the
//! target frame, a one-shot sleep gate and rolling frame-time stats.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic milliseconds plus a blocking sleep.
pub trait Clock {
    fn now_ms(&self) -> f64;
    fn sleep_ms(&self, ms: f64);
}

/// `Instant`-backed clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    #[inline(always)]
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline(always)]
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    fn sleep_ms(&self, ms: f64) {
        if ms > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(ms / 1000.0));
        }
    }
}

/// Clock that only moves when told to; sleeping advances it instantly.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
    slept: Cell<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    /// Total time spent in `sleep_ms`.
    pub fn slept_ms(&self) -> f64 {
        self.slept.get()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }

    fn sleep_ms(&self, ms: f64) {
        if ms > 0.0 {
            self.advance(ms);
            self.slept.set(self.slept.get() + ms);
        }
    }
}

/// Sleeps out whatever is left of the target frame time. A slow frame is
/// simply longer; there is no catch-up.
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    target_ms: f64,
    frame_start: f64,
}

impl FramePacer {
    pub fn new(target_ms: f64) -> Self {
        Self { target_ms, frame_start: 0.0 }
    }

    #[inline(always)]
    pub fn begin<C: Clock>(&mut self, clock: &C) {
        self.frame_start = clock.now_ms();
    }

    /// Sleep until the frame has lasted `target_ms`; returns the time slept.
    pub fn finish<C: Clock>(&mut self, clock: &C) -> f64 {
        let spent = clock.now_ms() - self.frame_start;
        let left = self.target_ms - spent;
        if left > 0.0 {
            clock.sleep_ms(left);
            left
        } else {
            0.0
        }
    }

    #[inline(always)]
    pub fn target_ms(&self) -> f64 {
        self.target_ms
    }
}

/// Holds stepping off until a wall-clock deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepGate {
    deadline: Option<f64>,
}

impl SleepGate {
    /// Sleep for `delay_ms` from `now`; a non-positive delay disarms the gate.
    pub fn arm(&mut self, now_ms: f64, delay_ms: f64) {
        self.deadline = (delay_ms > 0.0).then_some(now_ms + delay_ms);
    }

    /// True while the deadline is still ahead; the gate opens for good once it passes.
    pub fn is_sleeping(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms < deadline => true,
            Some(_) => {
                self.deadline = None;
                log::info!("sleep finished, resuming simulation");
                false
            }
            None => false,
        }
    }
}

const FRAME_WINDOW: usize = 128;

/// Rolling frame-time statistics over the last 128 frames.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    frame_times: [f32; FRAME_WINDOW],
    index: usize,
    last: Option<f64>,
    frames: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            frame_times: [0.0; FRAME_WINDOW],
            index: 0,
            last: None,
            frames: 0,
        }
    }

    /// Record a frame boundary at `now_ms`.
    pub fn tick(&mut self, now_ms: f64) {
        if let Some(last) = self.last {
            self.frame_times[self.index] = (now_ms - last) as f32;
            self.index = (self.index + 1) % FRAME_WINDOW;
        }
        self.last = Some(now_ms);
        self.frames += 1;
    }

    /// (fps, ms) averaged over the recorded window.
    pub fn averaged(&self) -> (f32, f32) {
        let (sum, count) = self
            .frame_times
            .iter()
            .filter(|&&v| v > 0.0)
            .fold((0.0f32, 0u32), |(s, n), &v| (s + v, n + 1));
        if count == 0 {
            return (0.0, 0.0);
        }
        let avg_ms = sum / count as f32;
        (1000.0 / avg_ms, avg_ms)
    }

    #[inline(always)]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Log the averages every `every` frames.
    pub fn log_every(&self, every: u64) {
        if every > 0 && self.frames % every == 0 {
            let (fps, ms) = self.averaged();
            log::info!("FPS: {:.1}, frame time: {:.3} ms", fps, ms);
        }
    }
}
