// src/app.rs
//! Frame loop glue: input gates, one physics step per frame, draw
//! submission and pacing. Rendering is behind `RenderSink` so the loop runs
//! the same with a real renderer or headless.

use crate::config::{Config, FrameConfig};
use crate::debug::DebugDraw;
use crate::input::InputSnapshot;
use crate::scene::Scene;
use crate::time::{Clock, FramePacer, FrameTimer, SleepGate};
use crate::world::{BodyInstance, StepStats, World};
use crate::Result;

/// Whatever draws the world.
pub trait RenderSink {
    fn begin_frame(&mut self, wireframe: bool);
    fn draw_body(&mut self, instance: &BodyInstance);
    fn draw_debug(&mut self, debug: &DebugDraw);
    fn end_frame(&mut self);
}

/// Headless sink that only counts submissions and logs now and then.
#[derive(Debug, Default)]
pub struct LogSink {
    pub frames: u64,
    pub bodies_drawn: u64,
    pub resting_drawn: u64,
    pub debug_points: usize,
    log_every: u64,
}

impl LogSink {
    pub fn new(log_every: u64) -> Self {
        Self { log_every, ..Self::default() }
    }
}

impl RenderSink for LogSink {
    fn begin_frame(&mut self, _wireframe: bool) {
        self.frames += 1;
    }

    fn draw_body(&mut self, instance: &BodyInstance) {
        self.bodies_drawn += 1;
        if instance.is_resting() {
            self.resting_drawn += 1;
        }
    }

    fn draw_debug(&mut self, debug: &DebugDraw) {
        self.debug_points = debug.points.len();
    }

    fn end_frame(&mut self) {
        if self.log_every > 0 && self.frames % self.log_every == 0 {
            log::debug!(
                "frame {}: {} bodies drawn so far, {} debug points",
                self.frames,
                self.bodies_drawn,
                self.debug_points
            );
        }
    }
}

/// Outcome of one `App::frame`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// `None` when paused or sleeping.
    pub step: Option<StepStats>,
    pub slept_ms: f64,
}

pub struct App<C: Clock, R: RenderSink> {
    world: World,
    clock: C,
    sink: R,
    pacer: FramePacer,
    gate: SleepGate,
    timer: FrameTimer,
    frame: FrameConfig,
    paused: bool,
    wireframe: bool,
}

impl<C: Clock, R: RenderSink> App<C, R> {
    /// Build the world from the configured scene. The sleep gate starts armed
    /// when `start_delay_ms` is positive.
    pub fn new(config: &Config, clock: C, sink: R) -> Result<Self> {
        config.validate()?;
        let scene = Scene::generate(&config.scene);
        let world = World::from_scene(config.sim.clone(), &scene)?;
        Ok(Self::with_world(world, config.frame.clone(), clock, sink))
    }

    pub fn with_world(world: World, frame: FrameConfig, clock: C, sink: R) -> Self {
        let mut gate = SleepGate::default();
        gate.arm(clock.now_ms(), frame.start_delay_ms);
        Self {
            world,
            pacer: FramePacer::new(frame.target_frame_ms),
            gate,
            timer: FrameTimer::new(),
            frame,
            paused: false,
            wireframe: false,
            clock,
            sink,
        }
    }

    /// Run one frame against `input`.
    pub fn frame(&mut self, input: &InputSnapshot) -> FrameReport {
        self.pacer.begin(&self.clock);

        if input.reset_pressed {
            self.world.reset();
        }
        if input.pause_pressed {
            self.paused = !self.paused;
            log::info!("simulation {}", if self.paused { "paused" } else { "resumed" });
        }
        if input.wireframe_pressed {
            self.wireframe = !self.wireframe;
        }

        let sleeping = self.gate.is_sleeping(self.clock.now_ms());
        let step = (!self.paused && !sleeping).then(|| self.world.step());

        self.sink.begin_frame(self.wireframe);
        for instance in self.world.instances() {
            self.sink.draw_body(&instance);
        }
        self.sink.draw_debug(self.world.debug());
        self.sink.end_frame();

        self.timer.tick(self.clock.now_ms());
        let slept_ms = self.pacer.finish(&self.clock);
        FrameReport { step, slept_ms }
    }

    /// Run up to `frame.max_frames` frames without input, stopping early once
    /// every body rests. Returns the number of frames run.
    pub fn run_headless(&mut self) -> u64 {
        let idle = InputSnapshot::default();
        let mut frames = 0;
        while frames < self.frame.max_frames {
            self.frame(&idle);
            frames += 1;
            self.timer.log_every(120);
            if self.world.is_settled() {
                log::info!("all {} bodies resting after {} frames", self.world.len(), frames);
                break;
            }
        }
        frames
    }

    /// Defer stepping for `delay_ms` from now.
    pub fn sleep_for(&mut self, delay_ms: f64) {
        self.gate.arm(self.clock.now_ms(), delay_ms);
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn frame_timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Action;
    use crate::time::ManualClock;

    fn app(config: Config) -> App<ManualClock, LogSink> {
        App::new(&config, ManualClock::new(), LogSink::new(0)).unwrap()
    }

    #[test]
    fn frame_steps_draws_and_paces() {
        let mut app = app(Config::default());
        let report = app.frame(&InputSnapshot::default());
        assert!(report.step.is_some());
        assert_eq!(report.slept_ms, 16.0);
        assert_eq!(app.sink().frames, 1);
        assert_eq!(app.sink().bodies_drawn, app.world().len() as u64);
        assert_eq!(app.world().steps(), 1);
    }

    #[test]
    fn pause_freezes_stepping() {
        let mut app = app(Config::default());
        let pause = InputSnapshot::pressing(&[Action::Pause]);
        assert!(app.frame(&pause).step.is_none());
        assert!(app.frame(&InputSnapshot::default()).step.is_none());
        assert_eq!(app.world().steps(), 0);
        // bodies are still drawn while paused
        assert_eq!(app.sink().frames, 2);
        assert!(app.frame(&pause).step.is_some());
    }

    #[test]
    fn start_delay_gates_stepping() {
        let mut config = Config::default();
        config.frame.start_delay_ms = 40.0;
        let mut app = app(config);
        // frames last 16 ms on the manual clock: 0, 16, 32 sleep, 48 steps
        let stepped: Vec<bool> = (0..4).map(|_| app.frame(&InputSnapshot::default()).step.is_some()).collect();
        assert_eq!(stepped, vec![false, false, false, true]);
    }

    #[test]
    fn reset_and_wireframe_toggle() {
        let mut app = app(Config::default());
        for _ in 0..5 {
            app.frame(&InputSnapshot::default());
        }
        app.frame(&InputSnapshot::pressing(&[Action::Reset, Action::Wireframe]));
        // reset zeroes the counter, then the frame steps once
        assert_eq!(app.world().steps(), 1);
        assert!(app.wireframe());
        app.frame(&InputSnapshot::pressing(&[Action::Wireframe]));
        assert!(!app.wireframe());
    }

    #[test]
    fn headless_run_respects_frame_limit() {
        let mut config = Config::default();
        config.frame.max_frames = 3;
        let mut app = app(config);
        assert_eq!(app.run_headless(), 3);
        assert_eq!(app.clock().slept_ms(), 48.0);
    }
}
