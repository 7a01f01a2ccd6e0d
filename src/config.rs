// src/config.rs
//! Simulation, frame and scene configuration.
//!
//! Every field has a default, so a JSON file only needs the values it changes:
//! ```json
//! { "sim": { "restitution": 0.7 }, "scene": { "body_count": 12 } }
//! ```

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Physics constants for one `World`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed physics step in seconds.
    pub step_size: f32,
    pub gravity: [f32; 3],
    /// Fraction of angular velocity removed per second.
    pub angular_damping: f32,
    pub restitution: f32,
    /// Single Coulomb coefficient (no static/kinetic split).
    pub friction: f32,
    /// A corner below this height counts as touching the floor.
    pub distance_tolerance: f32,
    /// Bisection stops once the bracket is narrower than this.
    pub time_tolerance: f32,
    /// Cross products shorter than this mark parallel directions.
    pub parallel_epsilon: f32,
    /// Effective-mass denominators below this skip the contact.
    pub denominator_epsilon: f32,
    /// A body rests only with strictly more contact points than this.
    pub rest_min_contacts: usize,
    pub rest_linear_speed: f32,
    pub rest_angular_speed: f32,
    pub max_bodies: usize,
    pub max_manifold_points: usize,
    pub max_manifolds: usize,
    /// Entries kept per debug ring buffer.
    pub debug_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            step_size: 1.0 / 60.0,
            gravity: [0.0, -9.81, 0.0],
            angular_damping: 0.5,
            restitution: 0.3,
            friction: 0.3,
            distance_tolerance: 0.01,
            time_tolerance: 1e-4,
            parallel_epsilon: 1e-4,
            denominator_epsilon: 1e-6,
            rest_min_contacts: 2,
            rest_linear_speed: 1.0,
            rest_angular_speed: 0.3,
            max_bodies: 32,
            max_manifold_points: 8,
            max_manifolds: 64,
            debug_capacity: 64,
        }
    }
}

impl SimConfig {
    #[inline]
    pub fn gravity(&self) -> Vec3 {
        Vec3::from_array(self.gravity)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("step_size", self.step_size),
            ("distance_tolerance", self.distance_tolerance),
            ("time_tolerance", self.time_tolerance),
            ("parallel_epsilon", self.parallel_epsilon),
            ("denominator_epsilon", self.denominator_epsilon),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(Error::invalid_config(format!("{name} must be positive, got {value}")));
            }
        }
        if self.time_tolerance >= self.step_size {
            return Err(Error::invalid_config("time_tolerance must be smaller than step_size"));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(Error::invalid_config(format!(
                "restitution must be in [0, 1], got {}",
                self.restitution
            )));
        }
        if self.friction < 0.0 || self.angular_damping < 0.0 {
            return Err(Error::invalid_config("friction and angular_damping must not be negative"));
        }
        let capacities = [
            ("max_bodies", self.max_bodies),
            ("max_manifold_points", self.max_manifold_points),
            ("max_manifolds", self.max_manifolds),
            ("debug_capacity", self.debug_capacity),
        ];
        for (name, value) in capacities {
            if value == 0 {
                return Err(Error::invalid_config(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }
}

/// Frame pacing for the interactive loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub target_frame_ms: f64,
    /// Hold the simulation for this long after start (0 = start immediately).
    pub start_delay_ms: f64,
    /// Frames the headless runner executes before exiting.
    pub max_frames: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            target_frame_ms: 16.0,
            start_delay_ms: 0.0,
            max_frames: 600,
        }
    }
}

/// Parameters for `Scene::generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub seed: u64,
    pub body_count: usize,
    pub drop_height: f32,
    pub spacing: f32,
    pub max_tilt_deg: f32,
    pub min_edge: f32,
    pub max_edge: f32,
    pub mass: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            body_count: 9,
            drop_height: 4.0,
            spacing: 2.5,
            max_tilt_deg: 35.0,
            min_edge: 0.6,
            max_edge: 1.4,
            mass: 1.0,
        }
    }
}

/// Top-level config document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sim: SimConfig,
    pub frame: FrameConfig,
    pub scene: SceneConfig,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::from(e).context(format!("reading {}", path.display())))?;
        Self::from_json_str(&text).map_err(|e| e.context(format!("parsing {}", path.display())))
    }

    pub fn validate(&self) -> Result<()> {
        self.sim.validate()?;
        if !(self.frame.target_frame_ms > 0.0) {
            return Err(Error::invalid_config("target_frame_ms must be positive"));
        }
        if self.frame.start_delay_ms < 0.0 {
            return Err(Error::invalid_config("start_delay_ms must not be negative"));
        }
        let scene = &self.scene;
        if scene.body_count > self.sim.max_bodies {
            return Err(Error::invalid_config(format!(
                "scene has {} bodies but max_bodies is {}",
                scene.body_count, self.sim.max_bodies
            )));
        }
        if !(scene.min_edge > 0.0) || scene.max_edge < scene.min_edge || !(scene.mass > 0.0) {
            return Err(Error::invalid_config("scene edge range and mass must be positive"));
        }
        if !(scene.max_tilt_deg >= 0.0) {
            return Err(Error::invalid_config("max_tilt_deg must not be negative"));
        }
        Ok(())
    }
}
