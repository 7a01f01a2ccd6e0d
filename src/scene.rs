// src/scene.rs
//! Initial body descriptions. A `World` keeps its scene so that a reset can
//! rebuild every body exactly as it started.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::body::{BodyId, RigidBody};
use crate::config::SceneConfig;
use crate::{math, Error, Result};

/// Starting state of one cuboid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub position: Vec3,
    pub rotation_axis: Vec3,
    pub rotation_deg: f32,
    /// Edge lengths.
    pub size: Vec3,
    pub mass: f32,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl BodyDesc {
    /// Axis-aligned unit cube of mass 1 at rest.
    pub fn cube(position: Vec3) -> Self {
        Self {
            position,
            rotation_axis: Vec3::Y,
            rotation_deg: 0.0,
            size: Vec3::ONE,
            mass: 1.0,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }

    pub fn with_rotation(mut self, axis: Vec3, angle_deg: f32) -> Self {
        self.rotation_axis = axis;
        self.rotation_deg = angle_deg;
        self
    }

    pub fn with_size(mut self, size: Vec3) -> Self {
        self.size = size;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Rejects descriptions that would give a body without mass, volume or
    /// a finite starting state.
    pub fn validate(&self) -> Result<()> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(Error::invalid_config(format!("body mass must be positive, got {}", self.mass)));
        }
        if !(self.size.is_finite() && self.size.min_element() > 0.0) {
            return Err(Error::invalid_config(format!("body edges must be positive, got {}", self.size)));
        }
        let finite = self.position.is_finite()
            && self.rotation_axis.is_finite()
            && self.rotation_deg.is_finite()
            && self.velocity.is_finite()
            && self.angular_velocity.is_finite();
        if !finite {
            return Err(Error::invalid_config("body starting state must be finite"));
        }
        Ok(())
    }

    pub fn build(&self, id: BodyId) -> RigidBody {
        RigidBody::new(
            id,
            self.position,
            math::rotation_deg(self.rotation_axis, self.rotation_deg),
            self.size,
            self.mass,
        )
        .with_velocity(self.velocity)
        .with_angular_velocity(self.angular_velocity)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub bodies: Vec<BodyDesc>,
}

impl Scene {
    pub fn new(bodies: Vec<BodyDesc>) -> Self {
        Self { bodies }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Square grid of tilted cuboids above the floor, reproducible per seed.
    pub fn generate(config: &SceneConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let cols = (config.body_count as f32).sqrt().ceil().max(1.0) as usize;
        let half = (cols as f32 - 1.0) * 0.5;

        let bodies = (0..config.body_count)
            .map(|i| {
                let col = (i % cols) as f32 - half;
                let row = (i / cols) as f32 - half;
                let lift: f32 = rng.gen_range(0.0..=1.0);
                let axis = Vec3::new(
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                );
                let angle = rng.gen_range(-config.max_tilt_deg..=config.max_tilt_deg);
                let size = Vec3::new(
                    rng.gen_range(config.min_edge..=config.max_edge),
                    rng.gen_range(config.min_edge..=config.max_edge),
                    rng.gen_range(config.min_edge..=config.max_edge),
                );
                BodyDesc::cube(Vec3::new(col * config.spacing, config.drop_height + lift, row * config.spacing))
                    .with_rotation(axis, angle)
                    .with_size(size)
                    .with_mass(config.mass)
            })
            .collect();

        Self { bodies }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_degenerate_bodies() {
        assert!(BodyDesc::cube(Vec3::Y).validate().is_ok());
        assert!(BodyDesc::cube(Vec3::Y).with_mass(-1.0).validate().unwrap_err().is_config());
        assert!(BodyDesc::cube(Vec3::Y).with_size(Vec3::new(1.0, 1.0, 0.0)).validate().is_err());
        assert!(BodyDesc::cube(Vec3::Y).with_velocity(Vec3::new(0.0, f32::INFINITY, 0.0)).validate().is_err());
    }

    #[test]
    fn same_seed_same_scene() {
        let cfg = SceneConfig::default();
        assert_eq!(Scene::generate(&cfg), Scene::generate(&cfg));
        let other = SceneConfig { seed: cfg.seed + 1, ..cfg.clone() };
        assert_ne!(Scene::generate(&cfg), Scene::generate(&other));
    }

    #[test]
    fn generated_bodies_respect_ranges() {
        let cfg = SceneConfig { body_count: 10, ..SceneConfig::default() };
        let scene = Scene::generate(&cfg);
        assert_eq!(scene.len(), 10);
        for desc in &scene.bodies {
            assert!(desc.position.y >= cfg.drop_height);
            assert!(desc.size.min_element() >= cfg.min_edge);
            assert!(desc.size.max_element() <= cfg.max_edge);
            assert!(desc.rotation_deg.abs() <= cfg.max_tilt_deg);
        }
    }

    #[test]
    fn build_applies_velocities() {
        let desc = BodyDesc::cube(Vec3::new(0.0, 3.0, 0.0))
            .with_velocity(Vec3::X)
            .with_angular_velocity(Vec3::Z);
        let body = desc.build(BodyId(4));
        assert_eq!(body.id, BodyId(4));
        assert_eq!(body.velocity, Vec3::X);
        assert_eq!(body.angular_velocity, Vec3::Z);
        assert_eq!(body.position, desc.position);
    }
}
