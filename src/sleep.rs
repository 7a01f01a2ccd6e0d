// src/sleep.rs
//! Resting classification.
//!
//! `Active -> Resting` once a settled body has enough support; `Resting` only
//! ends when the whole world is reset. There is no wake-on-touch.

use crate::body::RigidBody;
use crate::config::SimConfig;

/// Per-body simulation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BodyState {
    /// Integrated and collided every step.
    #[default]
    Active,
    /// Frozen: skipped by integration, impact search and both narrow-phases.
    Resting,
}

impl BodyState {
    #[inline]
    pub fn is_resting(self) -> bool {
        self == BodyState::Resting
    }
}

/// Decide the state of an `Active` body after a step given how many contact
/// points it had in this step's manifolds.
#[inline]
pub fn classify(body: &RigidBody, contact_points: usize, config: &SimConfig) -> BodyState {
    let supported = contact_points > config.rest_min_contacts;
    let slow = body.speed() < config.rest_linear_speed
        && body.angular_speed() < config.rest_angular_speed;
    if supported && slow {
        BodyState::Resting
    } else {
        BodyState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyId;
    use glam::{Mat3, Vec3};

    fn body(velocity: Vec3, angular_velocity: Vec3) -> RigidBody {
        RigidBody::new(BodyId(0), Vec3::new(0.0, 0.5, 0.0), Mat3::IDENTITY, Vec3::ONE, 1.0)
            .with_velocity(velocity)
            .with_angular_velocity(angular_velocity)
    }

    #[test]
    fn needs_more_than_two_points() {
        let cfg = SimConfig::default();
        let b = body(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(classify(&b, 2, &cfg), BodyState::Active);
        assert_eq!(classify(&b, 3, &cfg), BodyState::Resting);
    }

    #[test]
    fn speed_thresholds_are_strict() {
        let cfg = SimConfig::default();
        assert_eq!(classify(&body(Vec3::new(0.0, -1.0, 0.0), Vec3::ZERO), 4, &cfg), BodyState::Active);
        assert_eq!(classify(&body(Vec3::new(0.0, -0.9, 0.0), Vec3::ZERO), 4, &cfg), BodyState::Resting);
        assert_eq!(classify(&body(Vec3::ZERO, Vec3::new(0.0, 0.3, 0.0)), 4, &cfg), BodyState::Active);
        assert_eq!(classify(&body(Vec3::ZERO, Vec3::new(0.0, 0.29, 0.0)), 4, &cfg), BodyState::Resting);
    }
}
