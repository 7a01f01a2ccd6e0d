// src/integrator.rs
//! Explicit Euler integration of a single body.
//!
//! This is the only place physical state advances. Committing a step and
//! probing a future pose run the same routine; probes run it on a copy.

use crate::body::RigidBody;
use crate::config::SimConfig;
use crate::math;

/// Advance `body` by `dt` seconds and refresh its cached transforms.
pub fn integrate(body: &mut RigidBody, dt: f32, config: &SimConfig) {
    let damping = (1.0 - config.angular_damping * dt).max(0.0);
    body.angular_velocity *= damping;

    body.velocity += config.gravity() * dt;
    body.position += body.velocity * dt;

    let spin = body.angular_velocity.length();
    if spin > math::NORMALIZE_EPSILON {
        let axis = body.angular_velocity / spin;
        let angle_deg = spin.to_degrees() * dt;
        body.orientation = math::orthonormalize(math::rotation_deg(axis, angle_deg) * body.orientation);
    }

    body.refresh_transform();
}

/// Copy of `body` advanced by `dt`; the original is untouched.
#[inline]
pub fn predict(body: &RigidBody, dt: f32, config: &SimConfig) -> RigidBody {
    let mut ghost = *body;
    integrate(&mut ghost, dt, config);
    ghost
}
