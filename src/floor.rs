// src/floor.rs
//! Box vs. ground plane (`y = 0`, normal `+Y`).

use glam::Vec3;

use crate::body::RigidBody;
use crate::config::SimConfig;
use crate::contact::{ContactFeature, ContactManifold, ContactPoint};
use crate::integrator;
use crate::math::UNIT_CORNERS;

/// Test every corner of `body` against the floor, appending one point per
/// corner whose height is below `config.distance_tolerance`.
///
/// Returns whether any corner touched. Points past the manifold capacity are
/// dropped by the manifold and counted there.
pub fn collide(body: &RigidBody, config: &SimConfig, manifold: &mut ContactManifold) -> bool {
    let mut hit = false;
    for local in UNIT_CORNERS {
        let world = body.to_world(local);
        if world.y < config.distance_tolerance {
            hit = true;
            let _ = manifold.push(ContactPoint {
                local_a: local,
                local_b: Vec3::new(world.x, 0.0, world.z),
                depth: -world.y,
                feature: ContactFeature::FloorCorner,
            });
        }
    }
    hit
}

/// Floor test of `body` as it would be `dt` seconds from now.
///
/// `dt == 0` is the authoritative check on the current pose.
pub fn probe(body: &RigidBody, dt: f32, config: &SimConfig) -> Option<ContactManifold> {
    let mut manifold = ContactManifold::floor(body.id, config.max_manifold_points);
    let hit = if dt == 0.0 {
        collide(body, config, &mut manifold)
    } else {
        let ghost = integrator::predict(body, dt, config);
        collide(&ghost, config, &mut manifold)
    };
    hit.then_some(manifold)
}
