// src/toi.rs
//! Time-of-impact search by bisection over one step.

use crate::body::{BodyId, BodyStore, RigidBody};
use crate::config::SimConfig;
use crate::contact::ContactManifold;
use crate::{floor, integrator, sat};

/// Earliest contact found for one body within a step.
#[derive(Debug, Clone, PartialEq)]
pub struct Impact {
    /// Seconds into the step; equals the step size when nothing was hit.
    pub time: f32,
    /// Manifolds from the innermost colliding probe, empty when nothing was hit.
    pub manifolds: Vec<ContactManifold>,
    pub iterations: u32,
}

impl Impact {
    #[inline]
    pub fn is_hit(&self) -> bool {
        !self.manifolds.is_empty()
    }
}

/// Everything `body` would touch `dt` seconds ahead: the floor plus every
/// other awake body at its current pose.
pub fn probe_all(bodies: &BodyStore, body: &RigidBody, dt: f32, config: &SimConfig) -> Vec<ContactManifold> {
    let mut manifolds: Vec<ContactManifold> = floor::probe(body, dt, config).into_iter().collect();

    let mut others = bodies.awake_others(body.id).peekable();
    if others.peek().is_none() {
        return manifolds;
    }
    let ghost = integrator::predict(body, dt, config);
    for other in others {
        if let Some(contact) = sat::collide(&ghost, other, config) {
            let mut pair = ContactManifold::new(body.id, Some(other.id), contact.normal, config.max_manifold_points);
            let _ = pair.push(contact.point);
            manifolds.push(pair);
        }
    }
    manifolds
}

/// Bisect `[0, step_size]` for the first instant `id` touches anything.
///
/// Only the manifolds of the last colliding probe are kept. When no midpoint
/// collides the end of the step is probed once more, so contacts that begin
/// in the last sliver of the interval are not missed.
pub fn time_of_impact(bodies: &BodyStore, id: BodyId, config: &SimConfig) -> Impact {
    let step = config.step_size;
    let Some(body) = bodies.get(id) else {
        return Impact { time: step, manifolds: Vec::new(), iterations: 0 };
    };

    let mut t0 = 0.0f32;
    let mut t1 = step;
    let mut found: Vec<ContactManifold> = Vec::new();
    let mut iterations = 0u32;

    while t1 - t0 > config.time_tolerance {
        let mid = 0.5 * (t0 + t1);
        let hits = probe_all(bodies, body, mid, config);
        if hits.is_empty() {
            t0 = mid;
        } else {
            t1 = mid;
            found = hits;
        }
        iterations += 1;
    }

    if found.is_empty() {
        found = probe_all(bodies, body, step, config);
    }

    log::trace!(
        "body {}: impact at {:.5}s after {} bisections ({} manifolds)",
        id.0,
        t1,
        iterations,
        found.len()
    );

    Impact { time: t1, manifolds: found, iterations }
}
