// src/resolver.rs
//! Impulse response and penetration correction for one step's manifolds.
//!
//! Each manifold is solved at the centroid of its points: one normal impulse
//! with restitution and one friction impulse clamped to the Coulomb cone.
//! Every point of the manifold contributes those deltas to the bodies it
//! touches, and each body applies the average over all of its contact
//! points once. Positions are then pushed out along the normal by the
//! manifold's deepest penetration.

use glam::{Mat3, Vec3};

use crate::body::{BodyStore, RigidBody};
use crate::config::SimConfig;
use crate::contact::ContactManifold;
use crate::math::NORMALIZE_EPSILON;

/// Counters from one `resolve` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Manifolds that produced a response.
    pub solved: usize,
    /// Manifolds skipped for a near-zero effective mass denominator.
    pub degenerate: usize,
    /// Manifolds already separating along the normal.
    pub separating: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    linear: Vec3,
    angular: Vec3,
    shift: Vec3,
    weight: f32,
}

/// Per-side view of a manifold: the body and its averaged lever arm.
struct Side<'a> {
    body: &'a RigidBody,
    arm: Vec3,
    inv_inertia: Mat3,
}

impl Side<'_> {
    #[inline]
    fn velocity(&self) -> Vec3 {
        self.body.point_velocity(self.arm)
    }

    /// Linear plus angular effective-mass term along `dir`.
    #[inline]
    fn effective(&self, dir: Vec3) -> f32 {
        self.body.inv_mass + dir.dot((self.inv_inertia * self.arm.cross(dir)).cross(self.arm))
    }
}

enum Outcome {
    Impulse(Vec3),
    Separating,
    Degenerate,
}

fn solve(a: &Side<'_>, b: Option<&Side<'_>>, normal: Vec3, config: &SimConfig) -> Outcome {
    let relative = a.velocity() - b.map_or(Vec3::ZERO, Side::velocity);
    let vn = relative.dot(normal);
    if vn >= 0.0 {
        return Outcome::Separating;
    }

    let denom = a.effective(normal) + b.map_or(0.0, |b| b.effective(normal));
    if denom < config.denominator_epsilon {
        return Outcome::Degenerate;
    }
    let jn = -(1.0 + config.restitution) * vn / denom;
    let mut impulse = normal * jn;

    let tangential = relative - normal * vn;
    let slip = tangential.length();
    if slip > NORMALIZE_EPSILON {
        let dir = tangential / slip;
        let denom_t = a.effective(dir) + b.map_or(0.0, |b| b.effective(dir));
        if denom_t >= config.denominator_epsilon {
            let jt = (slip / denom_t).min(config.friction * jn);
            impulse -= dir * jt;
        }
    }
    Outcome::Impulse(impulse)
}

fn centroid_arm(body: &RigidBody, locals: impl Iterator<Item = Vec3>) -> Vec3 {
    let (sum, n) = locals.fold((Vec3::ZERO, 0u32), |(s, n), p| (s + body.lever_arm(p), n + 1));
    if n == 0 {
        Vec3::ZERO
    } else {
        sum / n as f32
    }
}

/// Apply impulses and positional correction for `manifolds`.
pub fn resolve(bodies: &mut BodyStore, manifolds: &[ContactManifold], config: &SimConfig) -> ResolveStats {
    let mut stats = ResolveStats::default();
    let mut acc = vec![Accumulator::default(); bodies.len()];

    for m in manifolds {
        if m.is_empty() {
            continue;
        }
        let Some(body_a) = bodies.get(m.body_a) else { continue };
        let body_b = match m.body_b {
            Some(id) => match bodies.get(id) {
                Some(b) => Some(b),
                None => continue,
            },
            None => None,
        };

        let weight = m.len() as f32;
        let a = Side {
            body: body_a,
            arm: centroid_arm(body_a, m.points().iter().map(|p| p.local_a)),
            inv_inertia: body_a.inv_inertia_world(),
        };
        let b = body_b.map(|body| Side {
            body,
            arm: centroid_arm(body, m.points().iter().map(|p| p.local_b)),
            inv_inertia: body.inv_inertia_world(),
        });

        let impulse = match solve(&a, b.as_ref(), m.normal, config) {
            Outcome::Impulse(j) => {
                stats.solved += 1;
                j
            }
            Outcome::Separating => {
                stats.separating += 1;
                Vec3::ZERO
            }
            Outcome::Degenerate => {
                stats.degenerate += 1;
                log::debug!(
                    "skipping contact of body {} with {:?}: degenerate effective mass",
                    m.body_a.0,
                    m.body_b.map(|id| id.0)
                );
                continue;
            }
        };

        let depth = m.max_depth();
        let slot = &mut acc[m.body_a.index()];
        slot.linear += impulse * a.body.inv_mass * weight;
        slot.angular += a.inv_inertia * a.arm.cross(impulse) * weight;
        slot.weight += weight;

        match (&b, m.body_b) {
            (Some(b), Some(id)) => {
                slot.shift += m.normal * (0.5 * depth);
                let other = &mut acc[id.index()];
                other.linear -= impulse * b.body.inv_mass * weight;
                other.angular -= b.inv_inertia * b.arm.cross(impulse) * weight;
                other.shift -= m.normal * (0.5 * depth);
                other.weight += weight;
            }
            _ => slot.shift += m.normal * depth,
        }
    }

    for id in bodies.ids().collect::<Vec<_>>() {
        let delta = acc[id.index()];
        if delta.weight == 0.0 {
            continue;
        }
        if let Some(body) = bodies.get_mut(id) {
            body.velocity += delta.linear / delta.weight;
            body.angular_velocity += delta.angular / delta.weight;
            body.position += delta.shift;
            body.refresh_transform();
        }
    }

    stats
}
