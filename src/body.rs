// src/body.rs
//! Rigid cuboid bodies and the fixed-capacity store that owns them.
//!
//! Bodies are addressed by `BodyId`, a plain index into the store. Contacts
//! keep ids, never references, and resolve them at the point of use.

use glam::{Mat3, Mat4, Vec3};

use crate::math;
use crate::sleep::BodyState;
use crate::{Error, Result};

/// Stable index of a body inside a `BodyStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

impl BodyId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A uniform-density cuboid.
///
/// The shape is the unit cube scaled by `scale` (edge lengths). `transform`
/// and `inverse_transform` are caches derived from the pose; they are only
/// written by `refresh_transform`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    pub id: BodyId,
    pub position: Vec3,
    /// Orthonormal rotation.
    pub orientation: Mat3,
    /// Edge lengths along the local axes.
    pub scale: Vec3,
    pub velocity: Vec3,
    /// World-space angular velocity, radians per second.
    pub angular_velocity: Vec3,
    pub mass: f32,
    pub inv_mass: f32,
    /// Diagonal of the body-space inertia tensor.
    pub inertia: Vec3,
    pub inv_inertia: Vec3,
    transform: Mat4,
    inverse_transform: Mat4,
}

impl RigidBody {
    /// Create a body at rest. `mass` and every edge length must be positive.
    pub fn new(id: BodyId, position: Vec3, orientation: Mat3, scale: Vec3, mass: f32) -> Self {
        debug_assert!(mass > 0.0, "body mass must be positive");
        debug_assert!(scale.min_element() > 0.0, "edge lengths must be positive");
        let inertia = cuboid_inertia(mass, scale);
        let mut body = Self {
            id,
            position,
            orientation: math::orthonormalize(orientation),
            scale,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass,
            inv_mass: 1.0 / mass,
            inertia,
            inv_inertia: inertia.recip(),
            transform: Mat4::IDENTITY,
            inverse_transform: Mat4::IDENTITY,
        };
        body.refresh_transform();
        body
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Recompute both cached transforms from position, orientation and scale.
    #[inline]
    pub fn refresh_transform(&mut self) {
        self.transform = math::compose_transform(self.position, self.orientation, self.scale);
        self.inverse_transform = math::invert_transform(self.position, self.orientation, self.scale);
    }

    #[inline(always)]
    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    #[inline(always)]
    pub fn inverse_transform(&self) -> &Mat4 {
        &self.inverse_transform
    }

    /// Local (unit-cube) point to world space.
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.transform.transform_point3(local)
    }

    /// World point to local (unit-cube) space.
    #[inline]
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        self.inverse_transform.transform_point3(world)
    }

    /// World offset from the center of mass to a local point.
    #[inline]
    pub fn lever_arm(&self, local: Vec3) -> Vec3 {
        self.to_world(local) - self.position
    }

    /// Inverse inertia tensor in world space, `R * I⁻¹ * Rᵀ`.
    #[inline]
    pub fn inv_inertia_world(&self) -> Mat3 {
        self.orientation * Mat3::from_diagonal(self.inv_inertia) * self.orientation.transpose()
    }

    /// Velocity of the material point at lever arm `r`.
    #[inline]
    pub fn point_velocity(&self, r: Vec3) -> Vec3 {
        self.velocity + self.angular_velocity.cross(r)
    }

    /// Face normals in world space (local x, y, z).
    #[inline]
    pub fn axes(&self) -> [Vec3; 3] {
        [self.orientation.x_axis, self.orientation.y_axis, self.orientation.z_axis]
    }

    #[inline]
    pub fn corners(&self) -> [Vec3; 8] {
        math::world_corners(&self.transform)
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    #[inline]
    pub fn angular_speed(&self) -> f32 {
        self.angular_velocity.length()
    }
}

/// Diagonal inertia of a solid cuboid with edge lengths `size`.
pub fn cuboid_inertia(mass: f32, size: Vec3) -> Vec3 {
    let sq = size * size;
    Vec3::new(sq.y + sq.z, sq.x + sq.z, sq.x + sq.y) * (mass / 12.0)
}

/// Owned, capacity-bounded arena of bodies with a parallel state array.
#[derive(Debug, Clone)]
pub struct BodyStore {
    bodies: Vec<RigidBody>,
    states: Vec<BodyState>,
    capacity: usize,
}

impl BodyStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bodies: Vec::with_capacity(capacity),
            states: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert a body built by `make` from the id it will receive.
    pub fn insert_with<F>(&mut self, make: F) -> Result<BodyId>
    where
        F: FnOnce(BodyId) -> RigidBody,
    {
        if self.bodies.len() >= self.capacity {
            return Err(Error::BodyCapacity { capacity: self.capacity });
        }
        let id = BodyId(self.bodies.len());
        let mut body = make(id);
        body.id = id;
        self.bodies.push(body);
        self.states.push(BodyState::Active);
        Ok(id)
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.states.clear();
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn get(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id.0)
    }

    #[inline]
    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id.0)
    }

    /// Two distinct bodies mutably at once.
    pub fn pair_mut(&mut self, a: BodyId, b: BodyId) -> Option<(&mut RigidBody, &mut RigidBody)> {
        if a == b || a.0 >= self.bodies.len() || b.0 >= self.bodies.len() {
            return None;
        }
        if a.0 < b.0 {
            let (lo, hi) = self.bodies.split_at_mut(b.0);
            Some((&mut lo[a.0], &mut hi[0]))
        } else {
            let (lo, hi) = self.bodies.split_at_mut(a.0);
            Some((&mut hi[0], &mut lo[b.0]))
        }
    }

    #[inline]
    pub fn state(&self, id: BodyId) -> Option<BodyState> {
        self.states.get(id.0).copied()
    }

    #[inline]
    pub fn set_state(&mut self, id: BodyId, state: BodyState) {
        if let Some(slot) = self.states.get_mut(id.0) {
            *slot = state;
        }
    }

    /// True for bodies that still integrate and collide.
    #[inline]
    pub fn is_awake(&self, id: BodyId) -> bool {
        self.state(id) == Some(BodyState::Active)
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyId> {
        (0..self.bodies.len()).map(BodyId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RigidBody, BodyState)> {
        self.bodies.iter().zip(self.states.iter().copied())
    }

    /// Awake bodies other than `id`.
    pub fn awake_others(&self, id: BodyId) -> impl Iterator<Item = &RigidBody> + '_ {
        self.bodies
            .iter()
            .zip(self.states.iter())
            .filter(move |(b, s)| b.id != id && **s == BodyState::Active)
            .map(|(b, _)| b)
    }

    pub fn resting_count(&self) -> usize {
        self.states.iter().filter(|s| **s == BodyState::Resting).count()
    }
}
