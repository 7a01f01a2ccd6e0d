// src/contact.rs
//! Contact manifolds and the per-step pool that collects them.

use glam::Vec3;

use crate::body::BodyId;
use crate::{Error, Result};

/// Which features produced a contact point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactFeature {
    /// A box corner below the floor tolerance.
    FloorCorner,
    /// A corner of one box inside a face of the other. `axis` is the SAT axis index (0..6).
    FaceVertex { axis: usize },
    /// Closest points between two edges (axis index 6..15). Edges are world-space
    /// segments at the time the contact was generated.
    EdgeEdge {
        axis: usize,
        edge_a: [Vec3; 2],
        edge_b: [Vec3; 2],
    },
}

/// One contact point stored in both bodies' local spaces, so it stays
/// attached to the bodies while they move within the step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// Point in body A's unit-cube space.
    pub local_a: Vec3,
    /// Point in body B's unit-cube space, or the world point for floor contacts.
    pub local_b: Vec3,
    /// Penetration depth; positive means overlap.
    pub depth: f32,
    pub feature: ContactFeature,
}

/// Contact set of one body pair. `body_b == None` means the floor.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactManifold {
    pub body_a: BodyId,
    pub body_b: Option<BodyId>,
    /// World normal pointing from B toward A (up for the floor).
    pub normal: Vec3,
    points: Vec<ContactPoint>,
    capacity: usize,
    dropped: usize,
}

impl ContactManifold {
    pub fn new(body_a: BodyId, body_b: Option<BodyId>, normal: Vec3, capacity: usize) -> Self {
        Self {
            body_a,
            body_b,
            normal,
            points: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    #[inline]
    pub fn floor(body: BodyId, capacity: usize) -> Self {
        Self::new(body, None, Vec3::Y, capacity)
    }

    /// Append a point; when full the point is dropped and counted.
    pub fn push(&mut self, point: ContactPoint) -> Result<()> {
        if self.points.len() >= self.capacity {
            self.dropped += 1;
            return Err(Error::ManifoldOverflow { capacity: self.capacity });
        }
        self.points.push(point);
        Ok(())
    }

    #[inline(always)]
    pub fn points(&self) -> &[ContactPoint] {
        &self.points
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points rejected because the manifold was full.
    #[inline(always)]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    #[inline]
    pub fn is_floor(&self) -> bool {
        self.body_b.is_none()
    }

    #[inline]
    pub fn involves(&self, id: BodyId) -> bool {
        self.body_a == id || self.body_b == Some(id)
    }

    /// Same unordered pair.
    #[inline]
    pub fn same_pair(&self, a: BodyId, b: Option<BodyId>) -> bool {
        match (self.body_b, b) {
            (None, None) => self.body_a == a,
            (Some(mb), Some(b)) => (self.body_a == a && mb == b) || (self.body_a == b && mb == a),
            _ => false,
        }
    }

    /// Largest penetration among the points (0 when none overlap).
    pub fn max_depth(&self) -> f32 {
        self.points.iter().map(|p| p.depth).fold(0.0, f32::max)
    }
}

/// Bounded list of the manifolds collected during one step.
#[derive(Debug, Clone)]
pub struct ManifoldPool {
    manifolds: Vec<ContactManifold>,
    capacity: usize,
}

impl ManifoldPool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { manifolds: Vec::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, manifold: ContactManifold) -> Result<()> {
        if self.manifolds.len() >= self.capacity {
            return Err(Error::PoolOverflow { capacity: self.capacity });
        }
        self.manifolds.push(manifold);
        Ok(())
    }

    #[inline]
    pub fn contains_pair(&self, a: BodyId, b: Option<BodyId>) -> bool {
        self.manifolds.iter().any(|m| m.same_pair(a, b))
    }

    /// Contact points touching `id` across all manifolds.
    pub fn contact_count(&self, id: BodyId) -> usize {
        self.manifolds.iter().filter(|m| m.involves(id)).map(|m| m.len()).sum()
    }

    #[inline(always)]
    pub fn manifolds(&self) -> &[ContactManifold] {
        &self.manifolds
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.manifolds.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.manifolds.is_empty()
    }

    pub fn clear(&mut self) {
        self.manifolds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(depth: f32) -> ContactPoint {
        ContactPoint {
            local_a: Vec3::splat(-0.5),
            local_b: Vec3::ZERO,
            depth,
            feature: ContactFeature::FloorCorner,
        }
    }

    #[test]
    fn manifold_drops_excess_points() {
        let mut m = ContactManifold::floor(BodyId(0), 2);
        m.push(corner(0.1)).unwrap();
        m.push(corner(0.3)).unwrap();
        let err = m.push(corner(0.9)).unwrap_err();
        assert!(err.is_overflow());
        assert_eq!(m.len(), 2);
        assert_eq!(m.dropped(), 1);
        // the dropped point does not leak into the kept data
        assert!((m.max_depth() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn pool_overflow_keeps_existing_manifolds() {
        let mut pool = ManifoldPool::with_capacity(1);
        pool.push(ContactManifold::floor(BodyId(0), 4)).unwrap();
        let err = pool.push(ContactManifold::floor(BodyId(1), 4)).unwrap_err();
        assert!(matches!(err, Error::PoolOverflow { capacity: 1 }));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.manifolds()[0].body_a, BodyId(0));
    }

    #[test]
    fn pair_lookup_is_unordered() {
        let mut pool = ManifoldPool::with_capacity(4);
        pool.push(ContactManifold::new(BodyId(2), Some(BodyId(5)), Vec3::X, 4)).unwrap();
        assert!(pool.contains_pair(BodyId(5), Some(BodyId(2))));
        assert!(!pool.contains_pair(BodyId(2), None));
        assert!(!pool.contains_pair(BodyId(2), Some(BodyId(3))));
    }

    #[test]
    fn contact_count_includes_both_sides() {
        let mut pool = ManifoldPool::with_capacity(4);
        let mut floor = ContactManifold::floor(BodyId(1), 8);
        for _ in 0..3 {
            floor.push(corner(0.0)).unwrap();
        }
        let mut pair = ContactManifold::new(BodyId(0), Some(BodyId(1)), Vec3::Y, 8);
        pair.push(corner(0.01)).unwrap();
        pool.push(floor).unwrap();
        pool.push(pair).unwrap();
        assert_eq!(pool.contact_count(BodyId(1)), 4);
        assert_eq!(pool.contact_count(BodyId(0)), 1);
    }
}
