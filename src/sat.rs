// src/sat.rs
//! Oriented box vs. oriented box via the separating axis test.
//!
//! Candidate axes, in enumeration order:
//! - `0..3`  face normals of A
//! - `3..6`  face normals of B
//! - `6..15` `A[i] x B[j]` at index `6 + 3 * i + j`
//!
//! The first axis with disjoint projections ends the test. Otherwise the axis
//! with the smallest overlap picks the contact: face axes yield the deepest
//! vertex of the other box, edge axes the closest points of the two edges
//! running along the generating face normals.

use glam::Vec3;

use crate::body::RigidBody;
use crate::config::SimConfig;
use crate::contact::{ContactFeature, ContactPoint};
use crate::math::{self, UNIT_EDGES};

pub const AXIS_COUNT: usize = 15;
pub const FACE_AXES: usize = 6;

/// A later axis must beat the current best by more than this to win, so
/// rounding noise does not flip a face/edge tie.
const TIE_TOLERANCE: f32 = 1e-5;

/// Line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
}

impl Segment {
    #[inline]
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.end - self.start
    }
}

/// Result of `closest_points`. `s` and `t` are the clamped parameters on the
/// first and second segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoints {
    pub on_first: Vec3,
    pub on_second: Vec3,
    pub s: f32,
    pub t: f32,
    pub distance: f32,
}

/// Closest points between two segments.
///
/// Solves the 2×2 system for both line parameters with Cramer's rule, clamps
/// each to `[0, 1]` independently and measures between the clamped points.
pub fn closest_points(first: Segment, second: Segment) -> ClosestPoints {
    let d1 = first.direction();
    let d2 = second.direction();
    let r = first.start - second.start;

    let a = d1.dot(d1);
    let e = d2.dot(d2);
    let b = d1.dot(d2);
    let c = d1.dot(r);
    let f = d2.dot(r);

    let denom = a * e - b * b;
    let (s, t) = if denom > f32::EPSILON * a * e && denom > 0.0 {
        ((b * f - c * e) / denom, (a * f - b * c) / denom)
    } else if e > f32::EPSILON {
        // parallel (or first degenerate): project the first start onto the
        // second segment, then back onto the first
        let t = (f / e).clamp(0.0, 1.0);
        let s = if a > f32::EPSILON { (b * t - c) / a } else { 0.0 };
        (s, t)
    } else if a > f32::EPSILON {
        (-c / a, 0.0)
    } else {
        (0.0, 0.0)
    };

    let s = s.clamp(0.0, 1.0);
    let t = t.clamp(0.0, 1.0);
    let on_first = first.start + d1 * s;
    let on_second = second.start + d2 * t;
    ClosestPoints { on_first, on_second, s, t, distance: on_first.distance(on_second) }
}

/// A box-box contact, ready to be appended to the pair's manifold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatContact {
    pub axis: usize,
    /// Unit normal from B toward A.
    pub normal: Vec3,
    pub depth: f32,
    pub point: ContactPoint,
}

impl SatContact {
    #[inline]
    pub fn is_edge_edge(&self) -> bool {
        self.axis >= FACE_AXES
    }
}

/// All 15 candidate axes; degenerate cross products (parallel edges) are `None`.
pub fn candidate_axes(a: &RigidBody, b: &RigidBody, parallel_epsilon: f32) -> [Option<Vec3>; AXIS_COUNT] {
    let axes_a = a.axes();
    let axes_b = b.axes();
    let mut axes = [None; AXIS_COUNT];
    for i in 0..3 {
        axes[i] = Some(axes_a[i]);
        axes[3 + i] = Some(axes_b[i]);
    }
    for i in 0..3 {
        for j in 0..3 {
            let cross = axes_a[i].cross(axes_b[j]);
            if cross.length() > parallel_epsilon {
                axes[FACE_AXES + 3 * i + j] = Some(cross.normalize());
            }
        }
    }
    axes
}

#[inline]
fn project(corners: &[Vec3; 8], axis: Vec3) -> (f32, f32) {
    corners.iter().fold((f32::MAX, f32::MIN), |(lo, hi), c| {
        let d = c.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

/// Overlap test between `a` and `b` at their current poses.
pub fn collide(a: &RigidBody, b: &RigidBody, config: &SimConfig) -> Option<SatContact> {
    let corners_a = a.corners();
    let corners_b = b.corners();

    let mut best: Option<(usize, Vec3, f32)> = None;
    for (index, axis) in candidate_axes(a, b, config.parallel_epsilon).into_iter().enumerate() {
        let Some(axis) = axis else { continue };
        let (min_a, max_a) = project(&corners_a, axis);
        let (min_b, max_b) = project(&corners_b, axis);
        if max_a < min_b || max_b < min_a {
            return None;
        }
        let overlap = max_a.min(max_b) - min_a.max(min_b);
        // smallest overlap wins, except that overlaps within TIE_TOLERANCE of
        // the current best count as equal and keep the earlier axis
        if best.map_or(true, |(_, _, depth)| overlap < depth - TIE_TOLERANCE) {
            best = Some((index, axis, overlap));
        }
    }

    let (axis_index, axis, depth) = best?;
    let normal = if axis.dot(a.position - b.position) < 0.0 { -axis } else { axis };

    if axis_index < FACE_AXES {
        Some(face_vertex(a, b, &corners_a, &corners_b, axis_index, normal, depth))
    } else {
        edge_edge(a, b, &corners_a, &corners_b, axis_index, normal, depth, config.parallel_epsilon)
    }
}

fn face_vertex(
    a: &RigidBody,
    b: &RigidBody,
    corners_a: &[Vec3; 8],
    corners_b: &[Vec3; 8],
    axis: usize,
    normal: Vec3,
    depth: f32,
) -> SatContact {
    // A face of A: the vertex of B reaching furthest toward A.
    // A face of B: the vertex of A reaching furthest toward B.
    let point = if axis < 3 {
        deepest(corners_b, normal)
    } else {
        deepest(corners_a, -normal)
    };
    SatContact {
        axis,
        normal,
        depth,
        point: ContactPoint {
            local_a: a.to_local(point),
            local_b: b.to_local(point),
            depth,
            feature: ContactFeature::FaceVertex { axis },
        },
    }
}

/// First corner with the largest projection on `direction`.
fn deepest(corners: &[Vec3; 8], direction: Vec3) -> Vec3 {
    let mut best = corners[0];
    let mut best_d = best.dot(direction);
    for c in &corners[1..] {
        let d = c.dot(direction);
        if d > best_d {
            best = *c;
            best_d = d;
        }
    }
    best
}

/// World edges of a box running parallel to `direction`.
fn parallel_edges(corners: &[Vec3; 8], direction: Vec3, parallel_epsilon: f32) -> Vec<Segment> {
    UNIT_EDGES
        .iter()
        .map(|&(i, j)| Segment::new(corners[i], corners[j]))
        .filter(|edge| math::safe_normalize(edge.direction()).cross(direction).length() < parallel_epsilon)
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn edge_edge(
    a: &RigidBody,
    b: &RigidBody,
    corners_a: &[Vec3; 8],
    corners_b: &[Vec3; 8],
    axis: usize,
    normal: Vec3,
    depth: f32,
    parallel_epsilon: f32,
) -> Option<SatContact> {
    let pair = axis - FACE_AXES;
    let dir_a = a.axes()[pair / 3];
    let dir_b = b.axes()[pair % 3];

    let edges_a = parallel_edges(corners_a, dir_a, parallel_epsilon);
    let edges_b = parallel_edges(corners_b, dir_b, parallel_epsilon);

    let mut closest: Option<(Segment, Segment, ClosestPoints)> = None;
    for ea in &edges_a {
        for eb in &edges_b {
            let cp = closest_points(*ea, *eb);
            if closest.map_or(true, |(_, _, best)| cp.distance < best.distance) {
                closest = Some((*ea, *eb, cp));
            }
        }
    }

    let Some((edge_a, edge_b, cp)) = closest else {
        log::debug!(
            "edge-edge axis {} between bodies {} and {} found no parallel edges",
            axis,
            a.id.0,
            b.id.0
        );
        return None;
    };

    Some(SatContact {
        axis,
        normal,
        depth,
        point: ContactPoint {
            local_a: a.to_local(cp.on_first),
            local_b: b.to_local(cp.on_second),
            depth,
            feature: ContactFeature::EdgeEdge {
                axis,
                edge_a: [edge_a.start, edge_a.end],
                edge_b: [edge_b.start, edge_b.end],
            },
        },
    })
}
