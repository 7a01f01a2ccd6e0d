// src/debug.rs
//! Contact visualisation data for the renderer.
//!
//! Small fixed-size rings that keep the most recent contact points, normals
//! and edge-edge segment pairs. Old entries are overwritten, never reallocated.

use glam::Vec3;

use crate::body::BodyStore;
use crate::contact::{ContactFeature, ManifoldPool};

const POINT_COLOR: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
const NORMAL_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const EDGE_A_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const EDGE_B_COLOR: [f32; 4] = [0.0, 0.4, 1.0, 1.0];
const NORMAL_LENGTH: f32 = 0.3;

/// Bounded ring that overwrites its oldest entry when full.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    buf: Vec<Option<T>>,
    head: usize,
    len: usize,
}

impl<T> RingBuffer<T> {
    pub fn with_capacity(cap: usize) -> Self {
        let mut buf = Vec::with_capacity(cap);
        buf.resize_with(cap, || None);
        Self { buf, head: 0, len: 0 }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Push `v`; returns the evicted oldest entry when the ring was full.
    pub fn push(&mut self, v: T) -> Option<T> {
        let cap = self.capacity();
        if cap == 0 {
            return Some(v);
        }
        let tail = (self.head + self.len) % cap;
        let evicted = self.buf[tail].replace(v);
        if self.len == cap {
            self.head = (self.head + 1) % cap;
        } else {
            self.len += 1;
        }
        evicted
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let cap = self.capacity();
        (0..self.len).filter_map(move |i| self.buf[(self.head + i) % cap].as_ref())
    }

    pub fn clear(&mut self) {
        self.buf.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.len = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugPoint {
    pub position: Vec3,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    pub start: Vec3,
    pub end: Vec3,
    pub color: [f32; 4],
}

/// Recent contact geometry, refilled after each step.
#[derive(Debug, Clone)]
pub struct DebugDraw {
    pub points: RingBuffer<DebugPoint>,
    pub normals: RingBuffer<DebugLine>,
    /// Edge pairs from edge-edge contacts, A's edge then B's edge.
    pub edges: RingBuffer<(DebugLine, DebugLine)>,
}

impl DebugDraw {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: RingBuffer::with_capacity(capacity),
            normals: RingBuffer::with_capacity(capacity),
            edges: RingBuffer::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.normals.clear();
        self.edges.clear();
    }

    /// Append every point of `pool` in world space, using body A's pose.
    pub fn record(&mut self, pool: &ManifoldPool, bodies: &BodyStore) {
        for manifold in pool.manifolds() {
            let Some(body) = bodies.get(manifold.body_a) else { continue };
            for point in manifold.points() {
                let position = body.to_world(point.local_a);
                self.points.push(DebugPoint { position, color: POINT_COLOR });
                self.normals.push(DebugLine {
                    start: position,
                    end: position + manifold.normal * NORMAL_LENGTH,
                    color: NORMAL_COLOR,
                });
                if let ContactFeature::EdgeEdge { edge_a, edge_b, .. } = point.feature {
                    self.edges.push((
                        DebugLine { start: edge_a[0], end: edge_a[1], color: EDGE_A_COLOR },
                        DebugLine { start: edge_b[0], end: edge_b[1], color: EDGE_B_COLOR },
                    ));
                }
            }
        }
    }
}
