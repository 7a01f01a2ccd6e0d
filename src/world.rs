// src/world.rs
//! The simulation world: bodies, per-step contacts and the step pipeline.
//!
//! One `step` runs, for every awake body in index order:
//! 1. bisect for the earliest contact and integrate up to it,
//! 2. commit the contact manifolds found there (one per body pair),
//!
//! then resolves all committed manifolds at once, integrates each body over
//! what is left of the step and classifies settled bodies as resting.

use bytemuck::{Pod, Zeroable};

use crate::body::{BodyId, BodyStore, RigidBody};
use crate::config::SimConfig;
use crate::contact::{ContactManifold, ManifoldPool};
use crate::debug::DebugDraw;
use crate::scene::{BodyDesc, Scene};
use crate::sleep::{self, BodyState};
use crate::{integrator, resolver, toi, Error, Result};

/// Per-body record handed to the renderer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BodyInstance {
    /// Column-major world transform.
    pub model: [[f32; 4]; 4],
    /// x = 1 when resting, yzw unused.
    pub flags: [u32; 4],
}

impl BodyInstance {
    pub fn from_body(body: &RigidBody, state: BodyState) -> Self {
        Self {
            model: body.transform().to_cols_array_2d(),
            flags: [u32::from(state.is_resting()), 0, 0, 0],
        }
    }

    #[inline]
    pub fn is_resting(&self) -> bool {
        self.flags[0] != 0
    }
}

/// What happened during one `World::step`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub bodies_stepped: usize,
    pub manifolds: usize,
    pub contact_points: usize,
    /// Points discarded by full manifolds.
    pub dropped_points: usize,
    /// Manifolds discarded by the full pool.
    pub dropped_manifolds: usize,
    /// Pairs already committed earlier in the step by the other body.
    pub duplicate_pairs: usize,
    pub degenerate_contacts: usize,
    pub newly_resting: usize,
}

impl StepStats {
    #[inline]
    pub fn overflowed(&self) -> bool {
        self.dropped_points > 0 || self.dropped_manifolds > 0
    }
}

pub struct World {
    config: SimConfig,
    bodies: BodyStore,
    pool: ManifoldPool,
    debug: DebugDraw,
    scene: Scene,
    steps: u64,
}

impl World {
    /// Empty world. Fails on a config that `SimConfig::validate` rejects.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            bodies: BodyStore::with_capacity(config.max_bodies),
            pool: ManifoldPool::with_capacity(config.max_manifolds),
            debug: DebugDraw::new(config.debug_capacity),
            scene: Scene::default(),
            steps: 0,
            config,
        })
    }

    /// World populated with every body of `scene`.
    pub fn from_scene(config: SimConfig, scene: &Scene) -> Result<Self> {
        let mut world = Self::new(config)?;
        for desc in &scene.bodies {
            world.spawn(desc)?;
        }
        log::info!("world created with {} bodies", world.bodies.len());
        Ok(world)
    }

    /// Add a body; it becomes part of the scene restored by `reset`.
    pub fn spawn(&mut self, desc: &BodyDesc) -> Result<BodyId> {
        desc.validate()?;
        let id = self.bodies.insert_with(|id| desc.build(id))?;
        self.scene.bodies.push(*desc);
        Ok(id)
    }

    /// Rebuild every body from its description and wake them all.
    pub fn reset(&mut self) {
        self.bodies.clear();
        self.pool.clear();
        self.debug.clear();
        self.steps = 0;
        for desc in &self.scene.bodies {
            // the scene never grows past what fit before
            if let Err(err) = self.bodies.insert_with(|id| desc.build(id)) {
                log::warn!("reset: {err}");
                break;
            }
        }
        log::info!("world reset: {} bodies active", self.bodies.len());
    }

    /// Advance the world by one fixed step.
    pub fn step(&mut self) -> StepStats {
        let mut stats = StepStats::default();
        self.pool.clear();

        let step = self.config.step_size;
        let awake: Vec<BodyId> = self.bodies.ids().filter(|id| self.bodies.is_awake(*id)).collect();
        let mut remaining = vec![0.0f32; self.bodies.len()];

        for &id in &awake {
            let impact = toi::time_of_impact(&self.bodies, id, &self.config);
            if let Some(body) = self.bodies.get_mut(id) {
                integrator::integrate(body, impact.time, &self.config);
            }
            remaining[id.index()] = step - impact.time;
            for manifold in impact.manifolds {
                self.commit(manifold, &mut stats);
            }
        }

        let resolved = resolver::resolve(&mut self.bodies, self.pool.manifolds(), &self.config);
        stats.degenerate_contacts = resolved.degenerate;

        for &id in &awake {
            let dt = remaining[id.index()];
            if dt > 0.0 {
                if let Some(body) = self.bodies.get_mut(id) {
                    integrator::integrate(body, dt, &self.config);
                }
            }
        }

        for &id in &awake {
            let Some(body) = self.bodies.get(id) else { continue };
            let contacts = self.pool.contact_count(id);
            if sleep::classify(body, contacts, &self.config).is_resting() {
                log::debug!("body {} resting at {:?}", id.0, body.position);
                self.bodies.set_state(id, BodyState::Resting);
                stats.newly_resting += 1;
            }
        }

        self.debug.record(&self.pool, &self.bodies);
        stats.bodies_stepped = awake.len();
        self.steps += 1;

        log::debug!(
            "step {}: {} bodies, {} manifolds, {} points, {} resting",
            self.steps,
            stats.bodies_stepped,
            stats.manifolds,
            stats.contact_points,
            self.bodies.resting_count()
        );
        stats
    }

    fn commit(&mut self, manifold: ContactManifold, stats: &mut StepStats) {
        if self.pool.contains_pair(manifold.body_a, manifold.body_b) {
            stats.duplicate_pairs += 1;
            return;
        }
        let dropped = manifold.dropped();
        if dropped > 0 {
            let err = Error::ManifoldOverflow { capacity: self.config.max_manifold_points };
            log::warn!("body {}: {err} ({dropped} dropped)", manifold.body_a.0);
            stats.dropped_points += dropped;
        }
        let points = manifold.len();
        match self.pool.push(manifold) {
            Ok(()) => {
                stats.manifolds += 1;
                stats.contact_points += points;
            }
            Err(err) => {
                log::warn!("{err}");
                stats.dropped_manifolds += 1;
            }
        }
    }

    pub fn body(&self, id: BodyId) -> Result<&RigidBody> {
        self.bodies.get(id).ok_or(Error::UnknownBody(id.0))
    }

    pub fn state(&self, id: BodyId) -> Result<BodyState> {
        self.bodies.state(id).ok_or(Error::UnknownBody(id.0))
    }

    pub fn bodies(&self) -> impl Iterator<Item = (&RigidBody, BodyState)> {
        self.bodies.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    #[inline]
    pub fn resting_count(&self) -> usize {
        self.bodies.resting_count()
    }

    /// True once every body is resting.
    pub fn is_settled(&self) -> bool {
        !self.bodies.is_empty() && self.bodies.resting_count() == self.bodies.len()
    }

    /// Transforms of every body for draw submission.
    pub fn instances(&self) -> Vec<BodyInstance> {
        self.bodies.iter().map(|(body, state)| BodyInstance::from_body(body, state)).collect()
    }

    /// Manifolds committed by the last step.
    pub fn manifolds(&self) -> &[ContactManifold] {
        self.pool.manifolds()
    }

    pub fn debug(&self) -> &DebugDraw {
        &self.debug
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}
