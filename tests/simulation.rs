// tests/simulation.rs
// End-to-end behaviour of the step pipeline.

use boxfall::sat::{self, Segment};
use boxfall::{math, BodyDesc, ContactFeature, BodyId, BodyState, RigidBody, Scene, SceneConfig, SimConfig, World};
use glam::{Mat3, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn world(config: SimConfig, descs: &[BodyDesc]) -> World {
    World::from_scene(config, &Scene::new(descs.to_vec())).unwrap()
}

fn lowest_corner(body: &RigidBody) -> f32 {
    body.corners().iter().map(|c| c.y).fold(f32::MAX, f32::min)
}

fn random_unit(rng: &mut StdRng) -> Vec3 {
    loop {
        let v = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        if v.length() > 0.1 {
            return v.normalize();
        }
    }
}

#[test]
fn bodies_resting_on_floor_stay_within_tolerance() {
    let cfg = SimConfig::default();
    let tolerance = cfg.distance_tolerance;
    let mut world = world(
        cfg,
        &[
            BodyDesc::cube(Vec3::new(0.0, 0.5, 0.0)),
            BodyDesc::cube(Vec3::new(4.0, 0.3, 0.0)).with_size(Vec3::new(2.0, 0.6, 1.0)).with_mass(3.0),
            BodyDesc::cube(Vec3::new(-4.0, 0.5, 1.0)).with_rotation(Vec3::Y, 30.0),
        ],
    );
    world.step();
    for (body, _) in world.bodies() {
        let low = lowest_corner(body);
        assert!(low.abs() < tolerance, "body {} lowest corner at {}", body.id.0, low);
    }
}

#[test]
fn inelastic_drop_comes_to_rest() {
    let cfg = SimConfig { restitution: 0.0, ..SimConfig::default() };
    let mut world = world(cfg.clone(), &[BodyDesc::cube(Vec3::new(0.0, 3.0, 0.0))]);

    let mut steps = 0;
    while world.state(BodyId(0)).unwrap() == BodyState::Active && steps < 300 {
        world.step();
        steps += 1;
    }

    assert_eq!(world.state(BodyId(0)).unwrap(), BodyState::Resting, "not resting after {steps} steps");
    let body = world.body(BodyId(0)).unwrap();
    assert!(body.speed() < cfg.rest_linear_speed);
    assert!(body.angular_speed() < cfg.rest_angular_speed);
    assert!(lowest_corner(body).abs() < cfg.distance_tolerance);
}

#[test]
fn first_bounce_follows_restitution() {
    let cfg = SimConfig { restitution: 0.7, ..SimConfig::default() };
    let mut world = world(cfg, &[BodyDesc::cube(Vec3::new(0.0, 3.0, 0.0))]);

    for _ in 0..200 {
        let before = world.body(BodyId(0)).unwrap().velocity.y;
        world.step();
        let after = world.body(BodyId(0)).unwrap().velocity.y;
        if before < 0.0 && after > 0.0 {
            let ratio = after / -before;
            assert!((ratio - 0.7).abs() < 0.08, "rebound ratio {ratio}");
            assert!(world.body(BodyId(0)).unwrap().angular_speed() < 1e-4);
            return;
        }
    }
    panic!("body never bounced");
}

#[test]
fn boxes_far_apart_never_collide() {
    let cfg = SimConfig::default();
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let size_a = Vec3::new(rng.gen_range(0.3..2.0), rng.gen_range(0.3..2.0), rng.gen_range(0.3..2.0));
        let size_b = Vec3::new(rng.gen_range(0.3..2.0), rng.gen_range(0.3..2.0), rng.gen_range(0.3..2.0));
        let reach = 0.5 * (size_a.length() + size_b.length());
        let offset = random_unit(&mut rng) * (reach + rng.gen_range(0.01..1.0));

        let a = RigidBody::new(
            BodyId(0),
            Vec3::ZERO,
            math::rotation_deg(random_unit(&mut rng), rng.gen_range(0.0..360.0)),
            size_a,
            1.0,
        );
        let b = RigidBody::new(
            BodyId(1),
            offset,
            math::rotation_deg(random_unit(&mut rng), rng.gen_range(0.0..360.0)),
            size_b,
            1.0,
        );
        assert!(sat::collide(&a, &b, &cfg).is_none());
        assert!(sat::collide(&b, &a, &cfg).is_none());
    }
}

#[test]
fn overlapping_boxes_report_normal_from_b_to_a() {
    let cfg = SimConfig::default();
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..100 {
        let a = RigidBody::new(
            BodyId(0),
            random_unit(&mut rng) * 0.4,
            math::rotation_deg(random_unit(&mut rng), rng.gen_range(0.0..360.0)),
            Vec3::ONE,
            1.0,
        );
        let b = RigidBody::new(BodyId(1), Vec3::ZERO, Mat3::IDENTITY, Vec3::ONE, 1.0);
        let contact = sat::collide(&a, &b, &cfg).expect("centers 0.4 apart always overlap");
        assert!((contact.normal.length() - 1.0).abs() < 1e-4);
        assert!(contact.normal.dot(a.position - b.position) >= 0.0);
        assert!(contact.depth >= 0.0);
        assert!(contact.point.local_a.is_finite() && contact.point.local_b.is_finite());
    }
}

#[test]
fn crossed_edges_collide_through_step() {
    use std::f32::consts::FRAC_1_SQRT_2;

    // A's lowest edge runs along z and falls onto B's highest edge along x;
    // B balances on its bottom edge at the floor
    let top = 2.0 * FRAC_1_SQRT_2;
    let mut world = world(
        SimConfig::default(),
        &[
            BodyDesc::cube(Vec3::new(0.0, top + FRAC_1_SQRT_2 + 0.05, 0.0))
                .with_rotation(Vec3::Z, 45.0)
                .with_velocity(Vec3::new(0.0, -3.0, 0.0)),
            BodyDesc::cube(Vec3::new(0.0, FRAC_1_SQRT_2, 0.0)).with_rotation(Vec3::X, 45.0),
        ],
    );

    let mut hit = None;
    for _ in 0..60 {
        let stats = world.step();
        assert!(stats.contact_points >= stats.manifolds);
        if let Some(pair) = world.manifolds().iter().find(|m| !m.is_floor()) {
            hit = Some(pair.clone());
            break;
        }
    }
    let pair = hit.expect("falling box never reached the lower one");
    assert_eq!(pair.body_a, BodyId(0));
    assert_eq!(pair.body_b, Some(BodyId(1)));
    assert!(pair.normal.is_finite());
    assert!((pair.normal.length() - 1.0).abs() < 1e-4);
    assert!(pair.normal.y > 0.9, "normal {:?}", pair.normal);
    let point = pair.points()[0];
    assert!(matches!(point.feature, ContactFeature::EdgeEdge { .. }), "{:?}", point.feature);
    assert!(point.depth < 0.05);

    for _ in 0..60 {
        world.step();
    }
    for (body, _) in world.bodies() {
        assert!(body.position.is_finite() && body.velocity.is_finite());
        assert!(body.orientation.is_finite() && body.angular_velocity.is_finite());
    }
    let upper = world.body(BodyId(0)).unwrap();
    assert!(lowest_corner(upper) > -0.25);
}

#[test]
fn segment_closest_points_are_symmetric() {
    let mut rng = StdRng::seed_from_u64(3);
    let point = |rng: &mut StdRng| Vec3::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0));
    for _ in 0..200 {
        let first = Segment::new(point(&mut rng), point(&mut rng));
        let second = Segment::new(point(&mut rng), point(&mut rng));
        let ab = sat::closest_points(first, second);
        let ba = sat::closest_points(second, first);
        assert!((ab.distance - ba.distance).abs() < 1e-4);
        assert!((ab.on_first - ba.on_second).length() < 1e-3);
        assert!((ab.on_second - ba.on_first).length() < 1e-3);
        assert_eq!(sat::closest_points(first, second), ab);
        assert!((0.0..=1.0).contains(&ab.s) && (0.0..=1.0).contains(&ab.t));
    }
}

#[test]
fn manifold_overflow_only_drops_excess_points() {
    let cfg = SimConfig { max_manifold_points: 2, ..SimConfig::default() };
    let far = BodyDesc::cube(Vec3::new(20.0, 10.0, 0.0)).with_rotation(Vec3::X, 20.0);
    let mut crowded = world(cfg.clone(), &[BodyDesc::cube(Vec3::new(0.0, 0.5, 0.0)), far]);
    let mut alone = world(cfg, &[far]);

    let stats = crowded.step();
    alone.step();
    assert_eq!(stats.dropped_points, 2);
    assert!(stats.overflowed());
    assert_eq!(crowded.manifolds()[0].len(), 2);

    for _ in 0..20 {
        crowded.step();
        alone.step();
    }
    let a = crowded.body(BodyId(1)).unwrap();
    let b = alone.body(BodyId(0)).unwrap();
    assert_eq!(a.position, b.position);
    assert_eq!(a.orientation, b.orientation);
    assert_eq!(a.velocity, b.velocity);
    assert_eq!(a.angular_velocity, b.angular_velocity);
}

#[test]
fn pool_overflow_drops_whole_manifolds() {
    let cfg = SimConfig { max_manifolds: 1, ..SimConfig::default() };
    let mut world = world(
        cfg,
        &[BodyDesc::cube(Vec3::new(0.0, 0.5, 0.0)), BodyDesc::cube(Vec3::new(3.0, 0.5, 0.0))],
    );
    let stats = world.step();
    assert_eq!(stats.manifolds, 1);
    assert_eq!(stats.dropped_manifolds, 1);
    assert_eq!(world.manifolds().len(), 1);
    assert!(world.bodies().all(|(b, _)| b.position.is_finite()));
}

#[test]
fn resting_body_is_frozen_until_reset() {
    let mut world = world(
        SimConfig::default(),
        &[BodyDesc::cube(Vec3::new(0.0, 0.5, 0.0)), BodyDesc::cube(Vec3::new(3.0, 4.0, 0.0))],
    );
    for _ in 0..10 {
        world.step();
    }
    assert_eq!(world.state(BodyId(0)).unwrap(), BodyState::Resting);
    let frozen = *world.body(BodyId(0)).unwrap();

    for _ in 0..50 {
        let stats = world.step();
        assert!(stats.bodies_stepped <= 1);
    }
    let later = world.body(BodyId(0)).unwrap();
    assert_eq!(later.position, frozen.position);
    assert_eq!(later.orientation, frozen.orientation);

    world.reset();
    assert_eq!(world.state(BodyId(0)).unwrap(), BodyState::Active);
    assert_eq!(world.state(BodyId(1)).unwrap(), BodyState::Active);
}

#[test]
fn generated_scene_stays_above_floor() {
    let cfg = SimConfig::default();
    let scene = Scene::generate(&SceneConfig::default());
    let mut world = World::from_scene(cfg, &scene).unwrap();
    for _ in 0..600 {
        world.step();
        if world.is_settled() {
            break;
        }
    }
    for (body, _) in world.bodies() {
        assert!(body.position.is_finite() && body.velocity.is_finite());
        assert!(lowest_corner(body) > -0.25, "body {} sank to {}", body.id.0, lowest_corner(body));
    }
}
