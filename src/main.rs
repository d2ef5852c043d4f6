//! narrowphase2d demo
//!
//! Scatters a seeded set of circles and polygons in a box, lets them drift,
//! and pushes each body out along its accumulated collision normal every frame.
//!
//! Usage: narrowphase2d [settings.json] [seed]

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use narrowphase2d::{CollisionSettings, CollisionWorld, Shape};

/// Fixed demo timestep
const DT: f32 = 1.0 / 60.0;
const FRAMES: u32 = 240;
const BODIES: usize = 24;
const ARENA_HALF_EXTENT: f32 = 12.0;
/// Distance a body is pushed out per frame while overlapping
const PUSH_OUT: f32 = 0.05;

fn random_shape(rng: &mut Pcg32) -> narrowphase2d::Result<Shape> {
    match rng.random_range(0..3) {
        0 => Shape::circle(rng.random_range(0.4..1.2)),
        1 => Shape::rect(rng.random_range(0.3..1.0), rng.random_range(0.3..1.0)),
        _ => {
            let cloud: Vec<Vec2> = (0..rng.random_range(5..9))
                .map(|_| Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)))
                .collect();
            Shape::convex_hull(&cloud)
        }
    }
}

fn build_world(settings: CollisionSettings, seed: u64) -> narrowphase2d::Result<CollisionWorld> {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut world = CollisionWorld::new(settings);

    for i in 0..BODIES {
        let pos = Vec2::new(
            rng.random_range(-ARENA_HALF_EXTENT..ARENA_HALF_EXTENT),
            rng.random_range(-ARENA_HALF_EXTENT..ARENA_HALF_EXTENT),
        );
        // Every sixth body is a kinematic obstacle
        let id = if i % 6 == 0 {
            world.spawn_kinematic(pos)
        } else {
            world.spawn_body(pos)
        };
        if let Some(body) = world.body_mut(id) {
            body.vel = Vec2::new(rng.random_range(-2.0..2.0), rng.random_range(-2.0..2.0));
        }

        let shape = random_shape(&mut rng)?;
        // A few bodies carry a trigger sensor around them
        let trigger = rng.random_bool(0.15);
        world.attach(id, shape, Vec2::ZERO, trigger)?;
    }

    Ok(world)
}

fn run() -> narrowphase2d::Result<()> {
    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => CollisionSettings::try_load(&path)?,
        None => CollisionSettings::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);

    log::info!(
        "narrowphase2d demo: {} bodies, seed {}, precision {}",
        BODIES,
        seed,
        settings.precision.as_str()
    );

    let mut world = build_world(settings, seed)?;
    let mut total_contacts = 0;

    for _ in 0..FRAMES {
        for body in world.bodies_mut() {
            body.integrate(DT);
            // Bounce off the arena walls
            if body.pos.x.abs() > ARENA_HALF_EXTENT {
                body.vel.x = -body.vel.x;
            }
            if body.pos.y.abs() > ARENA_HALF_EXTENT {
                body.vel.y = -body.vel.y;
            }
        }

        let summary = world.step();
        total_contacts += summary.contacts;
        if summary.contacts > 0 {
            log::info!(
                "Frame {}: {} contacts ({} resolved)",
                summary.frame,
                summary.contacts,
                summary.resolved
            );
        }

        for body in world.bodies_mut() {
            if !body.collided.is_empty() {
                log::debug!("{:?} touching {:?}", body.id, body.collided);
            }
            body.push_out(PUSH_OUT);
        }
    }

    log::info!("Done: {} contacts over {} frames", total_contacts, FRAMES);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
