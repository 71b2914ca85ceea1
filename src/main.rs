//! cellmotion demo
//!
//! Runs a walled arena headless for a few simulated seconds: bouncing balls,
//! a falling crate with friction, a seeker and a roamer. Pass a settings JSON
//! path as the first argument to override the engine defaults.
//!
//! `RUST_LOG=debug cargo run` shows impacts as they happen.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use cellmotion::consts::GRAVITY;
use cellmotion::sim::{
    ColliderGroup, ColliderId, Effects, Force, Friction, Lifetime, MotionOptions, PauseSignal, Roamer, SeekGoal, Seeker,
    SharedCollider, SimpleCollider,
};
use cellmotion::{Angle, EngineSettings, LocF, RectF};

const ARENA_WIDTH: f32 = 80.0;
const ARENA_HEIGHT: f32 = 24.0;
const FRAME: Duration = Duration::from_millis(16);
const SECONDS: u32 = 10;

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        log::error!("demo failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> cellmotion::Result<()> {
    let settings = match std::env::args().nth(1) {
        Some(path) => EngineSettings::load(path)?,
        None => EngineSettings::default(),
    };
    log::info!("cellmotion demo starting ({} cadence)", settings.preset.as_str());

    let pause = PauseSignal::new();
    let lifetime = Lifetime::new();
    let mut group = ColliderGroup::new(settings, pause.clone(), lifetime.clone())?;
    let mut effects = Effects::new();

    // Keep every collider alive for the whole run; the group only holds weak refs
    let mut scene: Vec<(&'static str, SharedCollider)> = Vec::new();
    let mut next_identity = 0u64;
    let mut spawn = |group: &mut ColliderGroup,
                     name: &'static str,
                     bounds: RectF,
                     options: MotionOptions|
     -> cellmotion::Result<ColliderId> {
        next_identity += 1;
        let collider = SimpleCollider::new(next_identity, bounds).shared();
        let id = group.register(&collider, options)?;
        scene.push((name, collider));
        Ok(id)
    };

    for wall in [
        RectF::new(-1.0, -1.0, ARENA_WIDTH + 2.0, 1.0),
        RectF::new(-1.0, ARENA_HEIGHT, ARENA_WIDTH + 2.0, 1.0),
        RectF::new(-1.0, 0.0, 1.0, ARENA_HEIGHT),
        RectF::new(ARENA_WIDTH, 0.0, 1.0, ARENA_HEIGHT),
    ] {
        spawn(&mut group, "wall", wall, MotionOptions::default())?;
    }

    for (i, degrees) in [30.0, 135.0, 250.0].into_iter().enumerate() {
        spawn(
            &mut group,
            "ball",
            RectF::new(10.0 + i as f32 * 20.0, 8.0, 1.0, 1.0),
            MotionOptions {
                angle: Angle::new(degrees)?,
                speed: 25.0 + i as f32 * 10.0,
                bounce: true,
                ..Default::default()
            },
        )?;
    }

    let crate_id = spawn(
        &mut group,
        "crate",
        RectF::new(40.0, 2.0, 3.0, 2.0),
        MotionOptions::default(),
    )?;
    effects.add(Force::gravity(crate_id, GRAVITY));
    effects.add(Friction::new(crate_id, 0.8, 0.5)?);

    let hunter_id = spawn(
        &mut group,
        "hunter",
        RectF::new(70.0, 20.0, 1.0, 1.0),
        MotionOptions::default(),
    )?;
    effects.add(Seeker::new(hunter_id, SeekGoal::Point(LocF::new(5.0, 3.0)), 12.0, 1.0)?.remove_on_arrival(true));

    let roamer_id = spawn(
        &mut group,
        "roamer",
        RectF::new(60.0, 12.0, 1.0, 1.0),
        MotionOptions {
            angle: Angle::LEFT,
            speed: 8.0,
            bounce: true,
            ..Default::default()
        },
    )?;
    effects.add(Roamer::new(roamer_id, 40.0, 3.0, 0x5eed)?);

    let impacts = Rc::new(RefCell::new(0usize));
    let counter = impacts.clone();
    group.on_impact(move |impact| {
        *counter.borrow_mut() += 1;
        log::debug!("{} hit {} heading {}", impact.mover, impact.struck, impact.angle);
    });

    let frames = SECONDS * 1000 / FRAME.as_millis() as u32;
    for frame in 0..frames {
        // freeze the middle second to show that pausing stops the clock
        if frame == frames / 2 {
            pause.pause();
        } else if frame == frames / 2 + 60 {
            pause.resume();
        }

        let report = group.tick(FRAME);
        effects.run(&mut group);

        if frame % 60 == 0 && !report.paused {
            log::info!(
                "t={:>5.2}s evaluated={} moved={} impacts={}",
                group.now().as_secs_f32(),
                report.evaluated,
                report.moved,
                report.impacts
            );
        }
    }

    println!("after {:.2}s of simulated time, {} impacts", group.now().as_secs_f32(), impacts.borrow());
    for (name, collider) in scene.iter().filter(|(name, _)| *name != "wall") {
        let collider = collider.borrow();
        let bounds = collider.bounds();
        let speed = group
            .id_of(collider.identity())
            .and_then(|id| group.velocity(id))
            .map_or(0.0, |v| v.speed());
        println!("{name:>7} at ({:6.2}, {:6.2}) speed {speed:6.2}", bounds.left, bounds.top);
    }

    lifetime.end();
    group.tick(FRAME);
    Ok(())
}
