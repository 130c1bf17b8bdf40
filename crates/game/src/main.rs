//! Skyrange - headless flight range: flies a scripted sortie against a
//! field of targets and logs what the simulation core reports.

use std::time::Duration;

use anyhow::{Context, Result};
use flight_sim::{
    ControlSurfaceRig, FrameLoop, NodeHandle, SimConfig, SimContext, TargetKind, VisualEvent,
};
use glam::Vec3;
use input::{ControlSnapshot, FlightControl};
use rand::{Rng, SeedableRng};

const FRAME_RATE: u32 = 60;
const DEFAULT_SECONDS: u32 = 30;
const TARGET_SEED: u64 = 7;

/// Controls for a given frame of the scripted sortie.
fn scripted_controls(frame: u32) -> ControlSnapshot {
    let second = frame / FRAME_RATE;
    let mut controls = ControlSnapshot::new();
    match second {
        0..=1 => {
            controls.set(FlightControl::ThrottleUp, true);
        }
        2..=9 => {
            controls.set(FlightControl::Fire, true);
        }
        10..=12 => {
            controls.set(FlightControl::Fire, true);
            controls.set(FlightControl::YawLeft, true);
            controls.set(FlightControl::PitchUp, true);
        }
        13..=14 => {
            controls.set(FlightControl::PitchDown, true);
        }
        15..=19 => {
            controls.set(FlightControl::Fire, true);
            controls.set(FlightControl::YawRight, true);
        }
        _ => {
            controls.set(FlightControl::Fire, true);
            controls.set(FlightControl::ThrottleDown, true);
        }
    }
    if second == 5 {
        controls.set(FlightControl::SelectModel(3), true);
    }
    controls
}

fn place_targets(sim: &mut SimContext, config: &SimConfig) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(TARGET_SEED);
    let origin = config.flight.spawn_position;
    for i in 0..6 {
        let distance = 150.0 + i as f32 * 120.0;
        let position = origin
            + Vec3::new(
                rng.gen_range(-6.0..6.0),
                rng.gen_range(-4.0..4.0),
                -distance,
            );
        sim.spawn_target(TargetKind::Aircraft, position, 5.0, 60.0);
    }
    for _ in 0..3 {
        let position = Vec3::new(
            rng.gen_range(-40.0..40.0),
            config.flight.ground_height,
            -rng.gen_range(300.0..900.0),
        );
        sim.spawn_target(TargetKind::Tank, position, 6.0, 120.0);
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seconds = match std::env::args().nth(1).as_deref() {
        Some("--dump-config") => {
            SimConfig::default().save();
            log::info!("Wrote default config to skyrange.ron");
            return Ok(());
        }
        Some(arg) => arg
            .parse::<u32>()
            .with_context(|| format!("invalid duration in seconds: {arg}"))?,
        None => DEFAULT_SECONDS,
    };

    log::info!("Starting Skyrange flight range ({}s sortie)", seconds);

    let config = SimConfig::load();
    let mut sim = SimContext::new(&config);
    sim.set_control_surface_rig(ControlSurfaceRig::resolve([
        ("Aileron_Left", NodeHandle(1)),
        ("Aileron_Right", NodeHandle(2)),
        ("Elevator", NodeHandle(3)),
        ("Rudder", NodeHandle(4)),
    ]));
    place_targets(&mut sim, &config);
    log::info!(
        "Weapon: {}, {} targets on range",
        sim.weapons.current_weapon_name(),
        sim.targets.len()
    );

    let mut frames = FrameLoop::new(sim);
    let frame_time = Duration::from_secs_f64(1.0 / f64::from(FRAME_RATE));
    let mut shots = 0u32;
    let mut hits = 0usize;
    let mut damage = 0u32;
    let mut destroyed = 0usize;
    let mut attached = 0usize;

    for frame in 0..seconds * FRAME_RATE {
        let controls = scripted_controls(frame);
        let Some(report) = frames.run_frame(&controls, frame_time) else {
            continue;
        };
        if report.fired.is_some() {
            shots += 1;
        }
        for event in &report.damage {
            hits += 1;
            damage += event.damage;
        }
        destroyed += report.destroyed.len();
        attached += report
            .visual_events
            .iter()
            .filter(|e| matches!(e, VisualEvent::Attach { .. }))
            .count();
    }

    let state = frames.context.flight.state();
    log::info!(
        "Sortie over: {} shots ({} attached), {} hits, {} damage, {} destroyed, {} evicted, {} faults",
        shots,
        attached,
        hits,
        damage,
        destroyed,
        frames.context.projectiles.eviction_count(),
        frames.faults()
    );
    log::info!(
        "Final pose: position {:.1?}, throttle {:.2}, model {}",
        state.position,
        state.throttle,
        state.model
    );

    frames.context.reset();
    Ok(())
}
