//! Simulation context: one aircraft, its weapons, its rounds, and the
//! targets they can hit, advanced together by `tick`.
//!
//! Contexts share no state, so several can run side by side (replays,
//! tests, more than one player).

use engine_core::TransformRaw;
use glam::{Quat, Vec3};
use hecs::{Entity, World};
use input::ControlSource;
use physics::CollisionFilter;

use crate::config::SimConfig;
use crate::control_surfaces::{ControlSurfaceRig, NodeHandle};
use crate::error::SimError;
use crate::flight::FlightModel;
use crate::projectiles::{ProjectileHandle, ProjectileStore, VisualEvent};
use crate::targets::{self, DamageEvent, TargetKind};
use crate::weapons::WeaponController;

/// Everything observable that happened during one tick.
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// Aircraft model matrix for the renderer.
    pub aircraft_pose: TransformRaw,
    pub fired: Option<ProjectileHandle>,
    pub damage: Vec<DamageEvent>,
    pub destroyed: Vec<Entity>,
    pub surface_poses: Vec<(NodeHandle, Quat)>,
    /// Round attach/detach changes since the previous report.
    pub visual_events: Vec<VisualEvent>,
}

pub struct SimContext {
    pub flight: FlightModel,
    pub weapons: WeaponController,
    pub projectiles: ProjectileStore,
    pub targets: World,
    rig: Option<ControlSurfaceRig>,
    rounds_filter: CollisionFilter,
    muzzle_offset: f32,
}

impl SimContext {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            flight: FlightModel::new(config.flight.clone()),
            weapons: WeaponController::new(config.weapons.clone(), config.min_fire_interval),
            projectiles: ProjectileStore::new(config.projectile_capacity),
            targets: World::new(),
            rig: None,
            rounds_filter: CollisionFilter::player_projectile(),
            muzzle_offset: config.muzzle_offset,
        }
    }

    /// Attach the control-surface rig of the loaded visual model.
    pub fn set_control_surface_rig(&mut self, rig: ControlSurfaceRig) {
        self.rig = Some(rig);
    }

    pub fn spawn_target(&mut self, kind: TargetKind, position: Vec3, radius: f32, health: f32) -> Entity {
        targets::spawn_target(&mut self.targets, kind, position, radius, health)
    }

    /// Move a target to the pose its own controller produced this frame.
    pub fn move_target(&mut self, target: Entity, position: Vec3) {
        if let Ok(mut transform) = self.targets.get::<&mut engine_core::Transform>(target) {
            transform.position = position;
        }
    }

    /// Advance one frame in fixed order: flight, weapon, rounds, hits.
    /// Firing always sees this frame's aircraft pose. The report carries the
    /// store's queued visual events, so the queue is empty after every tick.
    pub fn tick(
        &mut self,
        controls: &impl ControlSource,
        now: f64,
        dt: f32,
    ) -> Result<FrameReport, SimError> {
        self.flight.advance(controls, dt)?;

        self.weapons.handle_input(controls);
        let (muzzle, direction) = self.flight.muzzle(self.muzzle_offset);
        let fired = match self.weapons.update(now, muzzle, direction, &mut self.projectiles) {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("Shot dropped: {}", e);
                None
            }
        };

        self.projectiles.advance(dt);

        let damage = targets::sweep_targets(&self.targets, &mut self.projectiles, &self.rounds_filter);
        let destroyed = targets::apply_damage(&mut self.targets, &damage);

        let surface_poses = match &self.rig {
            Some(rig) => rig.poses(&self.flight.control_deflections()),
            None => Vec::new(),
        };

        Ok(FrameReport {
            aircraft_pose: TransformRaw::from(self.flight.pose()),
            fired,
            damage,
            destroyed,
            surface_poses,
            visual_events: self.projectiles.drain_visual_events(),
        })
    }

    /// Level (re)entry: spawn pose, no rounds in flight, trigger released.
    pub fn reset(&mut self) {
        self.flight.reset_state();
        self.weapons.reset();
        self.projectiles.remove_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use input::{ControlSnapshot, FlightControl};

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn fired_round_starts_at_current_muzzle() {
        let config = SimConfig::default();
        let mut sim = SimContext::new(&config);
        let controls = ControlSnapshot::new()
            .with(FlightControl::Fire)
            .with(FlightControl::YawLeft);
        let report = sim.tick(&controls, 0.0, DT).unwrap();
        let handle = report.fired.unwrap();

        let (muzzle, direction) = sim.flight.muzzle(config.muzzle_offset);
        let round = sim.projectiles.get(handle).unwrap();
        // Round was spawned from this frame's pose, then advanced by dt.
        assert!((round.direction - direction).length() < 1e-5);
        let spawned_at = round.position - round.velocity * DT;
        assert!((spawned_at - muzzle).length() < 1e-3);
    }

    #[test]
    fn target_in_line_of_fire_takes_damage() {
        let config = SimConfig::default();
        let mut sim = SimContext::new(&config);
        let ahead = config.flight.spawn_position + Vec3::new(0.0, 0.0, -60.0);
        let target = sim.spawn_target(TargetKind::Aircraft, ahead, 4.0, 1000.0);
        let fire = ControlSnapshot::new().with(FlightControl::Fire);

        let mut hits = 0;
        for frame in 0..30 {
            let report = sim.tick(&fire, frame as f64 * DT as f64, DT).unwrap();
            hits += report.damage.iter().filter(|d| d.target == target).count();
        }
        assert!(hits >= 1);
    }

    #[test]
    fn moved_target_is_swept_at_new_position() {
        let config = SimConfig::default();
        let mut sim = SimContext::new(&config);
        let aside = config.flight.spawn_position + Vec3::new(200.0, 0.0, 0.0);
        let target = sim.spawn_target(TargetKind::Aircraft, aside, 4.0, 1000.0);
        let fire = ControlSnapshot::new().with(FlightControl::Fire);

        let report = sim.tick(&fire, 0.0, DT).unwrap();
        assert!(report.damage.is_empty());

        let round = sim.projectiles.get(report.fired.unwrap()).unwrap();
        let next = round.position + round.velocity * DT;
        sim.move_target(target, next);
        let position = sim.targets.get::<&engine_core::Transform>(target).unwrap().position;
        assert_eq!(position, next);

        let report = sim.tick(&ControlSnapshot::new(), DT as f64, DT).unwrap();
        assert!(report.damage.iter().any(|d| d.target == target));
    }

    #[test]
    fn reset_clears_rounds() {
        let mut sim = SimContext::new(&SimConfig::default());
        sim.tick(&ControlSnapshot::new().with(FlightControl::Fire), 0.0, DT).unwrap();
        assert_eq!(sim.projectiles.count(), 1);
        sim.reset();
        assert!(sim.projectiles.is_empty());
        assert_eq!(sim.weapons.last_fire_time(), None);
    }

    #[test]
    fn rig_poses_are_reported() {
        let mut sim = SimContext::new(&SimConfig::default());
        sim.set_control_surface_rig(ControlSurfaceRig::resolve([("Rudder", NodeHandle(3))]));
        let report = sim
            .tick(&ControlSnapshot::new().with(FlightControl::YawRight), 0.0, DT)
            .unwrap();
        assert_eq!(report.surface_poses.len(), 1);
        assert_eq!(report.surface_poses[0].0, NodeHandle(3));
    }

    #[test]
    fn report_carries_aircraft_pose() {
        let mut sim = SimContext::new(&SimConfig::default());
        let report = sim.tick(&ControlSnapshot::new(), 0.0, DT).unwrap();
        let position = sim.flight.state().position;
        assert_eq!(report.aircraft_pose.model[3][0], position.x);
        assert_eq!(report.aircraft_pose.model[3][1], position.y);
        assert_eq!(report.aircraft_pose.model[3][2], position.z);
    }

    #[test]
    fn contexts_are_independent() {
        let config = SimConfig::default();
        let mut a = SimContext::new(&config);
        let b = SimContext::new(&config);
        let climb = ControlSnapshot::new()
            .with(FlightControl::ThrottleUp)
            .with(FlightControl::Fire);
        for frame in 0..10 {
            a.tick(&climb, frame as f64 * DT as f64, DT).unwrap();
        }
        assert!(a.flight.state().throttle > 0.0);
        assert_eq!(b.flight.state().throttle, 0.0);
        assert!(b.projectiles.is_empty());
    }
}
