//! Target entities and damage application.

use engine_core::{Health, Transform};
use glam::Vec3;
use hecs::{Entity, World};
use physics::CollisionFilter;

use crate::projectiles::ProjectileStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Aircraft,
    Tank,
}

impl TargetKind {
    fn collision_filter(self) -> CollisionFilter {
        match self {
            TargetKind::Aircraft => CollisionFilter::enemy_aircraft(),
            TargetKind::Tank => CollisionFilter::enemy_ground(),
        }
    }
}

/// Tag plus hit volume for anything player rounds can strike.
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub kind: TargetKind,
    pub radius: f32,
    pub filter: CollisionFilter,
}

/// One round striking one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub target: Entity,
    pub damage: u32,
    pub position: Vec3,
}

pub fn spawn_target(
    world: &mut World,
    kind: TargetKind,
    position: Vec3,
    radius: f32,
    health: f32,
) -> Entity {
    world.spawn((
        Target {
            kind,
            radius,
            filter: kind.collision_filter(),
        },
        Transform::from_position(position),
        Health::new(health),
    ))
}

/// Sweep the store against every target the rounds may strike.
pub fn sweep_targets(
    world: &World,
    store: &mut ProjectileStore,
    rounds: &CollisionFilter,
) -> Vec<DamageEvent> {
    let mut events = Vec::new();
    for (entity, (target, transform)) in world.query::<(&Target, &Transform)>().iter() {
        if !rounds.interacts_with(&target.filter) {
            continue;
        }
        let report = store.test_collisions(transform.position, target.radius);
        events.extend(report.damage_events().map(|(damage, position)| DamageEvent {
            target: entity,
            damage,
            position,
        }));
    }
    events
}

/// Apply damage events and despawn targets that died this frame.
/// Returns the destroyed entities.
pub fn apply_damage(world: &mut World, events: &[DamageEvent]) -> Vec<Entity> {
    let mut destroyed = Vec::new();
    for event in events {
        if let Ok(mut health) = world.get::<&mut Health>(event.target) {
            if health.is_dead() {
                continue;
            }
            health.take_damage(event.damage as f32);
            log::debug!(
                "{:?} took {} damage ({:.0} left)",
                event.target,
                event.damage,
                health.current
            );
            if health.is_dead() {
                destroyed.push(event.target);
            }
        }
    }
    for &entity in &destroyed {
        if let Ok(target) = world.get::<&Target>(entity) {
            log::info!("{:?} target destroyed", target.kind);
        }
        world.despawn(entity).ok();
    }
    destroyed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projectiles::ProjectileSpec;

    fn spec(damage: u32) -> ProjectileSpec {
        ProjectileSpec {
            speed: 100.0,
            damage,
            hit_radius: 1.0,
            lifetime: 5.0,
            color: [1.0; 3],
            size: 0.2,
        }
    }

    #[test]
    fn sweep_pairs_hits_with_targets() {
        let mut world = World::new();
        let near = spawn_target(&mut world, TargetKind::Aircraft, Vec3::ZERO, 2.0, 50.0);
        let far = spawn_target(&mut world, TargetKind::Tank, Vec3::new(500.0, 0.0, 0.0), 2.0, 50.0);
        let mut store = ProjectileStore::new(8);
        store.spawn(Vec3::new(0.0, 0.0, 1.0), Vec3::Z, &spec(10)).unwrap();
        store.spawn(Vec3::new(500.0, 0.0, 0.0), Vec3::Z, &spec(5)).unwrap();

        let events = sweep_targets(&world, &mut store, &CollisionFilter::player_projectile());
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| e.target == near && e.damage == 10));
        assert!(events.iter().any(|e| e.target == far && e.damage == 5));
        assert!(store.is_empty());
    }

    #[test]
    fn filtered_targets_are_not_swept() {
        let mut world = World::new();
        spawn_target(&mut world, TargetKind::Tank, Vec3::ZERO, 2.0, 50.0);
        let mut store = ProjectileStore::new(8);
        store.spawn(Vec3::ZERO, Vec3::Z, &spec(10)).unwrap();
        let aircraft_only = CollisionFilter {
            membership: physics::CollisionLayer::PlayerProjectile as u32,
            filter: physics::CollisionLayer::EnemyAircraft as u32,
        };
        assert!(sweep_targets(&world, &mut store, &aircraft_only).is_empty());
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn lethal_damage_despawns_once() {
        let mut world = World::new();
        let target = spawn_target(&mut world, TargetKind::Aircraft, Vec3::ZERO, 2.0, 15.0);
        let hit = DamageEvent {
            target,
            damage: 10,
            position: Vec3::ZERO,
        };
        assert!(apply_damage(&mut world, &[hit]).is_empty());
        assert_eq!(world.get::<&Health>(target).unwrap().current, 5.0);
        let destroyed = apply_damage(&mut world, &[hit, hit]);
        assert_eq!(destroyed, vec![target]);
        assert!(!world.contains(target));
    }
}
