//! Bounded projectile store: spawning, ballistic integration, expiry,
//! eviction, and hit sweeps.
//!
//! Rounds are kept in spawn order. When the store is full the oldest round
//! is dropped to admit the new one; the caller is not told.

use std::collections::VecDeque;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use physics::spheres_overlap;

use crate::collision_report::CollisionReport;
use crate::error::SimError;

/// Opaque identity of a live round, shared with the renderer.
/// Handles increase monotonically in spawn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileHandle(u64);

/// Per-round parameters taken from the firing weapon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpec {
    pub speed: f32,
    pub damage: u32,
    pub hit_radius: f32,
    /// Seconds.
    pub lifetime: f32,
    pub color: [f32; 3],
    pub size: f32,
}

/// A live round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub handle: ProjectileHandle,
    pub position: Vec3,
    /// Unit length, fixed at spawn.
    pub direction: Vec3,
    pub speed: f32,
    /// `direction * speed`, fixed at spawn.
    pub velocity: Vec3,
    pub damage: u32,
    pub hit_radius: f32,
    /// Seconds since spawn.
    pub age: f32,
    pub lifetime: f32,
    pub active: bool,
    pub color: [f32; 3],
    pub size: f32,
}

/// Per-instance data for drawing rounds.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ProjectileInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 3],
    pub _pad: f32,
}

impl From<&Projectile> for ProjectileInstance {
    fn from(p: &Projectile) -> Self {
        Self {
            position: p.position.to_array(),
            size: p.size,
            color: p.color,
            _pad: 0.0,
        }
    }
}

/// Why a round left the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisposeReason {
    Expired,
    Hit,
    Evicted,
    Cleared,
}

/// Scene-graph changes for the renderer to apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisualEvent {
    Attach {
        handle: ProjectileHandle,
        instance: ProjectileInstance,
    },
    Detach {
        handle: ProjectileHandle,
        reason: DisposeReason,
    },
}

pub struct ProjectileStore {
    projectiles: VecDeque<Projectile>,
    capacity: usize,
    next_handle: u64,
    visual_events: Vec<VisualEvent>,
    evictions: u64,
}

impl ProjectileStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            projectiles: VecDeque::with_capacity(capacity),
            capacity,
            next_handle: 0,
            visual_events: Vec::new(),
            evictions: 0,
        }
    }

    /// Spawn a round. Evicts the oldest round first if the store is full.
    pub fn spawn(
        &mut self,
        position: Vec3,
        direction: Vec3,
        spec: &ProjectileSpec,
    ) -> Result<ProjectileHandle, SimError> {
        let Some(direction) = direction.try_normalize() else {
            log::warn!("Rejected projectile spawn with direction {:?}", direction);
            return Err(SimError::DegenerateDirection);
        };

        while self.projectiles.len() >= self.capacity {
            if let Some(oldest) = self.projectiles.pop_front() {
                self.evictions += 1;
                log::debug!(
                    "Projectile store full ({}), evicting {:?} at age {:.2}s",
                    self.capacity,
                    oldest.handle,
                    oldest.age
                );
                self.dispose(oldest, DisposeReason::Evicted);
            }
        }

        let handle = ProjectileHandle(self.next_handle);
        self.next_handle += 1;
        let projectile = Projectile {
            handle,
            position,
            direction,
            speed: spec.speed,
            velocity: direction * spec.speed,
            damage: spec.damage,
            hit_radius: spec.hit_radius,
            age: 0.0,
            lifetime: spec.lifetime,
            active: true,
            color: spec.color,
            size: spec.size,
        };
        self.visual_events.push(VisualEvent::Attach {
            handle,
            instance: ProjectileInstance::from(&projectile),
        });
        self.projectiles.push_back(projectile);
        Ok(handle)
    }

    /// Age every round, drop the expired ones, and move the rest.
    pub fn advance(&mut self, dt: f32) {
        for i in (0..self.projectiles.len()).rev() {
            let p = &mut self.projectiles[i];
            p.age += dt;
            if p.age >= p.lifetime {
                if let Some(expired) = self.projectiles.remove(i) {
                    log::debug!("Projectile {:?} expired", expired.handle);
                    self.dispose(expired, DisposeReason::Expired);
                }
            } else {
                p.position += p.velocity * dt;
            }
        }
    }

    /// Remove and report every round touching the target sphere. A round
    /// hits at most once. Reported newest first.
    pub fn test_collisions(&mut self, target_position: Vec3, target_radius: f32) -> CollisionReport {
        let mut report = CollisionReport::default();
        for i in (0..self.projectiles.len()).rev() {
            let p = &self.projectiles[i];
            if !p.active || !spheres_overlap(p.position, p.hit_radius, target_position, target_radius) {
                continue;
            }
            if let Some(mut hit) = self.projectiles.remove(i) {
                self.dispose(hit, DisposeReason::Hit);
                hit.active = false;
                report.push(hit);
            }
        }
        report
    }

    /// Dispose every round, e.g. on scene teardown.
    pub fn remove_all(&mut self) {
        while let Some(p) = self.projectiles.pop_front() {
            self.dispose(p, DisposeReason::Cleared);
        }
    }

    fn dispose(&mut self, projectile: Projectile, reason: DisposeReason) {
        self.visual_events.push(VisualEvent::Detach {
            handle: projectile.handle,
            reason,
        });
    }

    pub fn count(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Rounds dropped to make room since creation.
    pub fn eviction_count(&self) -> u64 {
        self.evictions
    }

    /// Live rounds, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    pub fn get(&self, handle: ProjectileHandle) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.handle == handle)
    }

    pub fn instances(&self) -> Vec<ProjectileInstance> {
        self.projectiles.iter().map(ProjectileInstance::from).collect()
    }

    /// Take the attach/detach events queued since the last drain.
    pub fn drain_visual_events(&mut self) -> Vec<VisualEvent> {
        std::mem::take(&mut self.visual_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ProjectileSpec {
        ProjectileSpec {
            speed: 350.0,
            damage: 10,
            hit_radius: 1.0,
            lifetime: 2.0,
            color: [1.0, 1.0, 0.0],
            size: 0.3,
        }
    }

    #[test]
    fn advance_moves_along_direction() {
        let mut store = ProjectileStore::new(20);
        let handle = store.spawn(Vec3::ZERO, Vec3::Z, &spec()).unwrap();
        store.advance(0.1);
        let p = store.get(handle).unwrap();
        assert!((p.position - Vec3::new(0.0, 0.0, 35.0)).length() < 1e-3);
    }

    #[test]
    fn direction_is_normalized_at_spawn() {
        let mut store = ProjectileStore::new(20);
        let handle = store.spawn(Vec3::ZERO, Vec3::new(0.0, 3.0, 4.0), &spec()).unwrap();
        let p = store.get(handle).unwrap();
        assert!((p.direction.length() - 1.0).abs() < 1e-6);
        assert!((p.velocity.length() - 350.0).abs() < 1e-3);
    }

    #[test]
    fn capacity_is_at_least_one() {
        assert_eq!(ProjectileStore::new(20).capacity(), 20);
        let mut store = ProjectileStore::new(0);
        assert_eq!(store.capacity(), 1);
        store.spawn(Vec3::ZERO, Vec3::Z, &spec()).unwrap();
        store.spawn(Vec3::ZERO, Vec3::Z, &spec()).unwrap();
        assert_eq!(store.count(), 1);
        assert_eq!(store.eviction_count(), 1);
    }

    #[test]
    fn zero_direction_is_rejected() {
        let mut store = ProjectileStore::new(20);
        assert_eq!(
            store.spawn(Vec3::ZERO, Vec3::ZERO, &spec()),
            Err(SimError::DegenerateDirection)
        );
        assert_eq!(store.count(), 0);
        assert!(store.drain_visual_events().is_empty());
    }

    #[test]
    fn overflow_evicts_oldest_first() {
        let mut store = ProjectileStore::new(20);
        let handles: Vec<_> = (0..25)
            .map(|_| store.spawn(Vec3::ZERO, Vec3::NEG_Z, &spec()).unwrap())
            .collect();
        assert_eq!(store.count(), 20);
        assert_eq!(store.eviction_count(), 5);
        let kept: Vec<_> = store.iter().map(|p| p.handle).collect();
        assert_eq!(kept, handles[5..].to_vec());

        let evicted: Vec<_> = store
            .drain_visual_events()
            .into_iter()
            .filter_map(|e| match e {
                VisualEvent::Detach {
                    handle,
                    reason: DisposeReason::Evicted,
                } => Some(handle),
                _ => None,
            })
            .collect();
        assert_eq!(evicted, handles[..5].to_vec());
    }

    #[test]
    fn round_expires_once_age_reaches_lifetime() {
        let mut store = ProjectileStore::new(20);
        let mut s = spec();
        s.lifetime = 1.0;
        store.spawn(Vec3::ZERO, Vec3::X, &s).unwrap();
        store.spawn(Vec3::ZERO, Vec3::X, &spec()).unwrap();
        for _ in 0..3 {
            store.advance(0.25);
        }
        assert_eq!(store.count(), 2);
        store.advance(0.25);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn expiry_mid_sequence_does_not_skip_neighbours() {
        let mut store = ProjectileStore::new(20);
        let mut short = spec();
        short.lifetime = 0.1;
        let a = store.spawn(Vec3::ZERO, Vec3::X, &spec()).unwrap();
        store.spawn(Vec3::ZERO, Vec3::X, &short).unwrap();
        let c = store.spawn(Vec3::ZERO, Vec3::X, &spec()).unwrap();
        store.advance(0.1);
        assert_eq!(store.count(), 2);
        for h in [a, c] {
            let p = store.get(h).unwrap();
            assert!((p.age - 0.1).abs() < 1e-6);
            assert!((p.position.x - 35.0).abs() < 1e-3);
        }
    }

    #[test]
    fn hit_boundary_is_inclusive() {
        // Round radius 1 + target radius 2 = reach 3.
        let mut store = ProjectileStore::new(20);
        store.spawn(Vec3::new(3.0, 0.0, 0.0), Vec3::X, &spec()).unwrap();
        assert_eq!(store.test_collisions(Vec3::ZERO, 2.0).len(), 1);

        store.spawn(Vec3::new(3.01, 0.0, 0.0), Vec3::X, &spec()).unwrap();
        assert!(store.test_collisions(Vec3::ZERO, 2.0).is_empty());
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn hit_consumes_round() {
        let mut store = ProjectileStore::new(20);
        let handle = store.spawn(Vec3::ZERO, Vec3::X, &spec()).unwrap();
        let report = store.test_collisions(Vec3::ZERO, 1.0);
        assert_eq!(report.len(), 1);
        let hit = report.iter().next().unwrap();
        assert_eq!(hit.handle, handle);
        assert!(!hit.active);
        assert!(store.get(handle).is_none());
        assert!(store.test_collisions(Vec3::ZERO, 1.0).is_empty());
    }

    #[test]
    fn hits_reported_newest_first() {
        let mut store = ProjectileStore::new(20);
        let a = store.spawn(Vec3::ZERO, Vec3::X, &spec()).unwrap();
        let b = store.spawn(Vec3::ZERO, Vec3::X, &spec()).unwrap();
        let far = store.spawn(Vec3::new(100.0, 0.0, 0.0), Vec3::X, &spec()).unwrap();
        let report = store.test_collisions(Vec3::ZERO, 1.0);
        let order: Vec<_> = report.iter().map(|p| p.handle).collect();
        assert_eq!(order, vec![b, a]);
        assert!(store.get(far).is_some());
    }

    #[test]
    fn remove_all_detaches_every_round() {
        let mut store = ProjectileStore::new(20);
        for _ in 0..4 {
            store.spawn(Vec3::ZERO, Vec3::Y, &spec()).unwrap();
        }
        store.drain_visual_events();
        store.remove_all();
        assert_eq!(store.count(), 0);
        let events = store.drain_visual_events();
        assert_eq!(events.len(), 4);
        assert!(events.iter().all(|e| matches!(
            e,
            VisualEvent::Detach {
                reason: DisposeReason::Cleared,
                ..
            }
        )));
    }

    #[test]
    fn instances_follow_live_rounds() {
        let mut store = ProjectileStore::new(20);
        store.spawn(Vec3::new(1.0, 2.0, 3.0), Vec3::Y, &spec()).unwrap();
        let instances = store.instances();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(instances[0].size, 0.3);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&instances).len(), 32);
    }
}
