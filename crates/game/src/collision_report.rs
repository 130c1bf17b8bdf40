//! Rounds that struck one target during a sweep.

use glam::Vec3;

use crate::projectiles::Projectile;

#[derive(Debug, Clone, Default)]
pub struct CollisionReport {
    hits: Vec<Projectile>,
}

impl CollisionReport {
    pub(crate) fn push(&mut self, projectile: Projectile) {
        self.hits.push(projectile);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.hits.iter()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// `(damage, position)` for each hit, for the damage system.
    pub fn damage_events(&self) -> impl Iterator<Item = (u32, Vec3)> + '_ {
        self.hits.iter().map(|p| (p.damage, p.position))
    }

    pub fn total_damage(&self) -> u32 {
        self.hits.iter().map(|p| p.damage).sum()
    }
}

impl IntoIterator for CollisionReport {
    type Item = Projectile;
    type IntoIter = std::vec::IntoIter<Projectile>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projectiles::{ProjectileSpec, ProjectileStore};

    #[test]
    fn damage_tuples_carry_position() {
        let spec = ProjectileSpec {
            speed: 100.0,
            damage: 7,
            hit_radius: 0.5,
            lifetime: 1.0,
            color: [1.0; 3],
            size: 0.1,
        };
        let mut store = ProjectileStore::new(4);
        store.spawn(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, &spec).unwrap();
        store.spawn(Vec3::new(0.0, -1.0, 0.0), Vec3::Z, &spec).unwrap();
        let report = store.test_collisions(Vec3::ZERO, 1.0);
        assert_eq!(report.total_damage(), 14);
        let events: Vec<_> = report.damage_events().collect();
        assert_eq!(events, vec![(7, Vec3::new(0.0, -1.0, 0.0)), (7, Vec3::new(0.0, 1.0, 0.0))]);
    }
}
