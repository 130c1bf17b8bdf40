//! Collision layers and sphere overlap tests.

use glam::Vec3;

/// Collision layers for different entity types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionLayer {
    /// Player aircraft
    Player = 1 << 0,
    /// Hostile aircraft
    EnemyAircraft = 1 << 1,
    /// Ground vehicles
    EnemyGround = 1 << 2,
    /// Player projectiles
    PlayerProjectile = 1 << 3,
}

/// Membership plus the set of layers an entity may strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionFilter {
    pub membership: u32,
    pub filter: u32,
}

impl CollisionFilter {
    /// Filter for targets hostile to the player.
    pub fn enemy_aircraft() -> Self {
        Self {
            membership: CollisionLayer::EnemyAircraft as u32,
            filter: CollisionLayer::PlayerProjectile as u32 | CollisionLayer::Player as u32,
        }
    }

    pub fn enemy_ground() -> Self {
        Self {
            membership: CollisionLayer::EnemyGround as u32,
            filter: CollisionLayer::PlayerProjectile as u32,
        }
    }

    /// Player rounds never strike the player.
    pub fn player_projectile() -> Self {
        Self {
            membership: CollisionLayer::PlayerProjectile as u32,
            filter: CollisionLayer::EnemyAircraft as u32 | CollisionLayer::EnemyGround as u32,
        }
    }

    /// Whether two filters allow a contact in both directions.
    pub fn interacts_with(&self, other: &CollisionFilter) -> bool {
        self.filter & other.membership != 0 && other.filter & self.membership != 0
    }
}

/// Touching spheres count as overlapping. Compares squared distances so no
/// square root is taken.
pub fn spheres_overlap(a: Vec3, radius_a: f32, b: Vec3, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance_squared(b) <= reach * reach
}
