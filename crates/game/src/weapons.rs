//! Weapon definitions and the rate-limited trigger.

use glam::Vec3;
use input::{ControlSource, FlightControl};
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::projectiles::{ProjectileHandle, ProjectileSpec, ProjectileStore};

/// Immutable description of a weapon and the rounds it fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDefinition {
    pub name: String,
    /// Nominal shots per second. Informational only: the controller's
    /// fixed minimum interval decides cadence for every weapon.
    pub fire_rate: f32,
    pub damage: u32,
    pub projectile_speed: f32,
    /// Seconds a round lives before expiring.
    pub projectile_lifetime: f32,
    pub hit_radius: f32,
    pub color: [f32; 3],
    pub size: f32,
}

impl WeaponDefinition {
    pub fn default_table() -> Vec<WeaponDefinition> {
        vec![
            WeaponDefinition {
                name: "Machine Gun".to_string(),
                fire_rate: 10.0,
                damage: 10,
                projectile_speed: 350.0,
                projectile_lifetime: 2.0,
                hit_radius: 1.0,
                color: [1.0, 0.9, 0.2],
                size: 0.3,
            },
            WeaponDefinition {
                name: "Rotary Cannon".to_string(),
                fire_rate: 30.0,
                damage: 6,
                projectile_speed: 400.0,
                projectile_lifetime: 1.5,
                hit_radius: 0.8,
                color: [1.0, 0.4, 0.1],
                size: 0.25,
            },
        ]
    }

    pub fn projectile_spec(&self) -> ProjectileSpec {
        ProjectileSpec {
            speed: self.projectile_speed,
            damage: self.damage,
            hit_radius: self.hit_radius,
            lifetime: self.projectile_lifetime,
            color: self.color,
            size: self.size,
        }
    }
}

/// Trigger state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerState {
    #[default]
    Idle,
    Held,
}

/// Decides once per frame whether the selected weapon may fire.
#[derive(Debug, Clone)]
pub struct WeaponController {
    weapons: Vec<WeaponDefinition>,
    selected: usize,
    trigger: TriggerState,
    last_fire_time: Option<f64>,
    min_fire_interval: f64,
}

impl WeaponController {
    /// An empty table falls back to the default weapons.
    pub fn new(weapons: Vec<WeaponDefinition>, min_fire_interval: f64) -> Self {
        let weapons = if weapons.is_empty() {
            WeaponDefinition::default_table()
        } else {
            weapons
        };
        Self {
            weapons,
            selected: 0,
            trigger: TriggerState::Idle,
            last_fire_time: None,
            min_fire_interval,
        }
    }

    pub fn handle_input(&mut self, controls: &impl ControlSource) {
        self.trigger = if controls.is_pressed(FlightControl::Fire) {
            TriggerState::Held
        } else {
            TriggerState::Idle
        };
    }

    /// Fire at most one round if the trigger is held and the minimum
    /// interval has passed since the last shot. Missed time is never made
    /// up with extra rounds.
    pub fn update(
        &mut self,
        now: f64,
        muzzle: Vec3,
        direction: Vec3,
        store: &mut ProjectileStore,
    ) -> Result<Option<ProjectileHandle>, SimError> {
        if self.trigger != TriggerState::Held || !self.ready(now) {
            return Ok(None);
        }
        let spec = self.current_weapon().projectile_spec();
        let handle = store.spawn(muzzle, direction, &spec)?;
        self.last_fire_time = Some(now);
        Ok(Some(handle))
    }

    fn ready(&self, now: f64) -> bool {
        match self.last_fire_time {
            Some(last) => now - last >= self.min_fire_interval,
            None => true,
        }
    }

    pub fn select_weapon(&mut self, index: usize) -> Result<(), SimError> {
        if index >= self.weapons.len() {
            return Err(SimError::UnknownWeapon(index));
        }
        self.selected = index;
        Ok(())
    }

    pub fn current_weapon(&self) -> &WeaponDefinition {
        &self.weapons[self.selected]
    }

    pub fn current_weapon_name(&self) -> &str {
        &self.current_weapon().name
    }

    pub fn trigger(&self) -> TriggerState {
        self.trigger
    }

    pub fn last_fire_time(&self) -> Option<f64> {
        self.last_fire_time
    }

    pub fn min_fire_interval(&self) -> f64 {
        self.min_fire_interval
    }

    /// Forget the last shot, e.g. on level entry.
    pub fn reset(&mut self) {
        self.trigger = TriggerState::Idle;
        self.last_fire_time = None;
    }
}
