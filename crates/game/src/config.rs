//! Simulation tuning. Loaded from skyrange.ron at startup.

use std::f32::consts::{FRAC_PI_4, FRAC_PI_6};
use std::path::Path;

use anyhow::Context;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::weapons::WeaponDefinition;

/// Number of selectable aircraft models.
pub const MODEL_COUNT: usize = 5;

/// How pitch and roll ease toward their targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Smoothing {
    /// Fixed blend per frame, independent of delta time. Matches the arcade
    /// feel the tuning values were authored against; response speed scales
    /// with frame rate.
    PerFrame,
    /// Frame-rate independent `1 - exp(-rate * dt)` blend. Changes the feel
    /// at any frame rate other than the one the tuning was authored at.
    DeltaScaled { rate: f32 },
}

impl Smoothing {
    /// Fraction of the remaining gap closed this frame.
    pub fn blend(&self, per_frame: f32, dt: f32) -> f32 {
        match *self {
            Smoothing::PerFrame => per_frame,
            Smoothing::DeltaScaled { rate } => 1.0 - (-rate * dt).exp(),
        }
    }
}

/// Arcade flight tuning. Rotation and throttle values are per frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightTuning {
    /// Per-frame blend toward target pitch/roll.
    #[serde(default = "default_blend")]
    pub blend: f32,
    #[serde(default = "default_smoothing")]
    pub smoothing: Smoothing,
    /// Target pitch while climbing or diving (radians).
    #[serde(default = "default_pitch_target")]
    pub pitch_target: f32,
    /// Target roll for a plain turn (radians).
    #[serde(default = "default_roll_target")]
    pub roll_target: f32,
    /// Target roll in a banked (climbing) turn.
    #[serde(default = "default_banked_roll")]
    pub banked_roll: f32,
    /// Yaw added per frame while turning (radians).
    #[serde(default = "default_yaw_rate")]
    pub yaw_rate: f32,
    #[serde(default = "default_banked_yaw_multiplier")]
    pub banked_yaw_multiplier: f32,
    /// Throttle change per frame.
    #[serde(default = "default_throttle_step")]
    pub throttle_step: f32,
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f32,
    /// Throttle above which the lift term applies.
    #[serde(default = "default_lift_threshold")]
    pub lift_threshold: f32,
    /// Climb rate per unit of throttle above the threshold (units/s).
    #[serde(default = "default_lift_factor")]
    pub lift_factor: f32,
    /// Constant sink rate (units/s).
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    #[serde(default = "default_ground_height")]
    pub ground_height: f32,
    #[serde(default = "default_spawn_position")]
    pub spawn_position: Vec3,
    /// Maximum speed per aircraft model, indexed by model id - 1.
    #[serde(default = "default_model_speeds")]
    pub model_speeds: [f32; MODEL_COUNT],
}

fn default_blend() -> f32 {
    0.1
}
fn default_smoothing() -> Smoothing {
    Smoothing::PerFrame
}
fn default_pitch_target() -> f32 {
    FRAC_PI_6
}
fn default_roll_target() -> f32 {
    FRAC_PI_4
}
fn default_banked_roll() -> f32 {
    80f32.to_radians()
}
fn default_yaw_rate() -> f32 {
    0.02
}
fn default_banked_yaw_multiplier() -> f32 {
    1.8
}
fn default_throttle_step() -> f32 {
    0.01
}
fn default_speed_multiplier() -> f32 {
    1.0
}
fn default_lift_threshold() -> f32 {
    0.5
}
fn default_lift_factor() -> f32 {
    40.0
}
fn default_gravity() -> f32 {
    9.8
}
fn default_ground_height() -> f32 {
    5.0
}
fn default_spawn_position() -> Vec3 {
    Vec3::new(0.0, 100.0, 0.0)
}
fn default_model_speeds() -> [f32; MODEL_COUNT] {
    [80.0, 100.0, 120.0, 140.0, 160.0]
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self {
            blend: default_blend(),
            smoothing: default_smoothing(),
            pitch_target: default_pitch_target(),
            roll_target: default_roll_target(),
            banked_roll: default_banked_roll(),
            yaw_rate: default_yaw_rate(),
            banked_yaw_multiplier: default_banked_yaw_multiplier(),
            throttle_step: default_throttle_step(),
            speed_multiplier: default_speed_multiplier(),
            lift_threshold: default_lift_threshold(),
            lift_factor: default_lift_factor(),
            gravity: default_gravity(),
            ground_height: default_ground_height(),
            spawn_position: default_spawn_position(),
            model_speeds: default_model_speeds(),
        }
    }
}

/// Top-level simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub flight: FlightTuning,
    #[serde(default = "default_weapons")]
    pub weapons: Vec<WeaponDefinition>,
    /// Seconds between shots for every weapon. The per-weapon fire rate is
    /// not consulted.
    #[serde(default = "default_min_fire_interval")]
    pub min_fire_interval: f64,
    /// Maximum live projectiles.
    #[serde(default = "default_projectile_capacity")]
    pub projectile_capacity: usize,
    /// Distance ahead of the aircraft origin that rounds spawn at.
    #[serde(default = "default_muzzle_offset")]
    pub muzzle_offset: f32,
}

fn default_weapons() -> Vec<WeaponDefinition> {
    WeaponDefinition::default_table()
}
fn default_min_fire_interval() -> f64 {
    0.2
}
fn default_projectile_capacity() -> usize {
    20
}
fn default_muzzle_offset() -> f32 {
    3.0
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            flight: FlightTuning::default(),
            weapons: default_weapons(),
            min_fire_interval: default_min_fire_interval(),
            projectile_capacity: default_projectile_capacity(),
            muzzle_offset: default_muzzle_offset(),
        }
    }
}

impl SimConfig {
    /// Load config from `skyrange.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(c) => {
                log::info!("Loaded simulation config from {:?}", path);
                c
            }
            Err(e) => {
                log::warn!("Invalid config at {:?}: {:#}, using defaults", path, e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_ron(&data)
    }

    pub fn from_ron(data: &str) -> anyhow::Result<Self> {
        let config: SimConfig = ron::from_str(data).context("parsing simulation config")?;
        Ok(config.sanitized())
    }

    /// Save current config to `skyrange.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(&path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }

    /// Replace values the simulation cannot run with.
    fn sanitized(mut self) -> Self {
        if self.weapons.is_empty() {
            log::warn!("Config defines no weapons, using the default table");
            self.weapons = default_weapons();
        }
        if self.projectile_capacity == 0 {
            log::warn!("Projectile capacity of 0 raised to 1");
            self.projectile_capacity = 1;
        }
        if !(self.min_fire_interval.is_finite() && self.min_fire_interval >= 0.0) {
            self.min_fire_interval = default_min_fire_interval();
        }
        self
    }
}

fn config_path() -> std::path::PathBuf {
    std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from(".")).join("skyrange.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SimConfig::from_ron("()").unwrap();
        assert_eq!(config.projectile_capacity, 20);
        assert_eq!(config.weapons.len(), 2);
        assert_eq!(config.flight.smoothing, Smoothing::PerFrame);
        assert!((config.min_fire_interval - 0.2).abs() < 1e-12);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = SimConfig::from_ron(
            "(projectile_capacity: 8, flight: (blend: 0.25, smoothing: DeltaScaled(rate: 6.0)))",
        )
        .unwrap();
        assert_eq!(config.projectile_capacity, 8);
        assert_eq!(config.flight.blend, 0.25);
        assert_eq!(config.flight.smoothing, Smoothing::DeltaScaled { rate: 6.0 });
        assert_eq!(config.flight.model_speeds, default_model_speeds());
    }

    #[test]
    fn unusable_values_are_replaced() {
        let config = SimConfig::from_ron("(projectile_capacity: 0, weapons: [])").unwrap();
        assert_eq!(config.projectile_capacity, 1);
        assert!(!config.weapons.is_empty());
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(SimConfig::from_ron("(projectile_capacity: \"many\")").is_err());
    }

    #[test]
    fn pretty_output_parses_back() {
        let original = SimConfig::default();
        let text = ron::ser::to_string_pretty(&original, ron::ser::PrettyConfig::default()).unwrap();
        let parsed = SimConfig::from_ron(&text).unwrap();
        assert_eq!(parsed.weapons, original.weapons);
        assert_eq!(parsed.flight.spawn_position, original.flight.spawn_position);
    }

    #[test]
    fn delta_scaled_blend_grows_with_dt() {
        let s = Smoothing::DeltaScaled { rate: 5.0 };
        assert!(s.blend(0.1, 1.0 / 30.0) > s.blend(0.1, 1.0 / 60.0));
        assert_eq!(Smoothing::PerFrame.blend(0.1, 1.0), 0.1);
    }
}
