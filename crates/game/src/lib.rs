//! Skyrange flight-combat simulation core.
//!
//! Per frame: controls drive the [`FlightModel`], the [`WeaponController`]
//! fires from the fresh pose into the [`ProjectileStore`], rounds are aged
//! and moved, and each target is swept for hits. [`SimContext::tick`] runs
//! that sequence; [`FrameLoop`] wraps it with the clock and fault handling.

pub mod collision_report;
pub mod config;
pub mod control_surfaces;
pub mod error;
pub mod flight;
pub mod frame_loop;
pub mod projectiles;
pub mod sim;
pub mod targets;
pub mod weapons;

pub use collision_report::CollisionReport;
pub use config::{FlightTuning, SimConfig, Smoothing};
pub use control_surfaces::{ControlDeflections, ControlSurface, ControlSurfaceRig, NodeHandle};
pub use error::SimError;
pub use flight::{AircraftState, FlightModel, PITCH_LIMIT};
pub use frame_loop::FrameLoop;
pub use projectiles::{
    DisposeReason, Projectile, ProjectileHandle, ProjectileInstance, ProjectileSpec,
    ProjectileStore, VisualEvent,
};
pub use sim::{FrameReport, SimContext};
pub use targets::{DamageEvent, Target, TargetKind};
pub use weapons::{TriggerState, WeaponController, WeaponDefinition};
