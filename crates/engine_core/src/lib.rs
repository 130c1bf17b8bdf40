//! Core engine types and utilities for the Skyrange flight simulation.
//!
//! This crate provides the foundational types used across all engine systems:
//! - Transform, orientation, and renderable pose data
//! - Time management (the frame clock)
//! - Common component types for ECS

pub mod components;
pub mod time;
pub mod transform;

pub use components::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{EulerRot, Mat4, Quat, Vec3};
pub use hecs::{Entity, World};
