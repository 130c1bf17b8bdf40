//! Collision primitives shared by projectiles and targets.

pub mod collision;

pub use collision::*;
