//! Simulation error types.

use thiserror::Error;

/// Errors reported by per-frame simulation calls. None of them are fatal:
/// the frame loop logs them and carries on with the next frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("aircraft model {0} is not in 1..=5")]
    InvalidModelSelection(u8),
    #[error("projectile direction has zero length")]
    DegenerateDirection,
    #[error("no weapon defined at index {0}")]
    UnknownWeapon(usize),
    #[error("non-finite {0} detected")]
    NonFiniteState(&'static str),
}
