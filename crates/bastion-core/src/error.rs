//! Errors for the few genuinely invalid inputs: malformed tunables.
//!
//! Gameplay refusals (on cooldown, out of energy, no ammunition) are never
//! errors; they surface as `false` or `None` from the guard or action call.

use thiserror::Error;

use crate::enums::WeaponClass;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tunable `{field}` must be finite and non-negative, got {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("tunable `{field}` must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        min: f64,
        value: f64,
    },

    #[error("lock window inverted: min {min}s exceeds max {max}s")]
    LockWindowInverted { min: f64, max: f64 },

    #[error("weapon {class:?}: {reason}")]
    InvalidWeapon {
        class: WeaponClass,
        reason: &'static str,
    },

    #[error("malformed tuning document: {0}")]
    Json(#[from] serde_json::Error),
}
