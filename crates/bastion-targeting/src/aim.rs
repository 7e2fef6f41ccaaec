//! Aim-point stability tracking.
//!
//! The acquisition threshold adapts to how steadily the aim point is held:
//! a still aim locks in `min_lock_secs`, a sweeping aim in `max_lock_secs`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use bastion_core::config::LockTuning;

/// Smoothed aim-point speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AimTracker {
    last_aim: Option<DVec2>,
    speed: f64,
}

impl AimTracker {
    /// Feed this tick's aim point and return the smoothed speed
    /// (world units per second).
    pub fn sample(&mut self, aim: DVec2, dt: f64, tuning: &LockTuning) -> f64 {
        if let Some(last) = self.last_aim {
            if dt > 0.0 {
                let raw = aim.distance(last) / dt;
                self.speed += tuning.aim_speed_smoothing * (raw - self.speed);
            }
        }
        self.last_aim = Some(aim);
        self.speed
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Acquisition threshold for a given aim speed, interpolated linearly
/// between the stable and unstable bounds.
pub fn adaptive_lock_time(aim_speed: f64, tuning: &LockTuning) -> f64 {
    let instability = (aim_speed / tuning.unstable_aim_speed).clamp(0.0, 1.0);
    tuning.min_lock_secs + (tuning.max_lock_secs - tuning.min_lock_secs) * instability
}
