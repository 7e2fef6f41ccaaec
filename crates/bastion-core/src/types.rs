//! Fundamental geometric and simulation types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Engine-assigned ship identifier. Never reused within one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipId(pub u32);

/// Host-assigned identifier of a targetable contact.
///
/// Locks and homing munitions hold this id, never the contact itself, so a
/// contact can vanish at any time without the core noticing anything other
/// than a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContactId(pub u64);

/// A candidate target as reported by the host each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    /// Inactive contacts (destroyed, despawning) are never lockable.
    pub active: bool,
    pub position: DVec2,
    /// Physical radius or size hint (world units).
    pub radius: f64,
    pub cloaked: bool,
}

impl Contact {
    pub fn new(id: ContactId, position: DVec2, radius: f64) -> Self {
        Self {
            id,
            active: true,
            position,
            radius,
            cloaked: false,
        }
    }

    pub fn is_cloaked(&self) -> bool {
        self.cloaked
    }

    /// Active and visible.
    pub fn is_lockable(&self) -> bool {
        self.active && !self.cloaked
    }
}

/// Ship kinematic state supplied by the host's physics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub position: DVec2,
    /// Heading in radians, counter-clockwise from +X.
    pub rotation: f64,
    pub velocity: DVec2,
}

impl Kinematics {
    pub fn at(position: DVec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// World-space point of a hull-relative mount offset.
    pub fn mount_point(&self, offset: DVec2) -> DVec2 {
        self.position + DVec2::from_angle(self.rotation).rotate(offset)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of ticks processed.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}

/// Ship-level overrides queried by the core, owned by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipOverrides {
    /// Raising a defensive posture is forbidden (e.g. evasive warp in progress).
    pub posture_locked: bool,
}

/// Per-tick scaling derived from the active power mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerModifier {
    /// Multiplies fixed weapon cooldowns (< 1 fires faster).
    pub cooldown_scale: f64,
    /// Multiplies continuous posture drain.
    pub posture_drain_scale: f64,
    /// Multiplies passive generator refill.
    pub refill_scale: f64,
}

impl Default for PowerModifier {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl PowerModifier {
    pub const NEUTRAL: PowerModifier = PowerModifier {
        cooldown_scale: 1.0,
        posture_drain_scale: 1.0,
        refill_scale: 1.0,
    };
}
