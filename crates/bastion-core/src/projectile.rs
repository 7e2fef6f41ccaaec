//! Requests handed to the host's projectile spawner.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::{ProjectileKind, WeaponClass};
use crate::types::{ContactId, ShipId};

/// A plain-data request for the host to spawn one live projectile.
///
/// The core never spawns anything itself; it only guarantees that every
/// coordinate here is finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub owner: ShipId,
    pub slot: usize,
    pub weapon: WeaponClass,
    pub kind: ProjectileKind,
    pub origin: DVec2,
    /// Heading in radians, counter-clockwise from +X.
    pub rotation: f64,
    pub target: DVec2,
    pub damage: f64,
    pub speed: f64,
    /// Seconds before the projectile expires.
    pub lifetime: f64,
    /// Contact to home on, only ever set from a held lock.
    pub homing_target: Option<ContactId>,
    pub penetrates_shields: bool,
    pub area_radius: Option<f64>,
}

/// A beam held this tick: fixed origin, re-sampled endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamTrace {
    pub owner: ShipId,
    pub slot: usize,
    pub origin: DVec2,
    pub endpoint: DVec2,
    pub damage_per_sec: f64,
}
