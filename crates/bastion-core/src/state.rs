//! Read-only status snapshots for the host's HUD and AI layers.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{ContactId, ShipId};

/// Complete combat status of one ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipStatus {
    pub ship: ShipId,
    pub hull: HullClass,
    pub power_mode: PowerMode,
    pub reservoir: ReservoirView,
    pub posture: PostureView,
    pub weapons: Vec<WeaponView>,
    pub lock: LockView,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentView {
    pub max_length: f64,
    pub current_length: f64,
    pub charge: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservoirView {
    pub segments: Vec<SegmentView>,
    pub total_charge: f64,
    pub total_capacity: f64,
    /// 0.0 - 1.0.
    pub charge_percent: f64,
    pub helpless: bool,
    pub destroyed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostureView {
    pub kind: PostureKind,
    pub up: bool,
    /// Deflector strength, `None` for postures without a pool.
    pub strength: Option<f64>,
    pub max_strength: Option<f64>,
    /// Seconds of hit flash left (0 when idle).
    pub hit_flash_secs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponView {
    pub slot: usize,
    pub class: WeaponClass,
    pub model: FiringModelKind,
    pub ready: bool,
    pub disabled: bool,
    pub hp: f64,
    /// Seconds until the weapon may fire again (0 when ready or ammo-gated).
    pub cooldown_remaining: f64,
    /// Rounds or cells loaded, for magazine and energy models.
    pub loaded: Option<u32>,
    /// Rounds in reserve, for magazine models.
    pub stored: Option<u32>,
    /// Beam currently held.
    pub firing: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LockView {
    pub phase: LockPhase,
    pub target: Option<ContactId>,
    pub lock_progress: f64,
    pub current_lock_time: f64,
    pub losing_lock: bool,
    pub lock_loss_progress: f64,
}
