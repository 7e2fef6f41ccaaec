//! Events published by the simulation for audio, HUD, and AI subscribers.
//!
//! The core only publishes; nothing it does depends on a subscriber existing.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{ContactId, ShipId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatEvent {
    /// Aim settled on a new contact; acquisition timer started.
    LockAcquiring { ship: ShipId, target: ContactId },
    /// Acquisition completed.
    LockAcquired { ship: ShipId, target: ContactId },
    /// Aim drifted off a locked contact but inside the tolerance band.
    LockDegrading { ship: ShipId, target: ContactId },
    /// Aim returned to a degrading lock before it broke.
    LockRecovered { ship: ShipId, target: ContactId },
    /// Lock ended. Emitted once per break.
    LockBroken {
        ship: ShipId,
        target: ContactId,
        reason: LockBreakReason,
    },
    /// Posture raised or lowered on request.
    PostureToggled {
        ship: ShipId,
        kind: PostureKind,
        up: bool,
    },
    /// Posture forced down (reservoir empty or deflector exhausted).
    PostureCollapsed { ship: ShipId, kind: PostureKind },
    /// Reservoir charge reached zero.
    ReservoirDepleted { ship: ShipId },
    /// Reservoir capacity reached zero.
    ReservoirDestroyed { ship: ShipId },
    /// A weapon produced spawn requests this tick.
    WeaponFired {
        ship: ShipId,
        slot: usize,
        weapon: WeaponClass,
        shots: usize,
    },
    /// A beam stopped; `duration_secs` is also its cooldown.
    BeamStopped {
        ship: ShipId,
        slot: usize,
        duration_secs: f64,
        reason: BeamStopReason,
    },
    /// A weapon's hp reached zero.
    WeaponDisabled { ship: ShipId, slot: usize },
}
