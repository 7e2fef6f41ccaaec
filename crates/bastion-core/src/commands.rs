//! Host commands addressed to a ship.
//!
//! Commands are queued and processed at the matching step of the next tick:
//! posture toggles alongside posture updates, fire orders alongside weapon
//! updates.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::types::ShipId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShipCommand {
    /// Raise the posture if down, lower it if up.
    TogglePosture { ship: ShipId },
    /// Fire one weapon slot at a world point.
    Fire {
        ship: ShipId,
        slot: usize,
        target: DVec2,
    },
    /// Fire every ready weapon at a world point.
    FireAll { ship: ShipId, target: DVec2 },
    /// Let go of the trigger on a slot; stops a firing beam.
    ReleaseTrigger { ship: ShipId, slot: usize },
}

impl ShipCommand {
    pub fn ship(&self) -> ShipId {
        match self {
            ShipCommand::TogglePosture { ship }
            | ShipCommand::Fire { ship, .. }
            | ShipCommand::FireAll { ship, .. }
            | ShipCommand::ReleaseTrigger { ship, .. } => *ship,
        }
    }
}
