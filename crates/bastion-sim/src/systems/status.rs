//! Read-only ship status for the host's HUD and AI layers.

use hecs::{Entity, World};

use bastion_core::config::PowerModeTuning;
use bastion_core::enums::PowerMode;
use bastion_core::state::{ReservoirView, SegmentView, ShipStatus};
use bastion_targeting::TargetLock;

use crate::posture::{Defense, Posture};
use crate::reservoir::EnergyReservoir;
use crate::ship::{Loadout, ShipTag};

/// Build a status snapshot for one ship entity. `None` if the entity is gone
/// or missing a combat component.
pub fn build_status(
    world: &World,
    entity: Entity,
    now: f64,
    modes: &PowerModeTuning,
) -> Option<ShipStatus> {
    let mut query = world
        .query_one::<(
            &ShipTag,
            &EnergyReservoir,
            &Posture,
            &Loadout,
            &TargetLock,
            &PowerMode,
        )>(entity)
        .ok()?;
    let (tag, reservoir, posture, loadout, lock, mode) = query.get()?;
    let modifier = modes.modifier(*mode);

    Some(ShipStatus {
        ship: tag.id,
        hull: tag.hull,
        power_mode: *mode,
        reservoir: reservoir_view(reservoir),
        posture: posture.view(),
        weapons: loadout
            .weapons
            .iter()
            .map(|w| w.view(now, reservoir, &modifier))
            .collect(),
        lock: lock.view(),
    })
}

pub fn reservoir_view(reservoir: &EnergyReservoir) -> ReservoirView {
    ReservoirView {
        segments: reservoir
            .segments()
            .iter()
            .map(|s| SegmentView {
                max_length: s.max_length(),
                current_length: s.current_length(),
                charge: s.charge(),
            })
            .collect(),
        total_charge: reservoir.total_charge(),
        total_capacity: reservoir.total_capacity(),
        charge_percent: reservoir.charge_percent(),
        helpless: reservoir.is_helpless(),
        destroyed: reservoir.is_destroyed(),
    }
}
