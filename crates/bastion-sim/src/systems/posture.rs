//! Posture upkeep and host toggles.

use hecs::{Entity, World};
use log::debug;

use bastion_core::config::PowerModeTuning;
use bastion_core::enums::PowerMode;
use bastion_core::events::CombatEvent;
use bastion_core::types::ShipOverrides;

use crate::posture::{Defense, Posture};
use crate::reservoir::EnergyReservoir;
use crate::ship::ShipTag;

/// Drain, regenerate, and collapse postures, then apply queued toggles.
/// A ship listed twice in `toggles` toggles twice.
pub fn run(
    world: &mut World,
    toggles: &[Entity],
    dt: f64,
    now: f64,
    modes: &PowerModeTuning,
    events: &mut Vec<CombatEvent>,
) {
    for (entity, (tag, posture, reservoir, overrides, mode)) in world.query_mut::<(
        &ShipTag,
        &mut Posture,
        &mut EnergyReservoir,
        &ShipOverrides,
        &PowerMode,
    )>() {
        let modifier = modes.modifier(*mode);
        if posture.update(dt, now, reservoir, &modifier) {
            events.push(CombatEvent::PostureCollapsed {
                ship: tag.id,
                kind: posture.kind(),
            });
        }

        for _ in toggles.iter().filter(|t| **t == entity) {
            let before = posture.is_up();
            let after = posture.toggle(overrides, reservoir);
            if before == after {
                debug!("{:?} refused to raise {:?}", tag.id, posture.kind());
                continue;
            }
            events.push(CombatEvent::PostureToggled {
                ship: tag.id,
                kind: posture.kind(),
                up: after,
            });
        }
    }
}
