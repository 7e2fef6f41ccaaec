//! Generator refill and reservoir transition reporting.

use hecs::World;
use log::debug;

use bastion_core::config::{PowerModeTuning, ReservoirTuning};
use bastion_core::enums::PowerMode;
use bastion_core::events::CombatEvent;

use crate::reservoir::{Draw, EnergyReservoir};
use crate::ship::{ReservoirWatch, ShipTag};

/// Passive refill, scaled by each ship's power mode.
pub fn refill(world: &mut World, dt: f64, tuning: &ReservoirTuning, modes: &PowerModeTuning) {
    for (_entity, (reservoir, mode)) in world.query_mut::<(&mut EnergyReservoir, &PowerMode)>() {
        let modifier = modes.modifier(*mode);
        reservoir.refill(Draw::Rate {
            per_sec: tuning.refill_rate * modifier.refill_scale,
            dt,
        });
    }
}

/// Emit `ReservoirDepleted` / `ReservoirDestroyed` on the tick a reservoir
/// first reaches that state. Recovering re-arms the trigger.
pub fn report(world: &mut World, events: &mut Vec<CombatEvent>) {
    for (_entity, (tag, reservoir, watch)) in
        world.query_mut::<(&ShipTag, &EnergyReservoir, &mut ReservoirWatch)>()
    {
        let helpless = reservoir.is_helpless();
        if helpless && !watch.helpless {
            debug!("{:?} reservoir depleted", tag.id);
            events.push(CombatEvent::ReservoirDepleted { ship: tag.id });
        }
        watch.helpless = helpless;

        let destroyed = reservoir.is_destroyed();
        if destroyed && !watch.destroyed {
            debug!("{:?} reservoir destroyed", tag.id);
            events.push(CombatEvent::ReservoirDestroyed { ship: tag.id });
        }
        watch.destroyed = destroyed;
    }
}
