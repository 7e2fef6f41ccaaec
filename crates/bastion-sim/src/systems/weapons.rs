//! Weapon upkeep and fire orders.
//!
//! Every weapon is updated first (reloads, beam drain and endpoint
//! re-sampling), then the tick's fire orders are applied in queue order.
//! Spread is rolled here from the engine's seeded RNG so weapons stay free
//! of randomness.

use std::collections::HashMap;

use glam::DVec2;
use hecs::{Entity, World};
use log::warn;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use bastion_core::config::PowerModeTuning;
use bastion_core::enums::PowerMode;
use bastion_core::events::CombatEvent;
use bastion_core::projectile::{BeamTrace, SpawnRequest};
use bastion_core::types::{Kinematics, PowerModifier, ShipId};
use bastion_targeting::TargetLock;

use crate::reservoir::EnergyReservoir;
use crate::ship::{Aim, Loadout, ShipTag};
use crate::weapons::{apply_spread, BeamStop, FireContext, FiringModel, Weapon};

/// A fire-control order resolved to a ship entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeaponOrder {
    Fire { slot: usize, target: DVec2 },
    FireAll { target: DVec2 },
    Release { slot: usize },
}

/// Everything the weapons step hands back to the host.
#[derive(Debug, Default)]
pub struct WeaponOutput {
    pub spawns: Vec<SpawnRequest>,
    pub beams: Vec<BeamTrace>,
    pub events: Vec<CombatEvent>,
}

/// Per-ship state borrowed for the duration of one fire order.
struct Shooter<'a> {
    ship: ShipId,
    kinematics: &'a Kinematics,
    reservoir: &'a mut EnergyReservoir,
    lock: &'a TargetLock,
    modifier: PowerModifier,
}

pub fn run(
    world: &mut World,
    orders: &HashMap<Entity, Vec<WeaponOrder>>,
    dt: f64,
    now: f64,
    modes: &PowerModeTuning,
    rng: &mut ChaCha8Rng,
    out: &mut WeaponOutput,
) {
    for (entity, (tag, kinematics, reservoir, loadout, lock, aim, mode)) in world.query_mut::<(
        &ShipTag,
        &Kinematics,
        &mut EnergyReservoir,
        &mut Loadout,
        &TargetLock,
        &Aim,
        &PowerMode,
    )>() {
        for weapon in loadout.weapons.iter_mut() {
            let update = weapon.update(dt, now, reservoir, aim.point);
            if let Some((origin, endpoint)) = update.beam {
                out.beams.push(beam_trace(tag.id, weapon, origin, endpoint));
            }
            if let Some(stop) = update.beam_stopped {
                out.events.push(beam_stopped(tag.id, weapon.slot(), stop));
            }
        }

        let Some(orders) = orders.get(&entity) else {
            continue;
        };
        let mut shooter = Shooter {
            ship: tag.id,
            kinematics,
            reservoir,
            lock,
            modifier: modes.modifier(*mode),
        };
        for order in orders {
            match *order {
                WeaponOrder::Fire { slot, target } => match loadout.get_mut(slot) {
                    Some(weapon) => fire(weapon, &mut shooter, target, now, rng, out),
                    None => warn!("{:?} has no weapon in slot {slot}", tag.id),
                },
                WeaponOrder::FireAll { target } => {
                    for weapon in loadout.weapons.iter_mut() {
                        fire(weapon, &mut shooter, target, now, rng, out);
                    }
                }
                WeaponOrder::Release { slot } => {
                    let stop = loadout.get_mut(slot).and_then(|w| w.release(now));
                    if let Some(stop) = stop {
                        out.events.push(beam_stopped(tag.id, slot, stop));
                    }
                }
            }
        }
    }
}

fn fire(
    weapon: &mut Weapon,
    shooter: &mut Shooter<'_>,
    target: DVec2,
    now: f64,
    rng: &mut ChaCha8Rng,
    out: &mut WeaponOutput,
) {
    let ctx = FireContext {
        ship: shooter.ship,
        owner: shooter.kinematics,
        reservoir: &mut *shooter.reservoir,
        target,
        now,
        lock_target: shooter.lock.locked_target(),
        modifier: &shooter.modifier,
    };
    let Some(volley) = weapon.fire(ctx) else {
        return;
    };

    // One roll per volley so burst lines stay parallel.
    let spread = weapon.spec().spread;
    let angle = if spread > 0.0 {
        rng.gen_range(-spread..=spread)
    } else {
        0.0
    };
    let shots = volley.requests.len();
    for mut request in volley.requests {
        if angle != 0.0 {
            apply_spread(&mut request, angle);
        }
        out.spawns.push(request);
    }
    if let FiringModel::Beam(beam) = weapon.model() {
        if let (Some(origin), Some(endpoint)) = (beam.origin(), beam.endpoint()) {
            out.beams.push(beam_trace(shooter.ship, weapon, origin, endpoint));
        }
    }
    out.events.push(CombatEvent::WeaponFired {
        ship: shooter.ship,
        slot: weapon.slot(),
        weapon: weapon.class(),
        shots,
    });
}

fn beam_trace(ship: ShipId, weapon: &Weapon, origin: DVec2, endpoint: DVec2) -> BeamTrace {
    BeamTrace {
        owner: ship,
        slot: weapon.slot(),
        origin,
        endpoint,
        damage_per_sec: weapon.spec().damage,
    }
}

fn beam_stopped(ship: ShipId, slot: usize, stop: BeamStop) -> CombatEvent {
    CombatEvent::BeamStopped {
        ship,
        slot,
        duration_secs: stop.duration_secs,
        reason: stop.reason,
    }
}
