//! Target lock step: feeds each ship's aim point into its lock FSM and
//! republishes the FSM's signals as combat events.

use hecs::World;

use bastion_core::config::LockTuning;
use bastion_core::enums::LockBreakReason;
use bastion_core::events::CombatEvent;
use bastion_core::types::{Contact, ShipId};
use bastion_targeting::{LockInput, LockSignal, TargetLock};

use crate::ship::{Aim, ShipTag};

pub fn run(
    world: &mut World,
    dt: f64,
    contacts: &[Contact],
    tuning: &LockTuning,
    events: &mut Vec<CombatEvent>,
) {
    for (_entity, (tag, lock, aim)) in world.query_mut::<(&ShipTag, &mut TargetLock, &Aim)>() {
        let signal = match aim.point {
            Some(point) => lock.update(
                &LockInput {
                    dt,
                    aim: point,
                    contacts,
                },
                tuning,
            ),
            // Nothing aimed at all: any lock is out of tolerance.
            None => lock.break_lock(LockBreakReason::OutOfTolerance),
        };
        if let Some(signal) = signal {
            events.push(to_event(tag.id, signal));
        }
    }
}

fn to_event(ship: ShipId, signal: LockSignal) -> CombatEvent {
    match signal {
        LockSignal::Acquiring(target) => CombatEvent::LockAcquiring { ship, target },
        LockSignal::Acquired(target) => CombatEvent::LockAcquired { ship, target },
        LockSignal::Degrading(target) => CombatEvent::LockDegrading { ship, target },
        LockSignal::Recovered(target) => CombatEvent::LockRecovered { ship, target },
        LockSignal::Broken { target, reason } => CombatEvent::LockBroken {
            ship,
            target,
            reason,
        },
    }
}
