//! Simulation engine.
//!
//! `SimulationEngine` owns the hecs world of ships, queues host commands,
//! and runs the combat systems in a fixed order each tick. It never reads a
//! clock or global state: time, geometry, and contacts all arrive through
//! `TickInput` and the host setters, so a given seed and input stream always
//! replays identically.

use std::collections::{HashMap, VecDeque};

use glam::DVec2;
use hecs::{Entity, World};
use log::{info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use bastion_core::commands::ShipCommand;
use bastion_core::config::CombatTuning;
use bastion_core::enums::PowerMode;
use bastion_core::error::TuningError;
use bastion_core::events::CombatEvent;
use bastion_core::projectile::{BeamTrace, SpawnRequest};
use bastion_core::state::ShipStatus;
use bastion_core::types::{Contact, Kinematics, ShipId, ShipOverrides, SimTime};
use bastion_targeting::TargetLock;

use crate::posture::{Defense, Posture};
use crate::reservoir::EnergyReservoir;
use crate::ship::{Aim, Loadout, ReservoirWatch, ShipBlueprint, ShipTag};
use crate::systems;
use crate::systems::weapons::{WeaponOrder, WeaponOutput};

/// Configuration for a new engine.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for weapon spread. Same seed, same inputs, same outputs.
    pub seed: u64,
    pub tuning: CombatTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tuning: CombatTuning::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown ship {0:?}")]
    UnknownShip(ShipId),
    #[error("{ship:?} has no weapon in slot {slot}")]
    UnknownWeapon { ship: ShipId, slot: usize },
    #[error(transparent)]
    Tuning(#[from] TuningError),
}

/// Host input for one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickInput<'a> {
    /// Seconds since the previous tick.
    pub dt: f64,
    /// Every targetable contact this tick. Locks re-resolve against it.
    pub contacts: &'a [Contact],
}

/// Everything one tick produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutput {
    pub time: SimTime,
    pub spawns: Vec<SpawnRequest>,
    pub beams: Vec<BeamTrace>,
    pub events: Vec<CombatEvent>,
}

/// Outcome of routing one hit through a ship's posture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageReport {
    pub incoming: f64,
    /// Stopped or converted by the posture.
    pub absorbed: f64,
    /// Passed through to the hull.
    pub unabsorbed: f64,
}

pub struct SimulationEngine {
    world: World,
    time: SimTime,
    tuning: CombatTuning,
    rng: ChaCha8Rng,
    next_ship_id: u32,
    ships: HashMap<ShipId, Entity>,
    command_queue: VecDeque<ShipCommand>,
    /// Events raised between ticks (weapon damage), flushed with the next tick.
    pending_events: Vec<CombatEvent>,
}

impl SimulationEngine {
    pub fn new(config: SimConfig) -> Result<Self, TuningError> {
        config.tuning.validate()?;
        Ok(Self {
            world: World::new(),
            time: SimTime::default(),
            tuning: config.tuning,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            next_ship_id: 0,
            ships: HashMap::new(),
            command_queue: VecDeque::new(),
            pending_events: Vec::new(),
        })
    }

    /// Assemble a ship and add it to the world. Weapons are validated first;
    /// nothing is spawned if any of them is rejected.
    pub fn spawn_ship(&mut self, blueprint: ShipBlueprint) -> Result<ShipId, EngineError> {
        let loadout = blueprint.build_loadout()?;
        let id = ShipId(self.next_ship_id);
        self.next_ship_id += 1;

        let entity = self.world.spawn((
            ShipTag {
                id,
                hull: blueprint.hull,
            },
            blueprint.kinematics,
            blueprint.build_reservoir(&self.tuning),
            Posture::new(blueprint.posture, &self.tuning),
            loadout,
            TargetLock::new(&self.tuning.lock),
            Aim::default(),
            ShipOverrides::default(),
            PowerMode::default(),
            ReservoirWatch::default(),
        ));
        self.ships.insert(id, entity);
        info!(
            "spawned {id:?}: {:?} hull, {:?}, {} weapon(s)",
            blueprint.hull,
            blueprint.posture,
            blueprint.weapons.len()
        );
        Ok(id)
    }

    /// Remove a ship. Queued commands for it are dropped at the next tick.
    pub fn despawn_ship(&mut self, ship: ShipId) -> Result<(), EngineError> {
        let entity = self.entity(ship)?;
        self.ships.remove(&ship);
        if self.world.despawn(entity).is_err() {
            warn!("{ship:?} entity was already gone");
        }
        info!("despawned {ship:?}");
        Ok(())
    }

    pub fn set_kinematics(&mut self, ship: ShipId, kinematics: Kinematics) -> Result<(), EngineError> {
        *self.component_mut::<Kinematics>(ship)? = kinematics;
        Ok(())
    }

    /// Point the ship's targeting agent at a world position, or at nothing.
    pub fn set_aim(&mut self, ship: ShipId, point: Option<DVec2>) -> Result<(), EngineError> {
        self.component_mut::<Aim>(ship)?.point = point;
        Ok(())
    }

    pub fn set_overrides(&mut self, ship: ShipId, overrides: ShipOverrides) -> Result<(), EngineError> {
        *self.component_mut::<ShipOverrides>(ship)? = overrides;
        Ok(())
    }

    pub fn set_power_mode(&mut self, ship: ShipId, mode: PowerMode) -> Result<(), EngineError> {
        *self.component_mut::<PowerMode>(ship)? = mode;
        Ok(())
    }

    /// Queue a command for processing at the matching step of the next tick.
    pub fn queue_command(&mut self, command: ShipCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = ShipCommand>) {
        self.command_queue.extend(commands);
    }

    /// Route a hit through the ship's posture immediately. Called from the
    /// host's collision handling, between ticks.
    pub fn apply_damage(&mut self, ship: ShipId, damage: f64) -> Result<DamageReport, EngineError> {
        let entity = self.entity(ship)?;
        let now = self.time.elapsed_secs;
        let (posture, reservoir) = self
            .world
            .query_one_mut::<(&mut Posture, &mut EnergyReservoir)>(entity)
            .map_err(|_| EngineError::UnknownShip(ship))?;
        let incoming = if damage.is_finite() { damage.max(0.0) } else { 0.0 };
        let unabsorbed = posture.apply_damage(incoming, now, reservoir);
        Ok(DamageReport {
            incoming,
            absorbed: incoming - unabsorbed,
            unabsorbed,
        })
    }

    /// Damage one weapon. A weapon knocked out mid-beam stops its beam now.
    pub fn damage_weapon(&mut self, ship: ShipId, slot: usize, amount: f64) -> Result<(), EngineError> {
        let now = self.time.elapsed_secs;
        let loadout = self.component_mut::<Loadout>(ship)?;
        let weapon = loadout
            .get_mut(slot)
            .ok_or(EngineError::UnknownWeapon { ship, slot })?;
        if !weapon.apply_damage(amount) {
            return Ok(());
        }
        info!("{ship:?} slot {slot} disabled");
        let stop = weapon.interrupt(now);
        self.pending_events
            .push(CombatEvent::WeaponDisabled { ship, slot });
        if let Some(stop) = stop {
            self.pending_events.push(CombatEvent::BeamStopped {
                ship,
                slot,
                duration_secs: stop.duration_secs,
                reason: stop.reason,
            });
        }
        Ok(())
    }

    /// Advance every ship by `input.dt` seconds.
    ///
    /// Order: power refill, postures (upkeep then toggles), weapons (upkeep
    /// then fire orders), target locks, reservoir transition report.
    pub fn tick(&mut self, input: TickInput<'_>) -> TickOutput {
        if !(input.dt.is_finite() && input.dt > 0.0) {
            warn!("tick skipped: invalid dt {}", input.dt);
            return TickOutput {
                time: self.time,
                events: std::mem::take(&mut self.pending_events),
                ..Default::default()
            };
        }

        let dt = input.dt;
        self.time.advance(dt);
        let now = self.time.elapsed_secs;

        let (toggles, orders) = self.drain_commands();
        let mut out = WeaponOutput {
            events: std::mem::take(&mut self.pending_events),
            ..Default::default()
        };

        // 1. Generator refill
        systems::power::refill(
            &mut self.world,
            dt,
            &self.tuning.reservoir,
            &self.tuning.power_modes,
        );
        // 2. Postures
        systems::posture::run(
            &mut self.world,
            &toggles,
            dt,
            now,
            &self.tuning.power_modes,
            &mut out.events,
        );
        // 3. Weapons
        systems::weapons::run(
            &mut self.world,
            &orders,
            dt,
            now,
            &self.tuning.power_modes,
            &mut self.rng,
            &mut out,
        );
        // 4. Target locks
        systems::lock::run(
            &mut self.world,
            dt,
            input.contacts,
            &self.tuning.lock,
            &mut out.events,
        );
        // 5. Reservoir transitions
        systems::power::report(&mut self.world, &mut out.events);

        TickOutput {
            time: self.time,
            spawns: out.spawns,
            beams: out.beams,
            events: out.events,
        }
    }

    pub fn status(&self, ship: ShipId) -> Option<ShipStatus> {
        let entity = *self.ships.get(&ship)?;
        systems::status::build_status(
            &self.world,
            entity,
            self.time.elapsed_secs,
            &self.tuning.power_modes,
        )
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn tuning(&self) -> &CombatTuning {
        &self.tuning
    }

    /// Read-only access to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Live ship ids in ascending order.
    pub fn ships(&self) -> Vec<ShipId> {
        let mut ids: Vec<ShipId> = self.ships.keys().copied().collect();
        ids.sort();
        ids
    }

    fn entity(&self, ship: ShipId) -> Result<Entity, EngineError> {
        self.ships
            .get(&ship)
            .copied()
            .ok_or(EngineError::UnknownShip(ship))
    }

    fn component_mut<T: hecs::Component>(&mut self, ship: ShipId) -> Result<&mut T, EngineError> {
        let entity = self.entity(ship)?;
        self.world
            .query_one_mut::<&mut T>(entity)
            .map_err(|_| EngineError::UnknownShip(ship))
    }

    /// Split the queue into posture toggles and weapon orders, resolved to
    /// entities. Commands for ships that no longer exist are dropped.
    fn drain_commands(&mut self) -> (Vec<Entity>, HashMap<Entity, Vec<WeaponOrder>>) {
        let mut toggles = Vec::new();
        let mut orders: HashMap<Entity, Vec<WeaponOrder>> = HashMap::new();
        while let Some(command) = self.command_queue.pop_front() {
            let Some(&entity) = self.ships.get(&command.ship()) else {
                warn!("dropping {command:?}: unknown ship");
                continue;
            };
            let order = match command {
                ShipCommand::TogglePosture { .. } => {
                    toggles.push(entity);
                    continue;
                }
                ShipCommand::Fire { slot, target, .. } => WeaponOrder::Fire { slot, target },
                ShipCommand::FireAll { target, .. } => WeaponOrder::FireAll { target },
                ShipCommand::ReleaseTrigger { slot, .. } => WeaponOrder::Release { slot },
            };
            orders.entry(entity).or_default().push(order);
        }
        (toggles, orders)
    }
}
