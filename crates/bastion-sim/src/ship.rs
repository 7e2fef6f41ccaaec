//! Ship assembly and the ECS components a ship entity carries.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use bastion_core::config::{CombatTuning, WeaponSpec};
use bastion_core::enums::{HullClass, PostureKind, WeaponClass};
use bastion_core::error::TuningError;
use bastion_core::types::{Kinematics, ShipId};

use crate::reservoir::EnergyReservoir;
use crate::weapons::Weapon;

/// Identity marker on every ship entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipTag {
    pub id: ShipId,
    pub hull: HullClass,
}

/// Mounted weapons, indexed by slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    pub weapons: Vec<Weapon>,
}

impl Loadout {
    pub fn get(&self, slot: usize) -> Option<&Weapon> {
        self.weapons.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Weapon> {
        self.weapons.get_mut(slot)
    }
}

/// Where the ship's targeting agent is pointing, if anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aim {
    pub point: Option<DVec2>,
}

/// Edge-trigger memory for reservoir events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservoirWatch {
    pub helpless: bool,
    pub destroyed: bool,
}

/// One weapon to mount: its parameters and hull-relative offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponMount {
    pub spec: WeaponSpec,
    pub offset: DVec2,
}

impl WeaponMount {
    pub fn preset(class: WeaponClass, offset: DVec2) -> Self {
        Self {
            spec: WeaponSpec::preset(class),
            offset,
        }
    }
}

/// Everything needed to assemble a ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipBlueprint {
    pub hull: HullClass,
    pub posture: PostureKind,
    pub weapons: Vec<WeaponMount>,
    pub kinematics: Kinematics,
}

impl ShipBlueprint {
    pub fn new(hull: HullClass, posture: PostureKind) -> Self {
        Self {
            hull,
            posture,
            weapons: Vec::new(),
            kinematics: Kinematics::default(),
        }
    }

    /// Mount a preset weapon. Slots follow mounting order.
    pub fn with_weapon(mut self, class: WeaponClass, offset: DVec2) -> Self {
        self.weapons.push(WeaponMount::preset(class, offset));
        self
    }

    pub fn with_mount(mut self, mount: WeaponMount) -> Self {
        self.weapons.push(mount);
        self
    }

    pub fn at(mut self, kinematics: Kinematics) -> Self {
        self.kinematics = kinematics;
        self
    }

    pub(crate) fn build_reservoir(&self, tuning: &CombatTuning) -> EnergyReservoir {
        EnergyReservoir::new(self.hull.segment_count(), tuning.reservoir.segment_length)
    }

    pub(crate) fn build_loadout(&self) -> Result<Loadout, TuningError> {
        let weapons = self
            .weapons
            .iter()
            .enumerate()
            .map(|(slot, mount)| Weapon::new(mount.spec.clone(), slot, mount.offset))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Loadout { weapons })
    }
}
