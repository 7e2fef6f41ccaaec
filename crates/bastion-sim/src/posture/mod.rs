//! Defensive postures.
//!
//! A ship mounts exactly one posture, chosen at assembly and never swapped.
//! Both variants sit behind the `Defense` capability so the damage and
//! update paths never care which one is fitted.

pub mod absorption;
pub mod deflector;

use serde::{Deserialize, Serialize};

use bastion_core::config::CombatTuning;
use bastion_core::enums::PostureKind;
use bastion_core::state::PostureView;
use bastion_core::types::{PowerModifier, ShipOverrides};

use crate::reservoir::EnergyReservoir;

pub use absorption::AbsorptionField;
pub use deflector::Deflector;

pub trait Defense {
    fn kind(&self) -> PostureKind;

    fn is_up(&self) -> bool;

    /// Raise if down, lower if up. Returns the resulting state. Raising is a
    /// no-op while `overrides.posture_locked` is set, while the reservoir is
    /// helpless, or while a deflector has no strength left. Lowering always
    /// succeeds.
    fn toggle(&mut self, overrides: &ShipOverrides, reservoir: &EnergyReservoir) -> bool;

    /// Route incoming damage through the posture. Returns the damage that
    /// got past it, for the host's hull bookkeeping.
    fn apply_damage(&mut self, damage: f64, now: f64, reservoir: &mut EnergyReservoir) -> f64;

    /// Per-tick upkeep. Returns `true` when the posture was forced down.
    fn update(
        &mut self,
        dt: f64,
        now: f64,
        reservoir: &mut EnergyReservoir,
        modifier: &PowerModifier,
    ) -> bool;

    fn view(&self) -> PostureView;
}

/// The fitted posture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Posture {
    Deflector(Deflector),
    AbsorptionField(AbsorptionField),
}

impl Posture {
    pub fn new(kind: PostureKind, tuning: &CombatTuning) -> Self {
        match kind {
            PostureKind::Deflector => Posture::Deflector(Deflector::new(tuning.deflector.clone())),
            PostureKind::AbsorptionField => {
                Posture::AbsorptionField(AbsorptionField::new(tuning.absorption.clone()))
            }
        }
    }

    fn as_defense(&self) -> &dyn Defense {
        match self {
            Posture::Deflector(d) => d,
            Posture::AbsorptionField(a) => a,
        }
    }

    fn as_defense_mut(&mut self) -> &mut dyn Defense {
        match self {
            Posture::Deflector(d) => d,
            Posture::AbsorptionField(a) => a,
        }
    }
}

impl Defense for Posture {
    fn kind(&self) -> PostureKind {
        self.as_defense().kind()
    }

    fn is_up(&self) -> bool {
        self.as_defense().is_up()
    }

    fn toggle(&mut self, overrides: &ShipOverrides, reservoir: &EnergyReservoir) -> bool {
        self.as_defense_mut().toggle(overrides, reservoir)
    }

    fn apply_damage(&mut self, damage: f64, now: f64, reservoir: &mut EnergyReservoir) -> f64 {
        self.as_defense_mut().apply_damage(damage, now, reservoir)
    }

    fn update(
        &mut self,
        dt: f64,
        now: f64,
        reservoir: &mut EnergyReservoir,
        modifier: &PowerModifier,
    ) -> bool {
        self.as_defense_mut().update(dt, now, reservoir, modifier)
    }

    fn view(&self) -> PostureView {
        self.as_defense().view()
    }
}

/// Incoming damage, or zero for negative and non-finite values.
pub(crate) fn sanitize_damage(damage: f64) -> f64 {
    if damage.is_finite() && damage > 0.0 {
        damage
    } else {
        0.0
    }
}
