//! Absorption field: turns incoming damage into charge until the reservoir
//! is full, then lets it through and loses capacity instead.

use log::debug;
use serde::{Deserialize, Serialize};

use bastion_core::config::AbsorptionTuning;
use bastion_core::enums::PostureKind;
use bastion_core::state::PostureView;
use bastion_core::types::{PowerModifier, ShipOverrides};

use super::{sanitize_damage, Defense};
use crate::reservoir::{Draw, EnergyReservoir};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsorptionField {
    tuning: AbsorptionTuning,
    active: bool,
}

impl AbsorptionField {
    /// Starts down.
    pub fn new(tuning: AbsorptionTuning) -> Self {
        Self {
            tuning,
            active: false,
        }
    }
}

impl Defense for AbsorptionField {
    fn kind(&self) -> PostureKind {
        PostureKind::AbsorptionField
    }

    fn is_up(&self) -> bool {
        self.active
    }

    fn toggle(&mut self, overrides: &ShipOverrides, reservoir: &EnergyReservoir) -> bool {
        if self.active {
            self.active = false;
        } else if !overrides.posture_locked && !reservoir.is_helpless() {
            self.active = true;
        }
        self.active
    }

    /// Fullness is checked before converting: exactly 100% bypasses, anything
    /// below converts even if the conversion itself fills the reservoir.
    fn apply_damage(&mut self, damage: f64, _now: f64, reservoir: &mut EnergyReservoir) -> f64 {
        let damage = sanitize_damage(damage);
        if !self.active || damage <= 0.0 {
            return damage;
        }
        if reservoir.is_full() {
            reservoir.apply_capacity_damage(damage);
            return damage;
        }
        reservoir.refill(damage * self.tuning.conversion_ratio);
        0.0
    }

    fn update(
        &mut self,
        dt: f64,
        _now: f64,
        reservoir: &mut EnergyReservoir,
        modifier: &PowerModifier,
    ) -> bool {
        if !self.active {
            return false;
        }
        reservoir.drain(Draw::Rate {
            per_sec: self.tuning.drain_rate * modifier.posture_drain_scale,
            dt,
        });
        if reservoir.is_helpless() {
            debug!("absorption field collapsed, reservoir empty");
            self.active = false;
            return true;
        }
        false
    }

    fn view(&self) -> PostureView {
        PostureView {
            kind: PostureKind::AbsorptionField,
            up: self.active,
            strength: None,
            max_strength: None,
            hit_flash_secs: 0.0,
        }
    }
}
