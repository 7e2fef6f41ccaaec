//! Deflector: a depletable strength pool in front of the hull.

use log::debug;
use serde::{Deserialize, Serialize};

use bastion_core::config::DeflectorTuning;
use bastion_core::enums::PostureKind;
use bastion_core::state::PostureView;
use bastion_core::types::{PowerModifier, ShipOverrides};

use super::{sanitize_damage, Defense};
use crate::reservoir::{Draw, EnergyReservoir};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deflector {
    tuning: DeflectorTuning,
    current_strength: f64,
    active: bool,
    /// Seconds of hit flash left.
    hit_flash_remaining: f64,
    last_hit_time: Option<f64>,
    /// Knocked down by a hit; reported as a collapse on the next update.
    #[serde(default)]
    collapse_pending: bool,
}

impl Deflector {
    /// Starts down at full strength.
    pub fn new(tuning: DeflectorTuning) -> Self {
        Self {
            current_strength: tuning.max_strength,
            tuning,
            active: false,
            hit_flash_remaining: 0.0,
            last_hit_time: None,
            collapse_pending: false,
        }
    }

    pub fn current_strength(&self) -> f64 {
        self.current_strength
    }

    pub fn max_strength(&self) -> f64 {
        self.tuning.max_strength
    }

    pub fn last_hit_time(&self) -> Option<f64> {
        self.last_hit_time
    }
}

impl Defense for Deflector {
    fn kind(&self) -> PostureKind {
        PostureKind::Deflector
    }

    fn is_up(&self) -> bool {
        self.active
    }

    fn toggle(&mut self, overrides: &ShipOverrides, reservoir: &EnergyReservoir) -> bool {
        if self.active {
            self.active = false;
            self.hit_flash_remaining = 0.0;
        } else if !overrides.posture_locked
            && !reservoir.is_helpless()
            && self.current_strength > 0.0
        {
            self.active = true;
        }
        self.active
    }

    fn apply_damage(&mut self, damage: f64, now: f64, reservoir: &mut EnergyReservoir) -> f64 {
        let damage = sanitize_damage(damage);
        if !self.active || damage <= 0.0 {
            return damage;
        }
        let absorbed = damage.min(self.current_strength);
        self.current_strength -= absorbed;
        // Being hit costs energy on top of strength, whatever was absorbed.
        reservoir.drain(damage * self.tuning.hit_drain_ratio);
        if absorbed > 0.0 {
            self.hit_flash_remaining = self.tuning.hit_flash_secs;
            self.last_hit_time = Some(now);
        }
        if self.current_strength <= 0.0 {
            debug!("deflector broken by a {damage:.1} hit");
            self.current_strength = 0.0;
            self.active = false;
            self.collapse_pending = true;
        }
        damage - absorbed
    }

    fn update(
        &mut self,
        dt: f64,
        _now: f64,
        reservoir: &mut EnergyReservoir,
        modifier: &PowerModifier,
    ) -> bool {
        self.hit_flash_remaining = (self.hit_flash_remaining - dt).max(0.0);

        if std::mem::take(&mut self.collapse_pending) {
            self.hit_flash_remaining = 0.0;
            return true;
        }

        if !self.active {
            self.current_strength =
                (self.current_strength + self.tuning.regen_rate * dt).min(self.tuning.max_strength);
            return false;
        }

        reservoir.drain(Draw::Rate {
            per_sec: self.tuning.drain_rate * modifier.posture_drain_scale,
            dt,
        });

        if reservoir.is_helpless() || self.current_strength <= 0.0 {
            debug!(
                "deflector collapsed (strength {:.1}, charge {:.1})",
                self.current_strength,
                reservoir.total_charge()
            );
            self.active = false;
            self.hit_flash_remaining = 0.0;
            return true;
        }
        false
    }

    fn view(&self) -> PostureView {
        PostureView {
            kind: PostureKind::Deflector,
            up: self.active,
            strength: Some(self.current_strength),
            max_strength: Some(self.tuning.max_strength),
            hit_flash_secs: self.hit_flash_remaining,
        }
    }
}
