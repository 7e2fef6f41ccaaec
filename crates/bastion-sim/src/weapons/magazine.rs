//! Ammunition-fed models.
//!
//! Both reload by topping off one round at a time every `reload_secs`, never
//! straight to full. A `Magazine` moves rounds from a finite store; an
//! `EnergyCell` pays for each shot and each reloaded cell out of the
//! reservoir and silently waits when it cannot.

use serde::{Deserialize, Serialize};

use crate::reservoir::EnergyReservoir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Magazine {
    capacity: u32,
    loaded: u32,
    stored: u32,
    reload_secs: f64,
    fire_interval: f64,
    reload_progress: f64,
}

impl Magazine {
    /// Starts fully loaded with `stored` rounds in reserve.
    pub fn new(capacity: u32, stored: u32, reload_secs: f64, fire_interval: f64) -> Self {
        Self {
            capacity,
            loaded: capacity,
            stored,
            reload_secs,
            fire_interval,
            reload_progress: 0.0,
        }
    }

    pub fn loaded(&self) -> u32 {
        self.loaded
    }

    pub fn stored(&self) -> u32 {
        self.stored
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn fire_interval(&self) -> f64 {
        self.fire_interval
    }

    pub fn reload_progress(&self) -> f64 {
        self.reload_progress
    }

    pub(crate) fn can_fire(&self, since_last_fire: f64) -> bool {
        self.loaded > 0 && since_last_fire >= self.fire_interval
    }

    pub(crate) fn consume(&mut self) {
        self.loaded = self.loaded.saturating_sub(1);
    }

    /// At most one round per tick.
    pub(crate) fn update(&mut self, dt: f64) {
        if self.loaded >= self.capacity || self.stored == 0 {
            self.reload_progress = 0.0;
            return;
        }
        self.reload_progress += dt;
        if self.reload_progress >= self.reload_secs {
            self.reload_progress = (self.reload_progress - self.reload_secs).min(self.reload_secs);
            self.loaded += 1;
            self.stored -= 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyCell {
    capacity: u32,
    loaded: u32,
    reload_secs: f64,
    fire_interval: f64,
    energy_cost: f64,
    reload_progress: f64,
}

impl EnergyCell {
    /// Starts with every cell charged.
    pub fn new(capacity: u32, reload_secs: f64, fire_interval: f64, energy_cost: f64) -> Self {
        Self {
            capacity,
            loaded: capacity,
            reload_secs,
            fire_interval,
            energy_cost,
            reload_progress: 0.0,
        }
    }

    pub fn loaded(&self) -> u32 {
        self.loaded
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn energy_cost(&self) -> f64 {
        self.energy_cost
    }

    pub fn fire_interval(&self) -> f64 {
        self.fire_interval
    }

    pub fn reload_progress(&self) -> f64 {
        self.reload_progress
    }

    pub(crate) fn can_fire(&self, since_last_fire: f64) -> bool {
        self.loaded > 0 && since_last_fire >= self.fire_interval
    }

    pub(crate) fn consume(&mut self) {
        self.loaded = self.loaded.saturating_sub(1);
    }

    /// A due reload that the reservoir cannot pay for holds at the
    /// threshold and retries next tick; nothing is charged in part.
    pub(crate) fn update(&mut self, dt: f64, reservoir: &mut EnergyReservoir) {
        if self.loaded >= self.capacity {
            self.reload_progress = 0.0;
            return;
        }
        self.reload_progress = (self.reload_progress + dt).min(self.reload_secs);
        if self.reload_progress >= self.reload_secs && reservoir.try_drain(self.energy_cost) {
            self.loaded += 1;
            self.reload_progress = 0.0;
        }
    }
}
