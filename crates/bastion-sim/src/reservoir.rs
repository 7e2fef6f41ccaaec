//! Segmented energy reservoir.
//!
//! One pool feeds postures and weapons. Draws come off the front segments
//! first; refills top up the rear segments first, so the front acts as the
//! first line and the rear as reserve. Capacity damage also starts at the
//! front and drags charge down with it.
//!
//! Every draw returns the amount actually applied, so several writers may
//! call in the same tick without coordinating.

use serde::{Deserialize, Serialize};

/// One storage unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    max_length: f64,
    current_length: f64,
    charge: f64,
}

impl Segment {
    fn full(length: f64) -> Self {
        Self {
            max_length: length,
            current_length: length,
            charge: length,
        }
    }

    /// Original, undamaged capacity.
    pub fn max_length(&self) -> f64 {
        self.max_length
    }

    /// Capacity left after damage.
    pub fn current_length(&self) -> f64 {
        self.current_length
    }

    pub fn charge(&self) -> f64 {
        self.charge
    }

    fn headroom(&self) -> f64 {
        self.current_length - self.charge
    }
}

/// A flat amount or a per-second rate over an elapsed interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Draw {
    Amount(f64),
    Rate { per_sec: f64, dt: f64 },
}

impl Draw {
    /// Requested amount. Negative and non-finite requests count as zero.
    pub fn amount(self) -> f64 {
        let raw = match self {
            Draw::Amount(amount) => amount,
            Draw::Rate { per_sec, dt } => per_sec * dt,
        };
        if raw.is_finite() && raw > 0.0 {
            raw
        } else {
            0.0
        }
    }
}

impl From<f64> for Draw {
    fn from(amount: f64) -> Self {
        Draw::Amount(amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyReservoir {
    segments: Vec<Segment>,
}

impl EnergyReservoir {
    /// A fully charged reservoir of `count` equal segments.
    pub fn new(count: usize, segment_length: f64) -> Self {
        Self {
            segments: vec![Segment::full(segment_length.max(0.0)); count],
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn total_charge(&self) -> f64 {
        self.segments.iter().map(|s| s.charge).sum()
    }

    /// Sum of current (possibly damaged) segment lengths.
    pub fn total_capacity(&self) -> f64 {
        self.segments.iter().map(|s| s.current_length).sum()
    }

    /// Sum of original segment lengths.
    pub fn max_capacity(&self) -> f64 {
        self.segments.iter().map(|s| s.max_length).sum()
    }

    /// Charge over current capacity, 0.0 - 1.0. Zero when no capacity is left.
    pub fn charge_percent(&self) -> f64 {
        let capacity = self.total_capacity();
        if capacity > 0.0 {
            (self.total_charge() / capacity).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// No headroom anywhere. A reservoir with no capacity left is full.
    pub fn is_full(&self) -> bool {
        self.segments.iter().all(|s| s.headroom() <= 0.0)
    }

    /// No charge left.
    pub fn is_helpless(&self) -> bool {
        self.segments.iter().all(|s| s.charge <= 0.0)
    }

    /// No capacity left. Implies helpless.
    pub fn is_destroyed(&self) -> bool {
        self.segments.iter().all(|s| s.current_length <= 0.0)
    }

    /// Remove charge front-to-back. Returns the amount actually removed.
    pub fn drain(&mut self, draw: impl Into<Draw>) -> f64 {
        let requested = draw.into().amount();
        let mut remaining = requested;
        for segment in self.segments.iter_mut() {
            if remaining <= 0.0 {
                break;
            }
            let take = remaining.min(segment.charge);
            segment.charge -= take;
            remaining -= take;
        }
        requested - remaining
    }

    /// Remove exactly `amount` or nothing at all.
    pub fn try_drain(&mut self, amount: f64) -> bool {
        let amount = Draw::Amount(amount).amount();
        if self.total_charge() < amount {
            return false;
        }
        self.drain(amount);
        true
    }

    /// Add charge back-to-front. Returns the amount actually added.
    pub fn refill(&mut self, draw: impl Into<Draw>) -> f64 {
        let requested = draw.into().amount();
        let mut remaining = requested;
        for segment in self.segments.iter_mut().rev() {
            if remaining <= 0.0 {
                break;
            }
            let give = remaining.min(segment.headroom().max(0.0));
            segment.charge += give;
            remaining -= give;
        }
        requested - remaining
    }

    /// Permanently shrink capacity front-to-back, clamping charge in the same
    /// pass. Returns the capacity actually removed.
    pub fn apply_capacity_damage(&mut self, amount: f64) -> f64 {
        let requested = Draw::Amount(amount).amount();
        let mut remaining = requested;
        for segment in self.segments.iter_mut() {
            if remaining <= 0.0 {
                break;
            }
            let cut = remaining.min(segment.current_length);
            segment.current_length -= cut;
            segment.charge = segment.charge.min(segment.current_length);
            remaining -= cut;
        }
        requested - remaining
    }
}
