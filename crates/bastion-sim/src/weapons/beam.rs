//! Continuous beam with a dynamic cooldown.
//!
//! The cooldown after a burn equals the length of the burn (capped at
//! `max_duration`). The origin is fixed when the beam starts; the endpoint
//! follows the aim point every tick. The beam drains the reservoir while
//! held and cuts out when the reservoir runs dry or the cap is reached.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use bastion_core::enums::BeamStopReason;

use super::WeaponUpdate;
use crate::reservoir::{Draw, EnergyReservoir};

/// How and after how long a beam stopped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamStop {
    pub duration_secs: f64,
    pub reason: BeamStopReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct ActiveBeam {
    origin: DVec2,
    endpoint: DVec2,
    started_at: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    max_duration: f64,
    drain_rate: f64,
    active: Option<ActiveBeam>,
    cooldown_until: f64,
    last_duration: f64,
}

impl Beam {
    pub fn new(max_duration: f64, drain_rate: f64) -> Self {
        Self {
            max_duration,
            drain_rate,
            active: None,
            cooldown_until: f64::NEG_INFINITY,
            last_duration: 0.0,
        }
    }

    pub fn is_firing(&self) -> bool {
        self.active.is_some()
    }

    pub fn can_fire(&self, now: f64) -> bool {
        self.active.is_none() && now >= self.cooldown_until
    }

    pub fn cooldown_until(&self) -> f64 {
        self.cooldown_until
    }

    /// Length of the most recent completed burn.
    pub fn last_duration(&self) -> f64 {
        self.last_duration
    }

    pub fn origin(&self) -> Option<DVec2> {
        self.active.map(|a| a.origin)
    }

    pub fn endpoint(&self) -> Option<DVec2> {
        self.active.map(|a| a.endpoint)
    }

    pub(crate) fn start(&mut self, origin: DVec2, target: DVec2, now: f64) {
        self.active = Some(ActiveBeam {
            origin,
            endpoint: target,
            started_at: now,
        });
    }

    pub(crate) fn update(
        &mut self,
        dt: f64,
        now: f64,
        reservoir: &mut EnergyReservoir,
        aim: Option<DVec2>,
    ) -> WeaponUpdate {
        let Some(active) = self.active.as_mut() else {
            return WeaponUpdate::default();
        };
        if let Some(aim) = aim.filter(|a| a.is_finite()) {
            active.endpoint = aim;
        }
        let trace = (active.origin, active.endpoint);
        let started_at = active.started_at;

        let draw = Draw::Rate {
            per_sec: self.drain_rate,
            dt,
        };
        let drained = reservoir.drain(draw);

        if now - started_at >= self.max_duration {
            return WeaponUpdate {
                beam: None,
                beam_stopped: self.stop(now, BeamStopReason::DurationCap),
            };
        }
        if drained < draw.amount() || reservoir.is_helpless() {
            return WeaponUpdate {
                beam: None,
                beam_stopped: self.stop(now, BeamStopReason::Depleted),
            };
        }
        WeaponUpdate {
            beam: Some(trace),
            beam_stopped: None,
        }
    }

    /// End the burn at `now`. The burn length becomes the cooldown even when
    /// the stop was forced.
    pub(crate) fn stop(&mut self, now: f64, reason: BeamStopReason) -> Option<BeamStop> {
        let active = self.active.take()?;
        let duration = (now - active.started_at).clamp(0.0, self.max_duration);
        self.last_duration = duration;
        self.cooldown_until = now + duration;
        Some(BeamStop {
            duration_secs: duration,
            reason,
        })
    }
}
