//! Simultaneous burst: every shot spawns in the same tick, spread sideways
//! along parallel lines toward a target point captured once at the trigger.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use bastion_core::projectile::SpawnRequest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Burst {
    count: u32,
    /// Lateral distance between neighbouring shots.
    spacing: f64,
    cooldown: f64,
}

impl Burst {
    pub fn new(count: u32, spacing: f64, cooldown: f64) -> Self {
        Self {
            count,
            spacing,
            cooldown,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn cooldown(&self) -> f64 {
        self.cooldown
    }

    /// Copies of `shot` offset perpendicular to `direction`, centred on the
    /// firing line.
    pub(crate) fn volley(&self, shot: &SpawnRequest, direction: DVec2) -> Vec<SpawnRequest> {
        let lateral = direction.perp();
        let centre = (self.count as f64 - 1.0) / 2.0;
        (0..self.count)
            .map(|i| {
                let offset = lateral * ((i as f64 - centre) * self.spacing);
                SpawnRequest {
                    origin: shot.origin + offset,
                    target: shot.target + offset,
                    ..shot.clone()
                }
            })
            .collect()
    }
}
