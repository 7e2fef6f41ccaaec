//! Weapon state machines.
//!
//! Every weapon shares one contract (`can_fire`, `fire`, `update`) over five
//! firing models. A `false` from `can_fire` or `None` from `fire` means
//! "not yet" and is never an error.

pub mod beam;
pub mod burst;
pub mod magazine;

use glam::DVec2;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use bastion_core::config::{ModelSpec, WeaponSpec};
use bastion_core::enums::{BeamStopReason, FiringModelKind, WeaponClass};
use bastion_core::error::TuningError;
use bastion_core::projectile::SpawnRequest;
use bastion_core::state::WeaponView;
use bastion_core::types::{ContactId, Kinematics, PowerModifier, ShipId};

use crate::reservoir::EnergyReservoir;

pub use beam::{Beam, BeamStop};
pub use burst::Burst;
pub use magazine::{EnergyCell, Magazine};

/// Model-specific state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FiringModel {
    FixedCooldown { cooldown: f64 },
    Beam(Beam),
    Burst(Burst),
    Magazine(Magazine),
    EnergyCell(EnergyCell),
}

impl FiringModel {
    fn from_spec(model: &ModelSpec) -> Self {
        match *model {
            ModelSpec::FixedCooldown { cooldown } => FiringModel::FixedCooldown { cooldown },
            ModelSpec::Beam {
                max_duration,
                drain_rate,
            } => FiringModel::Beam(Beam::new(max_duration, drain_rate)),
            ModelSpec::Burst {
                count,
                spacing,
                cooldown,
            } => FiringModel::Burst(Burst::new(count, spacing, cooldown)),
            ModelSpec::Magazine {
                capacity,
                stored,
                reload_secs,
                fire_interval,
            } => FiringModel::Magazine(Magazine::new(capacity, stored, reload_secs, fire_interval)),
            ModelSpec::EnergyCell {
                capacity,
                reload_secs,
                fire_interval,
                energy_cost,
            } => FiringModel::EnergyCell(EnergyCell::new(
                capacity,
                reload_secs,
                fire_interval,
                energy_cost,
            )),
        }
    }

    pub fn kind(&self) -> FiringModelKind {
        match self {
            FiringModel::FixedCooldown { .. } => FiringModelKind::FixedCooldown,
            FiringModel::Beam(_) => FiringModelKind::Beam,
            FiringModel::Burst(_) => FiringModelKind::Burst,
            FiringModel::Magazine(_) => FiringModelKind::Magazine,
            FiringModel::EnergyCell(_) => FiringModelKind::EnergyCell,
        }
    }
}

/// Everything `fire` needs from the owning ship and the host.
pub struct FireContext<'a> {
    pub ship: ShipId,
    pub owner: &'a Kinematics,
    pub reservoir: &'a mut EnergyReservoir,
    pub target: DVec2,
    pub now: f64,
    /// Target of a completed lock, if any. Only guided weapons use it.
    pub lock_target: Option<ContactId>,
    pub modifier: &'a PowerModifier,
}

/// Spawn requests produced by one trigger pull. Bursts carry several.
#[derive(Debug, Clone, PartialEq)]
pub struct Volley {
    pub requests: Vec<SpawnRequest>,
}

/// Side effects of one `update` call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeaponUpdate {
    /// Beam held this tick: (fixed origin, re-sampled endpoint).
    pub beam: Option<(DVec2, DVec2)>,
    pub beam_stopped: Option<BeamStop>,
}

/// A mounted weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    spec: WeaponSpec,
    slot: usize,
    /// Hull-relative mount offset.
    mount: DVec2,
    hp: f64,
    disabled: bool,
    last_fire_time: Option<f64>,
    model: FiringModel,
}

impl Weapon {
    pub fn new(spec: WeaponSpec, slot: usize, mount: DVec2) -> Result<Self, TuningError> {
        spec.validate()?;
        Ok(Self {
            model: FiringModel::from_spec(&spec.model),
            hp: spec.max_hp,
            spec,
            slot,
            mount,
            disabled: false,
            last_fire_time: None,
        })
    }

    pub fn spec(&self) -> &WeaponSpec {
        &self.spec
    }

    pub fn class(&self) -> WeaponClass {
        self.spec.class
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn mount(&self) -> DVec2 {
        self.mount
    }

    pub fn model(&self) -> &FiringModel {
        &self.model
    }

    pub fn hp(&self) -> f64 {
        self.hp
    }

    pub fn last_fire_time(&self) -> Option<f64> {
        self.last_fire_time
    }

    /// Knocked out by damage or by the host.
    pub fn is_disabled(&self) -> bool {
        self.disabled || self.hp <= 0.0
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_beam_firing(&self) -> bool {
        matches!(&self.model, FiringModel::Beam(beam) if beam.is_firing())
    }

    /// Reduce hp. Returns `true` if this call knocked the weapon out.
    pub fn apply_damage(&mut self, amount: f64) -> bool {
        if !(amount.is_finite() && amount > 0.0) {
            return false;
        }
        let was_disabled = self.is_disabled();
        self.hp = (self.hp - amount).max(0.0);
        !was_disabled && self.is_disabled()
    }

    fn seconds_since_fire(&self, now: f64) -> f64 {
        self.last_fire_time.map_or(f64::INFINITY, |t| now - t)
    }

    /// Pure guard. Energy-gated models report `false` when a reservoir is
    /// supplied that cannot cover them; without one only timing is checked.
    pub fn can_fire(
        &self,
        now: f64,
        reservoir: Option<&EnergyReservoir>,
        modifier: &PowerModifier,
    ) -> bool {
        if self.is_disabled() {
            return false;
        }
        let since = self.seconds_since_fire(now);
        match &self.model {
            FiringModel::FixedCooldown { cooldown } => since >= cooldown * modifier.cooldown_scale,
            FiringModel::Beam(beam) => {
                beam.can_fire(now) && reservoir.map_or(true, |r| !r.is_helpless())
            }
            FiringModel::Burst(burst) => since >= burst.cooldown() * modifier.cooldown_scale,
            FiringModel::Magazine(mag) => mag.can_fire(since),
            FiringModel::EnergyCell(cell) => {
                cell.can_fire(since) && reservoir.map_or(true, |r| r.total_charge() >= cell.energy_cost())
            }
        }
    }

    /// Pull the trigger. Returns `None` without touching any state when the
    /// weapon is not ready, the reservoir cannot pay, or the geometry is bad.
    pub fn fire(&mut self, ctx: FireContext<'_>) -> Option<Volley> {
        if !self.can_fire(ctx.now, Some(&*ctx.reservoir), ctx.modifier) {
            return None;
        }
        if !ctx.owner.is_finite() || !ctx.target.is_finite() {
            warn!(
                "{:?} slot {} refused to fire: non-finite geometry (owner {:?}, target {:?})",
                ctx.ship, self.slot, ctx.owner.position, ctx.target
            );
            return None;
        }

        let origin = ctx.owner.mount_point(self.mount);
        let heading = DVec2::from_angle(ctx.owner.rotation);
        let direction = (ctx.target - origin).try_normalize().unwrap_or(heading);
        let rotation = direction.y.atan2(direction.x);
        let homing_target = if self.spec.guided {
            ctx.lock_target
        } else {
            None
        };
        let shot = SpawnRequest {
            owner: ctx.ship,
            slot: self.slot,
            weapon: self.spec.class,
            kind: self.spec.projectile,
            origin,
            rotation,
            target: ctx.target,
            damage: self.spec.damage,
            speed: self.spec.speed,
            lifetime: self.spec.lifetime(),
            homing_target,
            penetrates_shields: self.spec.penetrates_shields,
            area_radius: self.spec.area_radius,
        };

        let requests = match &mut self.model {
            FiringModel::FixedCooldown { .. } => vec![shot],
            FiringModel::Beam(beam) => {
                beam.start(origin, ctx.target, ctx.now);
                vec![shot]
            }
            FiringModel::Burst(burst) => burst.volley(&shot, direction),
            FiringModel::Magazine(mag) => {
                mag.consume();
                vec![shot]
            }
            FiringModel::EnergyCell(cell) => {
                if !ctx.reservoir.try_drain(cell.energy_cost()) {
                    return None;
                }
                cell.consume();
                vec![shot]
            }
        };

        self.last_fire_time = Some(ctx.now);
        debug!(
            "{:?} slot {} fired {:?} x{}",
            ctx.ship,
            self.slot,
            self.spec.class,
            requests.len()
        );
        Some(Volley { requests })
    }

    /// Advance cooldown, reload, and beam bookkeeping by one tick. `aim` is
    /// the current aim point, used to re-sample a held beam's endpoint.
    pub fn update(
        &mut self,
        dt: f64,
        now: f64,
        reservoir: &mut EnergyReservoir,
        aim: Option<DVec2>,
    ) -> WeaponUpdate {
        let disabled = self.is_disabled();
        match &mut self.model {
            FiringModel::FixedCooldown { .. } | FiringModel::Burst(_) => WeaponUpdate::default(),
            FiringModel::Beam(beam) => {
                if disabled {
                    return WeaponUpdate {
                        beam: None,
                        beam_stopped: beam.stop(now, BeamStopReason::Disabled),
                    };
                }
                beam.update(dt, now, reservoir, aim)
            }
            FiringModel::Magazine(mag) => {
                mag.update(dt);
                WeaponUpdate::default()
            }
            FiringModel::EnergyCell(cell) => {
                cell.update(dt, reservoir);
                WeaponUpdate::default()
            }
        }
    }

    /// Let go of the trigger. Only beams react.
    pub fn release(&mut self, now: f64) -> Option<BeamStop> {
        match &mut self.model {
            FiringModel::Beam(beam) => beam.stop(now, BeamStopReason::Released),
            _ => None,
        }
    }

    /// Stop a held beam because the weapon was knocked out.
    pub fn interrupt(&mut self, now: f64) -> Option<BeamStop> {
        match &mut self.model {
            FiringModel::Beam(beam) => beam.stop(now, BeamStopReason::Disabled),
            _ => None,
        }
    }

    /// Seconds until timing allows another shot. Ammunition and energy are
    /// not considered.
    pub fn cooldown_remaining(&self, now: f64, modifier: &PowerModifier) -> f64 {
        let since = self.seconds_since_fire(now);
        let remaining = match &self.model {
            FiringModel::FixedCooldown { cooldown } => cooldown * modifier.cooldown_scale - since,
            FiringModel::Beam(beam) => beam.cooldown_until() - now,
            FiringModel::Burst(burst) => burst.cooldown() * modifier.cooldown_scale - since,
            FiringModel::Magazine(mag) => mag.fire_interval() - since,
            FiringModel::EnergyCell(cell) => cell.fire_interval() - since,
        };
        remaining.max(0.0)
    }

    pub fn view(
        &self,
        now: f64,
        reservoir: &EnergyReservoir,
        modifier: &PowerModifier,
    ) -> WeaponView {
        let (loaded, stored) = match &self.model {
            FiringModel::Magazine(mag) => (Some(mag.loaded()), Some(mag.stored())),
            FiringModel::EnergyCell(cell) => (Some(cell.loaded()), None),
            _ => (None, None),
        };
        WeaponView {
            slot: self.slot,
            class: self.spec.class,
            model: self.model.kind(),
            ready: self.can_fire(now, Some(reservoir), modifier),
            disabled: self.is_disabled(),
            hp: self.hp,
            cooldown_remaining: self.cooldown_remaining(now, modifier),
            loaded,
            stored,
            firing: self.is_beam_firing(),
        }
    }
}

/// Rotate a request's heading and target point about its origin.
pub fn apply_spread(request: &mut SpawnRequest, angle: f64) {
    if angle == 0.0 || !angle.is_finite() {
        return;
    }
    let rot = DVec2::from_angle(angle);
    request.target = request.origin + rot.rotate(request.target - request.origin);
    request.rotation += angle;
}
