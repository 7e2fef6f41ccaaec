//! Injected tunables.
//!
//! Every rate, ratio, and threshold the simulation uses comes from a
//! `CombatTuning` handed to the engine at construction. Defaults mirror
//! `constants`; a JSON document may override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::{PowerMode, ProjectileKind, WeaponClass};
use crate::error::TuningError;
use crate::types::PowerModifier;

/// Complete tuning set for one simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub reservoir: ReservoirTuning,
    pub deflector: DeflectorTuning,
    pub absorption: AbsorptionTuning,
    pub lock: LockTuning,
    pub power_modes: PowerModeTuning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservoirTuning {
    /// Capacity of one undamaged segment.
    pub segment_length: f64,
    /// Passive generator refill (charge per second).
    pub refill_rate: f64,
}

impl Default for ReservoirTuning {
    fn default() -> Self {
        Self {
            segment_length: SEGMENT_LENGTH,
            refill_rate: RESERVOIR_REFILL_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeflectorTuning {
    pub max_strength: f64,
    pub regen_rate: f64,
    pub drain_rate: f64,
    pub hit_drain_ratio: f64,
    pub hit_flash_secs: f64,
}

impl Default for DeflectorTuning {
    fn default() -> Self {
        Self {
            max_strength: DEFLECTOR_MAX_STRENGTH,
            regen_rate: DEFLECTOR_REGEN_RATE,
            drain_rate: DEFLECTOR_DRAIN_RATE,
            hit_drain_ratio: DEFLECTOR_HIT_DRAIN_RATIO,
            hit_flash_secs: DEFLECTOR_HIT_FLASH_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbsorptionTuning {
    pub conversion_ratio: f64,
    pub drain_rate: f64,
}

impl Default for AbsorptionTuning {
    fn default() -> Self {
        Self {
            conversion_ratio: ABSORPTION_CONVERSION_RATIO,
            drain_rate: ABSORPTION_DRAIN_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockTuning {
    pub detection_radius_multiplier: f64,
    pub drift_tolerance_multiplier: f64,
    pub min_lock_secs: f64,
    pub max_lock_secs: f64,
    pub loss_timeout_secs: f64,
    pub unstable_aim_speed: f64,
    pub aim_speed_smoothing: f64,
    pub loss_rate_at_edge: f64,
}

impl Default for LockTuning {
    fn default() -> Self {
        Self {
            detection_radius_multiplier: LOCK_DETECTION_RADIUS_MULTIPLIER,
            drift_tolerance_multiplier: LOCK_DRIFT_TOLERANCE_MULTIPLIER,
            min_lock_secs: LOCK_MIN_SECS,
            max_lock_secs: LOCK_MAX_SECS,
            loss_timeout_secs: LOCK_LOSS_TIMEOUT_SECS,
            unstable_aim_speed: LOCK_UNSTABLE_AIM_SPEED,
            aim_speed_smoothing: LOCK_AIM_SPEED_SMOOTHING,
            loss_rate_at_edge: LOCK_LOSS_RATE_AT_EDGE,
        }
    }
}

/// Modifier per power mode. `Balanced` is always neutral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerModeTuning {
    pub offensive: PowerModifier,
    pub defensive: PowerModifier,
}

impl Default for PowerModeTuning {
    fn default() -> Self {
        Self {
            offensive: PowerModifier {
                cooldown_scale: OFFENSIVE_COOLDOWN_SCALE,
                posture_drain_scale: OFFENSIVE_POSTURE_DRAIN_SCALE,
                refill_scale: 1.0,
            },
            defensive: PowerModifier {
                cooldown_scale: DEFENSIVE_COOLDOWN_SCALE,
                posture_drain_scale: DEFENSIVE_POSTURE_DRAIN_SCALE,
                refill_scale: DEFENSIVE_REFILL_SCALE,
            },
        }
    }
}

impl PowerModeTuning {
    pub fn modifier(&self, mode: PowerMode) -> PowerModifier {
        match mode {
            PowerMode::Balanced => PowerModifier::NEUTRAL,
            PowerMode::Offensive => self.offensive,
            PowerMode::Defensive => self.defensive,
        }
    }
}

impl CombatTuning {
    /// Parse a (possibly partial) JSON tuning document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: CombatTuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let r = &self.reservoir;
        non_negative("reservoir.refill_rate", r.refill_rate)?;
        positive("reservoir.segment_length", r.segment_length)?;

        let d = &self.deflector;
        positive("deflector.max_strength", d.max_strength)?;
        non_negative("deflector.regen_rate", d.regen_rate)?;
        non_negative("deflector.drain_rate", d.drain_rate)?;
        non_negative("deflector.hit_drain_ratio", d.hit_drain_ratio)?;
        non_negative("deflector.hit_flash_secs", d.hit_flash_secs)?;

        let a = &self.absorption;
        non_negative("absorption.conversion_ratio", a.conversion_ratio)?;
        non_negative("absorption.drain_rate", a.drain_rate)?;

        let l = &self.lock;
        positive("lock.detection_radius_multiplier", l.detection_radius_multiplier)?;
        at_least(
            "lock.drift_tolerance_multiplier",
            1.0,
            l.drift_tolerance_multiplier,
        )?;
        non_negative("lock.min_lock_secs", l.min_lock_secs)?;
        non_negative("lock.max_lock_secs", l.max_lock_secs)?;
        if l.min_lock_secs > l.max_lock_secs {
            return Err(TuningError::LockWindowInverted {
                min: l.min_lock_secs,
                max: l.max_lock_secs,
            });
        }
        positive("lock.loss_timeout_secs", l.loss_timeout_secs)?;
        positive("lock.unstable_aim_speed", l.unstable_aim_speed)?;
        non_negative("lock.aim_speed_smoothing", l.aim_speed_smoothing)?;
        if l.aim_speed_smoothing > 1.0 {
            return Err(TuningError::InvalidValue {
                field: "lock.aim_speed_smoothing",
                value: l.aim_speed_smoothing,
            });
        }
        at_least("lock.loss_rate_at_edge", 1.0, l.loss_rate_at_edge)?;

        for m in [&self.power_modes.offensive, &self.power_modes.defensive] {
            non_negative("power_modes.*.cooldown_scale", m.cooldown_scale)?;
            non_negative("power_modes.*.posture_drain_scale", m.posture_drain_scale)?;
            non_negative("power_modes.*.refill_scale", m.refill_scale)?;
        }
        Ok(())
    }
}

/// Firing-model parameters. Each variant's fields only mean something for
/// that model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model")]
pub enum ModelSpec {
    FixedCooldown {
        cooldown: f64,
    },
    Beam {
        max_duration: f64,
        drain_rate: f64,
    },
    Burst {
        count: u32,
        spacing: f64,
        cooldown: f64,
    },
    Magazine {
        capacity: u32,
        stored: u32,
        reload_secs: f64,
        fire_interval: f64,
    },
    EnergyCell {
        capacity: u32,
        reload_secs: f64,
        fire_interval: f64,
        energy_cost: f64,
    },
}

/// Static parameters of one weapon type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponSpec {
    pub class: WeaponClass,
    pub projectile: ProjectileKind,
    /// Damage per projectile; for beams, damage per second.
    pub damage: f64,
    pub range: f64,
    /// Projectile speed; zero for beams.
    pub speed: f64,
    /// Half-angle of the aim cone (radians).
    pub spread: f64,
    pub max_hp: f64,
    /// Homes on the locked target when one is held.
    pub guided: bool,
    pub penetrates_shields: bool,
    pub area_radius: Option<f64>,
    pub model: ModelSpec,
}

impl WeaponSpec {
    pub fn preset(class: WeaponClass) -> Self {
        match class {
            WeaponClass::PulseLaser => WeaponSpec {
                class,
                projectile: ProjectileKind::Bolt,
                damage: PULSE_LASER_DAMAGE,
                range: PULSE_LASER_RANGE,
                speed: PULSE_LASER_SPEED,
                spread: 0.0,
                max_hp: 30.0,
                guided: false,
                penetrates_shields: false,
                area_radius: None,
                model: ModelSpec::FixedCooldown {
                    cooldown: PULSE_LASER_COOLDOWN,
                },
            },
            WeaponClass::Lance => WeaponSpec {
                class,
                projectile: ProjectileKind::Beam,
                damage: LANCE_DAMAGE_PER_SEC,
                range: LANCE_RANGE,
                speed: 0.0,
                spread: 0.0,
                max_hp: 40.0,
                guided: false,
                penetrates_shields: false,
                area_radius: None,
                model: ModelSpec::Beam {
                    max_duration: LANCE_MAX_DURATION,
                    drain_rate: LANCE_DRAIN_RATE,
                },
            },
            WeaponClass::Flak => WeaponSpec {
                class,
                projectile: ProjectileKind::Shell,
                damage: FLAK_DAMAGE,
                range: FLAK_RANGE,
                speed: FLAK_SPEED,
                spread: FLAK_SPREAD,
                max_hp: 30.0,
                guided: false,
                penetrates_shields: false,
                area_radius: Some(FLAK_AREA_RADIUS),
                model: ModelSpec::Burst {
                    count: FLAK_BURST_COUNT,
                    spacing: FLAK_SPACING,
                    cooldown: FLAK_COOLDOWN,
                },
            },
            WeaponClass::Autocannon => WeaponSpec {
                class,
                projectile: ProjectileKind::Slug,
                damage: AUTOCANNON_DAMAGE,
                range: AUTOCANNON_RANGE,
                speed: AUTOCANNON_SPEED,
                spread: AUTOCANNON_SPREAD,
                max_hp: 35.0,
                guided: false,
                penetrates_shields: false,
                area_radius: None,
                model: ModelSpec::Magazine {
                    capacity: AUTOCANNON_MAGAZINE,
                    stored: AUTOCANNON_STORED,
                    reload_secs: AUTOCANNON_RELOAD_SECS,
                    fire_interval: AUTOCANNON_FIRE_INTERVAL,
                },
            },
            WeaponClass::Torpedo => WeaponSpec {
                class,
                projectile: ProjectileKind::Missile,
                damage: TORPEDO_DAMAGE,
                range: TORPEDO_RANGE,
                speed: TORPEDO_SPEED,
                spread: 0.0,
                max_hp: 25.0,
                guided: true,
                penetrates_shields: false,
                area_radius: Some(TORPEDO_AREA_RADIUS),
                model: ModelSpec::Magazine {
                    capacity: TORPEDO_MAGAZINE,
                    stored: TORPEDO_STORED,
                    reload_secs: TORPEDO_RELOAD_SECS,
                    fire_interval: TORPEDO_FIRE_INTERVAL,
                },
            },
            WeaponClass::IonCannon => WeaponSpec {
                class,
                projectile: ProjectileKind::Ion,
                damage: ION_CANNON_DAMAGE,
                range: ION_CANNON_RANGE,
                speed: ION_CANNON_SPEED,
                spread: 0.0,
                max_hp: 30.0,
                guided: false,
                penetrates_shields: true,
                area_radius: None,
                model: ModelSpec::EnergyCell {
                    capacity: ION_CANNON_CELLS,
                    reload_secs: ION_CANNON_RELOAD_SECS,
                    fire_interval: ION_CANNON_FIRE_INTERVAL,
                    energy_cost: ION_CANNON_ENERGY_COST,
                },
            },
        }
    }

    /// Seconds a projectile lives before expiring: range over speed.
    /// Beams live for their maximum burn.
    pub fn lifetime(&self) -> f64 {
        match self.model {
            ModelSpec::Beam { max_duration, .. } => max_duration,
            _ if self.speed > 0.0 => self.range / self.speed,
            _ => 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid = |reason| TuningError::InvalidWeapon {
            class: self.class,
            reason,
        };
        let ok = |v: f64| v.is_finite() && v >= 0.0;
        if !ok(self.damage) || !ok(self.range) || !ok(self.speed) || !ok(self.spread) {
            return Err(invalid("damage, range, speed and spread must be non-negative"));
        }
        if !(self.max_hp.is_finite() && self.max_hp > 0.0) {
            return Err(invalid("max_hp must be positive"));
        }
        match self.model {
            ModelSpec::FixedCooldown { cooldown } if !ok(cooldown) => {
                Err(invalid("cooldown must be non-negative"))
            }
            ModelSpec::Beam {
                max_duration,
                drain_rate,
            } if !(ok(drain_rate) && max_duration.is_finite() && max_duration > 0.0) => {
                Err(invalid("beam needs a positive duration cap and non-negative drain"))
            }
            ModelSpec::Burst {
                count,
                spacing,
                cooldown,
            } if count == 0 || !ok(spacing) || !ok(cooldown) => {
                Err(invalid("burst needs at least one shot"))
            }
            ModelSpec::Magazine {
                capacity,
                reload_secs,
                fire_interval,
                ..
            } if capacity == 0 || !ok(reload_secs) || !ok(fire_interval) => {
                Err(invalid("magazine needs capacity and non-negative timings"))
            }
            ModelSpec::EnergyCell {
                capacity,
                reload_secs,
                fire_interval,
                energy_cost,
            } if capacity == 0 || !ok(reload_secs) || !ok(fire_interval) || !ok(energy_cost) => {
                Err(invalid("energy cell needs capacity and non-negative cost"))
            }
            _ => Ok(()),
        }
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::InvalidValue { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), TuningError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TuningError::InvalidValue { field, value })
    }
}

fn at_least(field: &'static str, min: f64, value: f64) -> Result<(), TuningError> {
    non_negative(field, value)?;
    if value < min {
        return Err(TuningError::BelowMinimum { field, min, value });
    }
    Ok(())
}
