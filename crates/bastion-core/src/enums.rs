//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Hull class chosen at ship assembly. Fixes reservoir segment layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HullClass {
    Corvette,
    #[default]
    Frigate,
    Cruiser,
    Dreadnought,
}

impl HullClass {
    /// Number of reservoir segments.
    pub fn segment_count(self) -> usize {
        match self {
            HullClass::Corvette => 1,
            HullClass::Frigate => 2,
            HullClass::Cruiser => 3,
            HullClass::Dreadnought => 4,
        }
    }
}

/// Which defensive posture a ship mounts. Selected once at assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostureKind {
    #[default]
    Deflector,
    AbsorptionField,
}

/// Concrete weapon type. Each class maps to exactly one firing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponClass {
    /// Fixed-cooldown discrete bolt.
    PulseLaser,
    /// Continuous beam with dynamic cooldown.
    Lance,
    /// Simultaneous parallel burst.
    Flak,
    /// Magazine-fed slug thrower.
    Autocannon,
    /// Magazine-fed guided munition; homes on a locked target.
    Torpedo,
    /// Energy-fed shot that ignores deflectors.
    IonCannon,
}

impl WeaponClass {
    pub fn firing_model(self) -> FiringModelKind {
        match self {
            WeaponClass::PulseLaser => FiringModelKind::FixedCooldown,
            WeaponClass::Lance => FiringModelKind::Beam,
            WeaponClass::Flak => FiringModelKind::Burst,
            WeaponClass::Autocannon | WeaponClass::Torpedo => FiringModelKind::Magazine,
            WeaponClass::IonCannon => FiringModelKind::EnergyCell,
        }
    }
}

/// Firing model discriminant, for status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiringModelKind {
    FixedCooldown,
    Beam,
    Burst,
    Magazine,
    EnergyCell,
}

/// Shape of a spawned projectile, for the host's spawner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Bolt,
    Beam,
    Shell,
    Slug,
    Missile,
    Ion,
}

/// Target lock phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockPhase {
    #[default]
    Idle,
    Acquiring,
    Locked,
}

/// Why a lock or acquisition ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockBreakReason {
    /// Aim point left the tolerance band.
    OutOfTolerance,
    /// Aim drifted inside the tolerance band for longer than the loss timeout.
    Degraded,
    /// Target inactive, cloaked, or no longer reported.
    TargetLost,
}

/// Why a beam stopped firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeamStopReason {
    Released,
    Depleted,
    DurationCap,
    Disabled,
}

/// Ship-wide power allocation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerMode {
    #[default]
    Balanced,
    Offensive,
    Defensive,
}
