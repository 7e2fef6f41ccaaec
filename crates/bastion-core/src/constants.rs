//! Default tuning parameters.
//!
//! These seed `CombatTuning::default()` and `WeaponSpec::preset`. Simulation
//! code reads the injected tuning, never these constants directly.

// --- Reservoir ---

/// Capacity of one undamaged reservoir segment.
pub const SEGMENT_LENGTH: f64 = 100.0;

/// Passive generator refill (charge per second).
pub const RESERVOIR_REFILL_RATE: f64 = 8.0;

// --- Deflector ---

/// Maximum deflector strength pool.
pub const DEFLECTOR_MAX_STRENGTH: f64 = 120.0;

/// Strength regenerated per second while the deflector is down.
pub const DEFLECTOR_REGEN_RATE: f64 = 12.0;

/// Reservoir drain per second while the deflector is up.
pub const DEFLECTOR_DRAIN_RATE: f64 = 5.0;

/// Reservoir drained per point of incoming damage while up.
pub const DEFLECTOR_HIT_DRAIN_RATIO: f64 = 0.5;

/// Duration of the hit flash after an absorbed hit (seconds).
pub const DEFLECTOR_HIT_FLASH_SECS: f64 = 0.25;

// --- Absorption field ---

/// Reservoir charge gained per point of absorbed damage.
pub const ABSORPTION_CONVERSION_RATIO: f64 = 0.5;

/// Reservoir drain per second while the field is up.
pub const ABSORPTION_DRAIN_RATE: f64 = 4.0;

// --- Target lock ---

/// Detection radius as a multiple of the contact's physical radius.
pub const LOCK_DETECTION_RADIUS_MULTIPLIER: f64 = 6.0;

/// Tolerance band as a multiple of the detection radius.
pub const LOCK_DRIFT_TOLERANCE_MULTIPLIER: f64 = 3.0;

/// Acquisition time with a perfectly steady aim (seconds).
pub const LOCK_MIN_SECS: f64 = 3.0;

/// Acquisition time with a maximally unstable aim (seconds).
pub const LOCK_MAX_SECS: f64 = 5.0;

/// Accumulated degradation at which a lock breaks (seconds).
pub const LOCK_LOSS_TIMEOUT_SECS: f64 = 2.5;

/// Aim speed (world units per second) treated as fully unstable.
pub const LOCK_UNSTABLE_AIM_SPEED: f64 = 300.0;

/// Exponential smoothing weight of the newest aim-speed sample.
pub const LOCK_AIM_SPEED_SMOOTHING: f64 = 0.2;

/// Degradation rate at the outer edge of the tolerance band
/// (the inner edge degrades at 1.0).
pub const LOCK_LOSS_RATE_AT_EDGE: f64 = 2.0;

// --- Power modes ---

pub const OFFENSIVE_COOLDOWN_SCALE: f64 = 0.8;
pub const OFFENSIVE_POSTURE_DRAIN_SCALE: f64 = 1.25;
pub const DEFENSIVE_COOLDOWN_SCALE: f64 = 1.25;
pub const DEFENSIVE_POSTURE_DRAIN_SCALE: f64 = 0.75;
pub const DEFENSIVE_REFILL_SCALE: f64 = 1.2;

// --- Pulse laser (fixed cooldown) ---

pub const PULSE_LASER_DAMAGE: f64 = 8.0;
pub const PULSE_LASER_RANGE: f64 = 900.0;
pub const PULSE_LASER_SPEED: f64 = 1200.0;
pub const PULSE_LASER_COOLDOWN: f64 = 0.4;

// --- Lance (beam) ---

/// Damage per second while the beam is held on target.
pub const LANCE_DAMAGE_PER_SEC: f64 = 30.0;
pub const LANCE_RANGE: f64 = 700.0;

/// Longest continuous burn before the beam cuts out (seconds).
pub const LANCE_MAX_DURATION: f64 = 5.0;

/// Reservoir drain per second while firing.
pub const LANCE_DRAIN_RATE: f64 = 10.0;

// --- Flak (burst) ---

pub const FLAK_DAMAGE: f64 = 4.0;
pub const FLAK_RANGE: f64 = 450.0;
pub const FLAK_SPEED: f64 = 800.0;
pub const FLAK_COOLDOWN: f64 = 1.5;
pub const FLAK_BURST_COUNT: u32 = 5;

/// Lateral spacing between parallel shots of a burst (world units).
pub const FLAK_SPACING: f64 = 6.0;
pub const FLAK_AREA_RADIUS: f64 = 20.0;

// --- Autocannon (magazine) ---

pub const AUTOCANNON_DAMAGE: f64 = 6.0;
pub const AUTOCANNON_RANGE: f64 = 800.0;
pub const AUTOCANNON_SPEED: f64 = 1000.0;
pub const AUTOCANNON_FIRE_INTERVAL: f64 = 0.15;
pub const AUTOCANNON_MAGAZINE: u32 = 12;
pub const AUTOCANNON_STORED: u32 = 120;
pub const AUTOCANNON_RELOAD_SECS: f64 = 0.5;

// --- Torpedo (magazine, guided) ---

pub const TORPEDO_DAMAGE: f64 = 60.0;
pub const TORPEDO_RANGE: f64 = 1600.0;
pub const TORPEDO_SPEED: f64 = 400.0;
pub const TORPEDO_FIRE_INTERVAL: f64 = 1.0;
pub const TORPEDO_MAGAZINE: u32 = 2;
pub const TORPEDO_STORED: u32 = 8;
pub const TORPEDO_RELOAD_SECS: f64 = 6.0;
pub const TORPEDO_AREA_RADIUS: f64 = 40.0;

// --- Ion cannon (energy cell) ---

pub const ION_CANNON_DAMAGE: f64 = 25.0;
pub const ION_CANNON_RANGE: f64 = 1000.0;
pub const ION_CANNON_SPEED: f64 = 900.0;
pub const ION_CANNON_FIRE_INTERVAL: f64 = 0.8;
pub const ION_CANNON_CELLS: u32 = 3;
pub const ION_CANNON_RELOAD_SECS: f64 = 2.0;

/// Reservoir energy consumed per shot and per reload increment.
pub const ION_CANNON_ENERGY_COST: f64 = 15.0;

// --- Aim spread (radians, full cone half-angle) ---

pub const AUTOCANNON_SPREAD: f64 = 0.03;
pub const FLAK_SPREAD: f64 = 0.05;
