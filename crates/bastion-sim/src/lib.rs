//! Combat core for BASTION ships.
//!
//! Owns a hecs world of ship entities and advances their energy reservoirs,
//! defensive postures, weapons, and target locks in a fixed order each tick.
//! Headless: the host supplies geometry and contacts and receives spawn
//! requests, beam traces, and events back.

pub mod engine;
pub mod posture;
pub mod reservoir;
pub mod ship;
pub mod systems;
pub mod weapons;

pub use bastion_core as core;
pub use engine::{SimConfig, SimulationEngine};

#[cfg(test)]
mod tests;
