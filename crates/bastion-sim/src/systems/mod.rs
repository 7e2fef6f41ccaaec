//! ECS systems that advance ship entities each tick.
//!
//! Systems are plain functions over `&mut World`. They own no state; every
//! piece of ship state lives in a component.

pub mod lock;
pub mod posture;
pub mod power;
pub mod status;
pub mod weapons;
