//! Target lock for BASTION.
//!
//! Implements the adaptive acquisition timer, the lock/degrade/break state
//! machine, and aim-stability tracking. Operates on plain data supplied by
//! the caller each tick; no ECS dependency.

pub mod aim;
pub mod lock;

pub use bastion_core as core;
pub use lock::{LockInput, LockSignal, TargetLock};
