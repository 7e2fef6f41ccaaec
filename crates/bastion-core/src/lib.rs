//! Core types and definitions for the BASTION combat simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometry, tunables, commands, projectile requests, events, status
//! snapshots, and default constants. It has no dependency on the ECS or on
//! any host framework.

pub mod commands;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod projectile;
pub mod state;
pub mod types;
