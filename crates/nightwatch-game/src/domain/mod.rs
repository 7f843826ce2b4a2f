//! Domain model for the game session context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod phase_clock;
pub mod policy;
pub mod role_assigner;
pub mod role_config;
pub mod vote_gate;
