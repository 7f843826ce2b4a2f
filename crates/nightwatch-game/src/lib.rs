//! Nightwatch: game session bounded context.
//!
//! Responsible for the player roster, the role pool and its randomized
//! distribution, the majority vote that starts a game, and the perpetual
//! day/night clock that drives the game once started.

pub mod application;
pub mod domain;
