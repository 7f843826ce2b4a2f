//! Nightwatch core: shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that the game
//! context and the chat adapter depend on. It contains no infrastructure
//! code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod outbound;
pub mod player;
pub mod rng;
pub mod timer;
