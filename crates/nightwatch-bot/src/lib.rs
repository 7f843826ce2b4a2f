//! Nightwatch bot: the chat adapter around the game session.
//!
//! Text commands arrive over HTTP or the console, are parsed into session
//! commands, and are executed one at a time by the [`runtime::SessionActor`].
//! The events each command produces are rendered and delivered through a
//! [`nightwatch_core::outbound::MessageSink`].

pub mod config;
pub mod console;
pub mod delivery;
pub mod error;
pub mod parser;
pub mod render;
pub mod routes;
pub mod runtime;
pub mod sinks;
pub mod state;
