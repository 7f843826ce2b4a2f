//! Application services for the game session context.

pub mod command_handlers;
pub mod query_handlers;
