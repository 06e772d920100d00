// Discord layer - commands, event listeners and the adapters that connect
// serenity messages to the core services.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "events/event_catalog.rs"]
pub mod events;

#[path = "errors/error_reporter.rs"]
pub mod errors;

#[path = "leveling/mod.rs"]
pub mod leveling;

#[path = "lookup/resolvers.rs"]
pub mod lookup;

pub mod data;
pub mod replies;

pub use data::{Context, Data, Error};
