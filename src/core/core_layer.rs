// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "commands/mod.rs"]
pub mod commands;

#[path = "leveling/leveling_service.rs"]
pub mod leveling;

#[path = "lookup/lookup_matching.rs"]
pub mod lookup;

#[path = "registry/handler_registry.rs"]
pub mod registry;

#[path = "reporting/error_report.rs"]
pub mod reporting;
