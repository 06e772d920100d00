// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "commands/in_memory_cooldowns.rs"]
pub mod commands;

#[path = "leveling/leveling_store.rs"]
pub mod leveling;
