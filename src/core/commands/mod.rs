// Core command handling - parsing, cooldowns and the execution gate.
// No Discord types in here; the discord layer adapts messages into these.

pub mod command_gate;
pub mod command_models;
pub mod cooldown;
pub mod invocation;

pub use command_gate::{
    CommandGate, CommandRunEvent, GateRejection, GateRequest, GrantedPermissions,
    PermissionSnapshot,
};
pub use command_models::{CommandOptions, CommandResult, DeveloperSet, SEND_MESSAGES};
pub use cooldown::{format_remaining, CooldownStore};
pub use invocation::{parse_invocation, Invocation};
