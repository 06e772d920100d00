// Shared state handed to every command, listener and slash command.

use crate::core::commands::{CommandGate, CommandRunEvent};
use crate::core::leveling::LevelingService;
use crate::core::registry::Registry;
use crate::discord::commands::PrefixCommand;
use crate::discord::errors::ErrorReporter;
use crate::discord::events::EventListener;
use crate::infra::commands::InMemoryCooldownStore;
use crate::infra::leveling::SqliteLevelStore;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

pub type CommandRegistry = Registry<dyn PrefixCommand>;
pub type EventRegistry = Registry<dyn EventListener>;

pub struct Data {
    pub prefix: String,
    pub commands: Arc<RwLock<CommandRegistry>>,
    pub events: Arc<RwLock<EventRegistry>>,
    pub gate: Arc<CommandGate<InMemoryCooldownStore>>,
    pub leveling: Arc<LevelingService<SqliteLevelStore>>,
    pub reporter: Arc<ErrorReporter>,
    /// Fires after every prefix command that reports `CommandResult::Done`.
    pub command_runs: broadcast::Sender<CommandRunEvent>,
}
