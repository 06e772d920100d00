// Discord commands module.
//
// Prefix commands are registered explicitly: every command module exposes a
// `SOURCE` key and a `build` factory, and `catalog()` lists them. Adding a
// command means adding a module here and a line to the catalog.

use crate::core::commands::{CommandOptions, CommandResult, Invocation};
use crate::core::registry::{Handler, HandlerFactory};
use crate::discord::{Data, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;

pub mod help;
pub mod kick;
pub mod leaderboard;
pub mod message_gate;
pub mod ping;
pub mod rank;
pub mod reload;
pub mod set_level_role;
pub mod unload;

/// A chat command triggered by the configured prefix.
#[async_trait]
pub trait PrefixCommand: Send + Sync {
    fn options(&self) -> &CommandOptions;

    /// Runs only after the gate's checks pass.
    async fn run(
        &self,
        ctx: &serenity::Context,
        msg: &serenity::Message,
        data: &Data,
        invocation: &Invocation,
    ) -> Result<CommandResult, Error>;
}

impl Handler for dyn PrefixCommand {
    fn name(&self) -> &str {
        &self.options().name
    }

    fn source(&self) -> &str {
        self.options().source
    }

    fn aliases(&self) -> Vec<String> {
        self.options().aliases.clone()
    }
}

/// Every prefix command the bot ships with.
pub fn catalog() -> Vec<HandlerFactory<dyn PrefixCommand>> {
    vec![
        HandlerFactory::new(help::SOURCE, help::build),
        HandlerFactory::new(kick::SOURCE, kick::build),
        HandlerFactory::new(leaderboard::SOURCE, leaderboard::build),
        HandlerFactory::new(ping::SOURCE, ping::build),
        HandlerFactory::new(rank::SOURCE, rank::build),
        HandlerFactory::new(reload::SOURCE, reload::build),
        HandlerFactory::new(set_level_role::SOURCE, set_level_role::build),
        HandlerFactory::new(unload::SOURCE, unload::build),
    ]
}
