use crate::core::commands::{CommandOptions, CommandResult, Invocation};
use crate::discord::commands::PrefixCommand;
use crate::discord::replies::{send_styled, ReplyStyle};
use crate::discord::{Data, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub const SOURCE: &str = file!();

pub fn build() -> Arc<dyn PrefixCommand> {
    Arc::new(Unload {
        options: CommandOptions::new("unload", SOURCE)
            .description("Unload a command until it is reloaded.")
            .usage("<command>")
            .required_arg("command")
            .dev_only(),
    })
}

struct Unload {
    options: CommandOptions,
}

#[async_trait]
impl PrefixCommand for Unload {
    fn options(&self) -> &CommandOptions {
        &self.options
    }

    async fn run(
        &self,
        ctx: &serenity::Context,
        msg: &serenity::Message,
        data: &Data,
        invocation: &Invocation,
    ) -> Result<CommandResult, Error> {
        let Some(name) = invocation.args.first() else {
            return Ok(CommandResult::Incomplete);
        };

        let outcome = {
            let mut registry = data.commands.write().await;
            match registry.get(name) {
                None => Err(format!("There is no command called `{}`", name)),
                // reload has to stay loaded.
                Some(command) if command.options().source == super::reload::SOURCE => {
                    Err("The reload command can't be unloaded".to_string())
                }
                Some(command) => {
                    registry.unload(command.options().source);
                    Ok(command.options().name.clone())
                }
            }
        };

        match outcome {
            Ok(unloaded) => {
                tracing::info!(command = %unloaded, by = msg.author.id.get(), "Command unloaded");
                send_styled(
                    ctx,
                    msg.channel_id,
                    ReplyStyle::Success,
                    format!("Unloaded `{}`", unloaded),
                )
                .await?;
                Ok(CommandResult::Done)
            }
            Err(text) => {
                send_styled(ctx, msg.channel_id, ReplyStyle::Warn, text).await?;
                Ok(CommandResult::Incomplete)
            }
        }
    }
}
