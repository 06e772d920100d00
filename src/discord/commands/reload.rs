use crate::core::commands::{CommandOptions, CommandResult, Invocation};
use crate::discord::commands::PrefixCommand;
use crate::discord::replies::{send_styled, ReplyStyle};
use crate::discord::{Data, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub const SOURCE: &str = file!();

pub fn build() -> Arc<dyn PrefixCommand> {
    Arc::new(Reload {
        options: CommandOptions::new("reload", SOURCE)
            .description("Rebuild a command, or load one that was unloaded.")
            .usage("<command>")
            .required_arg("command")
            .dev_only(),
    })
}

struct Reload {
    options: CommandOptions,
}

#[async_trait]
impl PrefixCommand for Reload {
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

        let reloaded = {
            let mut registry = data.commands.write().await;
            match registry.get(name) {
                Some(active) => {
                    let source = active.options().source;
                    registry.reload(source)
                }
                None => registry.load_by_name(name).is_some(),
            }
        };

        if !reloaded {
            send_styled(
                ctx,
                msg.channel_id,
                ReplyStyle::Warn,
                format!("There is no command called `{}`", name),
            )
            .await?;
            return Ok(CommandResult::Incomplete);
        }

        tracing::info!(command = %name, by = msg.author.id.get(), "Command reloaded");
        send_styled(
            ctx,
            msg.channel_id,
            ReplyStyle::Success,
            format!("Reloaded `{}`", name),
        )
        .await?;
        Ok(CommandResult::Done)
    }
}
