use crate::core::commands::{CommandOptions, CommandResult, Invocation};
use crate::discord::commands::PrefixCommand;
use crate::discord::{Data, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const SOURCE: &str = file!();

pub fn build() -> Arc<dyn PrefixCommand> {
    Arc::new(Ping {
        options: CommandOptions::new("ping", SOURCE)
            .alias("latency")
            .description("Check that the bot is alive and how long a round trip takes.")
            .cooldown(Duration::from_secs(5)),
    })
}

struct Ping {
    options: CommandOptions,
}

#[async_trait]
impl PrefixCommand for Ping {
    fn options(&self) -> &CommandOptions {
        &self.options
    }

    async fn run(
        &self,
        ctx: &serenity::Context,
        msg: &serenity::Message,
        _data: &Data,
        _invocation: &Invocation,
    ) -> Result<CommandResult, Error> {
        let started = Instant::now();
        let mut reply = msg.channel_id.say(&ctx.http, "🏓 Pinging...").await?;
        let elapsed = started.elapsed().as_millis();

        reply
            .edit(
                ctx,
                serenity::EditMessage::new()
                    .content(format!("🏓 Pong! Round trip took **{}ms**", elapsed)),
            )
            .await?;

        Ok(CommandResult::Done)
    }
}
