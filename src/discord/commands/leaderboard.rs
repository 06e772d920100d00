use crate::core::commands::{CommandOptions, CommandResult, Invocation};
use crate::discord::commands::PrefixCommand;
use crate::discord::replies::{send_styled, ReplyStyle};
use crate::discord::{Data, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;

pub const SOURCE: &str = file!();

const LEADERBOARD_SIZE: usize = 10;

pub fn build() -> Arc<dyn PrefixCommand> {
    Arc::new(Leaderboard {
        options: CommandOptions::new("leaderboard", SOURCE)
            .alias("lb")
            .alias("top")
            .description("Show the members with the most XP.")
            .cooldown(Duration::from_secs(10)),
    })
}

struct Leaderboard {
    options: CommandOptions,
}

#[async_trait]
impl PrefixCommand for Leaderboard {
    fn options(&self) -> &CommandOptions {
        &self.options
    }

    async fn run(
        &self,
        ctx: &serenity::Context,
        msg: &serenity::Message,
        data: &Data,
        _invocation: &Invocation,
    ) -> Result<CommandResult, Error> {
        let top = data.leveling.leaderboard(LEADERBOARD_SIZE).await?;

        if top.is_empty() {
            send_styled(
                ctx,
                msg.channel_id,
                ReplyStyle::Info,
                "Nobody has earned any XP yet. Start chatting!",
            )
            .await?;
            return Ok(CommandResult::Done);
        }

        let lines: Vec<String> = top
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let medal = match i {
                    0 => "🥇".to_string(),
                    1 => "🥈".to_string(),
                    2 => "🥉".to_string(),
                    _ => format!("**{}.**", i + 1),
                };
                format!(
                    "{} <@{}> - Level {} ({} XP)",
                    medal, record.user_id, record.level, record.xp
                )
            })
            .collect();

        let embed = serenity::CreateEmbed::new()
            .title("🏆 Leaderboard")
            .colour(serenity::Colour::GOLD)
            .description(lines.join("\n"));

        msg.channel_id
            .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
            .await?;
        Ok(CommandResult::Done)
    }
}
