use crate::core::commands::{CommandOptions, CommandResult, Invocation};
use crate::discord::commands::PrefixCommand;
use crate::discord::leveling::rank_card::rank_embed;
use crate::discord::lookup::resolve_member;
use crate::discord::replies::{send_styled, ReplyStyle};
use crate::discord::{Data, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;

pub const SOURCE: &str = file!();

pub fn build() -> Arc<dyn PrefixCommand> {
    Arc::new(Rank {
        options: CommandOptions::new("rank", SOURCE)
            .alias("level")
            .alias("xp")
            .description("Show your level and XP, or another member's.")
            .usage("[member]")
            .optional_arg("member")
            .cooldown(Duration::from_secs(3)),
    })
}

struct Rank {
    options: CommandOptions,
}

#[async_trait]
impl PrefixCommand for Rank {
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
        let Some(guild_id) = msg.guild_id else {
            return Ok(CommandResult::Incomplete);
        };

        let user = match invocation.args.first() {
            None => msg.author.clone(),
            Some(query) => match resolve_member(ctx, guild_id, query).await {
                Some(member) => member.user,
                None => {
                    send_styled(
                        ctx,
                        msg.channel_id,
                        ReplyStyle::Warn,
                        format!("I couldn't find a member matching `{}`", query),
                    )
                    .await?;
                    return Ok(CommandResult::Incomplete);
                }
            },
        };

        if user.bot {
            send_styled(ctx, msg.channel_id, ReplyStyle::Info, "Bots don't earn XP! 🤖").await?;
            return Ok(CommandResult::Done);
        }

        let record = data.leveling.get_record(user.id.get()).await?;
        let embed = rank_embed(&user, &record, data.leveling.xp_to_next_level(record.xp));
        msg.channel_id
            .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
            .await?;

        Ok(CommandResult::Done)
    }
}
