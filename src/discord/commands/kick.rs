use crate::core::commands::{CommandOptions, CommandResult, Invocation, SEND_MESSAGES};
use crate::discord::commands::PrefixCommand;
use crate::discord::lookup::resolve_member;
use crate::discord::replies::{dm_styled, send_styled, ReplyStyle};
use crate::discord::{Data, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;

pub const SOURCE: &str = file!();

/// Skip the DM to the kicked member.
const SILENT_FLAG: &str = "silent";

pub fn build() -> Arc<dyn PrefixCommand> {
    let kick = serenity::Permissions::KICK_MEMBERS.bits();
    Arc::new(Kick {
        options: CommandOptions::new("kick", SOURCE)
            .description("Kick a member from the server. Add --silent to skip the DM.")
            .usage("<member> [reason] [--silent]")
            .required_arg("member")
            .optional_arg("reason")
            .bot_permissions(SEND_MESSAGES | kick)
            .user_permissions(SEND_MESSAGES | kick)
            .cooldown(Duration::from_secs(3)),
    })
}

struct Kick {
    options: CommandOptions,
}

#[async_trait]
impl PrefixCommand for Kick {
    fn options(&self) -> &CommandOptions {
        &self.options
    }

    async fn run(
        &self,
        ctx: &serenity::Context,
        msg: &serenity::Message,
        _data: &Data,
        invocation: &Invocation,
    ) -> Result<CommandResult, Error> {
        let (Some(guild_id), Some(query)) = (msg.guild_id, invocation.args.first()) else {
            return Ok(CommandResult::Incomplete);
        };

        let Some(member) = resolve_member(ctx, guild_id, query).await else {
            send_styled(
                ctx,
                msg.channel_id,
                ReplyStyle::Warn,
                format!("I couldn't find a member matching `{}`", query),
            )
            .await?;
            return Ok(CommandResult::Incomplete);
        };

        if member.user.id == msg.author.id {
            send_styled(ctx, msg.channel_id, ReplyStyle::Warn, "You can't kick yourself.").await?;
            return Ok(CommandResult::Incomplete);
        }
        if member.user.id == ctx.cache.current_user().id {
            send_styled(ctx, msg.channel_id, ReplyStyle::Warn, "I'm not kicking myself.").await?;
            return Ok(CommandResult::Incomplete);
        }

        let reason = kick_reason(&invocation.args[1..]);

        if !invocation.has_flag(SILENT_FLAG) {
            let guild_name = guild_id
                .name(&ctx.cache)
                .unwrap_or_else(|| "the server".to_string());
            let mut notice = format!("You were kicked from **{}**", guild_name);
            if let Some(reason) = &reason {
                notice.push_str(&format!("\nReason: {}", reason));
            }
            // Members with closed DMs still get kicked.
            if let Err(e) = dm_styled(ctx, &member.user, ReplyStyle::Warn, notice).await {
                tracing::debug!(user_id = member.user.id.get(), "Could not DM kicked member: {}", e);
            }
        }

        match &reason {
            Some(reason) => member.kick_with_reason(ctx, reason).await?,
            None => member.kick(ctx).await?,
        }

        tracing::info!(
            guild_id = guild_id.get(),
            target = member.user.id.get(),
            moderator = msg.author.id.get(),
            "Member kicked"
        );

        send_styled(
            ctx,
            msg.channel_id,
            ReplyStyle::Success,
            format!("Kicked **{}**", member.user.name),
        )
        .await?;
        Ok(CommandResult::Done)
    }
}

fn kick_reason(words: &[String]) -> Option<String> {
    let reason = words.join(" ");
    if reason.is_empty() {
        None
    } else {
        Some(reason)
    }
}
