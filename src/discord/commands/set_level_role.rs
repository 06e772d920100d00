use crate::core::commands::{CommandOptions, CommandResult, Invocation, SEND_MESSAGES};
use crate::discord::commands::PrefixCommand;
use crate::discord::lookup::resolve_role;
use crate::discord::replies::{send_styled, ReplyStyle};
use crate::discord::{Data, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub const SOURCE: &str = file!();

const REMOVE_FLAG: &str = "remove";

pub fn build() -> Arc<dyn PrefixCommand> {
    let manage_roles = serenity::Permissions::MANAGE_ROLES.bits();
    Arc::new(SetLevelRole {
        options: CommandOptions::new("setlevelrole", SOURCE)
            .alias("levelrole")
            .description("Grant a role automatically at a level. Add --remove to stop granting it.")
            .usage("<role> [level] [--remove]")
            .required_arg("role")
            .optional_arg("level")
            .bot_permissions(SEND_MESSAGES | manage_roles)
            .user_permissions(SEND_MESSAGES | manage_roles),
    })
}

struct SetLevelRole {
    options: CommandOptions,
}

#[async_trait]
impl PrefixCommand for SetLevelRole {
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
        let (Some(guild_id), Some(query)) = (msg.guild_id, invocation.args.first()) else {
            return Ok(CommandResult::Incomplete);
        };

        let Some(role) = resolve_role(ctx, guild_id, query).await else {
            send_styled(
                ctx,
                msg.channel_id,
                ReplyStyle::Warn,
                format!("I couldn't find a role matching `{}`", query),
            )
            .await?;
            return Ok(CommandResult::Incomplete);
        };

        if invocation.has_flag(REMOVE_FLAG) {
            let removed = data
                .leveling
                .remove_level_role(guild_id.get(), role.id.get())
                .await?;
            let (style, text) = if removed {
                (
                    ReplyStyle::Success,
                    format!("**{}** is no longer a level role", role.name),
                )
            } else {
                (
                    ReplyStyle::Info,
                    format!("**{}** wasn't a level role", role.name),
                )
            };
            send_styled(ctx, msg.channel_id, style, text).await?;
            return Ok(CommandResult::Done);
        }

        let level = match parse_level(invocation.args.get(1).map(String::as_str)) {
            Ok(level) => level,
            Err(text) => {
                send_styled(ctx, msg.channel_id, ReplyStyle::Warn, text).await?;
                return Ok(CommandResult::Incomplete);
            }
        };

        data.leveling
            .set_level_role(guild_id.get(), role.id.get(), level)
            .await?;
        tracing::info!(
            guild_id = guild_id.get(),
            role_id = role.id.get(),
            level,
            "Level role configured"
        );

        send_styled(
            ctx,
            msg.channel_id,
            ReplyStyle::Success,
            format!("Members now get **{}** at level **{}**", role.name, level),
        )
        .await?;
        Ok(CommandResult::Done)
    }
}

fn parse_level(raw: Option<&str>) -> Result<u32, String> {
    let raw = raw.ok_or_else(|| "Tell me which level should grant the role".to_string())?;
    raw.parse::<u32>()
        .map_err(|_| format!("`{}` is not a valid level", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_must_be_a_non_negative_number() {
        assert_eq!(parse_level(Some("15")), Ok(15));
        assert!(parse_level(Some("-1")).is_err());
        assert!(parse_level(Some("ten")).is_err());
        assert!(parse_level(None).is_err());
    }
}
