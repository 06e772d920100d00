// The message gate: turns an inbound chat message into either a prefix
// command run or a leveling event.
//
// **Flow:**
// 1. Route: ignore DMs, bots and webhooks; parse prefix / command / args / flags
// 2. Unknown command (or no prefix) -> award XP instead
// 3. Ask the core gate whether the command may run; warn once if not
// 4. Run it, then start the cooldown and publish a run event

use crate::core::commands::{
    format_remaining, parse_invocation, CommandOptions, CommandResult, CommandRunEvent,
    GateRejection, GateRequest, GrantedPermissions, Invocation, PermissionSnapshot,
};
use crate::discord::leveling::rewards::award_message_xp;
use crate::discord::replies::{dm_styled, send_styled, ReplyStyle};
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;
use std::time::Instant;

/// Where a message came from, as far as routing cares.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageOrigin {
    pub in_guild: bool,
    pub from_bot: bool,
    pub from_webhook: bool,
}

impl MessageOrigin {
    pub fn of(msg: &serenity::Message) -> Self {
        Self {
            in_guild: msg.guild_id.is_some(),
            from_bot: msg.author.bot,
            from_webhook: msg.webhook_id.is_some(),
        }
    }
}

/// What to do with an inbound message.
pub enum MessageRoute<C> {
    Ignore,
    Level,
    Run(C, Invocation),
}

/// Decide between dropping a message, leveling on it, or running a command.
///
/// `lookup` resolves a command name or alias; anything it doesn't know is
/// treated as ordinary chat.
pub fn route_message<C>(
    origin: MessageOrigin,
    prefix: &str,
    content: &str,
    lookup: impl FnOnce(&str) -> Option<C>,
) -> MessageRoute<C> {
    if !origin.in_guild || origin.from_bot || origin.from_webhook {
        return MessageRoute::Ignore;
    }

    let Some(invocation) = parse_invocation(prefix, content) else {
        return MessageRoute::Level;
    };
    match lookup(&invocation.raw_command) {
        Some(command) => MessageRoute::Run(command, invocation),
        None => MessageRoute::Level,
    }
}

pub async fn handle_message(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    let route = {
        let commands = data.commands.read().await;
        route_message(MessageOrigin::of(msg), &data.prefix, &msg.content, |name| {
            commands.get(name)
        })
    };

    let (guild_id, command, invocation) = match (route, msg.guild_id) {
        (MessageRoute::Run(command, invocation), Some(guild_id)) => {
            (guild_id, command, invocation)
        }
        (MessageRoute::Level, Some(guild_id)) => {
            award_message_xp(ctx, msg, guild_id, data).await;
            return Ok(());
        }
        _ => return Ok(()),
    };

    let options = command.options();
    let user_id = msg.author.id.get();
    let request = GateRequest {
        user_id,
        options,
        args: &invocation.args,
        permissions: permission_snapshot(ctx, msg, guild_id),
    };

    if let Err(rejection) = data.gate.evaluate(&request, Instant::now()).await {
        tracing::debug!(command = %options.name, user_id, ?rejection, "Command rejected");
        send_rejection(ctx, msg, guild_id, data, options, &rejection).await;
        return Ok(());
    }

    match command.run(ctx, msg, data, &invocation).await {
        Ok(CommandResult::Done) => {
            data.gate
                .record_invocation(options, user_id, Instant::now())
                .await;

            // Nobody listening is fine.
            let _ = data.command_runs.send(CommandRunEvent {
                command: options.name.clone(),
                user_id,
                guild_id: guild_id.get(),
                args: invocation.args.clone(),
                flags: invocation.flags.clone(),
            });
        }
        Ok(CommandResult::Incomplete) => {}
        Err(err) => {
            data.reporter
                .report(&format!("command `{}`", options.name), err.as_ref())
                .await;
            if let Err(e) = send_styled(
                ctx,
                msg.channel_id,
                ReplyStyle::Error,
                "Something went wrong while running that command.",
            )
            .await
            {
                tracing::warn!("Failed to send command error reply: {}", e);
            }
        }
    }

    Ok(())
}

/// Permissions of the bot and the author, guild-wide and in the message channel.
///
/// The author's side comes from the member data attached to the message, so it
/// does not depend on the author being in the member cache. Anything that
/// can't be resolved counts as no permissions at all.
fn permission_snapshot(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    guild_id: serenity::GuildId,
) -> PermissionSnapshot {
    let bot_id = ctx.cache.current_user().id;
    // Takes its own cache read, so resolve it before holding the guild.
    let author_channel = msg.author_permissions(&ctx.cache);

    let Some(guild) = ctx.cache.guild(guild_id) else {
        return PermissionSnapshot {
            user: granted(None, author_channel),
            ..Default::default()
        };
    };

    let role_permissions =
        |role_id: &serenity::RoleId| guild.roles.get(role_id).map(|role| role.permissions);

    let author_guild = match &msg.member {
        Some(member) => Some(guild_permissions(
            guild.owner_id == msg.author.id,
            role_permissions(&serenity::RoleId::new(guild_id.get()))
                .unwrap_or_else(serenity::Permissions::empty),
            member.roles.iter().filter_map(role_permissions),
        )),
        None => guild
            .members
            .get(&msg.author.id)
            .map(|member| guild.member_permissions(member)),
    };

    let bot_member = guild.members.get(&bot_id);
    let bot_channel = bot_member.and_then(|member| {
        if let Some(channel) = guild.channels.get(&msg.channel_id) {
            return Some(guild.user_permissions_in(channel, member));
        }
        let thread = guild.threads.iter().find(|t| t.id == msg.channel_id)?;
        let parent = guild.channels.get(&thread.parent_id?)?;
        Some(thread_permissions(guild.user_permissions_in(parent, member)))
    });

    PermissionSnapshot {
        bot: granted(
            bot_member.map(|member| guild.member_permissions(member)),
            bot_channel,
        ),
        user: granted(author_guild, author_channel),
    }
}

/// Missing permission sets count as empty.
pub fn granted(
    guild: Option<serenity::Permissions>,
    channel: Option<serenity::Permissions>,
) -> GrantedPermissions {
    GrantedPermissions {
        guild: guild.map_or(0, |p| p.bits()),
        channel: channel.map_or(0, |p| p.bits()),
    }
}

/// Guild-wide permissions: the everyone role plus each of the member's roles.
/// Owners and administrators get everything.
pub fn guild_permissions(
    is_owner: bool,
    everyone: serenity::Permissions,
    roles: impl IntoIterator<Item = serenity::Permissions>,
) -> serenity::Permissions {
    if is_owner {
        return serenity::Permissions::all();
    }
    let combined = roles.into_iter().fold(everyone, |acc, role| acc | role);
    if combined.contains(serenity::Permissions::ADMINISTRATOR) {
        serenity::Permissions::all()
    } else {
        combined
    }
}

/// Inside a thread, posting is governed by SEND_MESSAGES_IN_THREADS on the parent.
pub fn thread_permissions(parent: serenity::Permissions) -> serenity::Permissions {
    let mut permissions = parent;
    permissions.set(
        serenity::Permissions::SEND_MESSAGES,
        parent.contains(serenity::Permissions::SEND_MESSAGES_IN_THREADS),
    );
    permissions
}

async fn send_rejection(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    guild_id: serenity::GuildId,
    data: &Data,
    options: &CommandOptions,
    rejection: &GateRejection,
) {
    let guild_name = guild_id.name(&ctx.cache);
    let text = rejection_text(rejection, options, &data.prefix, guild_name.as_deref());

    let sent = match rejection {
        // Can't talk in the channel, so fall back to DMs.
        GateRejection::MissingBotPermissions {
            can_send: false, ..
        } => dm_styled(ctx, &msg.author, ReplyStyle::Warn, text).await,
        _ => send_styled(ctx, msg.channel_id, ReplyStyle::Warn, text).await,
    };

    if let Err(e) = sent {
        tracing::warn!("Failed to deliver command warning: {}", e);
    }
}

fn permission_names(bits: u64) -> String {
    serenity::Permissions::from_bits_truncate(bits)
        .get_permission_names()
        .join(", ")
}

/// The single warning a user sees when the gate refuses a command.
pub fn rejection_text(
    rejection: &GateRejection,
    options: &CommandOptions,
    prefix: &str,
    guild_name: Option<&str>,
) -> String {
    match rejection {
        GateRejection::DeveloperOnly => "That command is locked to developers only!".to_string(),
        GateRejection::MissingBotPermissions { required, can_send } => {
            let location = match (can_send, guild_name) {
                (false, Some(name)) => format!(" in **{}**", name),
                _ => String::new(),
            };
            format!(
                "I am missing one or more of the following permissions (`{}`) to execute that command{}",
                permission_names(*required),
                location
            )
        }
        GateRejection::MissingUserPermissions { required } => format!(
            "You are missing one or more of the following permissions (`{}`) to execute that command",
            permission_names(*required)
        ),
        GateRejection::MissingArgument { name } => {
            let usage = format!("{}{} {}", prefix, options.name, options.usage);
            format!(
                "You are missing the argument **{}**. Correct usage `{}`",
                name,
                usage.trim_end()
            )
        }
        GateRejection::OnCooldown { remaining } => format!(
            "The cooldown for that command has not expired! Please wait **{}** before using it again",
            format_remaining(*remaining)
        ),
    }
}
