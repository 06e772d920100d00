// XP for ordinary chat messages, plus the level role that comes with it.

use crate::core::leveling::LevelRole;
use crate::discord::Data;
use poise::serenity_prelude as serenity;

/// Award XP for a non-command message and grant the matching level role.
///
/// Never fails: storage errors are logged, role grant errors are dropped.
pub async fn award_message_xp(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    guild_id: serenity::GuildId,
    data: &Data,
) {
    let user_id = msg.author.id.get();

    let award = match data.leveling.process_message(user_id, guild_id.get()).await {
        Ok(award) => award,
        Err(e) => {
            tracing::error!(user_id, "Error processing XP for message: {}", e);
            return;
        }
    };

    if award.leveled_up() {
        tracing::info!(
            user_id,
            guild_id = guild_id.get(),
            old_level = award.old_level,
            new_level = award.record.level,
            total_xp = award.record.xp,
            "User leveled up"
        );
    }

    if let Some(role) = award.role {
        grant_level_role(ctx, msg, guild_id, role).await;
    }
}

async fn grant_level_role(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    guild_id: serenity::GuildId,
    role: LevelRole,
) {
    let role_id = serenity::RoleId::new(role.role_id);

    let already_has = msg
        .member
        .as_ref()
        .is_some_and(|member| member.roles.contains(&role_id));
    if already_has {
        return;
    }

    if let Err(e) = ctx
        .http
        .add_member_role(guild_id, msg.author.id, role_id, Some("Level reward"))
        .await
    {
        tracing::debug!(role_id = role.role_id, "Could not grant level role: {}", e);
    }
}
