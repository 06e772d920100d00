// Resolve members and roles from user input.
// Try the cache first, then fall back to the API when the input is an id.

use crate::core::lookup::{find_best_match, parse_snowflake};
use poise::serenity_prelude as serenity;

pub async fn resolve_member(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    query: &str,
) -> Option<serenity::Member> {
    let cached = ctx.cache.guild(guild_id).and_then(|guild| {
        find_best_match(
            guild.members.values(),
            query,
            |m| m.user.id.get(),
            |m| vec![m.display_name().to_string(), m.user.name.clone()],
        )
        .cloned()
    });
    if cached.is_some() {
        return cached;
    }

    let user_id = parse_snowflake(query)?;
    guild_id
        .member(ctx, serenity::UserId::new(user_id))
        .await
        .ok()
}

pub async fn resolve_role(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    query: &str,
) -> Option<serenity::Role> {
    let cached = ctx.cache.guild(guild_id).and_then(|guild| {
        find_best_match(
            guild.roles.values(),
            query,
            |r| r.id.get(),
            |r| vec![r.name.clone()],
        )
        .cloned()
    });
    if cached.is_some() {
        return cached;
    }

    let role_id = parse_snowflake(query)?;
    guild_id
        .roles(&ctx.http)
        .await
        .ok()?
        .remove(&serenity::RoleId::new(role_id))
}
