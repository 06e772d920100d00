// Slash versions of the leveling commands.
//
// Same pattern as everywhere else in this layer:
// 1. Extract primitive data from Discord types
// 2. Call core service
// 3. Format the response

use crate::discord::leveling::rank_card::rank_embed;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Show your current level and XP.
#[poise::command(slash_command, guild_only)]
pub async fn rank(
    ctx: Context<'_>,
    #[description = "User to check (defaults to you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let target_user = user.as_ref().unwrap_or_else(|| ctx.author());

    if target_user.bot {
        ctx.say("Bots don't earn XP! 🤖").await?;
        return Ok(());
    }

    let leveling = &ctx.data().leveling;
    let record = leveling.get_record(target_user.id.get()).await?;
    let embed = rank_embed(target_user, &record, leveling.xp_to_next_level(record.xp));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// List the roles members of this server earn at each level.
#[poise::command(slash_command, guild_only)]
pub async fn levelroles(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let roles = ctx.data().leveling.level_roles(guild_id.get()).await?;

    let description = if roles.is_empty() {
        "No level roles configured yet.".to_string()
    } else {
        roles
            .iter()
            .map(|role| format!("Level **{}** → <@&{}>", role.level, role.role_id))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let embed = serenity::CreateEmbed::new()
        .title("Level Roles")
        .colour(serenity::Colour::BLURPLE)
        .description(description);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
