use crate::core::leveling::{LevelRecord, XP_PER_LEVEL};
use poise::serenity_prelude as serenity;

/// Embed showing a user's level, XP and progress to the next level.
pub fn rank_embed(
    user: &serenity::User,
    record: &LevelRecord,
    xp_to_next: u64,
) -> serenity::CreateEmbed {
    let xp_in_level = record.xp % XP_PER_LEVEL;
    let progress = xp_in_level as f64 / XP_PER_LEVEL as f64;

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("Rank of {}", user.name))
        .colour(level_color(record.level))
        .thumbnail(user.face())
        .field("Level", format!("**{}**", record.level), true)
        .field("Total XP", format!("**{}**", record.xp), true)
        .field(
            "Progress",
            format!(
                "{}/{} XP ({} to go)\n{}",
                xp_in_level,
                XP_PER_LEVEL,
                xp_to_next,
                build_progress_bar(progress, 15)
            ),
            false,
        );

    if let Some(last) = record.last_message_at {
        embed = embed.field("Last active", format!("<t:{}:R>", last.timestamp()), true);
    }

    embed
}

fn level_color(level: u32) -> serenity::Colour {
    if level >= 50 {
        serenity::Colour::DARK_PURPLE
    } else if level >= 25 {
        serenity::Colour::ORANGE
    } else if level >= 10 {
        serenity::Colour::GOLD
    } else if level >= 5 {
        serenity::Colour::BLURPLE
    } else {
        serenity::Colour::LIGHT_GREY
    }
}

fn build_progress_bar(progress: f64, length: usize) -> String {
    let clamped = progress.clamp(0.0, 1.0);
    let mut filled = (clamped * length as f64).round() as usize;
    if clamped > 0.0 && filled == 0 {
        filled = 1;
    }
    filled = filled.min(length);
    let bar = "▰".repeat(filled) + &"▱".repeat(length - filled);
    format!("{} ({}%)", bar, (clamped * 100.0).round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_shows_some_progress_for_tiny_values() {
        assert_eq!(build_progress_bar(0.01, 10), "▰▱▱▱▱▱▱▱▱▱ (1%)");
        assert_eq!(build_progress_bar(0.0, 4), "▱▱▱▱ (0%)");
    }

    #[test]
    fn progress_bar_clamps() {
        assert_eq!(build_progress_bar(1.5, 4), "▰▰▰▰ (100%)");
        assert_eq!(build_progress_bar(-1.0, 4), "▱▱▱▱ (0%)");
    }
}
