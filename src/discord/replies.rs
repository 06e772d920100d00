// Styled embed replies used by prefix commands and the gate.

use poise::serenity_prelude as serenity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStyle {
    Info,
    Success,
    Warn,
    Error,
}

impl ReplyStyle {
    fn colour(self) -> serenity::Colour {
        match self {
            ReplyStyle::Info => serenity::Colour::BLURPLE,
            ReplyStyle::Success => serenity::Colour::DARK_GREEN,
            ReplyStyle::Warn => serenity::Colour::GOLD,
            ReplyStyle::Error => serenity::Colour::RED,
        }
    }

    fn icon(self) -> &'static str {
        match self {
            ReplyStyle::Info => "ℹ️",
            ReplyStyle::Success => "✅",
            ReplyStyle::Warn => "⚠️",
            ReplyStyle::Error => "❌",
        }
    }
}

pub fn styled_embed(style: ReplyStyle, text: impl AsRef<str>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .colour(style.colour())
        .description(format!("{} {}", style.icon(), text.as_ref()))
}

/// Send a one-line styled embed to a channel.
pub async fn send_styled(
    ctx: &serenity::Context,
    channel_id: serenity::ChannelId,
    style: ReplyStyle,
    text: impl AsRef<str>,
) -> Result<serenity::Message, serenity::Error> {
    channel_id
        .send_message(
            &ctx.http,
            serenity::CreateMessage::new().embed(styled_embed(style, text)),
        )
        .await
}

/// Same as [`send_styled`] but to the user's DMs (opened if needed).
pub async fn dm_styled(
    ctx: &serenity::Context,
    user: &serenity::User,
    style: ReplyStyle,
    text: impl AsRef<str>,
) -> Result<serenity::Message, serenity::Error> {
    user.direct_message(
        &ctx.http,
        serenity::CreateMessage::new().embed(styled_embed(style, text)),
    )
    .await
}
