use crate::core::commands::{format_remaining, CommandOptions, CommandResult, Invocation};
use crate::discord::commands::PrefixCommand;
use crate::discord::replies::{send_styled, ReplyStyle};
use crate::discord::{Data, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub const SOURCE: &str = file!();

pub fn build() -> Arc<dyn PrefixCommand> {
    Arc::new(Help {
        options: CommandOptions::new("help", SOURCE)
            .alias("commands")
            .description("List every command, or show the details of one.")
            .usage("[command]")
            .optional_arg("command"),
    })
}

struct Help {
    options: CommandOptions,
}

#[async_trait]
impl PrefixCommand for Help {
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
        let show_dev = data.gate.is_developer(msg.author.id.get());

        // Collect everything before awaiting so the registry lock is released.
        let embed = {
            let registry = data.commands.read().await;
            match invocation.args.first() {
                Some(name) => match registry.get(name) {
                    Some(command) if show_dev || !command.options().dev_only => {
                        Some(command_embed(command.options(), &data.prefix))
                    }
                    _ => None,
                },
                None => {
                    let visible: Vec<_> = registry
                        .handlers()
                        .into_iter()
                        .filter(|c| show_dev || !c.options().dev_only)
                        .collect();
                    Some(overview_embed(
                        visible.iter().map(|c| c.options()),
                        &data.prefix,
                    ))
                }
            }
        };

        let Some(embed) = embed else {
            send_styled(
                ctx,
                msg.channel_id,
                ReplyStyle::Warn,
                format!("There is no command called `{}`", invocation.args[0]),
            )
            .await?;
            return Ok(CommandResult::Incomplete);
        };

        msg.channel_id
            .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
            .await?;
        Ok(CommandResult::Done)
    }
}

fn overview_embed<'a>(
    commands: impl Iterator<Item = &'a CommandOptions>,
    prefix: &str,
) -> serenity::CreateEmbed {
    let lines: Vec<String> = commands
        .map(|c| {
            let description = if c.description.is_empty() {
                "No description"
            } else {
                c.description.as_str()
            };
            format!("`{}{}` - {}", prefix, c.name, description)
        })
        .collect();

    serenity::CreateEmbed::new()
        .title("📖 Commands")
        .colour(serenity::Colour::BLURPLE)
        .description(lines.join("\n"))
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Use {}help <command> for details",
            prefix
        )))
}

fn command_embed(options: &CommandOptions, prefix: &str) -> serenity::CreateEmbed {
    let usage = format!("{}{} {}", prefix, options.name, options.usage);
    let mut embed = serenity::CreateEmbed::new()
        .title(format!("{}{}", prefix, options.name))
        .colour(serenity::Colour::BLURPLE)
        .description(if options.description.is_empty() {
            "No description"
        } else {
            options.description.as_str()
        })
        .field("Usage", format!("`{}`", usage.trim_end()), false);

    if !options.aliases.is_empty() {
        embed = embed.field("Aliases", options.aliases.join(", "), true);
    }
    if let Some(cooldown) = options.cooldown {
        embed = embed.field("Cooldown", format_remaining(cooldown), true);
    }
    if options.dev_only {
        embed = embed.field("Access", "Developers only", true);
    }
    embed
}
