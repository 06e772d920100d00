// This is the entry point of the Discord bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (databases)
// - `discord/` = Discord-specific adapters (prefix commands, events)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Load the command and event registries
// 4. Set up the Discord framework and start the client

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::BotConfig;
use crate::core::commands::{CommandGate, CommandRunEvent};
use crate::core::leveling::LevelingService;
use crate::core::registry::Registry;
use crate::discord::errors::ErrorReporter;
use crate::discord::{Data, Error};
use crate::infra::commands::InMemoryCooldownStore;
use crate::infra::leveling::SqliteLevelStore;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

const COMMAND_RUN_BUFFER: usize = 64;

/// Event handler for non-command Discord events.
/// Looks up the listener registered for the event's name and runs it.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    let name = event.snake_case_name();

    // Clone the listener out so the registry isn't locked while it runs.
    let Some(listener) = data.events.read().await.get(name) else {
        return Ok(());
    };

    if let Err(e) = listener.run(ctx, event, data).await {
        data.reporter
            .report(&format!("event `{}`", name), e.as_ref())
            .await;
    }
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            ctx.data()
                .reporter
                .report(&format!("slash command `{}`", ctx.command().name), error.as_ref())
                .await;
            if let Err(e) = ctx.say("Something went wrong while running that command.").await {
                tracing::warn!("Failed to send command error reply: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Logs every completed prefix command.
fn spawn_run_logger(mut runs: broadcast::Receiver<CommandRunEvent>) {
    tokio::spawn(async move {
        loop {
            match runs.recv().await {
                Ok(run) => tracing::info!(
                    command = %run.command,
                    user_id = run.user_id,
                    guild_id = run.guild_id,
                    args = ?run.args,
                    flags = ?run.flags,
                    "Command ran"
                ),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Command run logger fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

async fn run() -> anyhow::Result<()> {
    let config = BotConfig::from_env()?;

    // Keep runtime databases in a dedicated folder so the repo root stays tidy.
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "Failed to create data directory {}",
            config.data_dir.display()
        )
    })?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let level_store = SqliteLevelStore::new(&config.database_url)
        .await
        .context("Failed to initialize SQLite store")?;
    let leveling = Arc::new(LevelingService::new(level_store));

    tracing::info!(developers = config.developers.len(), "Loaded developer list");
    let gate = Arc::new(CommandGate::new(
        InMemoryCooldownStore::new(),
        config.developers.clone(),
    ));

    let mut commands = Registry::new();
    let command_count = commands.load_all(discord::commands::catalog());
    let mut events = Registry::new();
    let event_count = events.load_all(discord::events::catalog());
    tracing::info!(
        commands = command_count,
        events = event_count,
        "Handlers loaded"
    );

    // The reporter gets its own HTTP client so it works before the gateway is up.
    let reporter = Arc::new(ErrorReporter::new(
        Arc::new(serenity::Http::new(&config.token)),
        config.error_webhook.clone(),
    ));

    let (command_runs, runs) = broadcast::channel(COMMAND_RUN_BUFFER);
    spawn_run_logger(runs);

    let data = Data {
        prefix: config.prefix.clone(),
        commands: Arc::new(RwLock::new(commands)),
        events: Arc::new(RwLock::new(events)),
        gate,
        leveling,
        reporter,
        command_runs,
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read prefix commands
        | serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                discord::leveling::slash_commands::rank(),
                discord::leveling::slash_commands::levelroles(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                // Register slash commands globally (can take up to an hour to propagate)
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Slash commands registered");
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    if let Err(e) = run().await {
        tracing::error!("Bot stopped: {:#}", e);
        std::process::exit(1);
    }
}
