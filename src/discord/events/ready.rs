use crate::discord::events::{EventListener, EventOptions};
use crate::discord::{Data, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub const SOURCE: &str = file!();

pub fn build() -> Arc<dyn EventListener> {
    Arc::new(ReadyListener {
        options: EventOptions {
            name: "ready",
            source: SOURCE,
        },
    })
}

struct ReadyListener {
    options: EventOptions,
}

#[async_trait]
impl EventListener for ReadyListener {
    fn options(&self) -> &EventOptions {
        &self.options
    }

    async fn run(
        &self,
        ctx: &serenity::Context,
        event: &serenity::FullEvent,
        data: &Data,
    ) -> Result<(), Error> {
        let serenity::FullEvent::Ready { data_about_bot } = event else {
            return Ok(());
        };

        let commands = data.commands.read().await.len();
        tracing::info!(
            user = %data_about_bot.user.name,
            guilds = data_about_bot.guilds.len(),
            commands,
            "Bot is ready"
        );

        let activity = serenity::ActivityData::watching(format!("for {}help", data.prefix));
        ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
        Ok(())
    }
}
