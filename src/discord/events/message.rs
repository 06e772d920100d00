use crate::discord::commands::message_gate::handle_message;
use crate::discord::events::{EventListener, EventOptions};
use crate::discord::{Data, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub const SOURCE: &str = file!();

pub fn build() -> Arc<dyn EventListener> {
    Arc::new(MessageListener {
        options: EventOptions {
            name: "message",
            source: SOURCE,
        },
    })
}

struct MessageListener {
    options: EventOptions,
}

#[async_trait]
impl EventListener for MessageListener {
    fn options(&self) -> &EventOptions {
        &self.options
    }

    async fn run(
        &self,
        ctx: &serenity::Context,
        event: &serenity::FullEvent,
        data: &Data,
    ) -> Result<(), Error> {
        let serenity::FullEvent::Message { new_message } = event else {
            return Ok(());
        };
        handle_message(ctx, new_message, data).await
    }
}
