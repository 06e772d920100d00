// Gateway event listeners.
//
// Each listener names the serenity event it handles (the snake_case name,
// e.g. "message" or "ready") and lives in the same registry type as the
// prefix commands, so it can be reloaded the same way.

use crate::core::registry::{Handler, HandlerFactory};
use crate::discord::{Data, Error};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;

pub mod message;
pub mod ready;

#[derive(Debug, Clone, Copy)]
pub struct EventOptions {
    /// `FullEvent::snake_case_name()` of the event to listen for.
    pub name: &'static str,
    pub source: &'static str,
}

#[async_trait]
pub trait EventListener: Send + Sync {
    fn options(&self) -> &EventOptions;

    async fn run(
        &self,
        ctx: &serenity::Context,
        event: &serenity::FullEvent,
        data: &Data,
    ) -> Result<(), Error>;
}

impl Handler for dyn EventListener {
    fn name(&self) -> &str {
        self.options().name
    }

    fn source(&self) -> &str {
        self.options().source
    }
}

pub fn catalog() -> Vec<HandlerFactory<dyn EventListener>> {
    vec![
        HandlerFactory::new(message::SOURCE, message::build),
        HandlerFactory::new(ready::SOURCE, ready::build),
    ]
}
