// Forwards uncaught errors to the operator webhook.
//
// Every report is logged first. Delivery to the webhook is best effort: if it
// fails, that failure is logged and nothing else happens.

use crate::config::WebhookCredentials;
use crate::core::reporting::ErrorReport;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub struct ErrorReporter {
    http: Arc<serenity::Http>,
    webhook: Option<WebhookCredentials>,
}

impl ErrorReporter {
    pub fn new(http: Arc<serenity::Http>, webhook: Option<WebhookCredentials>) -> Self {
        if webhook.is_none() {
            tracing::warn!("No error webhook configured; errors will only be logged");
        }
        Self { http, webhook }
    }

    pub async fn report(&self, context: &str, err: &(dyn std::error::Error + Send + Sync)) {
        tracing::error!(context, "Unhandled error: {}", err);

        let Some(credentials) = &self.webhook else {
            return;
        };

        let webhook = match self
            .http
            .get_webhook_with_token(serenity::WebhookId::new(credentials.id), &credentials.token)
            .await
        {
            Ok(webhook) => webhook,
            Err(e) => {
                tracing::warn!(
                    webhook_id = credentials.id,
                    "No error webhook was found using these credentials: {}",
                    e
                );
                return;
            }
        };

        let report = ErrorReport::new(context, err);
        let embed = serenity::CreateEmbed::new()
            .colour(serenity::Colour::RED)
            .author(serenity::CreateEmbedAuthor::new(report.title))
            .description(report.body)
            .timestamp(serenity::Timestamp::now());

        if let Err(e) = webhook
            .execute(&self.http, false, serenity::ExecuteWebhook::new().embed(embed))
            .await
        {
            tracing::warn!("Failed to forward error to webhook: {}", e);
        }
    }
}
