use async_trait::async_trait;
use pipeline::ports::{Notifier, ProviderError};
use pipeline::ChannelId;
use serde_json::json;
use tracing::debug;

use crate::{api_url, http_client, send};

const PROVIDER: &str = "discord";
const API_BASE_URL: &str = "https://discord.com";

/// Discord caps message content at this many characters.
const MESSAGE_LIMIT: usize = 2000;

/// Posts lead announcements to a Discord channel as a bot.
pub struct DiscordNotifier {
    http: reqwest::Client,
    base_url: String,
    bot_token: String,
}

impl DiscordNotifier {
    pub fn new(bot_token: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            http: http_client(PROVIDER)?,
            base_url: API_BASE_URL.to_string(),
            bot_token: bot_token.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn post_message(&self, channel: &ChannelId, text: &str) -> Result<(), ProviderError> {
        let content: String = text.chars().take(MESSAGE_LIMIT).collect();
        let url = api_url(
            &self.base_url,
            &format!("/api/v9/channels/{}/messages", channel.as_str()),
        );
        debug!(%channel, chars = content.len(), "posting discord message");

        let request = self
            .http
            .post(url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(&json!({ "content": content }));

        send(PROVIDER, request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notifier(server: &MockServer) -> DiscordNotifier {
        DiscordNotifier::new("bot-token").unwrap().with_base_url(server.uri())
    }

    #[tokio::test]
    async fn posts_message_as_bot() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v9/channels/123/messages"))
            .and(header("authorization", "Bot bot-token"))
            .and(body_json(json!({ "content": "New Opportunity Found: **Acme**" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "m1" })))
            .expect(1)
            .mount(&server)
            .await;

        notifier(&server)
            .post_message(&ChannelId::new("123").unwrap(), "New Opportunity Found: **Acme**")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn long_messages_are_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({ "content": "a".repeat(MESSAGE_LIMIT) })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        notifier(&server)
            .post_message(&ChannelId::new("123").unwrap(), &"a".repeat(MESSAGE_LIMIT + 50))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rate_limit_reports_fractional_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "1.5")
                    .set_body_string(r#"{"message":"You are being rate limited."}"#),
            )
            .mount(&server)
            .await;

        let err = notifier(&server)
            .post_message(&ChannelId::new("123").unwrap(), "hi")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Status { status: 429, retry_after: Some(d), .. }
                if d == Duration::from_millis(1500)
        ));
    }

    #[tokio::test]
    async fn missing_access_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Missing Access"))
            .mount(&server)
            .await;

        let err = notifier(&server)
            .post_message(&ChannelId::new("123").unwrap(), "hi")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "discord: HTTP 403: Missing Access");
    }
}
