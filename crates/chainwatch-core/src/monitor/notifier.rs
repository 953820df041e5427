//! Alert delivery

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::DiscordConfig;
use crate::error::{Error, Result};
use crate::models::ChainAlert;

/// Where alerts go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Channel identifier
    pub channel_id: String,
    /// Channel name, when the platform reports one
    pub name: Option<String>,
}

/// Delivers chain alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Look up the configured destination. `None` means it is not reachable
    /// yet and the caller should try again later.
    async fn resolve_destination(&self) -> Option<Destination>;

    /// Deliver one alert
    async fn send_alert(&self, destination: &Destination, alert: &ChainAlert) -> Result<()>;
}

/// Posts alerts to a Discord channel through the REST API with a bot token
pub struct DiscordNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    channel_id: String,
    mention: Option<String>,
}

impl DiscordNotifier {
    /// Create a new notifier
    pub fn new(config: &DiscordConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            channel_id: config.channel_id.clone(),
            mention: config.mention.clone().filter(|m| !m.is_empty()),
        })
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.bot_token)
    }

    fn build_payload(&self, alert: &ChainAlert) -> MessagePayload {
        let fields = alert
            .fields()
            .into_iter()
            .map(|(name, value)| EmbedField {
                name: name.to_string(),
                value,
                inline: true,
            })
            .collect();

        MessagePayload {
            content: self.mention.clone(),
            embeds: vec![Embed {
                title: alert.title(),
                description: alert.description(),
                color: alert.severity.color(),
                fields,
                timestamp: alert.triggered_at.to_rfc3339(),
            }],
            allowed_mentions: AllowedMentions {
                parse: if self.mention.is_some() {
                    vec!["everyone"]
                } else {
                    vec![]
                },
            },
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn resolve_destination(&self) -> Option<Destination> {
        let url = format!("{}/channels/{}", self.api_base, self.channel_id);

        let response = match self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(channel_id = %self.channel_id, error = %e, "Discord channel lookup failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(
                channel_id = %self.channel_id,
                status = %response.status(),
                "Discord channel not available"
            );
            return None;
        }

        match response.json::<DiscordChannel>().await {
            Ok(channel) => Some(Destination {
                channel_id: channel.id,
                name: channel.name,
            }),
            Err(e) => {
                warn!(channel_id = %self.channel_id, error = %e, "Unexpected channel payload");
                None
            }
        }
    }

    async fn send_alert(&self, destination: &Destination, alert: &ChainAlert) -> Result<()> {
        let url = format!(
            "{}/channels/{}/messages",
            self.api_base, destination.channel_id
        );

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&self.build_payload(alert))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::notification(format!(
                "Discord returned {}: {}",
                status, body
            )));
        }

        info!(channel_id = %destination.channel_id, "Discord alert sent");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct DiscordChannel {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

// Discord message payload types
#[derive(Debug, Serialize)]
struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    embeds: Vec<Embed>,
    allowed_mentions: AllowedMentions,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    description: String,
    color: u32,
    fields: Vec<EmbedField>,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct AllowedMentions {
    parse: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notifier(server: &MockServer) -> DiscordNotifier {
        DiscordNotifier::new(&DiscordConfig {
            bot_token: "secret".to_string(),
            channel_id: "42".to_string(),
            api_base: server.uri(),
            mention: Some("@here".to_string()),
        })
        .unwrap()
    }

    fn alert() -> ChainAlert {
        ChainAlert {
            remaining: 40,
            hits: 97,
            goal: 100,
            modifier: 1.5,
            severity: Severity::Critical,
            triggered_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    fn destination() -> Destination {
        Destination {
            channel_id: "42".to_string(),
            name: Some("chain-alerts".to_string()),
        }
    }

    #[tokio::test]
    async fn test_resolve_destination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/42"))
            .and(header("authorization", "Bot secret"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "42", "name": "chain-alerts", "type": 0})),
            )
            .mount(&server)
            .await;

        let resolved = notifier(&server).resolve_destination().await;

        assert_eq!(resolved, Some(destination()));
    }

    #[tokio::test]
    async fn test_resolve_destination_unknown_channel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/42"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Unknown Channel", "code": 10003})))
            .mount(&server)
            .await;

        assert_eq!(notifier(&server).resolve_destination().await, None);
    }

    #[tokio::test]
    async fn test_send_alert_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/42/messages"))
            .and(header("authorization", "Bot secret"))
            .and(body_partial_json(json!({
                "content": "@here",
                "allowed_mentions": { "parse": ["everyone"] },
                "embeds": [{
                    "title": ":bell: Chain Alert :bell:",
                    "description": "The chain is nearing end, only `40` seconds left!",
                    "color": 0x00E7_4C3C,
                    "fields": [
                        { "name": "Hits", "value": "97", "inline": true },
                        { "name": "Goal", "value": "100", "inline": true },
                        { "name": "Modifier", "value": "1.5x", "inline": true }
                    ]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1"})))
            .expect(1)
            .mount(&server)
            .await;

        notifier(&server)
            .send_alert(&destination(), &alert())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_alert_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/42/messages"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Missing Permissions"))
            .mount(&server)
            .await;

        let err = notifier(&server)
            .send_alert(&destination(), &alert())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Notification(ref m) if m.contains("Missing Permissions")));
    }
}
