//! Configuration management for Chainwatch
//!
//! Sources are layered, later ones winning: built-in defaults, an optional
//! TOML file, `CHAINWATCH__SECTION__KEY` variables, and finally the plain
//! variables the bot has always been deployed with (`TORN_TOKEN`,
//! `DISCORD_TOKEN`, `DISCORD_CHANNEL_ID`, `CHAIN_TIME_THRESHOLD`,
//! `ALERT_TIME_THRESHOLD`).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::monitor::{ALERT_THRESHOLD_BOUNDS, CHAIN_THRESHOLD_BOUNDS};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Torn API configuration
    pub torn: TornConfig,

    /// Discord delivery configuration
    pub discord: DiscordConfig,

    /// Chain monitor configuration
    pub monitor: MonitorConfig,

    /// Command API server configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Torn API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TornConfig {
    /// API key with faction access
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Upper bound on a single status request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for TornConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.torn.com".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Discord delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token
    pub bot_token: String,
    /// Channel that receives alerts
    pub channel_id: String,
    /// REST API base URL
    pub api_base: String,
    /// Message content sent alongside the embed
    pub mention: Option<String>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel_id: String::new(),
            api_base: "https://discord.com/api/v10".to_string(),
            mention: Some("@here".to_string()),
        }
    }
}

/// Chain monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Remaining seconds below which the chain is nearing its end
    pub chain_threshold_secs: i64,
    /// Minimum seconds between two alerts
    pub alert_threshold_secs: i64,
    /// Scheduler period
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
    /// Whether monitoring starts enabled
    pub start_watching: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            chain_threshold_secs: 120,
            alert_threshold_secs: 60,
            tick_interval: Duration::from_secs(10),
            start_watching: false,
        }
    }
}

/// Command API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// HTTP port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Socket address string for the listener
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json or pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Plain environment variables mapped onto config keys.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("TORN_TOKEN", "torn.api_key"),
    ("DISCORD_TOKEN", "discord.bot_token"),
    ("DISCORD_CHANNEL_ID", "discord.channel_id"),
    ("CHAIN_TIME_THRESHOLD", "monitor.chain_threshold_secs"),
    ("ALERT_TIME_THRESHOLD", "monitor.alert_threshold_secs"),
];

impl Config {
    /// Load configuration from defaults, an optional file and the environment.
    ///
    /// The result is not validated; call [`Config::validate`] before use.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with the legacy variables read through `lookup`.
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CHAINWATCH")
                .prefix_separator("__")
                .separator("__"),
        );

        for (var, key) in LEGACY_ENV {
            if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
                builder = builder.set_override(*key, value.trim().to_string())?;
            }
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Check that everything required to run the watcher is present and sane.
    pub fn validate(&self) -> Result<()> {
        if self.torn.api_key.trim().is_empty() {
            return Err(Error::config("Torn API key is not set (TORN_TOKEN)"));
        }
        if self.discord.bot_token.trim().is_empty() {
            return Err(Error::config("Discord bot token is not set (DISCORD_TOKEN)"));
        }
        if self.discord.channel_id.trim().is_empty() {
            return Err(Error::config(
                "Discord channel id is not set (DISCORD_CHANNEL_ID)",
            ));
        }
        if !CHAIN_THRESHOLD_BOUNDS.contains(&self.monitor.chain_threshold_secs) {
            return Err(Error::config(format!(
                "chain threshold must be between {} and {} seconds, got {}",
                CHAIN_THRESHOLD_BOUNDS.start(),
                CHAIN_THRESHOLD_BOUNDS.end(),
                self.monitor.chain_threshold_secs
            )));
        }
        if !ALERT_THRESHOLD_BOUNDS.contains(&self.monitor.alert_threshold_secs) {
            return Err(Error::config(format!(
                "alert threshold must be between {} and {} seconds, got {}",
                ALERT_THRESHOLD_BOUNDS.start(),
                ALERT_THRESHOLD_BOUNDS.end(),
                self.monitor.alert_threshold_secs
            )));
        }
        if self.monitor.tick_interval.is_zero() {
            return Err(Error::config("monitor tick interval must be non-zero"));
        }
        url::Url::parse(&self.torn.base_url)
            .map_err(|e| Error::config(format!("invalid torn.base_url: {e}")))?;
        url::Url::parse(&self.discord.api_base)
            .map_err(|e| Error::config(format!("invalid discord.api_base: {e}")))?;
        Ok(())
    }

    /// Copy of this configuration with credentials masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.torn.api_key = mask(&copy.torn.api_key);
        copy.discord.bot_token = mask(&copy.discord.bot_token);
        copy
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        let visible: String = secret.chars().take(4).collect();
        format!("{visible}****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("TORN_TOKEN", "abcd1234efgh"),
            ("DISCORD_TOKEN", "bot-token"),
            ("DISCORD_CHANNEL_ID", "123456789"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.monitor.tick_interval, Duration::from_secs(10));
        assert_eq!(config.torn.request_timeout, Duration::from_secs(10));
        assert_eq!(config.discord.mention.as_deref(), Some("@here"));
        assert!(!config.monitor.start_watching);
    }

    #[test]
    fn test_legacy_env_overrides() {
        let mut vars = required();
        vars.push(("CHAIN_TIME_THRESHOLD", "90"));
        vars.push(("ALERT_TIME_THRESHOLD", " 30 "));

        let config = Config::load_with_env(None, env(&vars)).unwrap();

        assert_eq!(config.torn.api_key, "abcd1234efgh");
        assert_eq!(config.discord.channel_id, "123456789");
        assert_eq!(config.monitor.chain_threshold_secs, 90);
        assert_eq!(config.monitor.alert_threshold_secs, 30);
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_credential_fails_validation() {
        let config = Config::load_with_env(None, env(&[])).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("TORN_TOKEN"));
    }

    #[test]
    fn test_out_of_range_threshold_fails_validation() {
        let mut vars = required();
        vars.push(("CHAIN_TIME_THRESHOLD", "10"));
        let config = Config::load_with_env(None, env(&vars)).unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_file_source() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[monitor]
chain_threshold_secs = 200
tick_interval = "15s"

[server]
port = 9090
"#
        )
        .unwrap();

        let config = Config::load_with_env(Some(file.path()), env(&required())).unwrap();

        assert_eq!(config.monitor.chain_threshold_secs, 200);
        assert_eq!(config.monitor.tick_interval, Duration::from_secs(15));
        assert_eq!(config.server.addr(), "127.0.0.1:9090");
        // untouched sections keep their defaults
        assert_eq!(config.monitor.alert_threshold_secs, 60);
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let config = Config::load_with_env(None, env(&required())).unwrap();
        let redacted = config.redacted();
        assert_eq!(redacted.torn.api_key, "abcd****");
        assert_eq!(redacted.discord.bot_token, "bot-****");
        assert_eq!(redacted.discord.channel_id, "123456789");
    }
}
