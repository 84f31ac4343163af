use crate::error::{Result, RelayError};
use std::time::Duration;

const DEFAULT_BLACKLIST: &str = "dark,r18";
const DEFAULT_CACHE_TTL_SECS: u64 = 600;
const DEFAULT_STATS_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct Settings {
    pub slack: SlackConfig,
    pub relay: RelayConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub bot_token: String,
    pub app_token: String,
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Channel every relayed message is posted to
    pub target_channel: String,
    pub blacklist: Vec<String>,
    pub cache_ttl: Duration,
    /// Cadence of cache stats logging and purging; `None` disables it
    pub stats_interval: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
}

pub fn load_settings() -> Result<Settings> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    Settings::from_lookup(|key| std::env::var(key).ok())
}

impl Settings {
    /// Parse settings from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| RelayError::Config(format!("{} not set", key)))
        };

        let parse_secs = |key: &str, default: u64| -> Result<u64> {
            match lookup(key) {
                Some(v) => v
                    .trim()
                    .parse()
                    .map_err(|_| RelayError::Config(format!("Invalid {}", key))),
                None => Ok(default),
            }
        };

        // Load Slack config
        let slack = SlackConfig {
            bot_token: required("SLACK_BOT_TOKEN")?,
            app_token: required("SLACK_APP_TOKEN")?,
        };

        // Load relay config
        let blacklist = lookup("RELAY_BLACKLIST")
            .unwrap_or_else(|| DEFAULT_BLACKLIST.to_string())
            .split(',')
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(String::from)
            .collect();

        let stats_interval_secs =
            parse_secs("RELAY_STATS_INTERVAL_SECS", DEFAULT_STATS_INTERVAL_SECS)?;

        let relay = RelayConfig {
            target_channel: required("SLACK_CHANNEL_ID")?,
            blacklist,
            cache_ttl: Duration::from_secs(parse_secs(
                "RELAY_CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL_SECS,
            )?),
            stats_interval: (stats_interval_secs > 0)
                .then(|| Duration::from_secs(stats_interval_secs)),
        };

        // Load log config
        let format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(RelayError::Config(format!(
                    "Invalid LOG_FORMAT: {} (expected pretty or json)",
                    other
                )));
            }
        };

        Ok(Settings {
            slack,
            relay,
            log: LogConfig { format },
        })
    }
}
