// Startup configuration, read from the environment (and `.env` if present).

use crate::core::commands::DeveloperSet;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_PREFIX: &str = "!";
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0} environment variable! Create a .env file with your bot settings.")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Where uncaught errors get forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookCredentials {
    pub id: u64,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub prefix: String,
    pub developers: DeveloperSet,
    pub data_dir: PathBuf,
    /// File path or `sqlite:` URL for the leveling database.
    pub database_url: String,
    pub error_webhook: Option<WebhookCredentials>,
}

impl BotConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variables. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;
        let prefix = get("BOT_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let developers = match get("DEVELOPER_IDS") {
            Some(raw) => parse_id_list(&raw).ok_or(ConfigError::Invalid {
                key: "DEVELOPER_IDS",
                value: raw,
            })?,
            None => DeveloperSet::default(),
        };

        let data_dir = PathBuf::from(get("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));
        let database_url = get("DATABASE_URL")
            .unwrap_or_else(|| data_dir.join("leveling.db").to_string_lossy().into_owned());

        let error_webhook = match (get("ERROR_WEBHOOK_ID"), get("ERROR_WEBHOOK_TOKEN")) {
            (Some(id), Some(token)) => {
                let id = id.trim().parse().map_err(|_| ConfigError::Invalid {
                    key: "ERROR_WEBHOOK_ID",
                    value: id.clone(),
                })?;
                Some(WebhookCredentials { id, token })
            }
            _ => None,
        };

        Ok(Self {
            token,
            prefix,
            developers,
            data_dir,
            database_url,
            error_webhook,
        })
    }
}

fn parse_id_list(raw: &str) -> Option<DeveloperSet> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    Some(DeveloperSet::new(ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn token_is_required() {
        let err = load(&[]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DISCORD_TOKEN"));

        let err = load(&[("DISCORD_TOKEN", "  ")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DISCORD_TOKEN"));
    }

    #[test]
    fn defaults() {
        let config = load(&[("DISCORD_TOKEN", "abc")]).unwrap();

        assert_eq!(config.prefix, "!");
        assert_eq!(config.developers.len(), 0);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(
            config.database_url,
            PathBuf::from("data").join("leveling.db").to_string_lossy()
        );
        assert!(config.error_webhook.is_none());
    }

    #[test]
    fn parses_developers_and_webhook() {
        let config = load(&[
            ("DISCORD_TOKEN", "abc"),
            ("BOT_PREFIX", "?"),
            ("DEVELOPER_IDS", "1, 2,3,"),
            ("ERROR_WEBHOOK_ID", "99"),
            ("ERROR_WEBHOOK_TOKEN", "secret"),
        ])
        .unwrap();

        assert_eq!(config.prefix, "?");
        assert!(config.developers.contains(1));
        assert!(config.developers.contains(3));
        assert_eq!(config.developers.len(), 3);
        assert_eq!(
            config.error_webhook,
            Some(WebhookCredentials {
                id: 99,
                token: "secret".to_string()
            })
        );
    }

    #[test]
    fn rejects_bad_ids() {
        let err = load(&[("DISCORD_TOKEN", "abc"), ("DEVELOPER_IDS", "1,two")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "DEVELOPER_IDS",
                ..
            }
        ));

        let err = load(&[
            ("DISCORD_TOKEN", "abc"),
            ("ERROR_WEBHOOK_ID", "hook"),
            ("ERROR_WEBHOOK_TOKEN", "secret"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "ERROR_WEBHOOK_ID",
                ..
            }
        ));
    }

    #[test]
    fn webhook_needs_both_halves() {
        let config = load(&[("DISCORD_TOKEN", "abc"), ("ERROR_WEBHOOK_ID", "99")]).unwrap();
        assert!(config.error_webhook.is_none());
    }
}
