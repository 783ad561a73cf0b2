//! Process configuration, read once at startup from the environment and an
//! optional `.env` file.

use std::time::Duration;

use sommelierr_core::{CatalogKind, PosterPolicy};
use thiserror::Error;
use url::Url;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Connection settings for one media manager.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub base_url: Url,
    pub api_key: String,
    pub exclude_label: String,
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("exclude_label", &self.exclude_label)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub radarr: UpstreamConfig,
    pub sonarr: UpstreamConfig,
    pub poster_policy: PosterPolicy,
    pub upstream_timeout: Duration,
    pub bind_addr: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load `.env` (if present) and then read the process environment.
    /// Variables already set in the environment take precedence.
    pub fn load() -> Result<Self, ConfigError> {
        env_file_loaded(dotenvy::dotenv())?;
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source. Empty values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let radarr = UpstreamConfig {
            base_url: parse_host("RADARR_HOST", get("RADARR_HOST"))?,
            api_key: get("RADARR_API_KEY").ok_or(ConfigError::Missing("RADARR_API_KEY"))?,
            exclude_label: get("RADARR_EXCLUDE_TAG").unwrap_or_default(),
        };
        let sonarr = UpstreamConfig {
            base_url: parse_host("SONARR_HOST", get("SONARR_HOST"))?,
            api_key: get("SONARR_API_KEY").ok_or(ConfigError::Missing("SONARR_API_KEY"))?,
            exclude_label: get("SONARR_EXCLUDE_TAG").unwrap_or_default(),
        };

        let poster_policy = match get("POSTER_MODE") {
            Some(raw) => raw.parse::<PosterPolicy>().map_err(|e| ConfigError::Invalid {
                name: "POSTER_MODE",
                reason: format!("{e}"),
            })?,
            None => PosterPolicy::default(),
        };

        let timeout_secs = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "UPSTREAM_TIMEOUT_SECS",
                        reason: format!("'{raw}' is not a positive number of seconds"),
                    });
                }
            },
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: format!("'{raw}': {e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let log_format = match get("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    reason: format!("'{other}', expected 'text' or 'json'"),
                });
            }
        };

        Ok(Self {
            radarr,
            sonarr,
            poster_policy,
            upstream_timeout: Duration::from_secs(timeout_secs),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port,
            log_format,
        })
    }

    pub fn upstream(&self, kind: CatalogKind) -> &UpstreamConfig {
        match kind {
            CatalogKind::Movie => &self.radarr,
            CatalogKind::Series => &self.sonarr,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn env_file_loaded<T>(result: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn parse_host(name: &'static str, raw: Option<String>) -> Result<Url, ConfigError> {
    let raw = raw.ok_or(ConfigError::Missing(name))?;
    let url = Url::parse(&raw).map_err(|e| ConfigError::Invalid {
        name,
        reason: format!("'{raw}': {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("'{raw}' must be an http(s) URL"),
        });
    }
    Ok(url)
}
