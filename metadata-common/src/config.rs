//! Configuration management for the metadata MCP server
//!
//! Two sources, chosen at startup:
//! 1. **TOML file** when a path is supplied (`-c/--config` or `METADATA_MCP_CONFIG`)
//! 2. **Environment variables** otherwise
//!
//! Either way the result goes through [`Config::validate`], which fills in
//! defaults and rejects missing provider credentials.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Server configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server port
    ///
    /// Default: 8080
    #[serde(default)]
    pub port: u16,

    /// TMDB API key (required)
    #[serde(default)]
    pub tmdb_api_key: String,

    /// Language TMDB responses are localized into
    ///
    /// Default: zh-CN
    #[serde(default)]
    pub tmdb_response_language: String,

    /// ThePornDB API token (required)
    #[serde(default)]
    pub theporndb_api_key: String,

    /// Base URL of the Metatube server (required)
    #[serde(default)]
    pub metatube_api_url: String,

    /// Metatube bearer token (optional)
    #[serde(default)]
    pub metatube_api_key: Option<String>,

    /// Wikipedia language edition, e.g. "en", "ja"
    ///
    /// Default: en
    #[serde(default)]
    pub wikipedia_language: String,

    /// JSON document mapping actor directory names to alias lists
    ///
    /// Default: jav_actor_alias.json (relative to the working directory)
    #[serde(default)]
    pub jav_actor_alias_file: Option<PathBuf>,

    /// Upper bound on every upstream HTTP request
    ///
    /// Default: 30 seconds
    #[serde(default)]
    pub request_timeout_secs: u64,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TMDB_LANGUAGE: &str = "zh-CN";
const DEFAULT_WIKIPEDIA_LANGUAGE: &str = "en";
const DEFAULT_ALIAS_FILE: &str = "jav_actor_alias.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from `path` if given, otherwise from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_toml_file(path),
            None => Self::from_env(),
        }
    }

    /// Read and validate a TOML configuration file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        info!("Configuration loaded from environment variables");
        Ok(config)
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Keys are the upper-case environment names (`TMDB_API_KEY`, ...).
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let parse_num = |key: &str| -> Result<Option<u64>> {
            get(key)
                .map(|v| {
                    v.trim()
                        .parse::<u64>()
                        .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", key, v, e)))
                })
                .transpose()
        };

        let port = match parse_num("PORT")? {
            Some(p) => u16::try_from(p)
                .map_err(|_| Error::Config(format!("Invalid PORT '{}': out of range", p)))?,
            None => 0,
        };

        let mut config = Config {
            port,
            tmdb_api_key: get("TMDB_API_KEY").unwrap_or_default(),
            tmdb_response_language: get("TMDB_RESPONSE_LANGUAGE").unwrap_or_default(),
            theporndb_api_key: get("THEPORNDB_API_KEY").unwrap_or_default(),
            metatube_api_url: get("METATUBE_API_URL").unwrap_or_default(),
            metatube_api_key: get("METATUBE_API_KEY"),
            wikipedia_language: get("WIKIPEDIA_LANGUAGE").unwrap_or_default(),
            jav_actor_alias_file: get("JAV_ACTOR_ALIAS_FILE").map(PathBuf::from),
            request_timeout_secs: parse_num("REQUEST_TIMEOUT_SECS")?.unwrap_or(0),
            logging: LoggingConfig {
                level: get("LOG_LEVEL").unwrap_or_else(default_log_level),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Fill defaults and check required fields
    pub fn validate(&mut self) -> Result<()> {
        if self.port == 0 {
            self.port = DEFAULT_PORT;
        }

        if self.tmdb_api_key.trim().is_empty() {
            return Err(Error::Config("TMDB_API_KEY is required".to_string()));
        }
        if self.tmdb_response_language.trim().is_empty() {
            self.tmdb_response_language = DEFAULT_TMDB_LANGUAGE.to_string();
        }

        if self.theporndb_api_key.trim().is_empty() {
            return Err(Error::Config("THEPORNDB_API_KEY is required".to_string()));
        }
        if self.metatube_api_url.trim().is_empty() {
            return Err(Error::Config("METATUBE_API_URL is required".to_string()));
        }
        if self
            .metatube_api_key
            .as_ref()
            .is_some_and(|k| k.trim().is_empty())
        {
            self.metatube_api_key = None;
        }

        if self.wikipedia_language.trim().is_empty() {
            self.wikipedia_language = DEFAULT_WIKIPEDIA_LANGUAGE.to_string();
        }

        if self.jav_actor_alias_file.is_none() {
            warn!(
                "jav_actor_alias_file not configured, using ./{}",
                DEFAULT_ALIAS_FILE
            );
            self.jav_actor_alias_file = Some(PathBuf::from(DEFAULT_ALIAS_FILE));
        }

        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }

        Ok(())
    }

    /// Path of the actor alias document (defaults applied by `validate`)
    pub fn alias_file(&self) -> PathBuf {
        self.jav_actor_alias_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ALIAS_FILE))
    }

    /// Upstream request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
