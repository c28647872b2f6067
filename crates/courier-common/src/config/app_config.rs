//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use courier_core::GatewayIntents;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ApiConfig,
    pub gateway: GatewayConfig,
    pub bot: BotConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Request/response API settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

/// Gateway session settings
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_version")]
    pub version: u8,
    #[serde(default)]
    pub intents: GatewayIntents,
    #[serde(default = "default_large_threshold")]
    pub large_threshold: u32,
}

/// Identity and command settings
#[derive(Clone, Deserialize)]
pub struct BotConfig {
    pub token: String,
    /// Bot identities use `/gateway/bot` and the `Bot` authorization scheme
    #[serde(default = "default_is_bot")]
    pub is_bot: bool,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: char,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("is_bot", &self.is_bot)
            .field("command_prefix", &self.command_prefix)
            .finish()
    }
}

// Default value functions
fn default_app_name() -> String {
    "courier".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_api_base_url() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_api_timeout_secs() -> u64 {
    15
}

fn default_gateway_version() -> u8 {
    10
}

fn default_large_threshold() -> u32 {
    100
}

fn default_is_bot() -> bool {
    true
}

fn default_command_prefix() -> char {
    '!'
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `COURIER_TOKEN` is missing or a value cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("COURIER_TOKEN")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingVar("COURIER_TOKEN"))?;

        let env = match lookup("APP_ENV") {
            Some(raw) => Environment::parse(&raw).ok_or(ConfigError::InvalidValue("APP_ENV", raw))?,
            None => default_env(),
        };

        let command_prefix = match lookup("COMMAND_PREFIX") {
            Some(raw) => raw
                .trim()
                .chars()
                .next()
                .ok_or(ConfigError::InvalidValue("COMMAND_PREFIX", raw.clone()))?,
            None => default_command_prefix(),
        };

        let intents = match lookup("GATEWAY_INTENTS") {
            Some(raw) => GatewayIntents::parse(&raw)
                .map_err(|_| ConfigError::InvalidValue("GATEWAY_INTENTS", raw.clone()))?,
            None => GatewayIntents::default(),
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            api: ApiConfig {
                base_url: lookup("API_BASE_URL").unwrap_or_else(default_api_base_url),
                timeout_secs: parse_var(&lookup, "API_TIMEOUT_SECS", default_api_timeout_secs)?,
            },
            gateway: GatewayConfig {
                version: parse_var(&lookup, "GATEWAY_VERSION", default_gateway_version)?,
                intents,
                large_threshold: parse_var(
                    &lookup,
                    "GATEWAY_LARGE_THRESHOLD",
                    default_large_threshold,
                )?,
            },
            bot: BotConfig {
                token,
                is_bot: parse_var(&lookup, "COURIER_BOT", default_is_bot)?,
                command_prefix,
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: fn() -> T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
