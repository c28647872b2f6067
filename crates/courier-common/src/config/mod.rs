//! Configuration structs

mod app_config;

pub use app_config::{
    ApiConfig, AppConfig, AppSettings, BotConfig, ConfigError, Environment, GatewayConfig,
};
