//! Tracing and logging setup
//!
//! `RUST_LOG` always wins. Without it the filter is built from
//! [`TracingConfig`]: a base level, the HTTP and WebSocket stacks held at
//! `warn`, and optionally per-frame logging from the gateway crate.

use crate::config::Environment;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Dependencies that log every request or frame at debug level
const NOISY_TARGETS: &[&str] = &[
    "hyper",
    "hyper_util",
    "reqwest",
    "rustls",
    "tungstenite",
    "tokio_tungstenite",
];

/// Subscriber settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for this workspace's crates
    pub level: Level,
    /// One JSON object per line instead of human-readable output
    pub json: bool,
    /// Log every gateway frame sent and received (trace level)
    pub frames: bool,
    /// Include source file and line
    pub file_line: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
            frames: false,
            file_line: true,
        }
    }
}

impl TracingConfig {
    /// Pick the configuration matching a deployment environment
    ///
    /// Development logs at debug with frames, production emits JSON.
    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self {
                level: Level::DEBUG,
                frames: true,
                ..Self::default()
            },
            Environment::Staging => Self::default(),
            Environment::Production => Self {
                json: true,
                file_line: false,
                ..Self::default()
            },
        }
    }

    /// Filter directives used when `RUST_LOG` is unset
    #[must_use]
    pub fn directives(&self) -> String {
        let level = self.level.to_string().to_lowercase();
        let mut directives = vec![level];
        directives.extend(NOISY_TARGETS.iter().map(|target| format!("{target}=warn")));
        if self.frames {
            directives.push("courier_gateway::session=trace".to_string());
        }
        directives.join(",")
    }
}

/// Install the global subscriber
///
/// Fails if a subscriber is already set, so calling it twice is harmless.
pub fn try_init_tracing_with_config(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.directives()));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_file(config.file_line)
        .with_line_number(config.file_line);

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.json {
        registry.with(fmt_layer.json()).try_init()
    } else {
        registry.with(fmt_layer).try_init()
    };
    result.map_err(|_| TracingError::AlreadyInitialized)
}

/// Install the global subscriber with default settings
pub fn try_init_tracing() -> Result<(), TracingError> {
    try_init_tracing_with_config(TracingConfig::default())
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}
