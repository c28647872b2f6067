//! reqwest-backed request client

use super::{RequestClient, RestError, RestResult};
use async_trait::async_trait;
use courier_common::AppConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Request client talking JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpRequestClient {
    client: Client,
    /// Base URL without trailing slash (e.g., "https://discord.com/api/v10")
    base_url: String,
}

impl HttpRequestClient {
    /// Create a client sending `token` on every request
    ///
    /// Bot identities use the `Bot <token>` scheme; other tokens are sent as is.
    pub fn new(
        base_url: impl Into<String>,
        token: &str,
        is_bot: bool,
        timeout: Duration,
    ) -> RestResult<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&authorization_value(token, is_bot))
            .map_err(|_| RestError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("courier (", env!("CARGO_PKG_VERSION"), ")")),
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from application configuration
    pub fn from_config(config: &AppConfig) -> RestResult<Self> {
        Self::new(
            config.api.base_url.clone(),
            &config.bot.token,
            config.bot.is_bot,
            Duration::from_secs(config.api.timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl RequestClient for HttpRequestClient {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> RestResult<Value> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "API request");

        let mut request = self.client.request(method, &url);
        if let Some(body) = &body {
            request = request.json(body);
        }
        let response = request.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), %url, "API request rejected");
            return Err(RestError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }
}

fn authorization_value(token: &str, is_bot: bool) -> String {
    if is_bot {
        format!("Bot {token}")
    } else {
        token.to_string()
    }
}
