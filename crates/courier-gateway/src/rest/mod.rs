//! Request/response API collaborator
//!
//! The session only needs a single `request` operation from the secondary
//! API; everything typed (gateway discovery, channels, messages) is layered on
//! top of it here.

mod http;

pub use http::HttpRequestClient;

use async_trait::async_trait;
use courier_core::{Channel, Snowflake};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Errors raised by a request client
#[derive(Debug, Error)]
pub enum RestError {
    /// The request could not be sent or the response could not be read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The token cannot be carried in an Authorization header
    #[error("Token contains characters not allowed in a header")]
    InvalidToken,

    /// The response body was not the expected JSON
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Request client result type
pub type RestResult<T> = Result<T, RestError>;

/// One-shot request/response calls against the secondary API
#[async_trait]
pub trait RequestClient: Send + Sync {
    /// Perform a request and return the decoded JSON body (null when empty)
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> RestResult<Value>;
}

/// Response of `GET /gateway` and `GET /gateway/bot`
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayInfo {
    pub url: String,
    /// Recommended shard count (bot endpoint only)
    #[serde(default)]
    pub shards: Option<u32>,
}

/// Discover the gateway endpoint
pub async fn gateway_info(client: &dyn RequestClient, is_bot: bool) -> RestResult<GatewayInfo> {
    let path = if is_bot { "/gateway/bot" } else { "/gateway" };
    let body = client.request(Method::GET, path, None).await?;
    Ok(serde_json::from_value(body)?)
}

/// Fetch a channel by id
pub async fn get_channel(client: &dyn RequestClient, channel_id: Snowflake) -> RestResult<Channel> {
    let body = client
        .request(Method::GET, &format!("/channels/{channel_id}"), None)
        .await?;
    Ok(serde_json::from_value(body)?)
}

/// Post a text message to a channel, returning the created message
pub async fn create_message(
    client: &dyn RequestClient,
    channel_id: Snowflake,
    content: &str,
) -> RestResult<Value> {
    client
        .request(
            Method::POST,
            &format!("/channels/{channel_id}/messages"),
            Some(json!({ "content": content })),
        )
        .await
}
