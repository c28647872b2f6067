//! Public handle to a running session
//!
//! Cheap to clone. Gateway actions are queued to the session task; request API
//! actions run directly on the caller's task.

use crate::dispatch::{CommandCallback, EventCallback};
use crate::error::{GatewayError, GatewayResult};
use crate::protocol::{
    Activity, GatewayMessage, PresenceStatus, RequestGuildMembersPayload, StatusUpdatePayload,
    VoiceStateUpdatePayload,
};
use crate::rest::{self, RequestClient, RestResult};
use crate::session::{ConnectionState, SessionCommand, SessionEvent, SessionSnapshot};
use courier_core::{Channel, Guild, Snowflake, User};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Handle for driving a [`Session`](crate::session::Session)
#[derive(Clone)]
pub struct GatewayClient {
    tx: mpsc::UnboundedSender<SessionEvent>,
    rest: Arc<dyn RequestClient>,
}

impl GatewayClient {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<SessionEvent>,
        rest: Arc<dyn RequestClient>,
    ) -> Self {
        Self { tx, rest }
    }

    /// Request client shared with the session
    pub fn rest(&self) -> &Arc<dyn RequestClient> {
        &self.rest
    }

    // === Gateway actions ===

    /// Update the presence shown to other users
    pub fn status_update(
        &self,
        status: PresenceStatus,
        activity: Option<Activity>,
        since: Option<u64>,
        afk: bool,
    ) -> GatewayResult<()> {
        let message = GatewayMessage::status_update(&StatusUpdatePayload {
            since,
            activity,
            status,
            afk,
        })?;
        self.send(message)
    }

    /// Join a voice channel
    ///
    /// The channel is looked up first. Anything that is not a guild voice
    /// channel, or a failed lookup, is logged and skipped without error.
    pub async fn join_voice_channel(
        &self,
        channel_id: Snowflake,
        self_mute: bool,
        self_deaf: bool,
    ) -> GatewayResult<()> {
        let channel = match self.get_channel(channel_id).await {
            Ok(channel) => channel,
            Err(e) => {
                tracing::warn!(%channel_id, error = %e, "Voice channel lookup failed, not joining");
                return Ok(());
            }
        };

        if !channel.is_voice() {
            tracing::warn!(
                %channel_id,
                kind = channel.kind.as_u8(),
                "Not a voice channel, not joining"
            );
            return Ok(());
        }
        let Some(guild_id) = channel.guild_id else {
            tracing::warn!(%channel_id, "Voice channel has no guild, not joining");
            return Ok(());
        };

        let message = GatewayMessage::voice_state_update(&VoiceStateUpdatePayload {
            guild_id,
            channel_id: Some(channel_id),
            self_mute,
            self_deaf,
        })?;
        self.send(message)
    }

    /// Leave voice in a guild
    pub fn leave_voice_channel(&self, guild_id: Snowflake) -> GatewayResult<()> {
        let message = GatewayMessage::voice_state_update(&VoiceStateUpdatePayload {
            guild_id,
            channel_id: None,
            self_mute: false,
            self_deaf: false,
        })?;
        self.send(message)
    }

    /// Ask for a member chunk of a guild; the answer arrives as GUILD_MEMBERS_CHUNK
    pub fn request_guild_members(
        &self,
        guild_id: Snowflake,
        query: impl Into<String>,
        limit: u32,
    ) -> GatewayResult<()> {
        let message = GatewayMessage::request_guild_members(&RequestGuildMembersPayload {
            guild_id,
            query: query.into(),
            limit,
        })?;
        self.send(message)
    }

    // === Request API actions ===

    /// Post a text message; returns the created message
    pub async fn create_message(
        &self,
        channel_id: Snowflake,
        content: impl AsRef<str>,
    ) -> RestResult<Value> {
        rest::create_message(self.rest.as_ref(), channel_id, content.as_ref()).await
    }

    pub async fn get_channel(&self, channel_id: Snowflake) -> RestResult<Channel> {
        rest::get_channel(self.rest.as_ref(), channel_id).await
    }

    // === Registration ===

    /// Register the callback for a dispatch event, replacing any previous one
    ///
    /// Names are matched case-insensitively, with spaces and dashes treated
    /// as underscores.
    pub fn on_event<F>(&self, name: impl Into<String>, callback: F) -> GatewayResult<()>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let callback: EventCallback = Arc::new(callback);
        self.command(SessionCommand::OnEvent {
            name: name.into(),
            callback,
        })
    }

    /// Register the callback for a text command, replacing any previous one
    ///
    /// The callback receives the MESSAGE_CREATE payload and the text after the
    /// command word.
    pub fn register_command<F>(&self, word: impl Into<String>, callback: F) -> GatewayResult<()>
    where
        F: Fn(Value, String) + Send + Sync + 'static,
    {
        let callback: CommandCallback = Arc::new(callback);
        self.command(SessionCommand::RegisterCommand {
            word: word.into(),
            callback,
        })
    }

    // === Lifecycle ===

    /// Drop the current connection and resume on a new one
    pub fn reconnect(&self) -> GatewayResult<()> {
        self.command(SessionCommand::Reconnect)
    }

    /// Close the connection and stop the session task
    pub fn shutdown(&self) -> GatewayResult<()> {
        self.command(SessionCommand::Shutdown)
    }

    // === Queries ===

    pub async fn current_user(&self) -> GatewayResult<Option<User>> {
        self.query(SessionCommand::CurrentUser).await
    }

    pub async fn guild(&self, id: Snowflake) -> GatewayResult<Option<Guild>> {
        self.query(|reply| SessionCommand::Guild(id, reply)).await
    }

    pub async fn guild_count(&self) -> GatewayResult<usize> {
        Ok(self.snapshot().await?.guild_count)
    }

    pub async fn connection_state(&self) -> GatewayResult<ConnectionState> {
        Ok(self.snapshot().await?.state)
    }

    pub async fn snapshot(&self) -> GatewayResult<SessionSnapshot> {
        self.query(SessionCommand::Snapshot).await
    }

    fn send(&self, message: GatewayMessage) -> GatewayResult<()> {
        self.command(SessionCommand::Send(message))
    }

    fn command(&self, command: SessionCommand) -> GatewayResult<()> {
        self.tx
            .send(SessionEvent::Command(command))
            .map_err(|_| GatewayError::SessionClosed)
    }

    async fn query<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> GatewayResult<T> {
        let (reply, response) = oneshot::channel();
        self.command(make(reply))?;
        response.await.map_err(|_| GatewayError::SessionClosed)
    }
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}
