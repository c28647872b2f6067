//! Dispatch router
//!
//! Hands each dispatch event to the registered callback, then applies the
//! built-in effects: caching the current user and guilds, and running text
//! commands out of MESSAGE_CREATE.

use super::command::parse_command;
use super::registry::{CommandCallback, CommandRegistry, DispatchRegistry, EventCallback};
use crate::events::{normalize_event_name, GatewayEventType, ReadyEvent};
use courier_core::{Guild, Snowflake, User};
use serde_json::Value;
use std::collections::HashMap;

/// Effect of a dispatch event on the session itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No session field changes
    None,
    /// READY: store the new session id
    Ready { session_id: String },
    /// RESUMED: the resume completed
    Resumed,
}

/// Routes dispatch events and owns the state they build up
pub struct DispatchRouter {
    events: DispatchRegistry,
    commands: CommandRegistry,
    guilds: HashMap<Snowflake, Guild>,
    current_user: Option<User>,
    prefix: char,
}

impl DispatchRouter {
    #[must_use]
    pub fn new(prefix: char) -> Self {
        Self {
            events: DispatchRegistry::new(),
            commands: CommandRegistry::new(),
            guilds: HashMap::new(),
            current_user: None,
            prefix,
        }
    }

    pub fn on_event(&mut self, name: &str, callback: EventCallback) {
        self.events.register(name, callback);
    }

    pub fn register_command(&mut self, word: &str, callback: CommandCallback) {
        self.commands.register(word, callback);
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn guild(&self, id: Snowflake) -> Option<&Guild> {
        self.guilds.get(&id)
    }

    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }

    pub fn prefix(&self) -> char {
        self.prefix
    }

    /// Route one dispatch event
    ///
    /// The registered callback always sees the payload first, unmodified.
    pub fn route(&mut self, event_name: &str, payload: Value) -> DispatchOutcome {
        let name = normalize_event_name(event_name);

        if let Some(callback) = self.events.get(&name) {
            callback(payload.clone());
        }

        match GatewayEventType::from_normalized(&name) {
            Some(GatewayEventType::Ready) => self.on_ready(payload),
            Some(GatewayEventType::Resumed) => DispatchOutcome::Resumed,
            Some(GatewayEventType::GuildCreate) => {
                self.on_guild_create(payload);
                DispatchOutcome::None
            }
            Some(GatewayEventType::MessageCreate) => {
                self.on_message_create(payload);
                DispatchOutcome::None
            }
            None => DispatchOutcome::None,
        }
    }

    fn on_ready(&mut self, payload: Value) -> DispatchOutcome {
        match serde_json::from_value::<ReadyEvent>(payload) {
            Ok(ready) => {
                tracing::info!(
                    user = %ready.user.tag(),
                    guilds = ready.guilds.len(),
                    "Session ready"
                );
                self.current_user = Some(ready.user);
                DispatchOutcome::Ready {
                    session_id: ready.session_id,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Malformed READY payload");
                DispatchOutcome::None
            }
        }
    }

    fn on_guild_create(&mut self, payload: Value) {
        match serde_json::from_value::<Guild>(payload) {
            Ok(guild) => {
                tracing::debug!(guild_id = %guild.id, name = %guild.name, "Guild cached");
                self.guilds.insert(guild.id, guild);
            }
            Err(e) => tracing::warn!(error = %e, "Malformed GUILD_CREATE payload"),
        }
    }

    fn on_message_create(&self, payload: Value) {
        let Some(content) = payload.get("content").and_then(Value::as_str) else {
            return;
        };
        let Some(parsed) = parse_command(content, self.prefix) else {
            return;
        };
        let Some(callback) = self.commands.get(&parsed.word) else {
            tracing::trace!(command = %parsed.word, "No handler for command");
            return;
        };

        tracing::debug!(command = %parsed.word, "Running command");
        let remainder = parsed.remainder.to_string();
        callback(payload, remainder);
    }
}
