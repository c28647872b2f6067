//! Handler registries
//!
//! One callback per slot; registering again replaces the previous callback.

use crate::events::normalize_event_name;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Callback for a named dispatch event, receiving the raw payload
pub type EventCallback = Arc<dyn Fn(Value) + Send + Sync>;

/// Callback for a text command, receiving the message payload and the remainder
pub type CommandCallback = Arc<dyn Fn(Value, String) + Send + Sync>;

/// Normalized event name -> callback
#[derive(Default)]
pub struct DispatchRegistry {
    handlers: HashMap<String, EventCallback>,
}

impl DispatchRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `callback` for `name`, replacing any previous one
    pub fn register(&mut self, name: &str, callback: EventCallback) {
        let key = normalize_event_name(name);
        if self.handlers.insert(key.clone(), callback).is_some() {
            tracing::debug!(event = %key, "Replaced event handler");
        }
    }

    /// Look up the callback for an already normalized event name
    pub fn get(&self, normalized: &str) -> Option<&EventCallback> {
        self.handlers.get(normalized)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Lower-cased command word -> callback
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandCallback>,
}

impl CommandRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `callback` for `word`, replacing any previous one
    pub fn register(&mut self, word: &str, callback: CommandCallback) {
        let key = word.trim().to_lowercase();
        if self.commands.insert(key.clone(), callback).is_some() {
            tracing::debug!(command = %key, "Replaced command handler");
        }
    }

    /// Look up the callback for an already lower-cased command word
    pub fn get(&self, word: &str) -> Option<&CommandCallback> {
        self.commands.get(word)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.commands.len()
    }
}
