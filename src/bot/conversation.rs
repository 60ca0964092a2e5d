//! Append-only log of exchanged messages.

use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::bot::message::{Message, MessageAttachment, Sender};

/// Ordered conversation history for the current session.
///
/// Messages get assignment-order ids and are never edited or removed once
/// appended.
pub struct ConversationLog {
    messages: Vec<Message>,
    next_id: u64,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
        }
    }

    /// Append a turn, assigning the next id and stamping the current time.
    pub fn push(
        &mut self,
        sender: Sender,
        text: String,
        attachment: Option<MessageAttachment>,
        audio_url: Option<String>,
    ) -> &Message {
        let message = Message {
            id: self.next_id,
            sender,
            text,
            timestamp: Utc::now(),
            attachment,
            audio_url,
        };
        self.next_id += 1;
        self.messages.push(message);
        self.messages.last().expect("message was just pushed")
    }

    pub fn get(&self, id: u64) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of bot turns so far.
    pub fn bot_reply_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.sender == Sender::Bot)
            .count()
    }

    /// Most recent bot turns, newest first.
    pub fn recent_bot_replies(&self, limit: usize) -> Vec<&Message> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.sender == Sender::Bot)
            .take(limit)
            .collect()
    }

    /// Write the whole conversation to a pretty-printed JSON file.
    pub fn export(&self, path: &Path) -> Result<(), String> {
        #[derive(Serialize)]
        struct Export<'a> {
            messages: &'a [Message],
        }

        let json = serde_json::to_string_pretty(&Export {
            messages: &self.messages,
        })
        .map_err(|e| format!("Failed to serialize conversation: {e}"))?;

        std::fs::write(path, json).map_err(|e| format!("Failed to write {}: {e}", path.display()))?;

        info!("💾 Exported conversation ({} messages) to {}", self.messages.len(), path.display());
        Ok(())
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}
