//! Chat message types for the simulator conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bot::attachment::{AttachmentKind, EncodedFile};

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A file attached to a single chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAttachment {
    pub kind: AttachmentKind,
    /// Displayable reference; a data URL for files that originated locally.
    pub url: String,
    pub name: String,
    /// Payload for transmission, present when the file originated locally.
    pub base64: Option<String>,
    pub mime_type: Option<String>,
}

impl MessageAttachment {
    pub fn from_encoded(file: &EncodedFile, name: &str) -> Self {
        Self {
            kind: file.kind,
            url: file.data_url(),
            name: name.to_string(),
            base64: Some(file.base64.clone()),
            mime_type: Some(file.mime_type.clone()),
        }
    }

    /// The (base64, mime) pair forwarded to the generator, when available.
    pub fn inline_payload(&self) -> Option<(&str, &str)> {
        match (&self.base64, &self.mime_type) {
            (Some(data), Some(mime)) => Some((data.as_str(), mime.as_str())),
            _ => None,
        }
    }
}

/// One chat turn. Created once, appended to the log, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub sender: Sender,
    /// Display text; may be empty when only an attachment was sent.
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub attachment: Option<MessageAttachment>,
    /// Playable reference to synthesized speech for bot turns. Independent
    /// of `attachment`.
    pub audio_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_from_encoded() {
        let file = EncodedFile::from_bytes(b"fake-audio", "audio/webm");
        let attachment = MessageAttachment::from_encoded(&file, "Voz_1.webm");

        assert_eq!(attachment.kind, AttachmentKind::Audio);
        assert_eq!(attachment.name, "Voz_1.webm");
        assert!(attachment.url.starts_with("data:audio/webm;base64,"));
        assert_eq!(attachment.base64.as_deref(), Some(file.base64.as_str()));
        assert_eq!(attachment.mime_type.as_deref(), Some("audio/webm"));
    }

    #[test]
    fn test_inline_payload() {
        let file = EncodedFile::from_bytes(b"img", "image/png");
        let attachment = MessageAttachment::from_encoded(&file, "pic.png");
        let (data, mime) = attachment.inline_payload().unwrap();
        assert_eq!(data, file.base64);
        assert_eq!(mime, "image/png");
    }

    #[test]
    fn test_inline_payload_absent_without_base64() {
        let attachment = MessageAttachment {
            kind: AttachmentKind::Image,
            url: "https://example.com/remote.png".to_string(),
            name: "remote.png".to_string(),
            base64: None,
            mime_type: None,
        };
        assert!(attachment.inline_payload().is_none());
    }
}
