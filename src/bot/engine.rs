//! Simulator engine - wires the stores to the Gemini client.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

use crate::bot::attachment::{EncodedFile, mime_for_path};
use crate::bot::audio::{CHANNELS, SAMPLE_RATE, pcm_to_wav};
use crate::bot::conversation::ConversationLog;
use crate::bot::gemini::{GeminiClient, InlineAttachment};
use crate::bot::knowledge::KnowledgeStore;
use crate::bot::message::{MessageAttachment, Sender};
use crate::bot::settings::BotSettings;

/// A captured or selected file awaiting send with the next message.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub name: String,
    pub file: EncodedFile,
}

impl PendingUpload {
    /// Read a file from disk, deriving its MIME type from the extension.
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let data = std::fs::read(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        let mime = mime_for_path(path);
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("arquivo")
            .to_string();
        Ok(Self {
            name,
            file: EncodedFile::from_bytes(&data, mime),
        })
    }
}

/// Outcome of a single user turn.
#[derive(Debug, Clone, Copy)]
pub struct SendOutcome {
    pub user_message_id: u64,
    /// Absent when the bot is inactive.
    pub bot_message_id: Option<u64>,
}

/// The simulator engine.
///
/// Owns all session state. `send_message` takes `&mut self`, so turns are
/// processed one at a time and replies always append in send order.
pub struct SimulatorEngine {
    settings: BotSettings,
    knowledge: KnowledgeStore,
    conversation: ConversationLog,
    gemini: GeminiClient,
    /// Where synthesized voice replies are written.
    data_dir: PathBuf,
}

impl SimulatorEngine {
    pub fn new(settings: BotSettings, gemini: GeminiClient, data_dir: PathBuf) -> Self {
        Self {
            settings,
            knowledge: KnowledgeStore::new(),
            conversation: ConversationLog::new(),
            gemini,
            data_dir,
        }
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut BotSettings {
        &mut self.settings
    }

    pub fn knowledge(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    /// Ingest one file from disk into the knowledge store.
    pub fn add_knowledge_file(&mut self, path: &Path) -> Result<u64, String> {
        let data = std::fs::read(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        let mime = mime_for_path(path);
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("arquivo")
            .to_string();

        let file = self.knowledge.add(&name, &data, mime);
        info!("🧠 Added knowledge file {} ({}, {} bytes)", file.name, file.kind, data.len());
        Ok(file.id)
    }

    /// Ingest several files. A failed file is reported in its slot and does
    /// not stop the rest of the batch.
    pub fn add_knowledge_files(&mut self, paths: &[PathBuf]) -> Vec<(PathBuf, Result<u64, String>)> {
        paths
            .iter()
            .map(|path| (path.clone(), self.add_knowledge_file(path)))
            .collect()
    }

    pub fn remove_knowledge(&mut self, id: u64) -> bool {
        match self.knowledge.remove(id) {
            Some(file) => {
                info!("Removed knowledge file {} ({})", file.name, file.id);
                true
            }
            None => false,
        }
    }

    /// Process one user turn: append the user message, then (when the bot is
    /// active) generate and append the reply.
    pub async fn send_message(&mut self, text: &str, upload: Option<PendingUpload>) -> SendOutcome {
        let attachment = upload
            .as_ref()
            .map(|u| MessageAttachment::from_encoded(&u.file, &u.name));

        let user_message_id = self
            .conversation
            .push(Sender::User, text.to_string(), attachment, None)
            .id;

        if !self.settings.active {
            return SendOutcome {
                user_message_id,
                bot_message_id: None,
            };
        }

        let payload = upload.map(|u| InlineAttachment {
            base64: u.file.base64,
            mime_type: u.file.mime_type,
        });

        let reply = self
            .gemini
            .generate_auto_reply(text, &self.settings, payload.as_ref(), self.knowledge.files())
            .await;

        let audio_url = reply.audio.as_deref().and_then(|pcm| match self.write_voice_reply(pcm) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Failed to save voice reply: {e}");
                None
            }
        });

        let bot_message_id = self.conversation.push(Sender::Bot, reply.text, None, audio_url).id;

        SendOutcome {
            user_message_id,
            bot_message_id: Some(bot_message_id),
        }
    }

    /// Write raw PCM as a WAV file under the data directory and return its
    /// path as a playable reference.
    fn write_voice_reply(&self, pcm: &[u8]) -> Result<String, String> {
        std::fs::create_dir_all(&self.data_dir)
            .map_err(|e| format!("Failed to create {}: {e}", self.data_dir.display()))?;

        let path = self
            .data_dir
            .join(format!("voz_{}.wav", Utc::now().timestamp_millis()));
        let wav = pcm_to_wav(pcm, SAMPLE_RATE, CHANNELS);

        std::fs::write(&path, wav).map_err(|e| format!("Failed to write {}: {e}", path.display()))?;

        info!("🔊 Saved voice reply ({} PCM bytes) to {}", pcm.len(), path.display());
        Ok(path.display().to_string())
    }

    /// Export the conversation as pretty JSON.
    pub fn export_conversation(&self, path: &Path) -> Result<(), String> {
        self.conversation.export(path)
    }
}
