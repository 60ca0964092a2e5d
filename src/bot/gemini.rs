//! Gemini API client for auto-reply generation.
//!
//! Assembles a multimodal request (system instruction, knowledge files,
//! per-turn attachment, user text) and decodes text and inline audio from
//! the response. Generation never fails outward: any backend error becomes
//! a fixed user-visible fallback reply.

use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bot::knowledge::KnowledgeFile;
use crate::bot::settings::BotSettings;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Speech-capable model used whenever voice responses are enabled.
const TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
const TTS_VOICE: &str = "Kore";
const TEMPERATURE: f32 = 0.8;

/// Reply text when the backend returns no text content.
const EMPTY_REPLY_TEXT: &str = "Processado.";
/// User-visible reply for any backend failure.
const API_ERROR_TEXT: &str = "⚠️ Erro na API. Verifique sua chave nos Ajustes.";
/// Instruction standing in for the user text when only a file was sent.
const ATTACHMENT_ONLY_PROMPT: &str = "Analise o arquivo acima e responda adequadamente.";

pub struct GeminiClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

/// Attachment payload forwarded from the current chat turn.
#[derive(Debug, Clone)]
pub struct InlineAttachment {
    pub base64: String,
    pub mime_type: String,
}

/// A generated reply: display text plus optional synthesized PCM audio.
#[derive(Debug)]
pub struct BotReply {
    pub text: String,
    pub audio: Option<Vec<u8>>,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    fn text(text: String) -> Self {
        Self::Text { text }
    }

    fn inline(data: String, mime_type: String) -> Self {
        Self::InlineData {
            inline_data: InlineData { data, mime_type },
        }
    }
}

#[derive(Serialize)]
struct InlineData {
    data: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseModalities", skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(rename = "speechConfig", skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Serialize)]
struct SpeechConfig {
    #[serde(rename = "voiceConfig")]
    voice_config: VoiceConfig,
}

#[derive(Serialize)]
struct VoiceConfig {
    #[serde(rename = "prebuiltVoiceConfig")]
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Serialize)]
struct PrebuiltVoiceConfig {
    #[serde(rename = "voiceName")]
    voice_name: String,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: String,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<ResponseInlineData>,
}

#[derive(Deserialize, Debug)]
struct ResponseInlineData {
    data: String,
}

/// Errors from a single generation attempt.
#[derive(Debug)]
pub enum GenerateError {
    Http(String),
    Api(String),
    Parse(String),
    Decode(String),
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(msg) => write!(f, "HTTP error: {msg}"),
            Self::Api(msg) => write!(f, "API error: {msg}"),
            Self::Parse(msg) => write!(f, "Failed to parse response: {msg}"),
            Self::Decode(msg) => write!(f, "Failed to decode audio: {msg}"),
        }
    }
}

impl std::error::Error for GenerateError {}

/// Select the model for this turn. Voice responses force the TTS model.
fn model_for(settings: &BotSettings) -> &str {
    if settings.voice_response {
        TTS_MODEL
    } else {
        &settings.model
    }
}

/// Assemble the ordered part list and generation config for one turn.
fn build_request(
    user_text: &str,
    settings: &BotSettings,
    attachment: Option<&InlineAttachment>,
    knowledge: &[KnowledgeFile],
) -> GenerateRequest {
    let mut parts = vec![Part::text(format!("SYSTEM_INSTRUCTION: {}", settings.prompt))];

    for file in knowledge {
        parts.push(Part::inline(file.base64.clone(), file.mime_type.clone()));
        parts.push(Part::text(format!("[Contexto extraído do arquivo: {}]", file.name)));
    }

    if let Some(att) = attachment {
        parts.push(Part::inline(att.base64.clone(), att.mime_type.clone()));
    }

    let user_part = if user_text.is_empty() {
        ATTACHMENT_ONLY_PROMPT.to_string()
    } else {
        user_text.to_string()
    };
    parts.push(Part::text(user_part));

    let generation_config = if settings.voice_response {
        GenerationConfig {
            temperature: TEMPERATURE,
            response_modalities: Some(vec!["AUDIO".to_string()]),
            speech_config: Some(SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: TTS_VOICE.to_string(),
                    },
                },
            }),
        }
    } else {
        GenerationConfig {
            temperature: TEMPERATURE,
            response_modalities: None,
            speech_config: None,
        }
    };

    GenerateRequest {
        contents: vec![Content { parts }],
        generation_config,
    }
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, GEMINI_API_BASE.to_string())
    }

    /// Create a client against a non-default endpoint.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            api_key,
            base_url,
            client,
        }
    }

    /// Generate a reply for one user turn.
    ///
    /// Never fails outward: backend, credential, and decoding errors are
    /// logged and converted to a fixed error reply with no audio.
    pub async fn generate_auto_reply(
        &self,
        user_text: &str,
        settings: &BotSettings,
        attachment: Option<&InlineAttachment>,
        knowledge: &[KnowledgeFile],
    ) -> BotReply {
        match self.request(user_text, settings, attachment, knowledge).await {
            Ok(reply) => {
                info!(
                    "🤖 Generated reply ({} chars{})",
                    reply.text.chars().count(),
                    if reply.audio.is_some() { ", with audio" } else { "" }
                );
                reply
            }
            Err(e) => {
                warn!("Gemini generation failed: {e}");
                BotReply {
                    text: API_ERROR_TEXT.to_string(),
                    audio: None,
                }
            }
        }
    }

    async fn request(
        &self,
        user_text: &str,
        settings: &BotSettings,
        attachment: Option<&InlineAttachment>,
        knowledge: &[KnowledgeFile],
    ) -> Result<BotReply, GenerateError> {
        let model = model_for(settings);
        let request = build_request(user_text, settings, attachment, knowledge);

        let url = format!("{}/{}:generateContent?key={}", self.base_url, model, self.api_key);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerateError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerateError::Http(e.to_string()))?;

        debug!("Gemini response status: {status}");

        if !status.is_success() {
            return Err(GenerateError::Api(format!("{status}: {body}")));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| GenerateError::Parse(e.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(GenerateError::Api(error.message));
        }

        let mut text = String::new();
        let mut audio = None;

        let parts = parsed
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[]);

        for part in parts {
            if let Some(t) = &part.text {
                text.push_str(t);
            }
            if let Some(inline) = &part.inline_data {
                // Raw PCM; a later inline part replaces an earlier one.
                let data = base64::engine::general_purpose::STANDARD
                    .decode(&inline.data)
                    .map_err(|e| GenerateError::Decode(e.to_string()))?;
                audio = Some(data);
            }
        }

        let text = if text.is_empty() {
            EMPTY_REPLY_TEXT.to_string()
        } else {
            text
        };

        Ok(BotReply { text, audio })
    }
}
