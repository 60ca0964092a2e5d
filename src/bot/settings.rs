//! Behavioral settings for the simulated bot.

/// Default generation model when voice responses are off.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Default system prompt shipped with the simulator.
pub const DEFAULT_PROMPT: &str = "Você é um assistente virtual prestativo para uma empresa no \
WhatsApp. Responda de forma educada, curta e direta. Use emojis ocasionalmente. Se receber \
áudio, responda de acordo com o que ouviu.";

/// Bot behavior, owned by the engine and edited through the settings surface.
#[derive(Debug, Clone)]
pub struct BotSettings {
    /// Generation model used when voice responses are disabled.
    pub model: String,
    /// System instruction prepended to every request.
    pub prompt: String,
    /// Whether incoming messages trigger automatic replies at all.
    pub active: bool,
    /// Seconds to wait before replying. Currently a declared knob only; the
    /// generation path does not apply it.
    pub reply_delay_secs: u64,
    /// Request synthesized audio replies instead of text.
    pub voice_response: bool,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            active: true,
            reply_delay_secs: 2,
            voice_response: false,
        }
    }
}
