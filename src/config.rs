use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::bot::settings::{BotSettings, DEFAULT_MODEL, DEFAULT_PROMPT};

/// Environment variable holding the Gemini API key. Takes precedence over
/// the config file.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize, Default)]
struct ConfigFile {
    /// Gemini API key; the GEMINI_API_KEY environment variable wins over
    /// this field.
    #[serde(default)]
    gemini_api_key: String,
    /// Directory for logs, exports, and synthesized audio. Defaults to the
    /// current directory.
    data_dir: Option<String>,
    /// Startup model for text replies.
    model: Option<String>,
    /// Startup system prompt.
    prompt: Option<String>,
    /// Whether the bot starts in auto-reply mode.
    active: Option<bool>,
    reply_delay_secs: Option<u64>,
    voice_response: Option<bool>,
}

#[derive(Debug)]
pub struct Config {
    pub gemini_api_key: String,
    /// Directory for logs, exports, and synthesized audio.
    pub data_dir: PathBuf,
    /// Startup bot settings, editable at runtime from the settings surface.
    pub bot: BotSettings,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        Self::resolve(file, std::env::var(API_KEY_ENV).ok())
    }

    /// Build a config without a file: environment key plus stock settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(ConfigFile::default(), std::env::var(API_KEY_ENV).ok())
    }

    fn resolve(file: ConfigFile, env_key: Option<String>) -> Result<Self, ConfigError> {
        let gemini_api_key = env_key
            .filter(|k| !k.is_empty())
            .unwrap_or(file.gemini_api_key);

        if gemini_api_key.is_empty() {
            return Err(ConfigError::Validation(format!(
                "gemini_api_key is required (set {API_KEY_ENV} or the config field)"
            )));
        }

        let model = file.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        if model.is_empty() {
            return Err(ConfigError::Validation("model must not be empty".into()));
        }

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let defaults = BotSettings::default();
        let bot = BotSettings {
            model,
            prompt: file.prompt.unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
            active: file.active.unwrap_or(defaults.active),
            reply_delay_secs: file.reply_delay_secs.unwrap_or(defaults.reply_delay_secs),
            voice_response: file.voice_response.unwrap_or(defaults.voice_response),
        };

        Ok(Self {
            gemini_api_key,
            data_dir,
            bot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn parse(content: &str) -> ConfigFile {
        serde_json::from_str(content).unwrap()
    }

    #[test]
    fn test_valid_config() {
        let file = parse(r#"{
            "gemini_api_key": "abc123",
            "model": "gemini-3-pro",
            "voice_response": true
        }"#);
        let config = Config::resolve(file, None).expect("should resolve");
        assert_eq!(config.gemini_api_key, "abc123");
        assert_eq!(config.bot.model, "gemini-3-pro");
        assert!(config.bot.voice_response);
        assert!(config.bot.active);
    }

    #[test]
    fn test_env_key_wins_over_file() {
        let file = parse(r#"{ "gemini_api_key": "from-file" }"#);
        let config = Config::resolve(file, Some("from-env".to_string())).unwrap();
        assert_eq!(config.gemini_api_key, "from-env");
    }

    #[test]
    fn test_empty_env_key_falls_back_to_file() {
        let file = parse(r#"{ "gemini_api_key": "from-file" }"#);
        let config = Config::resolve(file, Some(String::new())).unwrap();
        assert_eq!(config.gemini_api_key, "from-file");
    }

    #[test]
    fn test_missing_key() {
        let err = Config::resolve(parse("{}"), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("gemini_api_key"));
    }

    #[test]
    fn test_empty_model() {
        let file = parse(r#"{ "gemini_api_key": "abc", "model": "" }"#);
        let err = Config::resolve(file, None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("model"));
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let file = parse(r#"{ "gemini_api_key": "abc" }"#);
        let config = Config::resolve(file, None).unwrap();
        assert_eq!(config.bot.model, DEFAULT_MODEL);
        assert_eq!(config.bot.prompt, DEFAULT_PROMPT);
        assert_eq!(config.data_dir, PathBuf::from("."));
    }

    #[test]
    fn test_file_not_found() {
        let err = Config::load("/nonexistent/path/zapsim.json").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ invalid json }");
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }
}
