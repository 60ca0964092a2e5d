//! Bot simulator core - stores, codec, and the Gemini reply generator.

pub mod attachment;
pub mod audio;
pub mod conversation;
pub mod engine;
pub mod gemini;
pub mod knowledge;
pub mod message;
pub mod settings;

pub use attachment::{AttachmentKind, EncodedFile};
pub use conversation::ConversationLog;
pub use engine::{PendingUpload, SendOutcome, SimulatorEngine};
pub use gemini::{BotReply, GeminiClient};
pub use knowledge::{KnowledgeFile, KnowledgeStore};
pub use message::{Message, MessageAttachment, Sender};
pub use settings::BotSettings;
