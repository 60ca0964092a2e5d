//! End-to-end tests for the simulator engine.
//!
//! The Gemini client is pointed at an unreachable local port, so every
//! generation attempt fails at the connection step. That exercises the
//! fail-soft contract: the simulator must stay usable and keep appending
//! well-formed bot turns.

use std::io::Write;

use zapsim::bot::{
    BotSettings, EncodedFile, GeminiClient, PendingUpload, Sender, SimulatorEngine,
};

const API_ERROR_TEXT: &str = "⚠️ Erro na API. Verifique sua chave nos Ajustes.";

fn broken_backend_engine(settings: BotSettings, data_dir: &std::path::Path) -> SimulatorEngine {
    let gemini = GeminiClient::with_base_url(
        "test-key".to_string(),
        "http://127.0.0.1:1".to_string(),
    );
    SimulatorEngine::new(settings, gemini, data_dir.to_path_buf())
}

#[tokio::test]
async fn test_backend_failure_becomes_error_reply() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = broken_backend_engine(BotSettings::default(), dir.path());

    let outcome = engine.send_message("oi, tudo bem?", None).await;

    let bot_id = outcome.bot_message_id.expect("active bot should reply");
    let reply = engine.conversation().get(bot_id).unwrap();
    assert_eq!(reply.sender, Sender::Bot);
    assert_eq!(reply.text, API_ERROR_TEXT);
    assert!(reply.audio_url.is_none());
    assert!(reply.attachment.is_none());
}

#[tokio::test]
async fn test_sequential_turns_keep_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = broken_backend_engine(BotSettings::default(), dir.path());

    engine.send_message("primeira", None).await;
    engine.send_message("segunda", None).await;

    let messages = engine.conversation().messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[0].text, "primeira");
    assert_eq!(messages[1].sender, Sender::Bot);
    assert_eq!(messages[2].sender, Sender::User);
    assert_eq!(messages[2].text, "segunda");
    assert_eq!(messages[3].sender, Sender::Bot);

    // Ids follow append order.
    assert!(messages[0].id < messages[1].id);
    assert!(messages[1].id < messages[2].id);
    assert!(messages[2].id < messages[3].id);
}

#[tokio::test]
async fn test_attachment_turn_survives_backend_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = broken_backend_engine(BotSettings::default(), dir.path());

    let upload = PendingUpload {
        name: "recibo.pdf".to_string(),
        file: EncodedFile::from_bytes(b"%PDF-1.4 fake", "application/pdf"),
    };
    let outcome = engine.send_message("", Some(upload)).await;

    let user = engine.conversation().get(outcome.user_message_id).unwrap();
    let attachment = user.attachment.as_ref().unwrap();
    assert_eq!(attachment.name, "recibo.pdf");
    assert!(attachment.url.starts_with("data:application/pdf;base64,"));

    let bot = engine
        .conversation()
        .get(outcome.bot_message_id.unwrap())
        .unwrap();
    assert_eq!(bot.text, API_ERROR_TEXT);
}

#[tokio::test]
async fn test_knowledge_survives_failed_turns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cardapio.png");
    std::fs::File::create(&path).unwrap().write_all(b"png-bytes").unwrap();

    let mut engine = broken_backend_engine(BotSettings::default(), dir.path());
    engine.add_knowledge_file(&path).unwrap();

    engine.send_message("qual o cardápio?", None).await;

    // The failed generation must not touch the knowledge store.
    assert_eq!(engine.knowledge().len(), 1);
    assert_eq!(engine.knowledge().files()[0].name, "cardapio.png");
}

#[tokio::test]
async fn test_paused_service_records_turns_without_replies() {
    let dir = tempfile::tempdir().unwrap();
    let settings = BotSettings {
        active: false,
        ..BotSettings::default()
    };
    let mut engine = broken_backend_engine(settings, dir.path());

    let first = engine.send_message("oi", None).await;
    let second = engine.send_message("tem alguém?", None).await;

    assert!(first.bot_message_id.is_none());
    assert!(second.bot_message_id.is_none());
    assert_eq!(engine.conversation().len(), 2);
    assert_eq!(engine.conversation().bot_reply_count(), 0);
}
