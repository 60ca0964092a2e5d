use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::prelude::*;

use zapsim::bot::{GeminiClient, PendingUpload, SimulatorEngine};
use zapsim::config::Config;

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "zapsim.json".to_string());

    let config = if Path::new(&config_path).exists() {
        Config::load(&config_path)
    } else {
        Config::from_env()
    };
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("zapsim.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::WARN.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting zapsim");

    let gemini = GeminiClient::new(config.gemini_api_key.clone());
    let mut engine = SimulatorEngine::new(config.bot.clone(), gemini, config.data_dir.clone());

    println!("zapsim - simulador de bot WhatsApp");
    println!("Digite uma mensagem para conversar, ou /help para os comandos.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt();
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("stdin error: {e}");
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if input == "/quit" || input == "/sair" {
            break;
        }

        if let Some(command) = input.strip_prefix('/') {
            handle_command(command, &mut engine, &config.data_dir).await;
        } else {
            chat_turn(&mut engine, input, None).await;
        }
    }

    info!("zapsim shutting down");
}

fn print_prompt() {
    use std::io::Write;
    print!("> ");
    std::io::stdout().flush().ok();
}

async fn handle_command(command: &str, engine: &mut SimulatorEngine, data_dir: &Path) {
    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or("");
    let rest: Vec<&str> = words.collect();

    match name {
        "help" => print_help(),
        "status" => print_status(engine),
        "on" => {
            engine.settings_mut().active = true;
            println!("Serviço ativo: respostas automáticas ligadas.");
        }
        "off" => {
            engine.settings_mut().active = false;
            println!("Serviço pausado: mensagens não geram resposta.");
        }
        "voice" => match rest.first().copied() {
            Some("on") => {
                engine.settings_mut().voice_response = true;
                println!("Respostas em áudio ligadas (voz Kore).");
            }
            Some("off") => {
                engine.settings_mut().voice_response = false;
                println!("Respostas em áudio desligadas.");
            }
            _ => println!("Uso: /voice on|off"),
        },
        "model" => match rest.first() {
            Some(model) => {
                engine.settings_mut().model = model.to_string();
                println!("Modelo: {model}");
            }
            None => println!("Uso: /model <id>"),
        },
        "prompt" => {
            if rest.is_empty() {
                println!("Prompt atual:\n{}", engine.settings().prompt);
            } else {
                engine.settings_mut().prompt = rest.join(" ");
                println!("Prompt atualizado.");
            }
        }
        "delay" => match rest.first().and_then(|s| s.parse::<u64>().ok()) {
            Some(secs) => {
                engine.settings_mut().reply_delay_secs = secs;
                println!("Atraso de resposta: {secs}s");
            }
            None => println!("Uso: /delay <segundos>"),
        },
        "kb" => handle_kb_command(&rest, engine),
        "send" => match rest.split_first() {
            Some((path, caption)) => {
                match PendingUpload::from_path(Path::new(path)) {
                    Ok(upload) => chat_turn(engine, &caption.join(" "), Some(upload)).await,
                    Err(e) => println!("Falha ao anexar: {e}"),
                }
            }
            None => println!("Uso: /send <arquivo> [legenda]"),
        },
        "export" => {
            let path = rest
                .first()
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("conversa.json"));
            match engine.export_conversation(&path) {
                Ok(()) => println!("Conversa exportada para {}", path.display()),
                Err(e) => println!("Falha ao exportar: {e}"),
            }
        }
        _ => println!("Comando desconhecido: /{name} (veja /help)"),
    }
}

fn handle_kb_command(rest: &[&str], engine: &mut SimulatorEngine) {
    match rest.split_first() {
        Some((&"add", paths)) if !paths.is_empty() => {
            let paths: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
            for (path, result) in engine.add_knowledge_files(&paths) {
                match result {
                    Ok(id) => println!("[{id}] {} adicionado", path.display()),
                    Err(e) => println!("{}: {e}", path.display()),
                }
            }
        }
        Some((&"list", _)) => {
            if engine.knowledge().is_empty() {
                println!("Sem arquivos carregados.");
            } else {
                println!("Memória atual ({}):", engine.knowledge().len());
                for file in engine.knowledge().files() {
                    println!("  [{}] {} ({})", file.id, file.name, file.kind);
                }
            }
        }
        Some((&"rm", args)) => match args.first().and_then(|s| s.parse::<u64>().ok()) {
            Some(id) => {
                if engine.remove_knowledge(id) {
                    println!("Arquivo {id} removido.");
                } else {
                    println!("Arquivo {id} não encontrado.");
                }
            }
            None => println!("Uso: /kb rm <id>"),
        },
        _ => println!("Uso: /kb add <arquivo>... | /kb list | /kb rm <id>"),
    }
}

async fn chat_turn(engine: &mut SimulatorEngine, text: &str, upload: Option<PendingUpload>) {
    if text.is_empty() && upload.is_none() {
        return;
    }

    if engine.settings().active {
        println!("Bot está pensando...");
    }

    let outcome = engine.send_message(text, upload).await;

    match outcome.bot_message_id {
        Some(id) => {
            if let Some(reply) = engine.conversation().get(id) {
                println!("Bot: {}", reply.text);
                if let Some(audio_url) = &reply.audio_url {
                    println!("     🔊 áudio: {audio_url}");
                }
            }
        }
        None => println!("(serviço pausado: mensagem registrada sem resposta)"),
    }
}

fn print_help() {
    println!("Comandos:");
    println!("  /status              visão geral do serviço");
    println!("  /on | /off           liga/desliga respostas automáticas");
    println!("  /voice on|off        respostas em áudio (TTS)");
    println!("  /model <id>          modelo de geração");
    println!("  /prompt [texto]      mostra ou define o prompt do sistema");
    println!("  /delay <segundos>    atraso configurado de resposta");
    println!("  /kb add <arquivo>... carrega conhecimento (imagem, PDF, áudio)");
    println!("  /kb list             lista os arquivos carregados");
    println!("  /kb rm <id>          remove um arquivo");
    println!("  /send <arquivo> [legenda]  envia mensagem com anexo");
    println!("  /export [arquivo]    exporta a conversa em JSON");
    println!("  /quit                encerra");
    println!("  <texto>              envia uma mensagem ao bot");
}

fn print_status(engine: &SimulatorEngine) {
    let settings = engine.settings();
    println!(
        "Serviço: {}",
        if settings.active { "ativo (monitorando)" } else { "pausado" }
    );
    println!("Modelo: {}", settings.model);
    println!(
        "Respostas em áudio: {}",
        if settings.voice_response { "sim" } else { "não" }
    );
    println!("Atraso configurado: {}s", settings.reply_delay_secs);
    println!("Respondidas: {}", engine.conversation().bot_reply_count());
    println!("Conhecimento: {} arquivo(s)", engine.knowledge().len());

    let recent = engine.conversation().recent_bot_replies(3);
    if !recent.is_empty() {
        println!("Últimas respostas:");
        for reply in recent {
            let preview: String = reply.text.chars().take(60).collect();
            println!("  {} \"{preview}\"", reply.timestamp.format("%H:%M"));
        }
    }
}
