//! Local Chat - interactive console client
//!
//! Reads lines from stdin and talks to the configured generation service.
//!
//! - `exit` quits
//! - an empty line lets the session produce the next user message itself
//! - `/auto <n>` runs `n` automatic turns
//! - `/mode <id>` switches mode (clears the conversation)
//! - `/modes` lists configured modes

use std::io::Write;
use std::sync::Arc;

use local_chat::adapters::ai::{OllamaConfig, OllamaProvider};
use local_chat::adapters::templates::FileTemplateStore;
use local_chat::application::{AutoTurn, ChatSession, EngineOptions, ModeLoader, Reply};
use local_chat::config::{AppConfig, LoggingConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type Session = ChatSession<OllamaProvider, FileTemplateStore>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging);
    config.validate()?;

    let provider = OllamaProvider::new(
        OllamaConfig::new(&config.generation.endpoint)
            .with_model(&config.generation.model)
            .with_timeout(config.generation.timeout()),
    )?;
    let store = FileTemplateStore::new(&config.templates.root);
    let loader = ModeLoader::from_config(Arc::new(store), &config);
    let options = EngineOptions {
        labels: config.chat.labels(),
        request_timeout: config.generation.timeout(),
    };

    let session =
        ChatSession::start(Arc::new(provider), loader, &config.chat.default_mode, options).await?;

    println!(
        "Mode: {}. Type 'exit' to quit, an empty line for an automatic turn, /modes to list modes.",
        config.chat.default_mode
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}: ", config.chat.user_label);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        if is_exit(input) {
            println!("Bye.");
            break;
        }
        run_command(&session, &config, input).await;
    }

    Ok(())
}

fn is_exit(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit")
}

async fn run_command(session: &Session, config: &AppConfig, input: &str) {
    let bot = &config.chat.bot_label;

    if input.is_empty() {
        match session.auto_turn().await {
            Ok(turn) => print_auto_turn(config, &turn),
            Err(err) => eprintln!("error: {}", err),
        }
    } else if input == "/modes" {
        for id in session.list_modes() {
            println!("  {}", id);
        }
    } else if let Some(mode_id) = input.strip_prefix("/mode ") {
        match session.switch_mode(mode_id.trim()).await {
            Ok(()) => println!("Switched to mode '{}'.", mode_id.trim()),
            Err(err) => eprintln!("error: {}", err),
        }
    } else if let Some(count) = input.strip_prefix("/auto ") {
        let Ok(turns) = count.trim().parse::<usize>() else {
            eprintln!("error: /auto expects a number of turns");
            return;
        };
        match session
            .auto_converse(turns, config.chat.auto_interval())
            .await
        {
            Ok(turns) => turns.iter().for_each(|turn| print_auto_turn(config, turn)),
            Err(err) => eprintln!("error: {}", err),
        }
    } else {
        match session.submit(input).await {
            Ok(reply) => print_reply(bot, &reply),
            Err(err) => eprintln!("error: {}", err),
        }
    }
}

fn print_auto_turn(config: &AppConfig, turn: &AutoTurn) {
    println!("{}: {}", config.chat.user_label, turn.message);
    print_reply(&config.chat.bot_label, &turn.reply);
}

fn print_reply(bot: &str, reply: &Reply) {
    if reply.degraded {
        println!("{}: {} (incomplete)\n", bot, reply.text);
    } else {
        println!("{}: {}\n", bot, reply.text);
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let json = logging.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
    });
    let plain = (!logging.json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_is_case_insensitive() {
        assert!(is_exit("exit"));
        assert!(is_exit("EXIT"));
        assert!(is_exit("Exit"));
        assert!(!is_exit("exit now"));
        assert!(!is_exit("/exit"));
    }
}
