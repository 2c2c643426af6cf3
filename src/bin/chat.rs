//! Terminal chat client for the stock chat relay.
//!
//! Run with: `cargo run --bin stock-chat`
//!
//! Conversations are kept in the local data directory; assistant replies are
//! rendered with terminal styling, user messages are echoed verbatim.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use stock_chat::client::{ChatSession, ChatTransport, RelayClient, relative_date};
use stock_chat::config::ChatConfig;
use stock_chat::conversations::{ConversationStore, FileStorage, MemoryStorage};
use stock_chat::render::MessageRenderer;
use stock_chat::render::terminal::{message_to_terminal, sanitize};

/// Chat with the stock market assistant from the terminal.
#[derive(Debug, Parser)]
#[command(name = "stock-chat", version)]
struct Cli {
    /// Base URL of the relay server (overrides `STOCK_CHAT_RELAY_URL`).
    #[arg(long)]
    relay_url: Option<String>,
    /// Directory for conversation history (overrides `STOCK_CHAT_DATA_DIR`).
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Keep conversations in memory only.
    #[arg(long)]
    ephemeral: bool,
    /// Disable ANSI styling.
    #[arg(long)]
    no_color: bool,
}

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Send(String),
    Prompt(usize),
    New,
    List,
    Open(String),
    Delete(String),
    Clear,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Send(line.to_string());
        };

        let (name, arg) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(n, a)| (n, a.trim()));

        match (name, arg) {
            ("new", _) => Self::New,
            ("list", _) => Self::List,
            ("clear", _) => Self::Clear,
            ("help", _) => Self::Help,
            ("quit" | "exit", _) => Self::Quit,
            ("open", id) if !id.is_empty() => Self::Open(id.to_string()),
            ("delete", id) if !id.is_empty() => Self::Delete(id.to_string()),
            ("prompt", n) => n
                .parse()
                .map_or_else(|_| Self::Unknown(trimmed.to_string()), Self::Prompt),
            _ => Self::Unknown(trimmed.to_string()),
        }
    }
}

const HELP: &str = "\
Commands:
  /new            start a new conversation
  /list           list saved conversations
  /open <id>      reopen a saved conversation
  /delete <id>    delete a saved conversation
  /clear          delete all saved conversations
  /prompt <n>     send suggested prompt number n
  /help           show this help
  /quit           exit
Anything else is sent to the assistant.";

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();
}

fn open_store(config: &ChatConfig, ephemeral: bool) -> ConversationStore {
    if ephemeral {
        return ConversationStore::new(Arc::new(MemoryStorage::new()));
    }

    match FileStorage::open(&config.client.data_dir) {
        Ok(storage) => ConversationStore::new(Arc::new(storage)),
        Err(e) => {
            tracing::warn!(
                "History disabled, cannot use {}: {e}",
                config.client.data_dir.display()
            );
            ConversationStore::unavailable()
        }
    }
}

fn show_suggestions<T: ChatTransport>(session: &ChatSession<T>) {
    let prompts = session.suggested_prompts();
    if prompts.is_empty() {
        return;
    }
    println!("Try asking:");
    for (i, prompt) in prompts.iter().enumerate() {
        println!("  {}. {prompt}", i + 1);
    }
}

fn show_list<T: ChatTransport>(session: &ChatSession<T>) {
    let summaries = session.summaries();
    if summaries.is_empty() {
        println!("No saved conversations.");
        return;
    }
    let now = Utc::now();
    for summary in summaries {
        println!(
            "{}  {}  ({} messages, {})",
            summary.id,
            sanitize(&summary.title),
            summary.message_count,
            relative_date(summary.updated_at, now)
        );
        println!("    {}", sanitize(&summary.preview.replace('\n', " ")));
    }
}

fn replay<T: ChatTransport>(session: &ChatSession<T>, renderer: &MessageRenderer, ansi: bool) {
    for message in session.messages() {
        println!("[{}]", message.role);
        print!("{}", message_to_terminal(renderer, message, ansi));
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Ask a y/N question on stdout and read the answer. End of input means no.
async fn confirm<R>(lines: &mut Lines<R>, question: &str) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?.is_some_and(|answer| is_yes(&answer)))
}

async fn send<T: ChatTransport>(
    session: &mut ChatSession<T>,
    renderer: &MessageRenderer,
    ansi: bool,
    text: &str,
) {
    if text.trim().is_empty() {
        return;
    }
    println!("(thinking...)");

    match session.send(text).await {
        Ok(reply) => print!("{}", message_to_terminal(renderer, &reply, ansi)),
        Err(e) => {
            eprintln!("Error: {e}");
            if let Some(last) = session.messages().last() {
                print!("{}", message_to_terminal(renderer, last, ansi));
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = ChatConfig::from_env();
    if let Some(url) = cli.relay_url {
        config.client.relay_url = url;
    }
    if let Some(dir) = cli.data_dir {
        config.client.data_dir = dir;
    }
    config.validate()?;

    let store = open_store(&config, cli.ephemeral);
    let transport = RelayClient::new(&config.client.relay_url)?;
    let renderer = MessageRenderer::new()?;
    let mut session = ChatSession::new(store, transport);
    let ansi = !cli.no_color;

    println!("Stock chat (relay: {})", config.client.relay_url);
    println!("{HELP}");
    println!();
    show_suggestions(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match Command::parse(&line) {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::New => {
                session.new_conversation();
                println!("Started a new conversation.");
                show_suggestions(&session);
            }
            Command::List => show_list(&session),
            Command::Open(id) => {
                if session.open(&id) {
                    replay(&session, &renderer, ansi);
                } else {
                    println!("No conversation with id {id}.");
                }
            }
            Command::Delete(id) => {
                let Some(summary) = session.summaries().into_iter().find(|s| s.id == id) else {
                    println!("No conversation with id {id}.");
                    continue;
                };
                let question = format!("Delete \"{}\"?", sanitize(&summary.title));
                if confirm(&mut lines, &question).await? {
                    session.delete(&id);
                    println!("Deleted {id}.");
                }
            }
            Command::Clear => {
                let question = "Delete all conversations? This cannot be undone.";
                if confirm(&mut lines, question).await? {
                    session.clear_all();
                    println!("All conversations cleared.");
                }
            }
            Command::Prompt(n) => {
                match session.suggested_prompts().get(n.wrapping_sub(1)) {
                    Some(prompt) => send(&mut session, &renderer, ansi, prompt).await,
                    None => println!("No suggested prompt {n}."),
                }
            }
            Command::Send(text) => send(&mut session, &renderer, ansi, &text).await,
            Command::Unknown(input) => println!("Unknown command {input}; try /help."),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_sent_untrimmed() {
        assert_eq!(
            Command::parse("  hello /there "),
            Command::Send("  hello /there ".to_string())
        );
    }

    #[test]
    fn test_commands() {
        assert_eq!(Command::parse("/new"), Command::New);
        assert_eq!(Command::parse(" /list "), Command::List);
        assert_eq!(Command::parse("/open conv_1_abc"), Command::Open("conv_1_abc".into()));
        assert_eq!(Command::parse("/delete  conv_2 "), Command::Delete("conv_2".into()));
        assert_eq!(Command::parse("/prompt 2"), Command::Prompt(2));
        assert_eq!(Command::parse("/exit"), Command::Quit);
    }

    #[test]
    fn test_confirmation_answers() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES \n"));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[tokio::test]
    async fn test_confirm_reads_next_line() {
        let mut lines = BufReader::new(&b"y\nno\n"[..]).lines();

        assert!(confirm(&mut lines, "first?").await.unwrap());
        assert!(!confirm(&mut lines, "second?").await.unwrap());
        assert!(!confirm(&mut lines, "eof?").await.unwrap());
    }

    #[test]
    fn test_bad_commands() {
        assert_eq!(Command::parse("/open"), Command::Unknown("/open".into()));
        assert_eq!(Command::parse("/prompt x"), Command::Unknown("/prompt x".into()));
        assert_eq!(Command::parse("/dance"), Command::Unknown("/dance".into()));
    }
}
