use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use robo_core::{CompanionError, FileStore, RoboConfig, SessionEvent, StorageStatus};
use robo_limbic::{spawn_heartbeat, HeartbeatConfig};
use robo_reasoning::Session;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod input;
mod terminal;

use input::{spawn_reader, Command};
use terminal::{PrintedVoice, TerminalDisplay};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "robo.toml", env = "ROBO_CONFIG")]
    config: PathBuf,

    /// Directory holding chat history, the reply catalog, and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log to stderr instead of the log file
    #[arg(short, long)]
    verbose: bool,

    /// Speak replies on /speak by printing them as speech
    #[arg(long)]
    voice: bool,
}

fn init_logging(data_dir: &Path, verbose: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if verbose {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return None;
    }

    // Keep log lines out of the chat prompt
    let appender = tracing_appender::rolling::never(data_dir, "robo.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

async fn handle(session: &mut Session, event: SessionEvent) {
    match session.dispatch(event).await {
        Ok(_) | Err(CompanionError::EmptyInput) => {}
        Err(e) => warn!("Event failed: {}", e),
    }
}

fn print_history(session: &Session) {
    let history = session.state().history();
    if history.is_empty() {
        println!("  No conversation history yet");
        return;
    }
    for record in history.records() {
        println!(
            "  [{}] You: {}\n             Robo: {}",
            record.timestamp.with_timezone(&chrono::Local).format("%H:%M:%S"),
            record.user_text,
            record.robot_text
        );
    }
}

fn print_storage(session: &Session) {
    match session.state().history().storage_status() {
        StorageStatus::Used(usage) => println!("  {} ({:?})", usage, usage.level()),
        StorageStatus::Error => println!("  Storage unavailable"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut config = RoboConfig::load_or_default(&args.config);
    if let Some(dir) = args.data_dir {
        config.storage.data_dir = dir;
    }
    let data_dir = config.storage.data_dir.clone();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    let _log_guard = init_logging(&data_dir, args.verbose);

    info!("Starting Robo v{}", env!("CARGO_PKG_VERSION"));
    info!("Using data directory {}", data_dir.display());

    let store = FileStore::open(&data_dir)
        .with_context(|| format!("Failed to open store at {}", data_dir.display()))?
        .with_quota(config.storage.quota_bytes);

    let (event_tx, mut event_rx) = mpsc::channel::<SessionEvent>(64);
    let (command_tx, mut command_rx) = mpsc::channel::<Command>(16);

    let mut session = Session::from_config(&config, Arc::new(store), Arc::new(TerminalDisplay), Utc::now());
    if args.voice {
        session = session.with_voice(Arc::new(PrintedVoice::new(event_tx.clone())));
    }

    println!("Robo is online. Commands: /clear /history /storage /speak, 'quit' to exit.");
    session.start();

    let heartbeat = spawn_heartbeat(HeartbeatConfig::from_engagement(&config.engagement), event_tx.clone());
    let _reader = spawn_reader(command_tx);

    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => handle(&mut session, event).await,
            command = command_rx.recv() => match command {
                None | Some(Command::Quit) => break,
                Some(Command::Session(event)) => handle(&mut session, event).await,
                Some(Command::History) => print_history(&session),
                Some(Command::Storage) => print_storage(&session),
            },
        }
    }

    heartbeat.abort();
    info!("Robo shutting down");
    println!("Goodbye!");
    Ok(())
}
