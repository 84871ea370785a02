//! Line input: parse what the user typed and feed it to the main loop.

use chrono::Utc;
use robo_core::SessionEvent;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Forward to the session.
    Session(SessionEvent),
    /// Print the remembered exchanges.
    History,
    /// Print current storage usage.
    Storage,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let now = Utc::now();
        match trimmed {
            "quit" | "exit" => Command::Quit,
            "/clear" => Command::Session(SessionEvent::ClearHistory),
            "/speak" => Command::Session(SessionEvent::SpeakLastReply),
            "/history" => Command::History,
            "/storage" => Command::Storage,
            // A bare Enter counts as paying attention
            "" => Command::Session(SessionEvent::InputFocused(now)),
            text => Command::Session(SessionEvent::UserSubmitted {
                text: text.to_string(),
                at: now,
            }),
        }
    }
}

pub const CLEAR_PROMPT: &str = "Clear all chat history? This cannot be undone. [y/N] ";

/// Only an explicit yes confirms.
pub fn is_confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub fn history_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".robo_history"))
}

/// Read lines on a dedicated thread until EOF, Ctrl-C, `quit`, or the
/// receiver going away.
pub fn spawn_reader(tx: mpsc::Sender<Command>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                tracing::error!("Could not start line editor: {}", e);
                let _ = tx.blocking_send(Command::Quit);
                return;
            }
        };
        let history = history_file();
        if let Some(path) = &history {
            let _ = editor.load_history(path);
        }

        loop {
            let command = match editor.readline("> ") {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    match Command::parse(&line) {
                        Command::Session(SessionEvent::ClearHistory) => {
                            let answer = editor.readline(CLEAR_PROMPT).unwrap_or_default();
                            if !is_confirmed(&answer) {
                                println!("  History kept");
                                continue;
                            }
                            Command::Session(SessionEvent::ClearHistory)
                        }
                        command => command,
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Command::Quit,
                Err(e) => {
                    tracing::error!("Input error: {}", e);
                    Command::Quit
                }
            };
            let quit = command == Command::Quit;
            if tx.blocking_send(command).is_err() || quit {
                break;
            }
        }

        if let Some(path) = &history {
            if let Err(e) = editor.save_history(path) {
                tracing::debug!("Could not save input history: {}", e);
            }
        }
    })
}
