//! CLI surface: one-shot subcommands and the interactive prompt loop.

use crate::config::Config;
use crate::history::{HistoryEntry, HistoryStore, RecencyBuckets};
use crate::service::GenerationClient;
use crate::session::{GenerationSession, SessionMode, SubmitOutcome};
use crate::storage::FileStore;
use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Max characters of email body shown in history listings.
const SUMMARY_LIMIT: usize = 80;

/// Cold-outreach email generator client
#[derive(Parser, Debug)]
#[command(name = "coldmail", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate an email for a website URL (non-interactive)
    Generate(GenerateArgs),
    /// List past generations grouped by recency
    History,
    /// Print a stored email by id
    Show {
        /// Entry id (see `coldmail history`)
        id: i64,
    },
    /// Delete a stored entry by id
    Delete {
        /// Entry id (see `coldmail history`)
        id: i64,
    },
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Website URL to generate an outreach email for
    #[arg(required = true)]
    pub url: String,

    /// Copy the generated email to the clipboard
    #[arg(long)]
    pub copy: bool,
}

fn open_history(config: &Config) -> HistoryStore {
    HistoryStore::open(Box::new(FileStore::new(config.history_dir())))
}

fn open_session(config: &Config) -> GenerationSession {
    let client = GenerationClient::new(&config.service_url, config.request_timeout());
    GenerationSession::new(open_history(config), Arc::new(client))
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
    clipboard
        .set_text(text.to_string())
        .context("failed to write clipboard")?;
    Ok(())
}

/// First line of an email, truncated for listings.
fn summary_line(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() > SUMMARY_LIMIT {
        format!(
            "{}...",
            first_line.chars().take(SUMMARY_LIMIT).collect::<String>()
        )
    } else {
        first_line.to_string()
    }
}

fn format_time(created_at_ms: i64) -> String {
    match Local.timestamp_millis_opt(created_at_ms) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        _ => created_at_ms.to_string(),
    }
}

fn print_group(title: &str, entries: &[HistoryEntry]) {
    if entries.is_empty() {
        return;
    }
    println!("{title}");
    for entry in entries {
        println!(
            "  {}  {}  {}",
            entry.id,
            format_time(entry.created_at),
            entry.source_url
        );
        let summary = summary_line(&entry.generated_text);
        if !summary.is_empty() {
            println!("      {summary}");
        }
    }
}

fn print_buckets(buckets: &RecencyBuckets) {
    if buckets.is_empty() {
        println!("No history yet.");
        return;
    }
    print_group("Today", &buckets.today);
    print_group("Yesterday", &buckets.yesterday);
    print_group("Last 7 Days", &buckets.last_7_days);
    print_group("Older", &buckets.older);
}

/// One-shot generation: print the email to stdout, errors to stderr.
pub async fn generate(args: GenerateArgs) -> ExitCode {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut session = open_session(&config);
    session.set_url_input(args.url.trim());

    match session.submit().await {
        SubmitOutcome::Generated(entry) => {
            println!("{}", entry.generated_text);
            if args.copy {
                if let Err(e) = copy_to_clipboard(&entry.generated_text) {
                    eprintln!("Warning: {e}");
                }
            }
            ExitCode::SUCCESS
        }
        SubmitOutcome::Failed => {
            eprintln!(
                "{}",
                session.last_error().unwrap_or("Generation failed.")
            );
            ExitCode::FAILURE
        }
        SubmitOutcome::Rejected => {
            eprintln!("Empty URL.");
            ExitCode::FAILURE
        }
    }
}

pub fn history() -> ExitCode {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let store = open_history(&config);
    let now = chrono::Utc::now().timestamp_millis();
    print_buckets(&store.bucket_by_recency(now));
    ExitCode::SUCCESS
}

pub fn show(id: i64) -> ExitCode {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let store = open_history(&config);
    match store.get(id) {
        Some(entry) => {
            println!("{}", entry.generated_text);
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("No entry with id {id}.");
            ExitCode::FAILURE
        }
    }
}

pub fn delete(id: i64) -> ExitCode {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut store = open_history(&config);
    store.remove(id);
    println!("Deleted.");
    ExitCode::SUCCESS
}

const INTERACTIVE_HELP: &str = "\
Enter a website URL to generate an outreach email.
Commands:
  :history        list past generations grouped by recency
  :view <id>      display a stored email read-only
  :delete <id>    delete a stored entry
  :copy           copy the displayed email to the clipboard
  :new            clear the form and any viewed entry
  :help           show this help
  :quit           exit";

/// Interactive prompt loop over the session state machine.
pub async fn interactive() -> ExitCode {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut session = open_session(&config);
    println!("coldmail — {}", config.service_url);
    println!("{INTERACTIVE_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let prompt = match session.mode() {
            SessionMode::Viewing(id) => format!("[viewing {id}] > "),
            _ => "> ".to_string(),
        };
        if stdout.write_all(prompt.as_bytes()).await.is_err() {
            return ExitCode::FAILURE;
        }
        let _ = stdout.flush().await;

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break, // EOF
            Err(e) => {
                eprintln!("Error reading input: {e}");
                return ExitCode::FAILURE;
            }
        };
        let input = line.trim();

        if input.is_empty() {
            continue;
        }

        if let Some(command) = input.strip_prefix(':') {
            let mut parts = command.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some("quit" | "q"), _) => break,
                (Some("help"), _) => println!("{INTERACTIVE_HELP}"),
                (Some("history" | "h"), _) => {
                    let now = chrono::Utc::now().timestamp_millis();
                    print_buckets(&session.history().bucket_by_recency(now));
                }
                (Some("view"), Some(arg)) => match arg.parse::<i64>() {
                    Ok(id) => {
                        if session.view(id) {
                            if let Some(entry) = session.viewed_entry() {
                                println!("{} ({})", entry.source_url, format_time(entry.created_at));
                                println!("{}", entry.generated_text);
                            }
                        } else {
                            eprintln!("Cannot view entry {id}.");
                        }
                    }
                    Err(_) => eprintln!("Usage: :view <id>"),
                },
                (Some("delete"), Some(arg)) => match arg.parse::<i64>() {
                    Ok(id) => {
                        session.delete(id);
                        println!("Deleted.");
                    }
                    Err(_) => eprintln!("Usage: :delete <id>"),
                },
                (Some("copy"), _) => match session.display_text() {
                    Some(text) => {
                        let text = text.to_string();
                        match copy_to_clipboard(&text) {
                            Ok(()) => println!("Copied."),
                            Err(e) => eprintln!("Warning: {e}"),
                        }
                    }
                    None => eprintln!("Nothing to copy."),
                },
                (Some("new"), _) => session.reset(),
                _ => eprintln!("Unknown command. Try :help"),
            }
            continue;
        }

        if session.mode() != SessionMode::Idle {
            eprintln!("Use :new to return to the form first.");
            continue;
        }

        session.set_url_input(input);
        println!("Generating...");
        match session.submit().await {
            SubmitOutcome::Generated(entry) => {
                println!("{}", entry.generated_text);
            }
            SubmitOutcome::Failed => {
                eprintln!("{}", session.last_error().unwrap_or("Generation failed."));
            }
            SubmitOutcome::Rejected => {}
        }
    }

    ExitCode::SUCCESS
}
