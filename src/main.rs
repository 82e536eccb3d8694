// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! cpdash command-line client
//!
//! Signs in, links Codeforces/CodeChef handles, and shows the dashboard,
//! hints, progress and notes from the terminal.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cpdash::{
    config::Config,
    models::{ParsedHints, Platform, SessionState, HintSession},
    services::PlatformSlot,
    AppState,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// cpdash: competitive-programming dashboard client
#[derive(Parser)]
#[command(name = "cpdash")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "CPDASH_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in and load linked accounts
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "CPDASH_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget every cached link
    Logout,

    /// Reconcile local state with the backend and show link status
    Status,

    /// Link a platform handle (codeforces | codechef)
    Link { platform: Platform, handle: String },

    /// Unlink a platform
    Unlink { platform: Platform },

    /// Ask the backend to re-sync platform data
    Refresh {
        /// Only this platform (default: both)
        platform: Option<Platform>,
    },

    /// Show ratings for linked handles
    Dashboard {
        /// Refresh backend data first
        #[arg(short, long)]
        refresh: bool,
    },

    /// Get progressive hints for a problem link
    Hints {
        url: String,
        /// Print every hint at once instead of one per Enter
        #[arg(short, long)]
        all: bool,
    },

    /// Chat about a problem (reads one message per line from stdin)
    Chat,

    /// Show score history
    Progress {
        #[arg(short, long, default_value = "codechef")]
        platform: Platform,
    },

    /// Manage study notes
    Notes {
        #[command(subcommand)]
        command: NotesCommand,
    },
}

#[derive(Subcommand)]
enum NotesCommand {
    /// List notes
    List,
    /// Add a note
    Add {
        title: String,
        #[arg(default_value = "")]
        content: String,
    },
    /// Edit a note's title or content
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Mark a note completed
    Done { id: String },
    /// Mark a note not completed
    Undone { id: String },
    /// Delete a note
    Rm { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(
        api_url = %config.api_url,
        api_base_url = %config.api_base_url,
        store = %config.store_path.display(),
        "Configuration loaded"
    );

    let state = AppState::from_config(config).context("Failed to initialize client")?;

    if let Err(e) = run(cli.command, &state).await {
        // Known client errors get the friendly text; the log has the detail.
        if let Some(app_err) = e.downcast_ref::<cpdash::error::AppError>() {
            tracing::debug!(error = %app_err, "Command failed");
            eprintln!("error: {}", app_err.user_message());
            std::process::exit(1);
        }
        return Err(e);
    }
    Ok(())
}

async fn run(command: Commands, state: &AppState) -> Result<()> {
    match command {
        Commands::Register {
            username,
            email,
            password,
        } => {
            state.sync.register(&username, &email, &password).await?;
            println!("Account created successfully! You can now sign in.");
        }

        Commands::Login { email, password } => {
            let session = state.sync.login(&email, &password).await?;
            println!("Signed in as {}", session.username);
            print_status(&state.sync.initialize_session().await, state)?;
        }

        Commands::Logout => {
            state.sync.logout()?;
            println!("Signed out.");
        }

        Commands::Status => {
            let status = state.sync.initialize_session().await;
            print_status(&status, state)?;
        }

        Commands::Link { platform, handle } => {
            let session = state.sync.require_session()?;
            let outcome = state
                .sync
                .link_platform(platform, &handle, &session.user_id)
                .await?;
            println!("{} connected as {}", platform, outcome.link.handle);
            if outcome.became_fully_linked {
                println!("Both accounts linked! Run `cpdash dashboard`.");
            } else if !state.sync.is_fully_linked() {
                println!("Link {} to finish setup.", platform.other());
            }
        }

        Commands::Unlink { platform } => {
            state.sync.unlink_platform(platform).await?;
            println!("{} unlinked.", platform);
        }

        Commands::Refresh { platform } => match platform {
            Some(p) => {
                state.sync.refresh_platform(p).await?;
                println!("{} data refreshed.", p);
            }
            None => {
                for (p, result) in state.sync.refresh_all().await {
                    match result {
                        Ok(()) => println!("{} data refreshed.", p),
                        Err(e) => println!("{} refresh failed: {}", p, e.user_message()),
                    }
                }
            }
        },

        Commands::Dashboard { refresh } => {
            if !state.sync.initialize_session().await.is_fully_linked() {
                bail!("Link both Codeforces and CodeChef to see the dashboard (see `cpdash status`).");
            }
            let snapshot = if refresh {
                state.dashboard.refresh_and_reload().await?
            } else {
                state.dashboard.snapshot().await?
            };
            println!("Welcome, {}", snapshot.username);
            for platform in Platform::ALL {
                match snapshot.slot(platform) {
                    PlatformSlot::NotLinked => println!("  {:<10}  not linked", platform),
                    PlatformSlot::Loaded(p) => {
                        let extra = match (&p.rank, p.stars) {
                            (Some(rank), _) => rank.clone(),
                            (None, Some(stars)) => format!("{}★", stars),
                            (None, None) => String::new(),
                        };
                        println!(
                            "  {:<10}  {:<16} rating {:>5} (max {:>5})  {}",
                            platform, p.handle, p.rating, p.max_rating, extra
                        );
                    }
                    PlatformSlot::Failed { handle, error } => {
                        println!("  {:<10}  {:<16} {}", platform, handle, error)
                    }
                }
            }
        }

        Commands::Hints { url, all } => match state.hints.generate(&url).await? {
            ParsedHints::Unparsed(text) => println!("{}", text.trim()),
            ParsedHints::Structured(hints) => {
                let total = hints.len();
                let mut session = HintSession::new(hints);
                if all {
                    while session.reveal_next().is_some() {}
                }
                for (i, hint) in session.revealed().iter().enumerate() {
                    println!("Hint {}/{}: {}", i + 1, total, hint.hint);
                }
                let mut lines = BufReader::new(tokio::io::stdin()).lines();
                while session.remaining() > 0 {
                    println!("(Enter for the next hint)");
                    if lines.next_line().await?.is_none() {
                        break;
                    }
                    if let Some(line) = reveal_line(&mut session) {
                        println!("{}", line);
                    }
                }
            }
        },

        Commands::Chat => {
            let mut conversation = Vec::new();
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                if line.trim().is_empty() {
                    continue;
                }
                match state.hints.chat(&mut conversation, &line).await {
                    Ok(reply) => println!("{}", reply),
                    Err(e) => println!("{}", e.user_message()),
                }
            }
        }

        Commands::Progress { platform } => {
            let series = state.progress.progress(platform).await?;
            if series.points.is_empty() {
                println!("No progress data yet.");
            } else {
                println!("{} score: {}", series.platform, series.score);
                if let Some(feedback) = &series.feedback {
                    println!("{}", feedback);
                }
                for point in &series.points {
                    println!("  {:<28} {:>6.1}", point.label, point.score);
                }
            }
        }

        Commands::Notes { command } => run_notes(command, state)?,
    }
    Ok(())
}

/// Reveal the next hint and format it with its position.
fn reveal_line(session: &mut HintSession) -> Option<String> {
    let text = session.reveal_next()?.hint.clone();
    let shown = session.revealed().len();
    Some(format!("Hint {}/{}: {}", shown, shown + session.remaining(), text))
}

fn run_notes(command: NotesCommand, state: &AppState) -> Result<()> {
    let notes = &state.notes;
    match command {
        NotesCommand::List => {
            let all = notes.list()?;
            if all.is_empty() {
                println!("You haven't saved any notes yet.");
            }
            for note in all {
                let mark = if note.completed { "x" } else { " " };
                println!("[{}] {:>3}  {}", mark, note.id, note.title);
                if !note.content.is_empty() {
                    println!("        {}", note.content.replace('\n', "\n        "));
                }
            }
        }
        NotesCommand::Add { title, content } => {
            let note = notes.add(&title, &content)?;
            println!("Added note {}", note.id);
        }
        NotesCommand::Edit { id, title, content } => {
            notes.edit(&id, title.as_deref(), content.as_deref())?;
            println!("Updated note {}", id);
        }
        NotesCommand::Done { id } => {
            notes.set_completed(&id, true)?;
        }
        NotesCommand::Undone { id } => {
            notes.set_completed(&id, false)?;
        }
        NotesCommand::Rm { id } => {
            notes.delete(&id)?;
            println!("Deleted note {}", id);
        }
    }
    Ok(())
}

fn print_status(status: &SessionState, state: &AppState) -> Result<()> {
    match status {
        SessionState::Unauthenticated => {
            bail!("Not signed in. Run `cpdash login`.");
        }
        SessionState::Authenticated {
            session,
            fully_linked,
        } => {
            println!("{} <{}>", session.username, session.email);
            let links = state.sync.links()?;
            for platform in Platform::ALL {
                match links.iter().find(|l| l.platform == platform && l.linked) {
                    Some(link) => println!("  {:<10}  {}", platform, link.handle),
                    None => println!("  {:<10}  not linked", platform),
                }
            }
            if !fully_linked {
                println!("Required: link both Codeforces and CodeChef to proceed.");
            }
        }
    }
    Ok(())
}

/// Initialize logging to stderr; JSON when `LOG_FORMAT=json`.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cpdash=warn"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
