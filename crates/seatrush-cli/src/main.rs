// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! SeatRush terminal client.
//!
//! Every invocation is one page load: persisted state is read, the current
//! page (or the requested action) is rendered, and the process exits. State
//! lives under the platform data dir unless `--state-dir` points elsewhere.
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod app;
mod prefs;
mod views;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use seatrush_app_core::clock::SystemClock;
use seatrush_client::{AdminCourseUpdate, HttpBackend};
use seatrush_session::{PageLabel, SessionStore};
use seatrush_store_fs::{default_root, FsKvStore, Scope};
use tracing_subscriber::EnvFilter;

use crate::app::{App, Usage};
use crate::prefs::{resolve_api_base, PrefsStore};

#[derive(Parser, Debug)]
#[command(author, version, about = "Practice course registration in the terminal")]
struct Cli {
    /// Backend API base URL (overrides the saved value)
    #[arg(long, global = true, env = "SEATRUSH_API_BASE")]
    api_base: Option<String>,
    /// Directory holding persisted state
    #[arg(long, global = true, env = "SEATRUSH_STATE_DIR")]
    state_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a location: `/` renders the current page, `/admin` the course editor
    Open {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Click a menu entry (intro, courses, register_wait, register, signup, ranking)
    Goto { page: PageLabel },
    /// Submit the sign-in form
    Login {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        name: String,
    },
    /// Log out and clear local session state
    Logout,
    /// Press GO in the waiting room
    Go,
    /// Apply for courses by code or list position, in order
    Apply {
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Administrative course editor
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Client preferences
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// List courses
    List,
    /// Update one course; at least one field is required
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        remain: Option<i64>,
        #[arg(long)]
        basket: Option<i64>,
        /// Closing time in seconds
        #[arg(long)]
        time: Option<i64>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print effective settings
    Show,
    /// Save the backend API base URL
    SetApiBase { url: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.downcast_ref::<Usage>().is_some() => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let root = match cli.state_dir {
        Some(dir) => dir,
        None => default_root().context("no state directory available")?,
    };
    let local = FsKvStore::open(&root, Scope::Local)
        .with_context(|| format!("could not open state under {}", root.display()))?;
    let prefs_store = PrefsStore::new(local.clone());
    let prefs = prefs_store.load();

    if let Command::Config(cmd) = cli.command {
        return config(cmd, &prefs_store, cli.api_base.as_deref(), &root);
    }

    let (api_base, source) = resolve_api_base(cli.api_base.as_deref(), &prefs);
    tracing::debug!(%api_base, source = source.label(), "backend");
    let backend = HttpBackend::new(&api_base, prefs.request_timeout())
        .with_context(|| format!("unusable API base {api_base:?}"))?;
    let session = FsKvStore::open(&root, Scope::Session)?;
    let store = SessionStore::new(local, session);
    let mut app = App::new(store, backend, SystemClock, io::stdout().lock());

    match cli.command {
        Command::Open { path } => app.open(&path).await,
        Command::Goto { page } => app.goto(page).await,
        Command::Login { student_id, name } => app.login(&student_id, &name).await,
        Command::Logout => app.logout().await,
        Command::Go => app.go().await,
        Command::Apply { targets } => app.apply(&targets).await,
        Command::Admin(AdminCommand::List) => app.admin_list().await,
        Command::Admin(AdminCommand::Update {
            id,
            name,
            remain,
            basket,
            time,
        }) => {
            let patch = AdminCourseUpdate {
                name,
                remain,
                basket,
                time,
            };
            app.admin_update(&id, &patch).await
        }
        Command::Config(_) => Ok(()),
    }
}

fn config(
    cmd: ConfigCommand,
    store: &PrefsStore<FsKvStore>,
    override_base: Option<&str>,
    root: &Path,
) -> Result<()> {
    let mut prefs = store.load();
    match cmd {
        ConfigCommand::Show => {
            let (api_base, source) = resolve_api_base(override_base, &prefs);
            println!("api_base    {api_base} ({})", source.label());
            println!("timeout_ms  {}", prefs.request_timeout().as_millis());
            println!("state_dir   {}", root.display());
        }
        ConfigCommand::SetApiBase { url } => {
            let url = url.trim().to_owned();
            HttpBackend::new(&url, prefs.request_timeout())
                .map_err(|err| Usage(format!("invalid API base {url:?}: {err}")))?;
            prefs.api_base = Some(url.clone());
            store.save(&prefs).context("could not save preferences")?;
            println!("Saved api_base {url}");
        }
    }
    Ok(())
}
