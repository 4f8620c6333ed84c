//! servicebook - command line client for the Silant electronic service book.
//!
//! Look up a machine by serial number without an account, or log in and
//! browse machines, maintenance records and complaints for your role.

mod commands;
mod render;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use servicebook_core::auth::Role;
use servicebook_core::{ApiClient, Config, SessionStore};

#[derive(Debug, Parser)]
#[command(name = "servicebook", version, about = "Silant electronic service book client")]
struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long, global = true, env = "SERVICEBOOK_API_URL")]
    api_url: Option<String>,

    /// Keep the session in memory only, for this invocation
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and store the session
    Login {
        #[arg(long, short)]
        username: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged in account and its active role
    Whoami,
    /// Show the active role, or switch to another one you hold
    Role { role: Option<Role> },
    /// Public lookup of a machine by serial number
    Lookup { serial: String },
    /// List machines
    Machines {
        #[arg(long)]
        model_technique: Option<i64>,
        #[arg(long)]
        model_engine: Option<i64>,
        #[arg(long)]
        model_transmission: Option<i64>,
        #[arg(long)]
        model_steer_bridge: Option<i64>,
        #[arg(long)]
        model_drive_bridge: Option<i64>,
    },
    /// Show one machine with its maintenance and complaints
    Machine { id: i64 },
    /// List maintenance records
    Maintenance {
        #[arg(long)]
        kind: Option<i64>,
        #[arg(long)]
        service_company: Option<i64>,
        #[arg(long)]
        serial: Option<String>,
        /// Show one record in full
        #[arg(long)]
        id: Option<i64>,
    },
    /// List complaints
    Complaints {
        #[arg(long)]
        failure_node: Option<i64>,
        #[arg(long)]
        recovery_method: Option<i64>,
        #[arg(long)]
        service_company: Option<i64>,
        #[arg(long)]
        serial: Option<String>,
        /// Show one record in full
        #[arg(long)]
        id: Option<i64>,
    },
    /// List a directory, e.g. `maintenance-kind` or "Узел отказа"
    References { entity: String },
    /// List the service companies across your machines
    ServiceCompanies,
}

/// Initialize the tracing subscriber for logging.
/// The returned guard must live as long as file logging is needed.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match config.log_to_file.then(|| config.data_dir()) {
        Some(Ok(dir)) => {
            let appender = tracing_appender::rolling::daily(dir, "servicebook.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(ref url) = cli.api_url {
        config.api_url = url.clone();
    }

    let _log_guard = init_tracing(&config);
    info!(api_url = %config.api_url, "servicebook starting");

    let session = if cli.ephemeral {
        SessionStore::in_memory()
    } else {
        config.open_session()?
    };
    let client = ApiClient::from_config(&config, Arc::new(session))
        .context("Failed to create API client")?;

    commands::run(cli.command, &client, &mut config).await
}
