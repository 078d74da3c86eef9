//! Running the CLI

// Allow exits because in this file we ideally handle all errors with known exit codes
#![allow(clippy::exit)]

use crate::config::{Config, LoggingConfig};
use crate::publications::Publications;
use crate::server::app::{init_state, serve};
use clap::Parser;
use std::path::PathBuf;
use tracing;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Agora serves the publications API and maintains its object store.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value_t = String::from("agora.toml").to_owned())]
    config: String,
    /// Agora cli subcommands
    #[command(subcommand)]
    subcommands: Subcommands,
}

///
#[derive(Clone, clap::Subcommand)]
enum Subcommands {
    /// Serve the publications API
    Serve {
        /// Port to listen on. Overrides the configuration file.
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Delete stored objects left behind by failed deletions
    Reconcile {
        /// Maximum number of queued objects to process.
        #[arg(short, long, default_value_t = 500)]
        limit: i64,
    },
}

/// Install the global subscriber. Logs go to daily rolling files when a log
/// directory is configured, to stdout otherwise.
///
/// The returned guard flushes file logs when dropped.
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match logging.directory.as_ref() {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "agora.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

/// Purge up to `limit` queued object keys.
fn reconcile(config: &Config, limit: i64) -> std::io::Result<()> {
    actix_web::rt::System::new().block_on(async {
        let state = match init_state(config).await {
            Ok(state) => state,
            Err(err) => {
                tracing::error!("error: could not initialize application: {err:?}");
                std::process::exit(1);
            }
        };
        let publications: &Publications = &state.publications;
        match publications.cleanup().reconcile(limit).await {
            Ok(report) if report.pending.is_empty() => Ok(()),
            Ok(report) => {
                tracing::warn!(pending = ?report.pending, "Some objects could not be deleted");
                std::process::exit(2);
            }
            Err(err) => {
                tracing::error!("error: reconciliation failed: {err}");
                std::process::exit(1);
            }
        }
    })
}

/// Main entrypoint to application
///
/// # Errors
/// Errors if the server cannot bind its address.
pub fn run() -> std::io::Result<()> {
    let cli = Cli::parse();
    let config_path = PathBuf::from(&cli.config);
    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: could not load `{}`: {err:#}", config_path.display());
            std::process::exit(1);
        }
    };
    let _guard = init_tracing(&config.logging);
    tracing::debug!("Starting application");

    match cli.subcommands {
        Subcommands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config)
        }
        Subcommands::Reconcile { limit } => reconcile(&config, limit),
    }
}
