//! # Command Line Interface
//!
//! `serve` runs the HTTP host adapter; `paths` prints the backend's routes.

use std::fmt::Write as _;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::api::{start_api_server, ApiState};
use crate::backend::ArgoCdBackend;
use crate::config::AppConfig;
use crate::framework::{InMemoryStorage, LogicalBackend};
use crate::observability::{init_observability, log_config_info};
use crate::{APP_NAME, VERSION};

#[derive(Parser)]
#[command(name = "argocd-secrets")]
#[command(about = "Dynamic secrets backend that vends Argo CD project tokens")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP host adapter (default)
    Serve {
        /// Address to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the backend's paths and secret types
    Paths {
        /// Emit the path table as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // .env must be loaded before any configuration is read
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let mut config = AppConfig::from_env()?;

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;
            serve(config).await?;
        }

        Commands::Paths { json } => {
            let backend = ArgoCdBackend::new(&config.upstream)?;
            if json {
                println!("{}", serde_json::to_string_pretty(backend.paths())?);
            } else {
                print!("{}", render_paths(&backend));
            }
        }
    }

    Ok(())
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    init_observability(&config.observability)?;
    tracing::info!(app_name = APP_NAME, version = VERSION, "Starting Argo CD secrets backend");
    log_config_info(&config);

    let backend = Arc::new(ArgoCdBackend::new(&config.upstream)?);
    let storage = Arc::new(InMemoryStorage::new());
    let state = ApiState::new(backend, storage, config.server.mount_path.clone());

    start_api_server(&config.server, state).await?;
    Ok(())
}

/// Human-readable path table.
pub fn render_paths(backend: &dyn LogicalBackend) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", backend.help());
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<16} {:<8} {}", "PATH", "OP", "SUMMARY");

    for spec in backend.paths() {
        for op in &spec.operations {
            let _ = writeln!(out, "{:<16} {:<8} {}", spec.pattern.display(), op.operation, op.summary);
        }
        for field in &spec.fields {
            let required = if field.required { " (required)" } else { "" };
            let _ = writeln!(out, "  {:<14} {}{}", field.name, field.description, required);
        }
    }

    let _ = writeln!(out);
    for secret_type in backend.secret_types() {
        let _ = writeln!(
            out,
            "secret type {} (lease {}s, renewable: {})",
            secret_type.name,
            secret_type.default_duration.as_secs(),
            secret_type.renewable
        );
        for field in &secret_type.fields {
            let _ = writeln!(out, "  {:<14} {}", field.name, field.description);
        }
    }

    out
}
