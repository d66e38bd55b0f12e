mod config;

use clap::{Parser, Subcommand};
use config::ScoutConfig;
use scout_agent::backends::OpenAiBackend;
use scout_gateway::{AppState, GatewayServer, Sanitizer};
use scout_search::Aggregator;
use scout_session::export::ExportFormat;
use scout_session::{FileSessionStore, SessionStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "scout", about = "Scout: multi-source research assistant relay")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "scout.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Inspect and manage stored research sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// List sessions, most recent first
    List {
        /// Only sessions whose title, tags or messages contain this text
        #[arg(short, long)]
        query: Option<String>,
        /// Only sessions carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Print a session as shareable text
    Show { id: Uuid },
    /// Export a session
    Export {
        id: Uuid,
        /// markdown, json or text
        #[arg(short, long, default_value = "markdown")]
        format: ExportFormat,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete one session, or all of them with --all
    Delete {
        #[arg(required_unless_present = "all")]
        id: Option<Uuid>,
        #[arg(long, conflicts_with = "id")]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();
    let config = ScoutConfig::load(&cli.config)?;

    match cli.command {
        Commands::Serve { host, port } => serve(config, host, port).await,
        Commands::Sessions { action } => sessions(config, action).await,
    }
}

async fn serve(config: ScoutConfig, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    if config.model.api_key().is_none() {
        warn!("FIREWORKS_API_KEY is not set; chat requests will be refused");
    }
    for problem in config.model.key_warnings() {
        warn!(problem, "Model API key looks malformed");
    }
    if config.search.web_api_key().is_none() {
        info!("No web search key configured; web search serves fallback results");
    }

    let sessions = Arc::new(FileSessionStore::new(config.sessions_dir()).await?);
    let aggregator = Arc::new(Aggregator::from_config(&config.search));
    info!(
        sources = ?aggregator.sources(),
        timeout_ms = config.search.timeout_ms,
        "Search providers registered"
    );

    let model = Arc::new(config.model);
    let backend = Arc::new(OpenAiBackend::new(model.clone()));
    let state = AppState::new(aggregator, backend, model, sessions)
        .with_sanitizer(Sanitizer::new(config.server.max_message_length))
        .with_event_buffer(config.server.event_buffer);
    let app = GatewayServer::build(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Scout listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn sessions(config: ScoutConfig, action: SessionAction) -> anyhow::Result<()> {
    let store = FileSessionStore::new(config.sessions_dir()).await?;

    match action {
        SessionAction::List { query, tag } => {
            let sessions = store.search(query.as_deref(), tag.as_deref()).await?;
            if sessions.is_empty() {
                println!("No sessions found.");
                return Ok(());
            }
            for session in &sessions {
                let tags = if session.tags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", session.tags.join(", "))
                };
                println!(
                    "{}  {}  {} message(s)  {}{}",
                    session.id,
                    session.updated_at.format("%Y-%m-%d %H:%M"),
                    session.message_count(),
                    session.title,
                    tags
                );
            }
            println!("\nTotal: {} session(s)", sessions.len());
        }
        SessionAction::Show { id } => {
            let session = store
                .get(id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Session not found: {id}"))?;
            print!("{}", scout_session::export::to_shareable_text(&session));
        }
        SessionAction::Export { id, format, output } => {
            let session = store
                .get(id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Session not found: {id}"))?;
            let rendered = format.render(&session)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, rendered).await?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{rendered}"),
            }
        }
        SessionAction::Delete { id, all } => {
            if all {
                store.delete_all().await?;
                println!("All sessions deleted.");
            } else if let Some(id) = id {
                if store.get(id).await?.is_none() {
                    anyhow::bail!("Session not found: {id}");
                }
                store.delete(id).await?;
                println!("Deleted {id}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_export() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "scout",
            "sessions",
            "export",
            &id.to_string(),
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Sessions {
                action: SessionAction::Export { id: parsed, format, output },
            } => {
                assert_eq!(parsed, id);
                assert_eq!(format, ExportFormat::Json);
                assert!(output.is_none());
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_delete_requires_id_or_all() {
        assert!(Cli::try_parse_from(["scout", "sessions", "delete"]).is_err());
        assert!(Cli::try_parse_from(["scout", "sessions", "delete", "--all"]).is_ok());
    }

    #[test]
    fn test_serve_overrides() {
        let cli =
            Cli::try_parse_from(["scout", "-c", "custom.toml", "serve", "-p", "8081"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert!(matches!(cli.command, Commands::Serve { port: Some(8081), host: None }));
    }
}
