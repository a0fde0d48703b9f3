//! habitlog server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite submission store, and serves the JSON API under `/api`.
//! Configuration keys can also be supplied as `HABITLOG_*` environment
//! variables.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use habitlog_store_sqlite::{SqliteStore, StoreOptions};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "habitlog submission server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

/// Runtime server configuration, deserialised from `config.toml` and the
/// `HABITLOG_*` environment.
#[derive(Clone, Deserialize)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host: String,
  #[serde(default = "default_port")]
  port: u16,
  #[serde(default = "default_db_path")]
  db_path: PathBuf,
  /// Photo-bearing submissions allowed per (student, habit, month).
  #[serde(default = "default_photo_cap")]
  photo_monthly_cap: u32,
}

fn default_host() -> String {
  "127.0.0.1".to_string()
}

fn default_port() -> u16 {
  8420
}

fn default_db_path() -> PathBuf {
  PathBuf::from("habitlog.db")
}

fn default_photo_cap() -> u32 {
  1
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("HABITLOG"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open the SQLite store.
  let store = SqliteStore::open_with(
    &server_cfg.db_path,
    StoreOptions {
      photo_monthly_cap: server_cfg.photo_monthly_cap,
    },
  )
  .await
  .with_context(|| format!("failed to open store at {:?}", server_cfg.db_path))?;

  let app = axum::Router::new()
    .nest("/api", habitlog_api::api_router(Arc::new(store)))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
