//! qdash-api - Production quality dashboard service
//!
//! Serves dashboard widgets (daily pass/fail bars, shift split, defect pies and
//! ranking, summary counters) computed on every request from a read-only
//! production database.

use anyhow::{Context, Result};
use clap::Parser;
use qdash_common::config::{resolve_config_path, TomlConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qdash_api::db::{self, SqliteRowSource};
use qdash_api::report::ReportEngine;
use qdash_api::{build_router, AppState};

/// Command-line arguments for qdash-api
#[derive(Parser, Debug)]
#[command(name = "qdash-api")]
#[command(about = "Production quality dashboard service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "QDASH_CONFIG")]
    config: Option<PathBuf>,

    /// Production SQLite database (opened read-only)
    #[arg(short, long, env = "QDASH_DATABASE")]
    database: Option<PathBuf>,

    /// Listen address
    #[arg(short, long, env = "QDASH_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "QDASH_PORT")]
    port: Option<u16>,

    /// Directory of static dashboard assets
    #[arg(long, env = "QDASH_STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is needed for the default log level, so it loads before tracing.
    // Its outcome (and any load error) is logged once tracing is up.
    let config_path = resolve_config_path(args.config.as_deref());
    let loaded = TomlConfig::load_or_default(config_path.as_deref());
    let log_level = loaded
        .as_ref()
        .map(|(c, _)| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("qdash_api={0},qdash_common={0},tower_http=info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting qdash-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let (config, config_source) = loaded.context("Failed to load configuration")?;
    config_source.log();

    let db_path = args
        .database
        .unwrap_or_else(|| config.database_path_or_default());
    info!("Database path: {}", db_path.display());

    let pool = match db::connect_readonly(&db_path).await {
        Ok(pool) => {
            info!("✓ Connected to database (read-only)");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e);
        }
    };

    for family in &config.families {
        info!(
            "Table family '{}': prefix '{}', unit id column '{}'",
            family.name, family.table_prefix, family.unit_id_field
        );
    }

    let engine = ReportEngine::new(
        Arc::new(SqliteRowSource::new(pool)),
        config.families.clone(),
        config.report.clone(),
    );

    let static_dir = args.static_dir.or_else(|| config.static_dir.clone());
    if let Some(dir) = &static_dir {
        info!("Serving static assets from {}", dir.display());
    }

    let state = AppState::new(engine).with_static_dir(static_dir);
    let app = build_router(state);

    let bind = args.bind.unwrap_or_else(|| config.bind.clone());
    let port = args.port.unwrap_or(config.port);
    let addr = format!("{}:{}", bind, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("qdash-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
