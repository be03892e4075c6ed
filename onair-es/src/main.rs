//! onair-es (Engagement Server) - Real-time listener engagement service
//!
//! Serves the like ledger, chat channel, milestone activity feed and
//! leaderboard for the live-radio companion experience.

use anyhow::Result;
use clap::Parser;
use onair_common::config::{resolve_root_folder, ServiceConfig};
use onair_common::db::init::seed_roles;
use onair_common::db::init_database;
use onair_es::{bind_address, build_router, AppState};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "onair-es", about = "OnAir listener engagement server")]
struct Args {
    /// Root folder holding the database and config file
    #[arg(long)]
    root_folder: Option<String>,

    /// Override the configured HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting OnAir Engagement Server (onair-es) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), "ONAIR_ROOT");
    info!("Root folder: {}", root_folder.display());

    let mut config = ServiceConfig::load(&root_folder)?;
    if let Some(port) = args.port {
        config.port = Some(port);
    }

    let db_path = root_folder.join("onair.db");
    let pool = init_database(&db_path).await?;
    info!("✓ Connected to database: {}", db_path.display());

    // Merge configured role allow-lists into the role store
    seed_roles(&pool, &config.roles).await?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let addr = bind_address(&config);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("onair-es listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
