//! cd-catalog - CD Collection Catalogue Service
//!
//! Searches Discogs for releases, ranks candidates against free-text
//! queries, and appends confirmed releases to a SQLite-backed collection
//! through a resumable, ticket-based confirmation workflow.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cd_catalog::config::Config;
use cd_catalog::db::{self, SqliteCollection};
use cd_catalog::services::DiscogsClient;
use cd_catalog::workflow::WorkflowSettings;
use cd_catalog::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting cd-catalog service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    let token = config.resolve_discogs_token()?;

    info!("Database: {}", config.database_path.display());
    let db_pool = db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    let catalog = Arc::new(DiscogsClient::new(token)?);
    let store = Arc::new(SqliteCollection::new(db_pool.clone()));

    let state = AppState::new(db_pool, catalog, store, WorkflowSettings::from(&config));
    let app = cd_catalog::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
