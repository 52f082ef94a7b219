//! BubbleBank API Server
//!
//! Main entry point for the ledger service.

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::{Instrument, info, info_span, warn};

use bubblebank_api::{AppState, create_router};
use bubblebank_db::migration::Migrator;
use bubblebank_db::{InstrumentedStore, RetryPolicy, RetryingStore, SqlStore, connect};
use bubblebank_shared::{AppConfig, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let span = info_span!(
        "server",
        service = %config.telemetry.service_name,
        environment = %config.telemetry.environment,
    );
    run(config).instrument(span).await
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let db = connect(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let sql_store = SqlStore::with_config(db.clone(), &config.store);
    let store = InstrumentedStore::new(RetryingStore::new(
        sql_store,
        RetryPolicy::from(&config.retry),
    ));
    let state = AppState::new(Arc::new(store));

    // The listener comes up first so `/ready` can report pending migrations.
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    Migrator::up(&db, None).await?;
    state.set_ready();
    info!(overdraft = ?config.store.overdraft, "Migrations complete, accepting traffic");

    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
