//! campus-events server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use campus_events::api;
use campus_events::app_state::AppState;
use campus_events::config::AppConfig;
use campus_events::domain::FeedBus;
use campus_events::identity::UserDirectory;
use campus_events::persistence::{EventStore, InMemoryEventStore, PostgresEventStore};
use campus_events::service::EventService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid configuration")?;
    tracing::info!(addr = %config.listen_addr, "starting campus-events");

    // Build persistence layer
    let store: Arc<dyn EventStore> = if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .context("cannot connect to PostgreSQL")?;
        let store = PostgresEventStore::new(pool);
        store.migrate().await.context("migrations failed")?;
        tracing::info!("using PostgreSQL event store");
        Arc::new(store)
    } else {
        tracing::info!("using in-memory event store");
        Arc::new(InMemoryEventStore::new())
    };

    // Identity
    let users = match &config.user_directory_path {
        Some(path) => UserDirectory::load_from_file(path)
            .await
            .context("cannot seed user directory")?,
        None => UserDirectory::new(),
    };

    // Build service layer
    let feed_bus = FeedBus::new(config.feed_bus_capacity);
    let event_service = EventService::new(store, feed_bus, config.retry_policy());

    // Build application state and router
    let app_state = AppState::new(event_service, Arc::new(users));
    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
