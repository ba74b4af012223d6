//! Learner context service entry point.

use std::error::Error;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use learner_context::adapters::{
    api_router, FileContextStore, InMemoryContextTier, LearnerHandlers, OpenAccountDirectory,
    PgContextStore, Reconciler, TieredContextStore,
};
use learner_context::application::UserContextManager;
use learner_context::config::{AppConfig, DatabaseConfig, ServerConfig};
use learner_context::domain::adaptation::ResponseAdapter;
use learner_context::domain::recommendation::RecommendationEngine;
use learner_context::domain::topics::TopicInferenceEngine;
use learner_context::ports::{ContextTier, TierKind};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        database = config.database.is_configured(),
        "Learner context service starting"
    );

    let primary = primary_tier(&config.database).await?;
    let store = Arc::new(
        TieredContextStore::new(
            InMemoryContextTier::cache(),
            primary,
            Arc::new(FileContextStore::new(&config.storage.fallback_dir)),
        )
        .with_primary_timeout(config.storage.primary_timeout()),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reconciler = Reconciler::with_config(
        store.clone(),
        config.reconciliation.reconciler_config(),
    );
    let reconciler_task = tokio::spawn(async move {
        if let Err(e) = reconciler.run(shutdown_rx).await {
            error!(error = %e, "Reconciler stopped");
        }
    });

    let topics = TopicInferenceEngine::default();
    let manager = Arc::new(
        UserContextManager::new(store, Arc::new(OpenAccountDirectory::new()))
            .with_topics(topics.clone()),
    );
    let recommendations = RecommendationEngine::new(topics).with_limits(
        config.personalization.dashboard_top_n,
        config.personalization.sidebar_top_n,
    );
    let handlers =
        LearnerHandlers::from_manager(manager, recommendations, ResponseAdapter::default());
    let router = api_router(handlers, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("Failed to listen for shutdown signal");
            }
            info!("Received shutdown signal, stopping gracefully...");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    if let Err(e) = reconciler_task.await {
        error!(error = %e, "Reconciler task panicked");
    }
    info!("Shut down complete");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if server.json_logs() {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// PostgreSQL when configured, otherwise an in-memory primary for local runs.
async fn primary_tier(database: &DatabaseConfig) -> Result<Arc<dyn ContextTier>, Box<dyn Error>> {
    if !database.is_configured() {
        warn!("No database configured, primary tier is held in memory");
        return Ok(Arc::new(InMemoryContextTier::new(TierKind::Primary)));
    }

    // Lazy connect: an unreachable database at start-up degrades to the
    // file tier instead of aborting.
    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .acquire_timeout(database.acquire_timeout())
        .connect_lazy(&database.url)?;

    let store = PgContextStore::new(pool);
    if database.run_migrations {
        store.migrate().await?;
        info!("Database migrations applied");
    }
    Ok(Arc::new(store))
}
