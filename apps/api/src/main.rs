mod admin;
mod catalog;
mod config;
mod db;
mod errors;
mod generation;
mod intake;
mod jobs;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::generation::worker::{recover_pending, run_generation_worker};
use crate::jobs::{JobQueue, MemoryJobQueue, RedisJobQueue};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgSongStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Song Story API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;
    let store = Arc::new(PgSongStore::new(db));

    // Initialize LLM client
    let llm = Arc::new(LlmClient::new(config.gemini_api_key.clone())?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Job queue: Redis when configured, in-process otherwise
    let jobs: Arc<dyn JobQueue> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Redis job queue initialized");
            Arc::new(RedisJobQueue::new(client))
        }
        None => {
            warn!("REDIS_URL not set; generation jobs are kept in-process");
            Arc::new(MemoryJobQueue::new())
        }
    };

    // Build app state
    let state = AppState {
        store,
        generator: llm,
        jobs,
        config: config.clone(),
    };

    // Re-queue work interrupted by the last shutdown, then start the worker
    let requeued = recover_pending(
        state.store.as_ref(),
        state.jobs.as_ref(),
        config.stale_claim_after,
    )
    .await?;
    if requeued > 0 {
        info!("Re-enqueued {requeued} pending request(s)");
    }
    tokio::spawn(run_generation_worker(
        state.store.clone(),
        state.generator.clone(),
        state.jobs.clone(),
        config.generation_timeout,
    ));

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the wizard's domain once it is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
