//! Background generation worker fed by the job queue.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::generator::generate_for_request;
use crate::jobs::JobQueue;
use crate::llm_client::TextGenerator;
use crate::store::SongStore;

/// How long one `next()` call blocks before the loop polls again.
const POLL_WAIT: Duration = Duration::from_secs(5);
/// Pause after a queue error so a dead Redis does not spin the loop.
const ERROR_BACKOFF: Duration = Duration::from_secs(2);

/// Startup sweep: resets claims older than `stale_after` and re-enqueues
/// every pending request. Returns how many jobs were enqueued.
pub async fn recover_pending(
    store: &dyn SongStore,
    jobs: &dyn JobQueue,
    stale_after: Duration,
) -> Result<usize, AppError> {
    let stale_after = chrono::Duration::from_std(stale_after)
        .map_err(|e| AppError::Internal(anyhow!("invalid stale claim window: {e}")))?;
    let reset = store.reset_stale_claims(Utc::now() - stale_after).await?;
    if reset > 0 {
        warn!("Reset {reset} stale generation claim(s) to pending");
    }

    let pending = store.pending_request_ids().await?;
    let mut enqueued = 0;
    for id in pending {
        match jobs.enqueue(id).await {
            Ok(()) => enqueued += 1,
            Err(e) => warn!("Could not re-enqueue request {id}: {e}"),
        }
    }
    Ok(enqueued)
}

/// Handles one job. Errors are logged, never propagated: the request stays
/// in the store and the next recovery sweep picks it up.
pub async fn process_job(
    store: &dyn SongStore,
    generator: &dyn TextGenerator,
    timeout: Duration,
    request_id: Uuid,
) {
    match generate_for_request(store, generator, timeout, request_id).await {
        Ok(artifact) => info!(
            "Worker finished request {request_id} ({})",
            artifact.generation_method.as_str()
        ),
        Err(AppError::Conflict(msg)) => debug!("Skipping job {request_id}: {msg}"),
        Err(e) => error!("Worker failed on request {request_id}: {e}"),
    }
}

/// Pops jobs forever. Spawned once from `main`.
pub async fn run_generation_worker(
    store: Arc<dyn SongStore>,
    generator: Arc<dyn TextGenerator>,
    jobs: Arc<dyn JobQueue>,
    timeout: Duration,
) {
    info!("Generation worker started (queue: {})", jobs.backend());
    loop {
        match jobs.next(POLL_WAIT).await {
            Ok(Some(request_id)) => {
                process_job(store.as_ref(), generator.as_ref(), timeout, request_id).await
            }
            Ok(None) => {}
            Err(e) => {
                error!("Job queue error: {e}");
                tokio::time::sleep(ERROR_BACKOFF).await;
            }
        }
    }
}
