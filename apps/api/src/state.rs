use std::sync::Arc;

use crate::config::Config;
use crate::jobs::JobQueue;
use crate::llm_client::TextGenerator;
use crate::store::SongStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SongStore>,
    /// Model backend. Default: the Gemini `LlmClient`.
    pub generator: Arc<dyn TextGenerator>,
    /// Where intake hands request ids to the generation worker.
    pub jobs: Arc<dyn JobQueue>,
    pub config: Config,
}
