//! Song generation: orchestrates claim → prompt → model → validate → persist.
//!
//! Flow: claim_for_generation → build_song_prompt → TextGenerator (with timeout)
//!       → parse_song_response → complete_with_artifact.
//!
//! Any failure between the claim and persistence degrades to the fallback
//! artifact. Only storage failures reach the caller.

use std::time::Duration;

use anyhow::anyhow;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::fallback::fallback_artifact;
use crate::generation::prompts::{
    build_song_prompt, response_schema, MAX_OUTPUT_TOKENS, TEMPERATURE,
};
use crate::generation::response::parse_song_response;
use crate::generation::GenerationError;
use crate::llm_client::{GenerationParams, LlmError, TextGenerator};
use crate::models::song::{GeneratedArtifact, NewArtifact, RequestStatus, SongRequest};
use crate::store::SongStore;

/// Produces the artifact for `request_id`, generating it at most once.
///
/// - `pending`: claimed, generated (or fallen back), stored, returned.
/// - `completed` / `sent`: the stored artifact is returned, no model call.
/// - `generating`: another worker holds the claim → `Conflict`. HTTP callers
///   go through [`generate_or_await`] instead.
pub async fn generate_for_request(
    store: &dyn SongStore,
    generator: &dyn TextGenerator,
    timeout: Duration,
    request_id: Uuid,
) -> Result<GeneratedArtifact, AppError> {
    let Some(request) = store.claim_for_generation(request_id).await? else {
        return resolve_unclaimed(store, request_id).await;
    };

    info!(
        "Generating song for request {} (theme={}, genre={})",
        request.id, request.theme, request.genre
    );

    let artifact = match draft_artifact(generator, timeout, &request).await {
        Ok(artifact) => artifact,
        Err(e) => {
            warn!("Generation degraded for request {request_id}, using fallback: {e}");
            fallback_artifact(request.theme, request.genre)
        }
    };

    match store.complete_with_artifact(request_id, &artifact).await {
        Ok(stored) => Ok(stored),
        Err(e) => {
            if let Err(release_err) = store.release_claim(request_id).await {
                warn!("Could not release claim on request {request_id}: {release_err}");
            }
            Err(e)
        }
    }
}

/// How often a caller re-checks a request whose claim is held elsewhere.
const IN_FLIGHT_POLL: Duration = Duration::from_millis(250);
/// Extra wait on top of the model timeout for the holder to persist its result.
const IN_FLIGHT_MARGIN: Duration = Duration::from_secs(10);

/// Like [`generate_for_request`], but when another worker holds the claim it
/// waits for that generation to land and returns its artifact. `Conflict` only
/// comes back once `timeout` plus a persistence margin has passed.
///
/// If the holder releases its claim (storage failure), the next poll claims
/// the request and generates here.
pub async fn generate_or_await(
    store: &dyn SongStore,
    generator: &dyn TextGenerator,
    timeout: Duration,
    request_id: Uuid,
) -> Result<GeneratedArtifact, AppError> {
    let deadline = tokio::time::Instant::now() + timeout + IN_FLIGHT_MARGIN;
    loop {
        match generate_for_request(store, generator, timeout, request_id).await {
            Err(AppError::Conflict(msg)) if tokio::time::Instant::now() < deadline => {
                debug!("Waiting on in-flight generation for {request_id}: {msg}");
                tokio::time::sleep(IN_FLIGHT_POLL).await;
            }
            other => return other,
        }
    }
}

/// Explains why a request could not be claimed.
async fn resolve_unclaimed(
    store: &dyn SongStore,
    request_id: Uuid,
) -> Result<GeneratedArtifact, AppError> {
    let request = store
        .get_request(request_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Song request {request_id} not found")))?;

    match request.status {
        status if status.has_artifact() => store.get_artifact(request_id).await?.ok_or_else(|| {
            AppError::Internal(anyhow!(
                "Request {request_id} is {status} but has no artifact"
            ))
        }),
        RequestStatus::Generating => Err(AppError::Conflict(format!(
            "Song request {request_id} is already being generated"
        ))),
        status => Err(AppError::Conflict(format!(
            "Song request {request_id} could not be claimed (status {status})"
        ))),
    }
}

/// Runs the model path for one request. Every error here is recoverable
/// by the fallback.
pub async fn draft_artifact(
    generator: &dyn TextGenerator,
    timeout: Duration,
    request: &SongRequest,
) -> Result<NewArtifact, GenerationError> {
    let prompt = build_song_prompt(request);
    let schema = response_schema();
    let params = GenerationParams {
        prompt: &prompt,
        max_output_tokens: MAX_OUTPUT_TOKENS,
        temperature: TEMPERATURE,
        response_schema: &schema,
    };

    let raw = tokio::time::timeout(timeout, generator.generate(&params))
        .await
        .map_err(|_| LlmError::Timeout(timeout))??;

    parse_song_response(&raw)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::{Genre, Style, Theme, VocalPreference};
    use crate::generation::response::has_section_marker;
    use crate::models::song::{Answer, GenerationMethod, NewSongRequest};
    use crate::store::memory::MemorySongStore;
    use crate::test_support::{ScriptedGenerator, GOOD_SONG_JSON};

    const TIMEOUT: Duration = Duration::from_secs(30);

    fn submission() -> NewSongRequest {
        NewSongRequest {
            contact: "010-1234-5678".to_string(),
            theme: Theme::Parents,
            answers: vec![Answer {
                question: "Q1".to_string(),
                answer: "A1".to_string(),
            }],
            style: Style::Calm,
            genre: Genre::Ballad,
            vocal_preference: VocalPreference::Female,
            preferred_artist: None,
        }
    }

    async fn stored_request(store: &MemorySongStore) -> Uuid {
        store.insert_request(&submission()).await.unwrap().id
    }

    #[tokio::test]
    async fn test_successful_generation_completes_request() {
        let store = MemorySongStore::new();
        let generator = ScriptedGenerator::reply(GOOD_SONG_JSON);
        let id = stored_request(&store).await;

        let artifact = generate_for_request(&store, &generator, TIMEOUT, id).await.unwrap();

        assert_eq!(artifact.generation_method, GenerationMethod::Ai);
        assert!(has_section_marker(&artifact.lyrics));
        assert!(artifact.style_tags.contains(','));
        assert_eq!(store.artifact_count(id), 1);
        let request = store.get_request(id).await.unwrap().unwrap();
        assert_eq!(request.status, RequestStatus::Completed);
    }

    #[tokio::test]
    async fn test_prompt_sent_to_model_carries_the_answers() {
        let store = MemorySongStore::new();
        let generator = ScriptedGenerator::reply(GOOD_SONG_JSON);
        let id = stored_request(&store).await;

        generate_for_request(&store, &generator, TIMEOUT, id).await.unwrap();

        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("질문: Q1\n답변: A1"));
        assert!(prompt.contains("- 주제: 부모님"));
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let store = MemorySongStore::new();
        let generator = ScriptedGenerator::failing();
        let id = stored_request(&store).await;

        let artifact = generate_for_request(&store, &generator, TIMEOUT, id).await.unwrap();

        assert_eq!(artifact.title, "부모님의 이야기");
        assert_eq!(artifact.style_tags, "korean, 발라드, emotional");
        assert_eq!(artifact.generation_method, GenerationMethod::Fallback);
        let request = store.get_request(id).await.unwrap().unwrap();
        assert_eq!(request.status, RequestStatus::Completed);
    }

    #[tokio::test]
    async fn test_unparseable_output_falls_back() {
        let store = MemorySongStore::new();
        let generator = ScriptedGenerator::reply("I'm sorry, I can't help with that.");
        let id = stored_request(&store).await;

        let artifact = generate_for_request(&store, &generator, TIMEOUT, id).await.unwrap();

        assert_eq!(artifact.generation_method, GenerationMethod::Fallback);
        assert!(!artifact.title.is_empty());
        assert!(!artifact.lyrics.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_model_timeout_falls_back() {
        let store = MemorySongStore::new();
        let generator = ScriptedGenerator::hanging();
        let id = stored_request(&store).await;

        let artifact = generate_for_request(&store, &generator, TIMEOUT, id).await.unwrap();

        assert_eq!(artifact.generation_method, GenerationMethod::Fallback);
    }

    #[tokio::test]
    async fn test_second_call_returns_existing_artifact_without_model_call() {
        let store = MemorySongStore::new();
        let generator = ScriptedGenerator::reply(GOOD_SONG_JSON);
        let id = stored_request(&store).await;

        let first = generate_for_request(&store, &generator, TIMEOUT, id).await.unwrap();
        let second = generate_for_request(&store, &generator, TIMEOUT, id).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.artifact_count(id), 1);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_in_flight_claim_is_a_conflict() {
        let store = MemorySongStore::new();
        let generator = ScriptedGenerator::reply(GOOD_SONG_JSON);
        let id = stored_request(&store).await;
        store.claim_for_generation(id).await.unwrap();

        let err = generate_for_request(&store, &generator, TIMEOUT, id)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_caller_gets_the_in_flight_artifact() {
        let store = Arc::new(MemorySongStore::new());
        let generator = ScriptedGenerator::reply(GOOD_SONG_JSON);
        let id = stored_request(&store).await;
        store.claim_for_generation(id).await.unwrap();

        let holder = store.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            holder
                .complete_with_artifact(id, &fallback_artifact(Theme::Parents, Genre::Ballad))
                .await
                .unwrap();
        });

        let artifact = generate_or_await(store.as_ref(), &generator, TIMEOUT, id)
            .await
            .unwrap();

        assert_eq!(artifact.generation_method, GenerationMethod::Fallback);
        assert_eq!(generator.calls(), 0);
        assert_eq!(store.artifact_count(id), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_caller_takes_over_a_released_claim() {
        let store = Arc::new(MemorySongStore::new());
        let generator = ScriptedGenerator::reply(GOOD_SONG_JSON);
        let id = stored_request(&store).await;
        store.claim_for_generation(id).await.unwrap();

        let holder = store.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            holder.release_claim(id).await.unwrap();
        });

        let artifact = generate_or_await(store.as_ref(), &generator, TIMEOUT, id)
            .await
            .unwrap();

        assert_eq!(artifact.generation_method, GenerationMethod::Ai);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_claim_that_never_lands_is_a_conflict_after_the_bound() {
        let store = MemorySongStore::new();
        let generator = ScriptedGenerator::reply(GOOD_SONG_JSON);
        let id = stored_request(&store).await;
        store.claim_for_generation(id).await.unwrap();
        let started = tokio::time::Instant::now();

        let err = generate_or_await(&store, &generator, TIMEOUT, id)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert!(started.elapsed() >= TIMEOUT + IN_FLIGHT_MARGIN);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_request_is_not_found() {
        let store = MemorySongStore::new();
        let generator = ScriptedGenerator::reply(GOOD_SONG_JSON);

        let err = generate_for_request(&store, &generator, TIMEOUT, Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_storage_failure_propagates_and_releases_claim() {
        let store = Arc::new(MemorySongStore::new());
        let generator = ScriptedGenerator::reply(GOOD_SONG_JSON);
        let id = stored_request(&store).await;

        // Claim succeeds, the artifact write fails.
        let failing = FailOnComplete(store.clone());
        let err = generate_for_request(&failing, &generator, TIMEOUT, id)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        let request = store.get_request(id).await.unwrap().unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(store.artifact_count(id), 0);
    }

    /// Delegates to the memory store but fails the artifact write.
    struct FailOnComplete(Arc<MemorySongStore>);

    #[async_trait::async_trait]
    impl SongStore for FailOnComplete {
        async fn insert_request(&self, new: &NewSongRequest) -> Result<SongRequest, AppError> {
            self.0.insert_request(new).await
        }
        async fn get_request(&self, id: Uuid) -> Result<Option<SongRequest>, AppError> {
            self.0.get_request(id).await
        }
        async fn claim_for_generation(&self, id: Uuid) -> Result<Option<SongRequest>, AppError> {
            self.0.claim_for_generation(id).await
        }
        async fn release_claim(&self, id: Uuid) -> Result<(), AppError> {
            self.0.release_claim(id).await
        }
        async fn complete_with_artifact(
            &self,
            _request_id: Uuid,
            _artifact: &NewArtifact,
        ) -> Result<GeneratedArtifact, AppError> {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn get_artifact(
            &self,
            request_id: Uuid,
        ) -> Result<Option<GeneratedArtifact>, AppError> {
            self.0.get_artifact(request_id).await
        }
        async fn list_requests(
            &self,
        ) -> Result<Vec<crate::models::song::RequestWithArtifact>, AppError> {
            self.0.list_requests().await
        }
        async fn mark_sent(&self, id: Uuid) -> Result<Option<SongRequest>, AppError> {
            self.0.mark_sent(id).await
        }
        async fn reset_stale_claims(
            &self,
            claimed_before: chrono::DateTime<chrono::Utc>,
        ) -> Result<u64, AppError> {
            self.0.reset_stale_claims(claimed_before).await
        }
        async fn pending_request_ids(&self) -> Result<Vec<Uuid>, AppError> {
            self.0.pending_request_ids().await
        }
    }
}
