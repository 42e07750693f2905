//! Axum route handlers for the generation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::catalog::VocalPreference;
use crate::errors::AppError;
use crate::generation::generator::generate_or_await;
use crate::models::song::{GeneratedArtifact, GenerationMethod, SongRequest};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Body of `POST /api/generate-content`.
///
/// Only `requestId` is required. The stored request drives the prompt; the
/// other fields are accepted from callers that still re-send the wizard data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    #[serde(alias = "request_id")]
    pub request_id: Uuid,
    pub theme: Option<String>,
    pub answers: Option<Map<String, Value>>,
    pub style: Option<String>,
    pub genre: Option<String>,
    #[serde(alias = "vocalGender")]
    pub vocal_preference: Option<String>,
    pub preferred_artist: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    pub request_id: Uuid,
    pub title: String,
    pub lyrics: String,
    pub style_tags: String,
    pub generation_method: GenerationMethod,
}

impl From<GeneratedArtifact> for GenerateContentResponse {
    fn from(artifact: GeneratedArtifact) -> Self {
        Self {
            request_id: artifact.request_id,
            title: artifact.title,
            lyrics: artifact.lyrics,
            style_tags: artifact.style_tags,
            generation_method: artifact.generation_method,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/generate-content
///
/// Generates (or returns the already generated) title, lyrics and style tags
/// for a stored request. Model failures come back as the fallback artifact
/// with `generationMethod: "fallback"`. When the background worker is already
/// generating this request, the call waits for its result.
pub async fn handle_generate_content(
    State(state): State<AppState>,
    Json(body): Json<GenerateContentRequest>,
) -> Result<Json<GenerateContentResponse>, AppError> {
    let stored = state
        .store
        .get_request(body.request_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Song request {} not found", body.request_id)))?;

    let mismatched = mismatched_fields(&body, &stored);
    if !mismatched.is_empty() {
        warn!(
            "generate-content for {} re-sent fields that differ from the stored request: {}; using stored values",
            stored.id,
            mismatched.join(", ")
        );
    }

    let artifact = generate_or_await(
        state.store.as_ref(),
        state.generator.as_ref(),
        state.config.generation_timeout,
        stored.id,
    )
    .await?;

    Ok(Json(artifact.into()))
}

/// Names of re-sent fields whose values disagree with the stored request.
fn mismatched_fields(body: &GenerateContentRequest, stored: &SongRequest) -> Vec<&'static str> {
    let mut mismatched = Vec::new();
    let differs = |sent: &Option<String>, expected: &str| {
        sent.as_deref().is_some_and(|s| s.trim() != expected)
    };

    if differs(&body.theme, stored.theme.label()) {
        mismatched.push("theme");
    }
    if differs(&body.style, stored.style.label()) {
        mismatched.push("style");
    }
    if differs(&body.genre, stored.genre.label()) {
        mismatched.push("genre");
    }
    if body
        .vocal_preference
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .is_some_and(|v| v.parse::<VocalPreference>().ok() != Some(stored.vocal_preference))
    {
        mismatched.push("vocalPreference");
    }
    if let Some(answers) = &body.answers {
        let same = answers.len() == stored.answers.len()
            && answers
                .iter()
                .zip(&stored.answers)
                .all(|((question, answer), kept)| {
                    *question == kept.question && answer.as_str() == Some(kept.answer.as_str())
                });
        if !same {
            mismatched.push("answers");
        }
    }
    mismatched
}
