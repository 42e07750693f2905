use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::{Genre, Style, Theme, VocalPreference};
use crate::errors::AppError;
use crate::intake::draft::SongDraft;
use crate::intake::validation::validate_contact;
use crate::models::song::NewSongRequest;
use crate::state::AppState;

/// Body of `POST /api/submit-request`. Labels arrive exactly as the catalog
/// lists them; `answers` maps question text to answer text in wizard order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(alias = "phoneNumber", alias = "phone_number")]
    pub contact: String,
    pub theme: String,
    #[serde(default)]
    pub answers: Map<String, Value>,
    pub style: String,
    pub genre: String,
    #[serde(alias = "vocalGender", alias = "vocal_gender")]
    pub vocal_preference: Option<String>,
    #[serde(alias = "preferred_artist")]
    pub preferred_artist: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub request_id: Uuid,
}

/// Validates a raw payload into a submission by walking it through a
/// [`SongDraft`]. The contact is checked first and strictly.
pub fn submission_from_payload(payload: SubmitRequest) -> Result<NewSongRequest, AppError> {
    validate_contact(&payload.contact)?;

    let theme: Theme = payload.theme.parse()?;
    let style: Style = payload.style.parse()?;
    let genre: Genre = payload.genre.parse()?;
    let vocal = match payload.vocal_preference.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<VocalPreference>()?),
    };

    let answers = payload
        .answers
        .into_iter()
        .map(|(question, value)| match value {
            Value::String(answer) => Ok((question, answer)),
            _ => Err(AppError::Validation(format!(
                "answer to '{question}' must be a string"
            ))),
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let mut draft = SongDraft::new();
    draft.select_theme(theme);
    draft.import_answers(answers)?;
    draft.choose_style(style, genre, vocal, payload.preferred_artist.as_deref())?;
    draft.enter_contact(&payload.contact)?;
    Ok(draft.into_submission()?)
}

/// POST /api/submit-request
pub async fn handle_submit_request(
    State(state): State<AppState>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let submission = submission_from_payload(payload)?;
    let request = state.store.insert_request(&submission).await?;
    info!(
        "Accepted song request {} (theme={}, genre={})",
        request.id, request.theme, request.genre
    );

    if let Err(e) = state.jobs.enqueue(request.id).await {
        warn!(
            "Could not enqueue request {}; it stays pending until the recovery sweep: {e}",
            request.id
        );
    }

    Ok(Json(SubmitResponse {
        request_id: request.id,
    }))
}
