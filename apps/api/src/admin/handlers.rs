use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::admin::review::{review_listing, ReviewListing, StatusFilter};
use crate::errors::AppError;
use crate::models::song::{RequestStatus, RequestWithArtifact, SongRequest};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: StatusFilter,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(alias = "request_id")]
    pub request_id: Uuid,
}

/// GET /api/admin/requests
pub async fn handle_list_requests(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ReviewListing>, AppError> {
    let all = state.store.list_requests().await?;
    Ok(Json(review_listing(
        all,
        params.status,
        params.search.as_deref(),
    )))
}

/// GET /api/admin/requests/:id
pub async fn handle_get_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestWithArtifact>, AppError> {
    let request = state
        .store
        .get_request(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Song request {id} not found")))?;
    let artifact = state.store.get_artifact(id).await?;
    Ok(Json(RequestWithArtifact { request, artifact }))
}

/// POST /api/admin/update-status
///
/// Marks a completed request as delivered. Sending twice is harmless: an
/// already-sent request comes back unchanged.
pub async fn handle_update_status(
    State(state): State<AppState>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<SongRequest>, AppError> {
    if let Some(sent) = state.store.mark_sent(body.request_id).await? {
        info!("Request {} marked as sent", sent.id);
        return Ok(Json(sent));
    }

    let current = state
        .store
        .get_request(body.request_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Song request {} not found", body.request_id)))?;

    match current.status {
        RequestStatus::Sent => Ok(Json(current)),
        status => Err(AppError::Conflict(format!(
            "Song request {} is {status}; only completed songs can be sent",
            current.id
        ))),
    }
}
