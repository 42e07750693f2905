//! Persistence seam for song requests and their generated artifacts.
//!
//! `AppState` carries an `Arc<dyn SongStore>`; production uses
//! [`PgSongStore`], tests use the in-memory store.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::song::{
    GeneratedArtifact, NewArtifact, NewSongRequest, RequestWithArtifact, SongRequest,
};

pub use postgres::PgSongStore;

#[async_trait]
pub trait SongStore: Send + Sync {
    /// Persists a new request in `pending` state.
    async fn insert_request(&self, new: &NewSongRequest) -> Result<SongRequest, AppError>;

    async fn get_request(&self, id: Uuid) -> Result<Option<SongRequest>, AppError>;

    /// Atomically moves a `pending` request to `generating`.
    /// Returns `None` when the request is missing or not pending.
    async fn claim_for_generation(&self, id: Uuid) -> Result<Option<SongRequest>, AppError>;

    /// Hands a claim back (`generating → pending`).
    async fn release_claim(&self, id: Uuid) -> Result<(), AppError>;

    /// Inserts the artifact and marks the request `completed` as one unit.
    /// A second artifact for the same request is a `Conflict`.
    async fn complete_with_artifact(
        &self,
        request_id: Uuid,
        artifact: &NewArtifact,
    ) -> Result<GeneratedArtifact, AppError>;

    async fn get_artifact(&self, request_id: Uuid) -> Result<Option<GeneratedArtifact>, AppError>;

    /// Every request with its artifact, newest first.
    async fn list_requests(&self) -> Result<Vec<RequestWithArtifact>, AppError>;

    /// Moves a `completed` request to `sent`. `None` when it is not `completed`.
    async fn mark_sent(&self, id: Uuid) -> Result<Option<SongRequest>, AppError>;

    /// Resets `generating` claims taken before `claimed_before` to `pending`.
    async fn reset_stale_claims(&self, claimed_before: DateTime<Utc>) -> Result<u64, AppError>;

    async fn pending_request_ids(&self) -> Result<Vec<Uuid>, AppError>;
}
