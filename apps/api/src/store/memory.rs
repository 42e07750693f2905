use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::SongStore;
use crate::errors::AppError;
use crate::models::song::{
    GeneratedArtifact, NewArtifact, NewSongRequest, RequestStatus, RequestWithArtifact,
    SongRequest,
};

#[derive(Default)]
struct Tables {
    requests: Vec<SongRequest>,
    artifacts: Vec<GeneratedArtifact>,
}

/// In-memory `SongStore` with the same state transitions as `PgSongStore`.
#[derive(Default)]
pub struct MemorySongStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
}

impl MemorySongStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail like an unreachable database.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.tables.lock().unwrap().requests.len()
    }

    pub fn artifact_count(&self, request_id: Uuid) -> usize {
        self.tables
            .lock()
            .unwrap()
            .artifacts
            .iter()
            .filter(|a| a.request_id == request_id)
            .count()
    }

    /// Backdates a claim so stale-claim recovery can be exercised.
    pub fn backdate_claim(&self, id: Uuid, started_at: DateTime<Utc>) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(request) = tables.requests.iter_mut().find(|r| r.id == id) {
            request.generation_started_at = Some(started_at);
        }
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl SongStore for MemorySongStore {
    async fn insert_request(&self, new: &NewSongRequest) -> Result<SongRequest, AppError> {
        self.check_writable()?;
        let request = SongRequest {
            id: Uuid::new_v4(),
            contact: new.contact.clone(),
            theme: new.theme,
            answers: new.answers.clone(),
            style: new.style,
            genre: new.genre,
            vocal_preference: new.vocal_preference,
            preferred_artist: new.preferred_artist.clone(),
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            generation_started_at: None,
            sent_at: None,
        };
        self.tables.lock().unwrap().requests.push(request.clone());
        Ok(request)
    }

    async fn get_request(&self, id: Uuid) -> Result<Option<SongRequest>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn claim_for_generation(&self, id: Uuid) -> Result<Option<SongRequest>, AppError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().unwrap();
        let claimed = tables
            .requests
            .iter_mut()
            .find(|r| r.id == id && r.status == RequestStatus::Pending)
            .map(|request| {
                request.status = RequestStatus::Generating;
                request.generation_started_at = Some(Utc::now());
                request.clone()
            });
        Ok(claimed)
    }

    async fn release_claim(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(request) = tables
            .requests
            .iter_mut()
            .find(|r| r.id == id && r.status == RequestStatus::Generating)
        {
            request.status = RequestStatus::Pending;
            request.generation_started_at = None;
        }
        Ok(())
    }

    async fn complete_with_artifact(
        &self,
        request_id: Uuid,
        artifact: &NewArtifact,
    ) -> Result<GeneratedArtifact, AppError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.artifacts.iter().any(|a| a.request_id == request_id) {
            return Err(AppError::Conflict(format!(
                "Request {request_id} already has an artifact"
            )));
        }
        let request = tables
            .requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or_else(|| AppError::NotFound(format!("Request {request_id} not found")))?;
        request.status = RequestStatus::Completed;

        let stored = GeneratedArtifact {
            id: Uuid::new_v4(),
            request_id,
            title: artifact.title.clone(),
            lyrics: artifact.lyrics.clone(),
            style_tags: artifact.style_tags.clone(),
            generation_method: artifact.generation_method,
            created_at: Utc::now(),
        };
        tables.artifacts.push(stored.clone());
        Ok(stored)
    }

    async fn get_artifact(&self, request_id: Uuid) -> Result<Option<GeneratedArtifact>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .artifacts
            .iter()
            .find(|a| a.request_id == request_id)
            .cloned())
    }

    async fn list_requests(&self) -> Result<Vec<RequestWithArtifact>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut listed: Vec<RequestWithArtifact> = tables
            .requests
            .iter()
            .map(|request| RequestWithArtifact {
                request: request.clone(),
                artifact: tables
                    .artifacts
                    .iter()
                    .find(|a| a.request_id == request.id)
                    .cloned(),
            })
            .collect();
        listed.sort_by(|a, b| b.request.created_at.cmp(&a.request.created_at));
        Ok(listed)
    }

    async fn mark_sent(&self, id: Uuid) -> Result<Option<SongRequest>, AppError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .requests
            .iter_mut()
            .find(|r| r.id == id && r.status == RequestStatus::Completed)
            .map(|request| {
                request.status = RequestStatus::Sent;
                request.sent_at = Some(Utc::now());
                request.clone()
            }))
    }

    async fn reset_stale_claims(&self, claimed_before: DateTime<Utc>) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let mut reset = 0;
        for request in tables.requests.iter_mut().filter(|r| {
            r.status == RequestStatus::Generating
                && r.generation_started_at.is_some_and(|t| t < claimed_before)
        }) {
            request.status = RequestStatus::Pending;
            request.generation_started_at = None;
            reset += 1;
        }
        Ok(reset)
    }

    async fn pending_request_ids(&self) -> Result<Vec<Uuid>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .map(|r| r.id)
            .collect())
    }
}
