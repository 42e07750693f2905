use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::SongStore;
use crate::errors::AppError;
use crate::models::song::{
    GeneratedArtifact, NewArtifact, NewSongRequest, RequestWithArtifact, SongPromptRow,
    SongRequest, SongRequestRow,
};

const UNIQUE_VIOLATION: &str = "23505";

/// `SongStore` backed by the two PostgreSQL tables created in `db::ensure_schema`.
#[derive(Clone)]
pub struct PgSongStore {
    pool: PgPool,
}

impl PgSongStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

#[async_trait]
impl SongStore for PgSongStore {
    async fn insert_request(&self, new: &NewSongRequest) -> Result<SongRequest, AppError> {
        let row = sqlx::query_as::<_, SongRequestRow>(
            r#"
            INSERT INTO song_requests
                (id, phone_number, theme, answers, style, genre, vocal_gender, preferred_artist, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.contact)
        .bind(new.theme.label())
        .bind(Json(&new.answers))
        .bind(new.style.label())
        .bind(new.genre.label())
        .bind(new.vocal_preference.as_str())
        .bind(new.preferred_artist.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(SongRequest::try_from(row)?)
    }

    async fn get_request(&self, id: Uuid) -> Result<Option<SongRequest>, AppError> {
        let row = sqlx::query_as::<_, SongRequestRow>("SELECT * FROM song_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(SongRequest::try_from).transpose()?)
    }

    async fn claim_for_generation(&self, id: Uuid) -> Result<Option<SongRequest>, AppError> {
        let row = sqlx::query_as::<_, SongRequestRow>(
            r#"
            UPDATE song_requests
            SET status = 'generating', generation_started_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SongRequest::try_from).transpose()?)
    }

    async fn release_claim(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE song_requests
            SET status = 'pending', generation_started_at = NULL
            WHERE id = $1 AND status = 'generating'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn complete_with_artifact(
        &self,
        request_id: Uuid,
        artifact: &NewArtifact,
    ) -> Result<GeneratedArtifact, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, SongPromptRow>(
            r#"
            INSERT INTO song_prompts
                (id, request_id, song_title, lyrics, style_tags, generation_method)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request_id)
        .bind(&artifact.title)
        .bind(&artifact.lyrics)
        .bind(&artifact.style_tags)
        .bind(artifact.generation_method.as_str())
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::Conflict(format!(
                    "Request {request_id} already has an artifact"
                )));
            }
            Err(e) => return Err(e.into()),
        };

        sqlx::query("UPDATE song_requests SET status = 'completed' WHERE id = $1")
            .bind(request_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            "Stored {} artifact for request {request_id}",
            artifact.generation_method.as_str()
        );
        Ok(GeneratedArtifact::try_from(row)?)
    }

    async fn get_artifact(&self, request_id: Uuid) -> Result<Option<GeneratedArtifact>, AppError> {
        let row = sqlx::query_as::<_, SongPromptRow>(
            "SELECT * FROM song_prompts WHERE request_id = $1",
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GeneratedArtifact::try_from).transpose()?)
    }

    async fn list_requests(&self) -> Result<Vec<RequestWithArtifact>, AppError> {
        let rows = sqlx::query_as::<_, SongRequestRow>(
            "SELECT * FROM song_requests ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let prompt_rows = sqlx::query_as::<_, SongPromptRow>(
            "SELECT * FROM song_prompts WHERE request_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut artifacts: HashMap<Uuid, GeneratedArtifact> = HashMap::new();
        for row in prompt_rows {
            let artifact = GeneratedArtifact::try_from(row)?;
            artifacts.insert(artifact.request_id, artifact);
        }

        rows.into_iter()
            .map(|row| -> Result<RequestWithArtifact, AppError> {
                let request = SongRequest::try_from(row)?;
                let artifact = artifacts.remove(&request.id);
                Ok(RequestWithArtifact { request, artifact })
            })
            .collect()
    }

    async fn mark_sent(&self, id: Uuid) -> Result<Option<SongRequest>, AppError> {
        let row = sqlx::query_as::<_, SongRequestRow>(
            r#"
            UPDATE song_requests
            SET status = 'sent', sent_at = NOW()
            WHERE id = $1 AND status = 'completed'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SongRequest::try_from).transpose()?)
    }

    async fn reset_stale_claims(&self, claimed_before: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE song_requests
            SET status = 'pending', generation_started_at = NULL
            WHERE status = 'generating' AND generation_started_at < $1
            "#,
        )
        .bind(claimed_before)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn pending_request_ids(&self) -> Result<Vec<Uuid>, AppError> {
        Ok(sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM song_requests WHERE status = 'pending' ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }
}
