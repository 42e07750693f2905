use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::catalog::{Genre, Style, Theme, VocalPreference};

/// One interview question with the user's free-text answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    /// Claimed by a generation worker; no artifact yet.
    Generating,
    Completed,
    Sent,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Generating => "generating",
            RequestStatus::Completed => "completed",
            RequestStatus::Sent => "sent",
        }
    }

    /// Completed and sent requests own exactly one artifact.
    pub fn has_artifact(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Sent)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "generating" => Ok(RequestStatus::Generating),
            "completed" => Ok(RequestStatus::Completed),
            "sent" => Ok(RequestStatus::Sent),
            other => Err(anyhow!("unknown request status '{other}'")),
        }
    }
}

/// Whether an artifact came from the model or from the deterministic placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMethod {
    Ai,
    Fallback,
}

impl GenerationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMethod::Ai => "ai",
            GenerationMethod::Fallback => "fallback",
        }
    }
}

impl FromStr for GenerationMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai" => Ok(GenerationMethod::Ai),
            "fallback" => Ok(GenerationMethod::Fallback),
            other => Err(anyhow!("unknown generation method '{other}'")),
        }
    }
}

/// A validated submission, ready to be persisted as a `pending` request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSongRequest {
    pub contact: String,
    pub theme: Theme,
    pub answers: Vec<Answer>,
    pub style: Style,
    pub genre: Genre,
    pub vocal_preference: VocalPreference,
    pub preferred_artist: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRequest {
    pub id: Uuid,
    pub contact: String,
    pub theme: Theme,
    pub answers: Vec<Answer>,
    pub style: Style,
    pub genre: Genre,
    pub vocal_preference: VocalPreference,
    pub preferred_artist: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub generation_started_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
}

/// Generated content for a request, before it has been stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArtifact {
    pub title: String,
    /// Line breaks encoded as the literal `\n` marker.
    pub lyrics: String,
    pub style_tags: String,
    pub generation_method: GenerationMethod,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArtifact {
    pub id: Uuid,
    pub request_id: Uuid,
    pub title: String,
    pub lyrics: String,
    pub style_tags: String,
    pub generation_method: GenerationMethod,
    pub created_at: DateTime<Utc>,
}

/// A request joined with its artifact, as the review dashboard shows it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWithArtifact {
    #[serde(flatten)]
    pub request: SongRequest,
    pub artifact: Option<GeneratedArtifact>,
}

// ────────────────────────────────────────────────────────────────────────────
// Database rows
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, FromRow)]
pub struct SongRequestRow {
    pub id: Uuid,
    pub phone_number: String,
    pub theme: String,
    pub answers: Json<Vec<Answer>>,
    pub style: String,
    pub genre: String,
    pub vocal_gender: String,
    pub preferred_artist: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub generation_started_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl TryFrom<SongRequestRow> for SongRequest {
    type Error = anyhow::Error;

    fn try_from(row: SongRequestRow) -> Result<Self, Self::Error> {
        Ok(SongRequest {
            id: row.id,
            contact: row.phone_number,
            theme: row.theme.parse()?,
            answers: row.answers.0,
            style: row.style.parse()?,
            genre: row.genre.parse()?,
            vocal_preference: row.vocal_gender.parse()?,
            preferred_artist: row.preferred_artist,
            status: row.status.parse()?,
            created_at: row.created_at,
            generation_started_at: row.generation_started_at,
            sent_at: row.sent_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SongPromptRow {
    pub id: Uuid,
    pub request_id: Uuid,
    pub song_title: String,
    pub lyrics: String,
    pub style_tags: String,
    pub generation_method: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SongPromptRow> for GeneratedArtifact {
    type Error = anyhow::Error;

    fn try_from(row: SongPromptRow) -> Result<Self, Self::Error> {
        Ok(GeneratedArtifact {
            id: row.id,
            request_id: row.request_id,
            title: row.song_title,
            lyrics: row.lyrics,
            style_tags: row.style_tags,
            generation_method: row.generation_method.parse()?,
            created_at: row.created_at,
        })
    }
}
