use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Schema statements, applied in order. Every statement is idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS song_requests (
        id UUID PRIMARY KEY,
        phone_number TEXT NOT NULL,
        theme TEXT NOT NULL,
        answers JSONB NOT NULL DEFAULT '[]'::jsonb,
        style TEXT NOT NULL,
        genre TEXT NOT NULL,
        vocal_gender TEXT NOT NULL DEFAULT 'female',
        preferred_artist TEXT,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'generating', 'completed', 'sent')),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        generation_started_at TIMESTAMPTZ,
        sent_at TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS song_prompts (
        id UUID PRIMARY KEY,
        request_id UUID NOT NULL UNIQUE REFERENCES song_requests (id) ON DELETE CASCADE,
        song_title TEXT NOT NULL,
        lyrics TEXT NOT NULL,
        style_tags TEXT NOT NULL,
        generation_method TEXT NOT NULL DEFAULT 'ai'
            CHECK (generation_method IN ('ai', 'fallback')),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_song_requests_created_at ON song_requests (created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_song_requests_status ON song_requests (status)",
];

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the tables this service owns if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for (idx, statement) in SCHEMA.iter().enumerate() {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Schema statement {idx} failed"))?;
    }
    info!("Database schema ready ({} statements)", SCHEMA.len());
    Ok(())
}
