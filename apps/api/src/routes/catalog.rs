use axum::Json;

use crate::catalog::{catalog, Catalog};

/// GET /api/catalog
/// Themes with their questions, moods, genres and vocal options for the wizard.
pub async fn catalog_handler() -> Json<Catalog> {
    Json(catalog())
}
