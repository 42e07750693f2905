pub mod catalog;
pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::admin::{self, auth::require_admin};
use crate::generation;
use crate::intake;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Staff review (bearer token)
    let admin_routes = Router::new()
        .route(
            "/api/admin/requests",
            get(admin::handlers::handle_list_requests),
        )
        .route(
            "/api/admin/requests/:id",
            get(admin::handlers::handle_get_request),
        )
        .route(
            "/api/admin/update-status",
            post(admin::handlers::handle_update_status),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/catalog", get(catalog::catalog_handler))
        // Wizard
        .route(
            "/api/submit-request",
            post(intake::handlers::handle_submit_request),
        )
        .route(
            "/api/generate-content",
            post(generation::handlers::handle_generate_content),
        )
        // Path used by older wizard builds
        .route(
            "/api/generate-prompt",
            post(generation::handlers::handle_generate_content),
        )
        .merge(admin_routes)
        .with_state(state)
}
