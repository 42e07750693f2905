//! Bearer-token guard for the staff review routes.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

/// Rejects requests whose `Authorization: Bearer <token>` does not match
/// `ADMIN_TOKEN`. Applied with `middleware::from_fn_with_state`.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token);

    let Some(token) = presented else {
        return Err(AppError::Unauthorized);
    };
    if !tokens_match(token, &state.config.admin_token) {
        warn!("Rejected admin request to {} with a wrong token", request.uri().path());
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Compares without short-circuiting on the first differing byte.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
