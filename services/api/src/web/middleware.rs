//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::web::error::HttpError;
use crate::web::state::AppState;
use crate::web::token;
use leximate_core::ports::PortError;

/// Middleware that validates the bearer identity token and extracts the user id.
///
/// If valid, inserts the user id into request extensions for handlers to use.
/// If missing or invalid, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(PortError::Unauthorized)?;

    let bearer = auth_header
        .strip_prefix("Bearer ")
        .ok_or(PortError::Unauthorized)?;

    let user_id = token::user_id_from_token(&state.config.jwt_secret, bearer)
        .ok_or(PortError::Unauthorized)?;

    req.extensions_mut().insert(user_id);
    Ok(next.run(req).await)
}
