//! services/api/src/web/auth.rs
//!
//! Authentication endpoints: signup, login, logout, current-user lookup, and
//! the Google federated-login flow.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::error::{HttpError, HttpResult};
use crate::web::state::AppState;
use crate::web::token;
use leximate_core::domain::User;
use leximate_core::ports::PortError;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A user record as returned to clients; secret fields never appear here.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            phone: user.phone,
            company: user.company,
            bio: user.bio,
            jurisdiction: user.jurisdiction,
            language: user.language,
            timezone: user.timezone,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: String,
    pub state: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /signup - Create a new user account
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Missing field or email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> HttpResult<impl IntoResponse> {
    let (username, email, password) = match (req.username, req.email, req.password) {
        (Some(u), Some(e), Some(p)) if !u.is_empty() && !e.is_empty() && !p.is_empty() => {
            (u, e, p)
        }
        _ => return Err(HttpError::bad_request("All fields are required")),
    };

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            HttpError::internal("Failed to hash password")
        })?
        .to_string();

    let user = state
        .db
        .create_user(&username, &email, &password_hash)
        .await?;

    let token = token::create_token(
        &state.config.jwt_secret,
        state.config.jwt_ttl_days,
        user.id,
        &user.email,
    )
    .map_err(|e| {
        error!("Failed to sign token: {:?}", e);
        HttpError::internal("Failed to create token")
    })?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            token,
            user: user.into(),
        }),
    ))
}

/// POST /login - Login with existing credentials
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> HttpResult<impl IntoResponse> {
    let (email, password) = match (req.email, req.password) {
        (Some(e), Some(p)) => (e, p),
        _ => return Err(HttpError::bad_request("Email and password are required")),
    };

    // A single message for every failure mode so the response never reveals
    // whether the email or the password was wrong.
    let invalid = || HttpError::new(StatusCode::UNAUTHORIZED, "Invalid credentials");

    let creds = match state.db.get_user_by_email(&email).await {
        Ok(creds) => creds,
        Err(PortError::NotFound(_)) => return Err(invalid()),
        Err(e) => return Err(e.into()),
    };

    // Accounts created through Google login carry no password hash.
    let stored_hash = creds.password_hash.ok_or_else(invalid)?;

    let parsed_hash = PasswordHash::new(&stored_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        HttpError::internal("Authentication error")
    })?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(invalid());
    }

    let token = token::create_token(
        &state.config.jwt_secret,
        state.config.jwt_ttl_days,
        creds.user.id,
        &creds.user.email,
    )
    .map_err(|e| {
        error!("Failed to sign token: {:?}", e);
        HttpError::internal("Failed to create token")
    })?;

    Ok(Json(AuthResponse {
        success: true,
        token,
        user: creds.user.into(),
    }))
}

/// POST /logout - Logout
///
/// Bearer tokens are not revocable server-side; the endpoint exists for
/// client symmetry and always succeeds.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 200, description = "Logout successful"))
)]
pub async fn logout_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "success": true, "message": "Logged out" }))
}

/// GET /api/me - The current identity's user record
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User no longer exists")
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> HttpResult<impl IntoResponse> {
    let user = state.db.get_user_by_id(user_id).await?;
    Ok(Json(
        serde_json::json!({ "user": UserResponse::from(user) }),
    ))
}

/// GET /auth/google - Begin the Google login flow
pub async fn google_login_handler(
    State(state): State<Arc<AppState>>,
) -> HttpResult<impl IntoResponse> {
    let google = state.google_oauth.as_ref().ok_or_else(|| {
        HttpError::new(StatusCode::SERVICE_UNAVAILABLE, "Google login not configured")
    })?;
    let auth_url = google.generate_auth_url().await?;
    Ok(Redirect::temporary(&auth_url))
}

/// GET /auth/google/callback - Complete the Google login flow
///
/// Reconciles the Google identity into a local user, issues a token, and
/// redirects back to the frontend with the token in the query string.
pub async fn google_callback_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GoogleCallbackQuery>,
) -> HttpResult<impl IntoResponse> {
    let google = state.google_oauth.as_ref().ok_or_else(|| {
        HttpError::new(StatusCode::SERVICE_UNAVAILABLE, "Google login not configured")
    })?;

    let user = google.exchange_code(&query.code, &query.state).await?;

    let token = token::create_token(
        &state.config.jwt_secret,
        state.config.jwt_ttl_days,
        user.id,
        &user.email,
    )
    .map_err(|e| {
        error!("Failed to sign token: {:?}", e);
        HttpError::internal("Failed to create token")
    })?;

    let redirect_url = format!("{}/oauth-callback?token={}", state.config.frontend_url, token);
    Ok(Redirect::temporary(&redirect_url))
}
