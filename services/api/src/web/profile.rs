//! services/api/src/web/profile.rs
//!
//! Profile endpoints: read/update the caller's profile fields and manage the
//! uploaded avatar image.

use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::auth::UserResponse;
use crate::web::error::{HttpError, HttpResult};
use crate::web::state::AppState;
use leximate_core::domain::UserProfilePatch;

const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub jurisdiction: Option<String>,
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<UpdateProfileRequest> for UserProfilePatch {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            role: req.role,
            phone: req.phone,
            company: req.company,
            bio: req.bio,
            jurisdiction: req.jurisdiction,
            language: req.language,
            timezone: req.timezone,
            avatar_url: req.avatar_url,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /getProfile - The caller's profile, secrets excluded
#[utoipa::path(
    get,
    path = "/getProfile",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> HttpResult<impl IntoResponse> {
    let user = state.db.get_user_by_id(user_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "user": UserResponse::from(user),
    })))
}

/// PUT /updateProfile - Apply an allow-listed profile patch
///
/// Blank and missing values leave the stored field untouched. An update with
/// no effective fields is not an error; the current record is returned as-is.
#[utoipa::path(
    put,
    path = "/updateProfile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> HttpResult<impl IntoResponse> {
    let mut user = state.db.get_user_by_id(user_id).await?;
    let applied = user.apply_profile_patch(req.into());
    if applied > 0 {
        state.db.update_user(&user).await?;
        user = state.db.get_user_by_id(user_id).await?;
    }
    Ok(Json(serde_json::json!({
        "success": true,
        "user": UserResponse::from(user),
    })))
}

/// POST /uploadProfileImage - Store an avatar image
///
/// Accepts a multipart/form-data request with a single `avatar` file part and
/// responds with the public URL the file is served from.
#[utoipa::path(
    post,
    path = "/uploadProfileImage",
    request_body(content_type = "multipart/form-data", description = "The avatar image."),
    responses(
        (status = 200, description = "Upload succeeded"),
        (status = 400, description = "Missing file or disallowed type"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn upload_avatar_handler(
    State(state): State<Arc<AppState>>,
    Extension(_user_id): Extension<Uuid>,
    mut multipart: Multipart,
) -> HttpResult<impl IntoResponse> {
    let mut upload: Option<(String, axum::body::Bytes)> = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Failed to read multipart data: {}", e);
        HttpError::bad_request("Malformed multipart body")
    })? {
        if field.name() != Some("avatar") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| HttpError::bad_request("Empty filename"))?;
        let data = field.bytes().await.map_err(|e| {
            error!("Failed to read file bytes: {}", e);
            HttpError::bad_request("Failed to read file")
        })?;
        upload = Some((file_name, data));
        break;
    }
    let (file_name, data) =
        upload.ok_or_else(|| HttpError::bad_request("No file provided"))?;

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(HttpError::bad_request("File type not allowed"));
    }
    if data.len() > state.config.max_upload_bytes {
        return Err(HttpError::bad_request("File too large"));
    }

    let unique_name = format!("{}_{}", Uuid::new_v4().simple(), sanitize_filename(&file_name));
    let save_path = state.config.upload_dir.join(&unique_name);

    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .map_err(|e| {
            error!("Failed to create upload dir: {}", e);
            HttpError::internal("Failed to store file")
        })?;
    tokio::fs::write(&save_path, &data).await.map_err(|e| {
        error!("Failed to write upload: {}", e);
        HttpError::internal("Failed to store file")
    })?;

    Ok(Json(serde_json::json!({
        "success": true,
        "url": format!("/uploads/{}", unique_name),
    })))
}

/// Reduces a client-supplied filename to a safe single path component.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("photo (1).PNG"), "photo__1_.PNG");
        assert_eq!(sanitize_filename("avatar.png"), "avatar.png");
    }

    #[test]
    fn extension_allow_list_is_lowercase_matched() {
        for ext in ALLOWED_EXTENSIONS {
            assert_eq!(ext, ext.to_lowercase());
        }
    }
}
