//! The caller's own profile: `GET` and `PUT /api/user/profile`.

use axum::{Extension, Json, extract::State};
use tracing::info;

use formhire_db::models::ProfileUpdate;
use formhire_types::api::{ProfileResponse, ProfileUpdateRequest};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::middleware::Claims;

/// Fetching the profile is the first authenticated action for most users,
/// so it creates the row (and sends the welcome email) when missing.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = state.ensure_user(&claims).await?;
    Ok(Json(ProfileResponse { user }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<ProfileUpdateRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    if req.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::validation("Name cannot be empty"));
    }

    let user = state.ensure_user(&claims).await?;
    let update = ProfileUpdate {
        name: req.name,
        bio: req.bio,
        location: req.location,
        website: req.website,
        github: req.github,
        linkedin: req.linkedin,
        phone: req.phone,
    };

    let email = user.email.clone();
    let user = state
        .run_db(move |db| db.update_profile(&email, &update))
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    info!(email = %user.email, "Profile updated");
    Ok(Json(ProfileResponse { user }))
}
