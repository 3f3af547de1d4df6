//! The admin authorization gate and `GET /api/admin/verify`.

use axum::{
    Extension, Json,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::info;

use formhire_types::api::AdminResponse;
use formhire_types::models::Admin;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{Claims, claims_from_headers};

/// Admit the caller iff their email is allow-listed and their admin row,
/// once it exists, is active. The first admitted request creates the row.
pub async fn authorize_admin(state: &AppState, claims: Option<&Claims>) -> ApiResult<Admin> {
    let claims = claims.ok_or(ApiError::Unauthenticated)?;
    if !state.config.admins.contains(&claims.email) {
        return Err(ApiError::Forbidden("Admin access required"));
    }

    let principal = claims.principal();
    let (admin, created) = state
        .run_db(move |db| db.find_or_create_admin(&principal))
        .await?;

    if created {
        info!(email = %admin.email, "Created admin record");
    }
    if !admin.is_active {
        return Err(ApiError::Forbidden("Admin account is deactivated"));
    }
    Ok(admin)
}

/// Middleware guarding every `/api/admin/*` route. Inserts the `Admin`
/// and the `Claims` into request extensions.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = claims_from_headers(req.headers(), &state.config.jwt_secret);
    let admin = authorize_admin(&state, claims.as_ref()).await?;

    if let Some(claims) = claims {
        req.extensions_mut().insert(claims);
    }
    req.extensions_mut().insert(admin);
    Ok(next.run(req).await)
}

/// GET /api/admin/verify
pub async fn verify(Extension(admin): Extension<Admin>) -> Json<AdminResponse> {
    Json(AdminResponse { admin })
}
