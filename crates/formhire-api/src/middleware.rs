use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use formhire_db::models::Principal;
use formhire_types::models::Role;

use crate::auth::AppState;
use crate::config::normalize_email;
use crate::error::{ApiError, ErrorDetails};

/// Session token claims issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Informational; admin routes re-check the allow-list.
    pub role: Role,
    pub exp: usize,
}

impl Claims {
    pub fn email(&self) -> String {
        normalize_email(&self.email)
    }

    /// Identity used when a user or admin row is created lazily.
    pub fn principal(&self) -> Principal {
        Principal {
            email: self.email(),
            name: self
                .name
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            image: self.image.clone(),
        }
    }
}

/// Decode the bearer token, if any. Invalid or expired tokens read as
/// absent.
pub fn claims_from_headers(headers: &HeaderMap, secret: &str) -> Option<Claims> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?
        .strip_prefix("Bearer ")?;

    let data = decode::<Claims>(
        token.trim(),
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;

    if normalize_email(&data.claims.email).is_empty() {
        return None;
    }
    Some(data.claims)
}

/// Extract and validate the JWT from the Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = claims_from_headers(req.headers(), &state.config.jwt_secret)
        .ok_or(ApiError::Unauthenticated)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Add the internal message to 500 bodies when `expose_errors` is set.
pub async fn expose_error_details(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let Some(details) = response.extensions_mut().remove::<ErrorDetails>() else {
        return response;
    };
    if !state.config.expose_errors {
        return response;
    }

    let status = response.status();
    (
        status,
        Json(json!({ "error": details.error, "details": details.detail })),
    )
        .into_response()
}
