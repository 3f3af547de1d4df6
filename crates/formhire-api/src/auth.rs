use std::sync::Arc;

use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info};

use formhire_db::Database;
use formhire_mailer::Notifier;
use formhire_types::events::Notification;
use formhire_types::models::{Role, User};

use crate::config::{AdminAllowList, AppConfig, normalize_email};
use crate::error::{ApiError, ApiResult};
use crate::middleware::Claims;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub config: AppConfig,
    pub notifier: Notifier,
    pub http: reqwest::Client,
}

impl AppStateInner {
    /// Run a blocking database call off the async runtime.
    pub async fn run_db<F, T>(self: &Arc<Self>, f: F) -> ApiResult<T>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || f(&state.db))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                ApiError::Internal(format!("blocking task failed: {}", e))
            })?
            .map_err(ApiError::from)
    }

    /// Find or lazily create the caller's user row. A new row triggers the
    /// welcome email.
    pub async fn ensure_user(self: &Arc<Self>, claims: &Claims) -> ApiResult<User> {
        let principal = claims.principal();
        let (user, created) = self
            .run_db(move |db| db.find_or_create_user(&principal))
            .await?;

        if created {
            info!(email = %user.email, "Created user on first authenticated action");
            self.notifier.notify(Notification::Welcome {
                email: user.email.clone(),
                name: user.name.clone(),
            });
        }
        Ok(user)
    }
}

/// Mint a session token. The role is derived from the allow-list at
/// issuance.
pub fn issue_token(
    secret: &str,
    admins: &AdminAllowList,
    email: &str,
    name: Option<&str>,
    ttl: chrono::Duration,
) -> anyhow::Result<String> {
    let email = normalize_email(email);
    let role = if admins.contains(&email) {
        Role::Admin
    } else {
        Role::User
    };

    let claims = Claims {
        sub: email.clone(),
        email,
        name: name.map(str::to_string),
        image: None,
        role,
        exp: (chrono::Utc::now() + ttl).timestamp().max(0) as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
