pub mod admin;
pub mod admin_applications;
pub mod admin_jobs;
pub mod applications;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod jobs;
pub mod middleware;
pub mod profile;
pub mod routes;
pub mod upload;
pub mod validate;

pub use auth::{AppState, AppStateInner, issue_token};
pub use config::{AdminAllowList, AppConfig, MediaHostConfig};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
