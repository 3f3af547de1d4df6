use axum::{Json, extract::State};

use formhire_types::api::DashboardStats;

use crate::auth::AppState;
use crate::error::ApiResult;

const RECENT_APPLICATIONS: u32 = 10;

/// GET /api/admin/dashboard
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    let stats = state
        .run_db(|db| db.dashboard_stats(RECENT_APPLICATIONS))
        .await?;
    Ok(Json(stats))
}
