use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use formhire_db::models::ApplicationFilter;
use formhire_types::api::{
    AdminApplicationQuery, ApplicationListResponse, BulkStatusRequest, StatusRequest,
    StatusUpdateResponse,
};
use formhire_types::events::Notification;
use formhire_types::models::ApplicationStatus;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery, parse_id};

const APPLICATION_NOT_FOUND: &str = "Application not found";

fn parse_status(raw: Option<&str>) -> ApiResult<ApplicationStatus> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Status is required"))?;
    raw.parse()
        .map_err(|_| ApiError::validation("Invalid status"))
}

/// Shared by every status route: persist the change, then tell the
/// applicant if the status actually moved.
async fn change_status(
    state: &AppState,
    id: Uuid,
    status: ApplicationStatus,
    note: Option<String>,
) -> ApiResult<StatusUpdateResponse> {
    let change = state
        .run_db(move |db| db.update_application_status(id, status, note.as_deref()))
        .await?
        .ok_or(ApiError::NotFound(APPLICATION_NOT_FOUND))?;

    info!(
        application_id = %id,
        from = %change.previous,
        to = %status,
        "Application status updated"
    );

    if change.previous != status {
        state.notifier.notify(Notification::StatusUpdate {
            applicant_email: change.application.applicant_email.clone(),
            applicant_name: change.application.applicant_name.clone(),
            job_title: change.job.title.clone(),
            company_name: change.job.company_name.clone(),
            status,
            message: change.application.status_message.clone(),
        });
    }

    Ok(StatusUpdateResponse {
        application: change.application,
        previous_status: change.previous,
        message: "Application status updated successfully".into(),
    })
}

/// GET /api/admin/applications?jobId=&status=
pub async fn list_applications(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AdminApplicationQuery>,
) -> ApiResult<Json<ApplicationListResponse>> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") | Some("ALL") => None,
        Some(raw) => Some(parse_status(Some(raw))?),
    };
    let filter = ApplicationFilter {
        job_id: query.job_id,
        user_id: None,
        status,
    };

    let applications = state
        .run_db(move |db| db.list_applications(&filter, true))
        .await?;

    Ok(Json(ApplicationListResponse {
        count: applications.len(),
        applications,
    }))
}

/// PATCH /api/admin/applications: body `{applicationId, status, notes}`.
pub async fn update_status_bulk(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BulkStatusRequest>,
) -> ApiResult<Json<StatusUpdateResponse>> {
    let id = req
        .application_id
        .ok_or_else(|| ApiError::validation("Application ID is required"))?;
    let status = parse_status(req.status.as_deref())?;
    Ok(Json(change_status(&state, id, status, req.notes).await?))
}

/// PATCH /api/admin/applications/{id}: body `{status, notes}`.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> ApiResult<Json<StatusUpdateResponse>> {
    let id = parse_id(&id, APPLICATION_NOT_FOUND)?;
    let status = parse_status(req.status.as_deref())?;
    Ok(Json(change_status(&state, id, status, req.notes).await?))
}

/// PUT /api/admin/applications/{id}/status: body `{status, message}`.
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> ApiResult<Json<StatusUpdateResponse>> {
    let id = parse_id(&id, APPLICATION_NOT_FOUND)?;
    let status = parse_status(req.status.as_deref())?;
    let note = req.message.or(req.notes);
    Ok(Json(change_status(&state, id, status, note).await?))
}

/// DELETE /api/admin/applications/{id}
pub async fn delete_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, APPLICATION_NOT_FOUND)?;
    let deleted = state.run_db(move |db| db.delete_application(id)).await?;
    if !deleted {
        return Err(ApiError::NotFound(APPLICATION_NOT_FOUND));
    }

    info!(application_id = %id, "Application deleted");
    Ok(Json(json!({ "message": "Application deleted successfully" })))
}
