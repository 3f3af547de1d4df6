use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use formhire_db::models::{DeleteJobOutcome, JobFields, NewQuestion};
use formhire_types::api::{
    AdminJobListResponse, DeleteBranch, DeleteJobResponse, JobFieldsRequest, JobMutationResponse,
    JobResponse,
};
use formhire_types::models::Admin;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, parse_id};
use crate::validate;

const JOB_NOT_FOUND: &str = "Job not found";

fn replacement_questions(req: &JobFieldsRequest) -> ApiResult<Option<Vec<NewQuestion>>> {
    req.questions
        .as_deref()
        .map(validate::questions)
        .transpose()
}

/// GET /api/admin/jobs: every job, active or not.
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<AdminJobListResponse>> {
    let jobs = state.run_db(|db| db.list_all_jobs()).await?;
    Ok(Json(AdminJobListResponse { jobs }))
}

/// POST /api/admin/jobs
pub async fn create_job(
    State(state): State<AppState>,
    Extension(admin): Extension<Admin>,
    ApiJson(req): ApiJson<JobFieldsRequest>,
) -> ApiResult<(StatusCode, Json<JobMutationResponse>)> {
    let fields = validate::job_fields(&req)?;
    let questions = replacement_questions(&req)?.unwrap_or_default();

    let admin_id = admin.id;
    let job = state
        .run_db(move |db| db.create_job(admin_id, &fields, &questions))
        .await?;

    info!(job_id = %job.job.id, admin = %admin.email, "Job created");
    Ok((
        StatusCode::CREATED,
        Json(JobMutationResponse {
            job,
            message: "Job created successfully".into(),
        }),
    ))
}

/// GET /api/admin/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobResponse>> {
    let id = parse_id(&id, JOB_NOT_FOUND)?;
    let job = state
        .run_db(move |db| db.get_job_detail(id, false))
        .await?
        .ok_or(ApiError::NotFound(JOB_NOT_FOUND))?;
    Ok(Json(JobResponse { job }))
}

/// PUT /api/admin/jobs/{id}: full replace; omitted fields take defaults.
pub async fn replace_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<JobFieldsRequest>,
) -> ApiResult<Json<JobMutationResponse>> {
    let id = parse_id(&id, JOB_NOT_FOUND)?;
    let fields = validate::job_fields(&req)?;
    let questions = replacement_questions(&req)?;

    let job = state
        .run_db(move |db| db.update_job(id, &fields, questions.as_deref()))
        .await?
        .ok_or(ApiError::NotFound(JOB_NOT_FOUND))?;

    info!(job_id = %id, "Job replaced");
    Ok(Json(JobMutationResponse {
        job,
        message: "Job updated successfully".into(),
    }))
}

/// PATCH /api/admin/jobs/{id}: merge; omitted fields keep stored values.
pub async fn patch_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<JobFieldsRequest>,
) -> ApiResult<Json<JobMutationResponse>> {
    let id = parse_id(&id, JOB_NOT_FOUND)?;
    let questions = replacement_questions(&req)?;

    let current = state
        .run_db(move |db| db.get_job(id))
        .await?
        .ok_or(ApiError::NotFound(JOB_NOT_FOUND))?;
    let fields = validate::merge_job_fields(&JobFields::from(&current), &req)?;

    let job = state
        .run_db(move |db| db.update_job(id, &fields, questions.as_deref()))
        .await?
        .ok_or(ApiError::NotFound(JOB_NOT_FOUND))?;

    info!(job_id = %id, "Job patched");
    Ok(Json(JobMutationResponse {
        job,
        message: "Job updated successfully".into(),
    }))
}

/// DELETE /api/admin/jobs/{id}: hard delete without applications,
/// deactivation otherwise.
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteJobResponse>> {
    let id = parse_id(&id, JOB_NOT_FOUND)?;
    let outcome = state.run_db(move |db| db.delete_job(id)).await?;

    let response = match outcome {
        DeleteJobOutcome::NotFound => return Err(ApiError::NotFound(JOB_NOT_FOUND)),
        DeleteJobOutcome::Deleted => {
            info!(job_id = %id, "Job deleted");
            DeleteJobResponse {
                outcome: DeleteBranch::Deleted,
                message: "Job deleted successfully".into(),
                job: None,
            }
        }
        DeleteJobOutcome::Deactivated(job) => {
            info!(job_id = %id, "Job has applications, deactivated instead of deleted");
            DeleteJobResponse {
                outcome: DeleteBranch::Deactivated,
                message: "Job has existing applications and was deactivated instead of deleted"
                    .into(),
                job: Some(job),
            }
        }
    };
    Ok(Json(response))
}
