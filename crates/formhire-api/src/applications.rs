use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use tracing::info;

use formhire_db::models::{ApplicationFilter, SubmitOutcome};
use formhire_types::api::{
    ApplicationListResponse, CheckAppliedResponse, SubmitApplicationRequest,
    SubmitApplicationResponse,
};
use formhire_types::events::Notification;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, parse_id};
use crate::middleware::{Claims, claims_from_headers};
use crate::validate;

/// POST /api/applications
pub async fn submit_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<SubmitApplicationRequest>,
) -> ApiResult<(StatusCode, Json<SubmitApplicationResponse>)> {
    let user = state.ensure_user(&claims).await?;

    let job_id = req
        .job_id
        .ok_or_else(|| ApiError::validation("Job ID is required"))?;

    let user_id = user.id;
    let (job, existing) = state
        .run_db(move |db| {
            Ok((
                db.get_job_detail(job_id, false)?,
                db.find_application(job_id, user_id)?,
            ))
        })
        .await?;

    let job = job.ok_or(ApiError::NotFound("Job not found"))?;
    if !job.job.is_active {
        return Err(ApiError::JobClosed);
    }
    // Fast path only; the unique constraint decides under concurrency
    if existing.is_some() {
        return Err(ApiError::DuplicateApplication);
    }

    let new_app = validate::application(&req, &job, &user)?;
    let outcome = state
        .run_db(move |db| db.submit_application(&new_app))
        .await?;

    let application = match outcome {
        SubmitOutcome::Created(application) => application,
        SubmitOutcome::Duplicate => return Err(ApiError::DuplicateApplication),
        SubmitOutcome::JobNotFound => return Err(ApiError::NotFound("Job not found")),
        SubmitOutcome::JobClosed => return Err(ApiError::JobClosed),
    };

    info!(
        application_id = %application.id,
        job_id = %job_id,
        applicant = %application.applicant_email,
        "Application submitted"
    );

    state.notifier.notify(Notification::ApplicationReceived {
        applicant_email: application.applicant_email.clone(),
        applicant_name: application.applicant_name.clone(),
        job_title: job.job.title.clone(),
        company_name: job.job.company_name.clone(),
        application_id: application.id,
    });
    state.notifier.notify(Notification::AdminNewApplication {
        admin_emails: state.config.admins.emails(),
        job_title: job.job.title.clone(),
        applicant_name: application.applicant_name.clone(),
        applicant_email: application.applicant_email.clone(),
        application_id: application.id,
        resume_url: application.resume_url.clone(),
    });

    let app_id = application.id;
    let detail = state
        .run_db(move |db| db.get_application_detail(app_id, false))
        .await?
        .ok_or_else(|| ApiError::Internal(format!("application {} missing after insert", app_id)))?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitApplicationResponse {
            application: detail,
            message: "Application submitted successfully".into(),
        }),
    ))
}

/// GET /api/applications and /api/applications/user: the caller's
/// applications, newest first. Never creates a user.
pub async fn list_my_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<ApplicationListResponse>> {
    let email = claims.email();
    let applications = state
        .run_db(move |db| {
            let Some(user) = db.get_user_by_email(&email)? else {
                return Ok(Vec::new());
            };
            db.list_applications(
                &ApplicationFilter {
                    user_id: Some(user.id),
                    ..Default::default()
                },
                false,
            )
        })
        .await?;

    Ok(Json(ApplicationListResponse {
        count: applications.len(),
        applications,
    }))
}

/// GET /api/applications/check/{jobId}. Anonymous callers get
/// `{hasApplied: false, application: null}`.
pub async fn check_applied(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> ApiResult<Json<CheckAppliedResponse>> {
    let not_applied = CheckAppliedResponse {
        has_applied: false,
        application: None,
    };

    let Some(claims) = claims_from_headers(&headers, &state.config.jwt_secret) else {
        return Ok(Json(not_applied));
    };
    let job_id = parse_id(&job_id, "Job not found")?;

    let email = claims.email();
    let application = state
        .run_db(move |db| match db.get_user_by_email(&email)? {
            Some(user) => db.find_application(job_id, user.id),
            None => Ok(None),
        })
        .await?;

    Ok(Json(CheckAppliedResponse {
        has_applied: application.is_some(),
        application,
    }))
}
