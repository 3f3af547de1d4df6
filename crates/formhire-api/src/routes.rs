use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
};

use crate::auth::AppState;
use crate::middleware::{expose_error_details, require_auth};
use crate::upload::UPLOAD_BODY_LIMIT;
use crate::{
    admin, admin_applications, admin_jobs, applications, dashboard, jobs, profile, upload,
};

/// Build the full `/api` router. Cross-cutting layers (CORS, tracing) are
/// added by the binary.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/jobs", get(jobs::list_jobs))
        .route("/api/jobs/{id}", get(jobs::get_job))
        .route(
            "/api/applications/check/{job_id}",
            get(applications::check_applied),
        );

    let protected_routes = Router::new()
        .route(
            "/api/applications",
            post(applications::submit_application).get(applications::list_my_applications),
        )
        .route(
            "/api/applications/user",
            get(applications::list_my_applications),
        )
        .route(
            "/api/user/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route(
            "/api/upload/resume",
            post(upload::upload_resume).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin_routes = Router::new()
        .route("/api/admin/verify", get(admin::verify))
        .route(
            "/api/admin/jobs",
            get(admin_jobs::list_jobs).post(admin_jobs::create_job),
        )
        .route(
            "/api/admin/jobs/{id}",
            get(admin_jobs::get_job)
                .put(admin_jobs::replace_job)
                .patch(admin_jobs::patch_job)
                .delete(admin_jobs::delete_job),
        )
        .route(
            "/api/admin/applications",
            get(admin_applications::list_applications)
                .patch(admin_applications::update_status_bulk),
        )
        .route(
            "/api/admin/applications/{id}",
            patch(admin_applications::update_status)
                .delete(admin_applications::delete_application),
        )
        .route(
            "/api/admin/applications/{id}/status",
            put(admin_applications::set_status),
        )
        .route("/api/admin/dashboard", get(dashboard::dashboard))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin::require_admin,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            expose_error_details,
        ))
        .with_state(state)
}
