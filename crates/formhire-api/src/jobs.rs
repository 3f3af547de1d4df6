//! Public job board: `GET /api/jobs` and `GET /api/jobs/{id}`.

use axum::{
    Json,
    extract::{Path, State},
};

use formhire_db::models::{JobFilter, JobSort};
use formhire_types::api::{FilterOptions, JobListQuery, JobListResponse, JobResponse, Pagination};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiQuery, parse_id};
use crate::validate::{EMPLOYMENT_TYPES, EXPERIENCE_LEVELS};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

const COMPANY_SIZES: &[&str] = &["1-10", "11-50", "51-200", "201-500", "501-1000", "1000+"];

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Translate query parameters into a storage filter. Returns the filter
/// and the effective page number.
pub fn job_filter(query: &JobListQuery) -> (JobFilter, u32) {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let skills = query
        .skills
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let featured = query
        .featured
        .as_deref()
        .is_some_and(|f| f.trim().eq_ignore_ascii_case("true"))
        .then_some(true);

    // Salary is free text; the range only narrows once both ends are given
    let salary = match (query.salary_min.as_deref(), query.salary_max.as_deref()) {
        (Some(min), Some(max)) if !min.trim().is_empty() && !max.trim().is_empty() => {
            Some(min.trim().to_string())
        }
        _ => None,
    };

    let descending = !query
        .sort_order
        .as_deref()
        .is_some_and(|o| o.trim().eq_ignore_ascii_case("asc"));

    let filter = JobFilter {
        active_only: true,
        search: query.search.clone(),
        location: query.location.clone(),
        department: query.department.clone(),
        employment_type: query.employment_type.clone(),
        experience_level: query.experience_level.clone(),
        company_size: query.company_size.clone(),
        salary,
        skills,
        featured,
        sort: JobSort::parse(query.sort_by.as_deref().unwrap_or_default().trim()),
        descending,
        offset: (page - 1).saturating_mul(limit),
        limit,
    };
    (filter, page)
}

/// GET /api/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<JobListQuery>,
) -> ApiResult<Json<JobListResponse>> {
    let (filter, page) = job_filter(&query);
    let limit = filter.limit;

    let ((jobs, total), (departments, locations, companies)) = state
        .run_db(move |db| Ok((db.list_jobs(&filter)?, db.job_facets()?)))
        .await?;

    Ok(Json(JobListResponse {
        jobs,
        pagination: Pagination::new(page, limit, total),
        filter_options: FilterOptions {
            departments,
            locations,
            companies,
            employment_types: to_strings(EMPLOYMENT_TYPES),
            experience_levels: to_strings(EXPERIENCE_LEVELS),
            company_sizes: to_strings(COMPANY_SIZES),
        },
    }))
}

/// GET /api/jobs/{id}: active jobs only.
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobResponse>> {
    let id = parse_id(&id, "Job not found")?;
    let job = state
        .run_db(move |db| db.get_job_detail(id, true))
        .await?
        .ok_or(ApiError::NotFound("Job not found"))?;

    Ok(Json(JobResponse { job }))
}
