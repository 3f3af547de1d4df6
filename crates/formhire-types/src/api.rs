use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    Admin, AdminSummary, Application, ApplicationAnswer, ApplicationLog, ApplicationStatus, Job,
    JobQuestion, JobSummary, User,
};

// -- Jobs --

/// Body of `POST /api/admin/jobs`, `PUT` and `PATCH /api/admin/jobs/{id}`.
///
/// Every field is optional at the wire level so that missing required
/// fields surface as one validation error listing all of them.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobFieldsRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
    pub skills: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub company_name: Option<String>,
    pub company_logo: Option<String>,
    pub company_website: Option<String>,
    pub company_size: Option<String>,
    pub resume_required: Option<bool>,
    pub featured: Option<bool>,
    pub is_active: Option<bool>,
    /// `Some` (even empty) replaces the whole question set.
    pub questions: Option<Vec<QuestionInput>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionInput {
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: Option<String>,
    pub required: bool,
    pub options: Vec<String>,
    pub placeholder: Option<String>,
}

/// Query string of `GET /api/jobs`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobListQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
    pub company_size: Option<String>,
    /// Free-text salary range; applied as a substring match on `salaryMin`
    /// when both ends are present.
    pub salary_min: Option<String>,
    pub salary_max: Option<String>,
    /// Comma-separated; a job matches if it lists any of them.
    pub skills: Option<String>,
    pub featured: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    #[serde(flatten)]
    pub job: Job,
    pub application_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub admin: AdminSummary,
    pub questions: Vec<JobQuestion>,
    pub application_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(current_page: u32, limit: u32, total_count: i64) -> Self {
        let limit = i64::from(limit.max(1));
        let total_pages = ((total_count + limit - 1) / limit) as u32;
        Self {
            current_page,
            total_pages,
            total_count,
            has_next: current_page < total_pages,
            has_prev: current_page > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub departments: Vec<String>,
    pub locations: Vec<String>,
    pub companies: Vec<String>,
    pub employment_types: Vec<String>,
    pub experience_levels: Vec<String>,
    pub company_sizes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListResponse {
    pub jobs: Vec<JobListing>,
    pub pagination: Pagination,
    pub filter_options: FilterOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    pub job: JobDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMutationResponse {
    pub job: JobDetail,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteBranch {
    Deleted,
    Deactivated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteJobResponse {
    pub outcome: DeleteBranch,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<Job>,
}

// -- Applications --

/// An answer is either free text or a list of selected options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Choices(Vec<String>),
}

impl AnswerValue {
    /// True when nothing meaningful was entered or selected.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Choices(choices) => choices.iter().all(|c| c.trim().is_empty()),
        }
    }

    /// Flattened storage form; selections are comma-joined.
    pub fn flatten(&self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Choices(choices) => choices
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAnswerInput {
    pub question_id: Uuid,
    pub answer: AnswerValue,
}

/// Body of `POST /api/applications`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    pub job_id: Option<Uuid>,
    pub resume_url: Option<String>,
    pub phone_number: Option<String>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub why_interested: Option<String>,
    pub relevant_experience: Option<String>,
    pub expected_salary: Option<String>,
    pub availability_start: Option<String>,
    pub current_employment: Option<String>,
    pub relocation_willingness: Option<String>,
    pub work_authorization: Option<String>,
    pub cover_letter: Option<String>,
    pub additional_comments: Option<String>,
    pub reference_source: Option<String>,
    pub custom_answers: Vec<CustomAnswerInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetail {
    #[serde(flatten)]
    pub application: Application,
    pub job: JobSummary,
    pub answers: Vec<ApplicationAnswer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<ApplicationLog>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitApplicationResponse {
    pub application: ApplicationDetail,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<ApplicationDetail>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAppliedResponse {
    pub has_applied: bool,
    pub application: Option<Application>,
}

/// Query string of `GET /api/admin/applications`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdminApplicationQuery {
    pub job_id: Option<Uuid>,
    pub status: Option<String>,
}

/// Body of `PATCH /api/admin/applications`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BulkStatusRequest {
    pub application_id: Option<Uuid>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Body of `PATCH /api/admin/applications/{id}` (`notes`) and
/// `PUT /api/admin/applications/{id}/status` (`message`).
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatusRequest {
    pub status: Option<String>,
    pub notes: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResponse {
    pub application: Application,
    pub previous_status: ApplicationStatus,
    pub message: String,
}

// -- Admin --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResponse {
    pub admin: Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminJobListResponse {
    pub jobs: Vec<JobDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentApplication {
    pub id: Uuid,
    pub applicant_name: String,
    pub applicant_email: String,
    pub job_title: String,
    pub company_name: String,
    pub applied_at: DateTime<Utc>,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub total_applications: i64,
    pub pending_applications: i64,
    pub total_users: i64,
    pub recent_applications: Vec<RecentApplication>,
}

// -- Profile --

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: User,
}

// -- Uploads --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub secure_url: String,
    pub public_id: String,
    pub message: String,
}
