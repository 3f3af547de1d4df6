//! Write-side inputs and operation outcomes. Read-side entities come from
//! `formhire_types::models` so the API serialises them directly.

use formhire_types::models::{Application, ApplicationStatus, Job, JobSummary, QuestionType};
use uuid::Uuid;

/// Identity details captured when a user or admin row is created lazily.
#[derive(Debug, Clone, Default)]
pub struct Principal {
    pub email: String,
    pub name: String,
    pub image: Option<String>,
}

/// Fully-resolved top-level job fields (defaults already applied).
#[derive(Debug, Clone)]
pub struct JobFields {
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub department: String,
    pub location: String,
    pub salary: Option<String>,
    pub employment_type: String,
    pub experience_level: String,
    pub skills: Vec<String>,
    pub benefits: Vec<String>,
    pub company_name: String,
    pub company_logo: Option<String>,
    pub company_website: Option<String>,
    pub company_size: Option<String>,
    pub resume_required: bool,
    pub featured: bool,
    pub is_active: bool,
}

impl From<&Job> for JobFields {
    fn from(job: &Job) -> Self {
        Self {
            title: job.title.clone(),
            description: job.description.clone(),
            requirements: job.requirements.clone(),
            department: job.department.clone(),
            location: job.location.clone(),
            salary: job.salary.clone(),
            employment_type: job.employment_type.clone(),
            experience_level: job.experience_level.clone(),
            skills: job.skills.clone(),
            benefits: job.benefits.clone(),
            company_name: job.company_name.clone(),
            company_logo: job.company_logo.clone(),
            company_website: job.company_website.clone(),
            company_size: job.company_size.clone(),
            resume_required: job.resume_required,
            featured: job.featured,
            is_active: job.is_active,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question: String,
    pub question_type: QuestionType,
    pub required: bool,
    pub options: Vec<String>,
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobSort {
    #[default]
    CreatedAt,
    Title,
    Company,
    Salary,
}

impl JobSort {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "title" => Self::Title,
            "company" | "companyName" => Self::Company,
            "salary" => Self::Salary,
            _ => Self::CreatedAt,
        }
    }

    pub(crate) fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "j.created_at",
            Self::Title => "j.title COLLATE NOCASE",
            Self::Company => "j.company_name COLLATE NOCASE",
            Self::Salary => "j.salary",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub active_only: bool,
    pub search: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
    pub company_size: Option<String>,
    /// Case-insensitive substring of the free-text salary.
    pub salary: Option<String>,
    pub skills: Vec<String>,
    pub featured: Option<bool>,
    pub sort: JobSort,
    pub descending: bool,
    pub offset: u32,
    pub limit: u32,
}

#[derive(Debug, Clone)]
pub enum DeleteJobOutcome {
    NotFound,
    /// No applications: the job and its questions are gone.
    Deleted,
    /// Applications exist: the job was deactivated instead.
    Deactivated(Job),
}

#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub question_id: Uuid,
    pub question: String,
    pub question_type: QuestionType,
    pub position: i64,
    pub answer: String,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub applicant_name: String,
    pub applicant_email: String,
    pub resume_url: Option<String>,
    pub phone_number: String,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub why_interested: String,
    pub relevant_experience: String,
    pub expected_salary: Option<String>,
    pub availability_start: Option<String>,
    pub current_employment: Option<String>,
    pub relocation_willingness: Option<String>,
    pub work_authorization: String,
    pub cover_letter: Option<String>,
    pub additional_comments: Option<String>,
    pub reference_source: Option<String>,
    pub answers: Vec<NewAnswer>,
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Created(Application),
    /// The (job, user) pair already has an application.
    Duplicate,
    JobNotFound,
    JobClosed,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub job_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Clone)]
pub struct StatusChange {
    pub previous: ApplicationStatus,
    pub application: Application,
    pub job: JobSummary,
}

/// Profile edits. `None` leaves a field unchanged; a blank string clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub phone: Option<String>,
}
