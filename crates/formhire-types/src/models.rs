use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

// -- Roles --

/// Role carried in the session token. Derived from the admin allow-list
/// when the token is issued; informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
}

// -- Application status --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    InterviewScheduled,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        Self::Pending,
        Self::Reviewed,
        Self::InterviewScheduled,
        Self::Accepted,
        Self::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Reviewed => "REVIEWED",
            Self::InterviewScheduled => "INTERVIEW_SCHEDULED",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Human-readable label used in notification emails.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Reviewed => "Reviewed",
            Self::InterviewScheduled => "Interview scheduled",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownVariant;

    /// Case-insensitive match against the canonical names only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownVariant {
                kind: "application status",
                value: s.to_string(),
            })
    }
}

// -- Question types --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    Text,
    Email,
    Phone,
    Textarea,
    Select,
    Checkbox,
    Radio,
}

impl QuestionType {
    pub const ALL: [QuestionType; 7] = [
        Self::Text,
        Self::Email,
        Self::Phone,
        Self::Textarea,
        Self::Select,
        Self::Checkbox,
        Self::Radio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Textarea => "TEXTAREA",
            Self::Select => "SELECT",
            Self::Checkbox => "CHECKBOX",
            Self::Radio => "RADIO",
        }
    }

    /// Types whose answers are picked from `options`.
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::Select | Self::Checkbox | Self::Radio)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownVariant {
                kind: "question type",
                value: s.to_string(),
            })
    }
}

// -- Entities --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Owner details embedded in job payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSummary {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
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
    pub admin_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQuestion {
    pub id: Uuid,
    pub job_id: Uuid,
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub required: bool,
    pub options: Vec<String>,
    pub placeholder: Option<String>,
    pub order: i64,
}

/// The slice of a job embedded in application payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: Uuid,
    pub title: String,
    pub company_name: String,
    pub department: String,
    pub location: String,
    pub employment_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub applicant_name: String,
    pub applicant_email: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
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
    pub status_message: Option<String>,
    pub status_updated_at: Option<DateTime<Utc>>,
}

/// A submitted answer. The question text and type are copied at submission
/// time, so the answer outlives edits to the job's question set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationAnswer {
    pub id: Uuid,
    pub application_id: Uuid,
    pub question_id: Uuid,
    pub question: String,
    pub question_type: QuestionType,
    pub position: i64,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationLog {
    pub id: Uuid,
    pub application_id: Uuid,
    pub action: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
