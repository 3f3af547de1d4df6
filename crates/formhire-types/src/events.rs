use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ApplicationStatus;

/// Outbound notifications. Dispatched after the primary write commits and
/// delivered best-effort; nothing waits on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Notification {
    /// A user record was created on first sign-in or first application
    Welcome { email: String, name: String },

    /// Confirmation to the applicant after a successful submission
    ApplicationReceived {
        applicant_email: String,
        applicant_name: String,
        job_title: String,
        company_name: String,
        application_id: Uuid,
    },

    /// Alert to every allow-listed admin about a new submission
    AdminNewApplication {
        admin_emails: Vec<String>,
        job_title: String,
        applicant_name: String,
        applicant_email: String,
        application_id: Uuid,
        resume_url: Option<String>,
    },

    /// The applicant's status changed
    StatusUpdate {
        applicant_email: String,
        applicant_name: String,
        job_title: String,
        company_name: String,
        status: ApplicationStatus,
        message: Option<String>,
    },
}

impl Notification {
    /// Short name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::ApplicationReceived { .. } => "application_received",
            Self::AdminNewApplication { .. } => "admin_new_application",
            Self::StatusUpdate { .. } => "status_update",
        }
    }
}
