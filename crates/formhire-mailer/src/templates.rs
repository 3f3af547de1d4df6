//! Plain-text renderings of each notification.

use formhire_types::events::Notification;
use formhire_types::models::ApplicationStatus;

use crate::sender::OutgoingEmail;

const SIGN_OFF: &str = "Best regards,\nThe FormHire Team";

/// Render a notification. Returns `None` when it has no recipients.
pub fn render(notification: &Notification, public_url: &str) -> Option<OutgoingEmail> {
    let base = public_url.trim_end_matches('/');

    let email = match notification {
        Notification::Welcome { email, name } => OutgoingEmail {
            to: vec![email.clone()],
            subject: "Welcome to FormHire!".into(),
            body: format!(
                "Hello {name}!\n\n\
                 Welcome to FormHire. You can browse open positions, apply in a few \
                 clicks and follow the status of every application from your dashboard.\n\n\
                 Start exploring: {base}/jobs\n\n\
                 {SIGN_OFF}",
                name = greeting_name(name),
            ),
        },

        Notification::ApplicationReceived {
            applicant_email,
            applicant_name,
            job_title,
            company_name,
            application_id,
        } => OutgoingEmail {
            to: vec![applicant_email.clone()],
            subject: format!("Application Confirmed - {} at {}", job_title, company_name),
            body: format!(
                "Hello {name},\n\n\
                 Thank you for applying to the {job_title} position at {company_name}.\n\n\
                 We have received your application and our team will review it shortly. \
                 You will hear from us by email when its status changes.\n\n\
                 Application ID: {application_id}\n\
                 Track your applications: {base}/applications\n\n\
                 {SIGN_OFF}",
                name = greeting_name(applicant_name),
            ),
        },

        Notification::AdminNewApplication {
            admin_emails,
            job_title,
            applicant_name,
            applicant_email,
            application_id,
            resume_url,
        } => {
            if admin_emails.is_empty() {
                return None;
            }
            let resume = resume_url
                .as_deref()
                .map(|url| format!("Resume: {}\n", url))
                .unwrap_or_default();
            OutgoingEmail {
                to: admin_emails.clone(),
                subject: format!("New Application - {}", job_title),
                body: format!(
                    "New application for: {job_title}\n\n\
                     Name: {applicant_name}\n\
                     Email: {applicant_email}\n\
                     Application ID: {application_id}\n\
                     {resume}\n\
                     Review it at {base}/admin/applications\n"
                ),
            }
        }

        Notification::StatusUpdate {
            applicant_email,
            applicant_name,
            job_title,
            company_name,
            status,
            message,
        } => {
            let note = message
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(|m| format!("Message from the hiring team:\n{}\n\n", m))
                .unwrap_or_default();
            OutgoingEmail {
                to: vec![applicant_email.clone()],
                subject: format!("Application Update - {}", job_title),
                body: format!(
                    "Hello {name},\n\n\
                     We have an update regarding your application for the {job_title} \
                     position at {company_name}.\n\n\
                     Your application status has been updated to: {label}\n\n\
                     {blurb}\n\n\
                     {note}\
                     View your applications: {base}/applications\n\n\
                     {SIGN_OFF}",
                    name = greeting_name(applicant_name),
                    label = status.label(),
                    blurb = status_blurb(*status),
                ),
            }
        }
    };

    Some(email)
}

fn greeting_name(name: &str) -> &str {
    let name = name.trim();
    if name.is_empty() { "there" } else { name }
}

fn status_blurb(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Pending => "Your application is waiting to be reviewed.",
        ApplicationStatus::Reviewed => "Our team has reviewed your application.",
        ApplicationStatus::InterviewScheduled => {
            "We would like to meet you. Expect a message with interview details soon."
        }
        ApplicationStatus::Accepted => "Congratulations! We are delighted to move forward with you.",
        ApplicationStatus::Rejected => {
            "After careful consideration we have decided not to move forward at this time."
        }
    }
}
