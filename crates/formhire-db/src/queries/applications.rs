use std::collections::HashMap;

use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{Connection, Row, TransactionBehavior};
use uuid::Uuid;

use formhire_types::api::ApplicationDetail;
use formhire_types::models::{
    Application, ApplicationAnswer, ApplicationLog, ApplicationStatus, JobSummary,
};

use super::{OptionalExt, is_unique_violation, non_blank, placeholders};
use crate::Database;
use crate::codec::{enum_at, new_id, now, opt_time_at, time_at, uuid_at};
use crate::models::{ApplicationFilter, NewApplication, StatusChange, SubmitOutcome};

const APP_COLUMNS: &str = "ap.id, ap.job_id, ap.user_id, ap.applicant_name, ap.applicant_email, \
     ap.status, ap.applied_at, ap.resume_url, ap.phone_number, ap.linkedin_url, ap.portfolio_url, \
     ap.why_interested, ap.relevant_experience, ap.expected_salary, ap.availability_start, \
     ap.current_employment, ap.relocation_willingness, ap.work_authorization, ap.cover_letter, \
     ap.additional_comments, ap.reference_source, ap.status_message, ap.status_updated_at";

const APP_COLUMN_COUNT: usize = 23;

const SUMMARY_COLUMNS: &str =
    "j.id, j.title, j.company_name, j.department, j.location, j.employment_type, j.created_at";

impl Database {
    /// Insert an application and its answers in one transaction.
    ///
    /// The job is re-read inside the transaction, and a second submission
    /// for the same (job, user) pair is caught by the UNIQUE constraint,
    /// so concurrent duplicates yield exactly one `Created`.
    pub fn submit_application(&self, app: &NewApplication) -> Result<SubmitOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let job_id = app.job_id.to_string();

            let active: Option<bool> = tx
                .query_row("SELECT is_active FROM jobs WHERE id = ?1", [&job_id], |row| {
                    row.get(0)
                })
                .optional()?;
            match active {
                None => return Ok(SubmitOutcome::JobNotFound),
                Some(false) => return Ok(SubmitOutcome::JobClosed),
                Some(true) => {}
            }

            let app_id = new_id();
            let inserted = tx.execute(
                "INSERT INTO applications (id, job_id, user_id, applicant_name, applicant_email,
                     status, applied_at, resume_url, phone_number, linkedin_url, portfolio_url,
                     why_interested, relevant_experience, expected_salary, availability_start,
                     current_employment, relocation_willingness, work_authorization,
                     cover_letter, additional_comments, reference_source)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                     ?16, ?17, ?18, ?19, ?20, ?21)",
                rusqlite::params![
                    &app_id,
                    &job_id,
                    app.user_id.to_string(),
                    &app.applicant_name,
                    &app.applicant_email,
                    ApplicationStatus::Pending.as_str(),
                    now(),
                    non_blank(&app.resume_url),
                    app.phone_number.trim(),
                    non_blank(&app.linkedin_url),
                    non_blank(&app.portfolio_url),
                    app.why_interested.trim(),
                    app.relevant_experience.trim(),
                    non_blank(&app.expected_salary),
                    non_blank(&app.availability_start),
                    non_blank(&app.current_employment),
                    non_blank(&app.relocation_willingness),
                    app.work_authorization.trim(),
                    non_blank(&app.cover_letter),
                    non_blank(&app.additional_comments),
                    non_blank(&app.reference_source),
                ],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => return Ok(SubmitOutcome::Duplicate),
                Err(e) => return Err(e.into()),
            }

            {
                let mut stmt = tx.prepare(
                    "INSERT INTO application_answers
                         (id, application_id, question_id, question, question_type, position, answer)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )?;
                for answer in &app.answers {
                    stmt.execute(rusqlite::params![
                        new_id(),
                        &app_id,
                        answer.question_id.to_string(),
                        &answer.question,
                        answer.question_type.as_str(),
                        answer.position,
                        &answer.answer,
                    ])?;
                }
            }

            let application = query_application(&tx, &app_id)?
                .ok_or_else(|| anyhow::anyhow!("application {} missing after insert", app_id))?;
            tx.commit()?;
            Ok(SubmitOutcome::Created(application))
        })
    }

    pub fn find_application(&self, job_id: Uuid, user_id: Uuid) -> Result<Option<Application>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM applications ap WHERE ap.job_id = ?1 AND ap.user_id = ?2",
                APP_COLUMNS
            );
            conn.query_row(
                &sql,
                [job_id.to_string(), user_id.to_string()],
                map_application,
            )
            .optional()
        })
    }

    /// Applications matching `filter`, newest first, each with its job
    /// summary and answers. Logs are attached only when `include_logs`.
    pub fn list_applications(
        &self,
        filter: &ApplicationFilter,
        include_logs: bool,
    ) -> Result<Vec<ApplicationDetail>> {
        self.with_conn(|conn| {
            let mut clauses: Vec<&str> = Vec::new();
            let mut params: Vec<Value> = Vec::new();
            if let Some(job_id) = filter.job_id {
                clauses.push("ap.job_id = ?");
                params.push(Value::Text(job_id.to_string()));
            }
            if let Some(user_id) = filter.user_id {
                clauses.push("ap.user_id = ?");
                params.push(Value::Text(user_id.to_string()));
            }
            if let Some(status) = filter.status {
                clauses.push("ap.status = ?");
                params.push(Value::Text(status.as_str().to_string()));
            }
            let where_sql = if clauses.is_empty() {
                String::new()
            } else {
                format!(" WHERE {}", clauses.join(" AND "))
            };

            let sql = format!(
                "SELECT {}, {} FROM applications ap JOIN jobs j ON j.id = ap.job_id{}
                 ORDER BY ap.applied_at DESC, ap.id DESC",
                APP_COLUMNS, SUMMARY_COLUMNS, where_sql
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut details = stmt
                .query_map(rusqlite::params_from_iter(params.iter()), map_detail)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            attach_children(conn, &mut details, include_logs)?;
            Ok(details)
        })
    }

    pub fn get_application_detail(
        &self,
        id: Uuid,
        include_logs: bool,
    ) -> Result<Option<ApplicationDetail>> {
        self.with_conn(|conn| {
            let Some(detail) = query_detail(conn, &id.to_string())? else {
                return Ok(None);
            };
            let mut details = vec![detail];
            attach_children(conn, &mut details, include_logs)?;
            Ok(details.pop())
        })
    }

    /// Set the status and status message, and append a log entry when the
    /// note is non-blank. Returns the previous status alongside the updated
    /// row, or `None` if the application does not exist.
    pub fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        note: Option<&str>,
    ) -> Result<Option<StatusChange>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let app_id = id.to_string();

            let Some(before) = query_detail(&tx, &app_id)? else {
                return Ok(None);
            };

            let note = note.map(str::trim).filter(|n| !n.is_empty());
            let updated_at = now();
            tx.execute(
                "UPDATE applications
                 SET status = ?2, status_message = ?3, status_updated_at = ?4
                 WHERE id = ?1",
                rusqlite::params![&app_id, status.as_str(), note, &updated_at],
            )?;

            if let Some(note) = note {
                tx.execute(
                    "INSERT INTO application_logs (id, application_id, action, notes, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![new_id(), &app_id, status.as_str(), note, &updated_at],
                )?;
            }

            let application = query_application(&tx, &app_id)?
                .ok_or_else(|| anyhow::anyhow!("application {} missing after update", app_id))?;
            tx.commit()?;

            Ok(Some(StatusChange {
                previous: before.application.status,
                application,
                job: before.job,
            }))
        })
    }

    /// Delete an application with its answers and logs. Returns false if
    /// it did not exist.
    pub fn delete_application(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM applications WHERE id = ?1", [id.to_string()])?;
            Ok(deleted > 0)
        })
    }
}

fn query_application(conn: &Connection, id: &str) -> Result<Option<Application>> {
    let sql = format!("SELECT {} FROM applications ap WHERE ap.id = ?1", APP_COLUMNS);
    conn.query_row(&sql, [id], map_application).optional()
}

fn query_detail(conn: &Connection, id: &str) -> Result<Option<ApplicationDetail>> {
    let sql = format!(
        "SELECT {}, {} FROM applications ap JOIN jobs j ON j.id = ap.job_id WHERE ap.id = ?1",
        APP_COLUMNS, SUMMARY_COLUMNS
    );
    conn.query_row(&sql, [id], map_detail).optional()
}

/// Fill in answers (by position) and optionally logs (oldest first) for a
/// batch of applications with two queries.
fn attach_children(
    conn: &Connection,
    details: &mut [ApplicationDetail],
    include_logs: bool,
) -> Result<()> {
    if details.is_empty() {
        return Ok(());
    }
    let ids: Vec<String> = details
        .iter()
        .map(|d| d.application.id.to_string())
        .collect();
    let marks = placeholders(ids.len());

    let mut answers: HashMap<Uuid, Vec<ApplicationAnswer>> = HashMap::new();
    let mut stmt = conn.prepare(&format!(
        "SELECT id, application_id, question_id, question, question_type, position, answer
         FROM application_answers WHERE application_id IN ({})
         ORDER BY application_id, position",
        marks
    ))?;
    for answer in stmt.query_map(rusqlite::params_from_iter(ids.iter()), map_answer)? {
        let answer = answer?;
        answers.entry(answer.application_id).or_default().push(answer);
    }

    let mut logs: HashMap<Uuid, Vec<ApplicationLog>> = HashMap::new();
    if include_logs {
        let mut stmt = conn.prepare(&format!(
            "SELECT id, application_id, action, notes, created_at
             FROM application_logs WHERE application_id IN ({})
             ORDER BY created_at, id",
            marks
        ))?;
        for log in stmt.query_map(rusqlite::params_from_iter(ids.iter()), map_log)? {
            let log = log?;
            logs.entry(log.application_id).or_default().push(log);
        }
    }

    for detail in details.iter_mut() {
        let id = detail.application.id;
        detail.answers = answers.remove(&id).unwrap_or_default();
        if include_logs {
            detail.logs = Some(logs.remove(&id).unwrap_or_default());
        }
    }
    Ok(())
}

fn map_application(row: &Row<'_>) -> rusqlite::Result<Application> {
    Ok(Application {
        id: uuid_at(row, 0)?,
        job_id: uuid_at(row, 1)?,
        user_id: uuid_at(row, 2)?,
        applicant_name: row.get(3)?,
        applicant_email: row.get(4)?,
        status: enum_at(row, 5)?,
        applied_at: time_at(row, 6)?,
        resume_url: row.get(7)?,
        phone_number: row.get(8)?,
        linkedin_url: row.get(9)?,
        portfolio_url: row.get(10)?,
        why_interested: row.get(11)?,
        relevant_experience: row.get(12)?,
        expected_salary: row.get(13)?,
        availability_start: row.get(14)?,
        current_employment: row.get(15)?,
        relocation_willingness: row.get(16)?,
        work_authorization: row.get(17)?,
        cover_letter: row.get(18)?,
        additional_comments: row.get(19)?,
        reference_source: row.get(20)?,
        status_message: row.get(21)?,
        status_updated_at: opt_time_at(row, 22)?,
    })
}

/// Expects `APP_COLUMNS, SUMMARY_COLUMNS`.
fn map_detail(row: &Row<'_>) -> rusqlite::Result<ApplicationDetail> {
    let base = APP_COLUMN_COUNT;
    Ok(ApplicationDetail {
        application: map_application(row)?,
        job: JobSummary {
            id: uuid_at(row, base)?,
            title: row.get(base + 1)?,
            company_name: row.get(base + 2)?,
            department: row.get(base + 3)?,
            location: row.get(base + 4)?,
            employment_type: row.get(base + 5)?,
            created_at: time_at(row, base + 6)?,
        },
        answers: Vec::new(),
        logs: None,
    })
}

fn map_answer(row: &Row<'_>) -> rusqlite::Result<ApplicationAnswer> {
    Ok(ApplicationAnswer {
        id: uuid_at(row, 0)?,
        application_id: uuid_at(row, 1)?,
        question_id: uuid_at(row, 2)?,
        question: row.get(3)?,
        question_type: enum_at(row, 4)?,
        position: row.get(5)?,
        answer: row.get(6)?,
    })
}

fn map_log(row: &Row<'_>) -> rusqlite::Result<ApplicationLog> {
    Ok(ApplicationLog {
        id: uuid_at(row, 0)?,
        application_id: uuid_at(row, 1)?,
        action: row.get(2)?,
        notes: row.get(3)?,
        created_at: time_at(row, 4)?,
    })
}
