use std::collections::HashMap;

use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{Connection, Row, TransactionBehavior};
use uuid::Uuid;

use formhire_types::api::{JobDetail, JobListing};
use formhire_types::models::{AdminSummary, Job, JobQuestion};

use super::{OptionalExt, non_blank};
use crate::Database;
use crate::codec::{contains_pattern, encode_list, enum_at, list_at, new_id, now, time_at, uuid_at};
use crate::models::{DeleteJobOutcome, JobFields, JobFilter, NewQuestion};

const JOB_COLUMNS: &str = "j.id, j.title, j.description, j.requirements, j.department, j.location, \
     j.salary, j.employment_type, j.experience_level, j.skills, j.benefits, j.company_name, \
     j.company_logo, j.company_website, j.company_size, j.resume_required, j.featured, \
     j.is_active, j.admin_id, j.created_at, j.updated_at";

/// Number of columns in `JOB_COLUMNS`; extra selected columns start here.
const JOB_COLUMN_COUNT: usize = 21;

const APPLICATION_COUNT: &str =
    "(SELECT COUNT(*) FROM applications x WHERE x.job_id = j.id)";

impl Database {
    /// Insert a job owned by `admin_id`, plus its initial question set, in
    /// one transaction.
    pub fn create_job(
        &self,
        admin_id: Uuid,
        fields: &JobFields,
        questions: &[NewQuestion],
    ) -> Result<JobDetail> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let job_id = new_id();
            let created_at = now();
            tx.execute(
                "INSERT INTO jobs (id, title, description, requirements, department, location,
                     salary, employment_type, experience_level, skills, benefits, company_name,
                     company_logo, company_website, company_size, resume_required, featured,
                     is_active, admin_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                     ?16, ?17, ?18, ?19, ?20, ?20)",
                rusqlite::params![
                    &job_id,
                    &fields.title,
                    &fields.description,
                    &fields.requirements,
                    &fields.department,
                    &fields.location,
                    non_blank(&fields.salary),
                    &fields.employment_type,
                    &fields.experience_level,
                    encode_list(&fields.skills)?,
                    encode_list(&fields.benefits)?,
                    &fields.company_name,
                    non_blank(&fields.company_logo),
                    non_blank(&fields.company_website),
                    non_blank(&fields.company_size),
                    fields.resume_required,
                    fields.featured,
                    fields.is_active,
                    admin_id.to_string(),
                    &created_at,
                ],
            )?;
            insert_questions(&tx, &job_id, questions)?;

            let detail = query_job_detail(&tx, &job_id, false)?
                .ok_or_else(|| anyhow::anyhow!("job {} missing after insert", job_id))?;
            tx.commit()?;
            Ok(detail)
        })
    }

    pub fn get_job(&self, id: Uuid) -> Result<Option<Job>> {
        self.with_conn(|conn| query_job(conn, &id.to_string()))
    }

    /// Job with owner, ordered questions and application count. With
    /// `active_only`, inactive jobs read as absent.
    pub fn get_job_detail(&self, id: Uuid, active_only: bool) -> Result<Option<JobDetail>> {
        self.with_conn(|conn| query_job_detail(conn, &id.to_string(), active_only))
    }

    pub fn list_job_questions(&self, job_id: Uuid) -> Result<Vec<JobQuestion>> {
        self.with_conn(|conn| query_questions(conn, &job_id.to_string()))
    }

    /// Overwrite the top-level fields and, when `questions` is given,
    /// replace the whole question set (orders 1..N). All-or-nothing.
    /// Returns `None` if the job does not exist.
    pub fn update_job(
        &self,
        id: Uuid,
        fields: &JobFields,
        questions: Option<&[NewQuestion]>,
    ) -> Result<Option<JobDetail>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let job_id = id.to_string();

            let changed = tx.execute(
                "UPDATE jobs SET title = ?2, description = ?3, requirements = ?4,
                     department = ?5, location = ?6, salary = ?7, employment_type = ?8,
                     experience_level = ?9, skills = ?10, benefits = ?11, company_name = ?12,
                     company_logo = ?13, company_website = ?14, company_size = ?15,
                     resume_required = ?16, featured = ?17, is_active = ?18, updated_at = ?19
                 WHERE id = ?1",
                rusqlite::params![
                    &job_id,
                    &fields.title,
                    &fields.description,
                    &fields.requirements,
                    &fields.department,
                    &fields.location,
                    non_blank(&fields.salary),
                    &fields.employment_type,
                    &fields.experience_level,
                    encode_list(&fields.skills)?,
                    encode_list(&fields.benefits)?,
                    &fields.company_name,
                    non_blank(&fields.company_logo),
                    non_blank(&fields.company_website),
                    non_blank(&fields.company_size),
                    fields.resume_required,
                    fields.featured,
                    fields.is_active,
                    now(),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }

            if let Some(questions) = questions {
                tx.execute("DELETE FROM job_questions WHERE job_id = ?1", [&job_id])?;
                insert_questions(&tx, &job_id, questions)?;
            }

            let detail = query_job_detail(&tx, &job_id, false)?;
            tx.commit()?;
            Ok(detail)
        })
    }

    /// Hard-delete a job without applications; otherwise deactivate it.
    /// The count and the branch run in one write transaction, so a
    /// concurrent submission cannot slip between them.
    pub fn delete_job(&self, id: Uuid) -> Result<DeleteJobOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let job_id = id.to_string();

            let count: Option<i64> = tx
                .query_row(
                    &format!("SELECT {} FROM jobs j WHERE j.id = ?1", APPLICATION_COUNT),
                    [&job_id],
                    |row| row.get(0),
                )
                .optional()?;

            let outcome = match count {
                None => DeleteJobOutcome::NotFound,
                Some(0) => {
                    tx.execute("DELETE FROM job_questions WHERE job_id = ?1", [&job_id])?;
                    tx.execute("DELETE FROM jobs WHERE id = ?1", [&job_id])?;
                    DeleteJobOutcome::Deleted
                }
                Some(_) => {
                    tx.execute(
                        "UPDATE jobs SET is_active = 0, updated_at = ?2 WHERE id = ?1",
                        rusqlite::params![&job_id, now()],
                    )?;
                    let job = query_job(&tx, &job_id)?
                        .ok_or_else(|| anyhow::anyhow!("job {} missing after update", job_id))?;
                    DeleteJobOutcome::Deactivated(job)
                }
            };

            tx.commit()?;
            Ok(outcome)
        })
    }

    /// One page of jobs matching `filter`, plus the total match count.
    pub fn list_jobs(&self, filter: &JobFilter) -> Result<(Vec<JobListing>, i64)> {
        self.with_conn(|conn| {
            let (where_sql, mut params) = job_where_clause(filter);

            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM jobs j{}", where_sql),
                rusqlite::params_from_iter(params.iter()),
                |row| row.get(0),
            )?;

            let direction = if filter.descending { "DESC" } else { "ASC" };
            let sql = format!(
                "SELECT {}, {} FROM jobs j{} ORDER BY {} {dir}, j.id {dir} LIMIT ? OFFSET ?",
                JOB_COLUMNS,
                APPLICATION_COUNT,
                where_sql,
                filter.sort.column(),
                dir = direction,
            );
            params.push(Value::Integer(i64::from(filter.limit)));
            params.push(Value::Integer(i64::from(filter.offset)));

            let mut stmt = conn.prepare(&sql)?;
            let jobs = stmt
                .query_map(rusqlite::params_from_iter(params.iter()), |row| {
                    Ok(JobListing {
                        job: map_job(row)?,
                        application_count: row.get(JOB_COLUMN_COUNT)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok((jobs, total))
        })
    }

    /// Every job, active or not, newest first, with questions attached.
    pub fn list_all_jobs(&self) -> Result<Vec<JobDetail>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {}, a.name, a.email, {}
                 FROM jobs j JOIN admins a ON a.id = j.admin_id
                 ORDER BY j.created_at DESC, j.id DESC",
                JOB_COLUMNS, APPLICATION_COUNT
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut jobs = stmt
                .query_map([], map_job_detail)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            // One pass over all questions instead of a query per job
            let mut stmt = conn.prepare(&format!(
                "{} ORDER BY q.job_id, q.sort_order",
                QUESTION_SELECT
            ))?;
            let mut by_job: HashMap<Uuid, Vec<JobQuestion>> = HashMap::new();
            for question in stmt.query_map([], map_question)? {
                let question = question?;
                by_job.entry(question.job_id).or_default().push(question);
            }
            for detail in &mut jobs {
                detail.questions = by_job.remove(&detail.job.id).unwrap_or_default();
            }

            Ok(jobs)
        })
    }

    /// Distinct departments, locations and company names across active jobs.
    pub fn job_facets(&self) -> Result<(Vec<String>, Vec<String>, Vec<String>)> {
        self.with_conn(|conn| {
            let distinct = |column: &str| -> Result<Vec<String>> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT DISTINCT {col} FROM jobs
                     WHERE is_active = 1 AND {col} <> ''
                     ORDER BY {col} COLLATE NOCASE",
                    col = column
                ))?;
                let values = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<String>, _>>()?;
                Ok(values)
            };

            Ok((
                distinct("department")?,
                distinct("location")?,
                distinct("company_name")?,
            ))
        })
    }
}

fn job_where_clause(filter: &JobFilter) -> (String, Vec<Value>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if filter.active_only {
        clauses.push("j.is_active = 1".into());
    }

    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = contains_pattern(search);
        let columns = ["j.title", "j.description", "j.company_name", "j.requirements"];
        let ors: Vec<String> = columns
            .iter()
            .map(|c| format!("fold({}) LIKE ? ESCAPE '\\'", c))
            .collect();
        clauses.push(format!("({})", ors.join(" OR ")));
        for _ in columns {
            params.push(Value::Text(pattern.clone()));
        }
    }

    for (column, value) in [
        ("j.location", &filter.location),
        ("j.department", &filter.department),
        ("j.salary", &filter.salary),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            clauses.push(format!("fold({}) LIKE ? ESCAPE '\\'", column));
            params.push(Value::Text(contains_pattern(value)));
        }
    }

    for (column, value) in [
        ("j.employment_type", &filter.employment_type),
        ("j.experience_level", &filter.experience_level),
        ("j.company_size", &filter.company_size),
    ] {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            clauses.push(format!("{} = ?", column));
            params.push(Value::Text(value.to_string()));
        }
    }

    if let Some(featured) = filter.featured {
        clauses.push("j.featured = ?".into());
        params.push(Value::Integer(i64::from(featured)));
    }

    if !filter.skills.is_empty() {
        let marks = vec!["?"; filter.skills.len()].join(", ");
        clauses.push(format!(
            "EXISTS (SELECT 1 FROM json_each(j.skills) s WHERE s.value IN ({}))",
            marks
        ));
        params.extend(filter.skills.iter().cloned().map(Value::Text));
    }

    if clauses.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}

fn insert_questions(conn: &Connection, job_id: &str, questions: &[NewQuestion]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO job_questions
             (id, job_id, question, question_type, required, options, placeholder, sort_order)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for (index, q) in questions.iter().enumerate() {
        stmt.execute(rusqlite::params![
            new_id(),
            job_id,
            &q.question,
            q.question_type.as_str(),
            q.required,
            encode_list(&q.options)?,
            non_blank(&q.placeholder),
            (index + 1) as i64,
        ])?;
    }
    Ok(())
}

pub(crate) fn query_job(conn: &Connection, id: &str) -> Result<Option<Job>> {
    let sql = format!("SELECT {} FROM jobs j WHERE j.id = ?1", JOB_COLUMNS);
    conn.query_row(&sql, [id], map_job).optional()
}

fn query_job_detail(conn: &Connection, id: &str, active_only: bool) -> Result<Option<JobDetail>> {
    let sql = format!(
        "SELECT {}, a.name, a.email, {}
         FROM jobs j JOIN admins a ON a.id = j.admin_id
         WHERE j.id = ?1{}",
        JOB_COLUMNS,
        APPLICATION_COUNT,
        if active_only { " AND j.is_active = 1" } else { "" }
    );
    let Some(mut detail) = conn.query_row(&sql, [id], map_job_detail).optional()? else {
        return Ok(None);
    };
    detail.questions = query_questions(conn, id)?;
    Ok(Some(detail))
}

const QUESTION_SELECT: &str = "SELECT q.id, q.job_id, q.question, q.question_type, q.required, \
     q.options, q.placeholder, q.sort_order FROM job_questions q";

pub(crate) fn query_questions(conn: &Connection, job_id: &str) -> Result<Vec<JobQuestion>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE q.job_id = ?1 ORDER BY q.sort_order",
        QUESTION_SELECT
    ))?;
    let questions = stmt
        .query_map([job_id], map_question)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(questions)
}

fn map_question(row: &Row<'_>) -> rusqlite::Result<JobQuestion> {
    Ok(JobQuestion {
        id: uuid_at(row, 0)?,
        job_id: uuid_at(row, 1)?,
        question: row.get(2)?,
        question_type: enum_at(row, 3)?,
        required: row.get(4)?,
        options: list_at(row, 5)?,
        placeholder: row.get(6)?,
        order: row.get(7)?,
    })
}

pub(crate) fn map_job(row: &Row<'_>) -> rusqlite::Result<Job> {
    Ok(Job {
        id: uuid_at(row, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        requirements: row.get(3)?,
        department: row.get(4)?,
        location: row.get(5)?,
        salary: row.get(6)?,
        employment_type: row.get(7)?,
        experience_level: row.get(8)?,
        skills: list_at(row, 9)?,
        benefits: list_at(row, 10)?,
        company_name: row.get(11)?,
        company_logo: row.get(12)?,
        company_website: row.get(13)?,
        company_size: row.get(14)?,
        resume_required: row.get(15)?,
        featured: row.get(16)?,
        is_active: row.get(17)?,
        admin_id: uuid_at(row, 18)?,
        created_at: time_at(row, 19)?,
        updated_at: time_at(row, 20)?,
    })
}

/// Expects `JOB_COLUMNS, a.name, a.email, application count`. Questions are
/// filled in by the caller.
fn map_job_detail(row: &Row<'_>) -> rusqlite::Result<JobDetail> {
    Ok(JobDetail {
        job: map_job(row)?,
        admin: AdminSummary {
            name: row.get(JOB_COLUMN_COUNT)?,
            email: row.get(JOB_COLUMN_COUNT + 1)?,
        },
        questions: Vec::new(),
        application_count: row.get(JOB_COLUMN_COUNT + 2)?,
    })
}
