use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL UNIQUE,
                name        TEXT NOT NULL DEFAULT '',
                image       TEXT,
                bio         TEXT,
                location    TEXT,
                website     TEXT,
                github      TEXT,
                linkedin    TEXT,
                phone       TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE admins (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL UNIQUE,
                name        TEXT NOT NULL,
                image       TEXT,
                is_active   INTEGER NOT NULL DEFAULT 1,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE jobs (
                id                TEXT PRIMARY KEY,
                title             TEXT NOT NULL,
                description       TEXT NOT NULL,
                requirements      TEXT NOT NULL,
                department        TEXT NOT NULL,
                location          TEXT NOT NULL,
                salary            TEXT,
                employment_type   TEXT NOT NULL,
                experience_level  TEXT NOT NULL,
                skills            TEXT NOT NULL DEFAULT '[]',
                benefits          TEXT NOT NULL DEFAULT '[]',
                company_name      TEXT NOT NULL,
                company_logo      TEXT,
                company_website   TEXT,
                company_size      TEXT,
                resume_required   INTEGER NOT NULL DEFAULT 1,
                featured          INTEGER NOT NULL DEFAULT 0,
                is_active         INTEGER NOT NULL DEFAULT 1,
                admin_id          TEXT NOT NULL REFERENCES admins(id),
                created_at        TEXT NOT NULL,
                updated_at        TEXT NOT NULL
            );

            CREATE INDEX idx_jobs_active_created ON jobs(is_active, created_at);

            CREATE TABLE job_questions (
                id            TEXT PRIMARY KEY,
                job_id        TEXT NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
                question      TEXT NOT NULL CHECK (length(trim(question)) > 0),
                question_type TEXT NOT NULL,
                required      INTEGER NOT NULL DEFAULT 0,
                options       TEXT NOT NULL DEFAULT '[]',
                placeholder   TEXT,
                sort_order    INTEGER NOT NULL
            );

            CREATE INDEX idx_job_questions_job ON job_questions(job_id, sort_order);

            CREATE TABLE applications (
                id                      TEXT PRIMARY KEY,
                job_id                  TEXT NOT NULL REFERENCES jobs(id),
                user_id                 TEXT NOT NULL REFERENCES users(id),
                applicant_name          TEXT NOT NULL,
                applicant_email         TEXT NOT NULL,
                status                  TEXT NOT NULL DEFAULT 'PENDING',
                applied_at              TEXT NOT NULL,
                resume_url              TEXT,
                phone_number            TEXT NOT NULL,
                linkedin_url            TEXT,
                portfolio_url           TEXT,
                why_interested          TEXT NOT NULL,
                relevant_experience     TEXT NOT NULL,
                expected_salary         TEXT,
                availability_start      TEXT,
                current_employment      TEXT,
                relocation_willingness  TEXT,
                work_authorization      TEXT NOT NULL,
                cover_letter            TEXT,
                additional_comments     TEXT,
                reference_source        TEXT,
                status_message          TEXT,
                status_updated_at       TEXT,
                UNIQUE(job_id, user_id)
            );

            CREATE INDEX idx_applications_job ON applications(job_id);
            CREATE INDEX idx_applications_applied ON applications(applied_at);

            -- No foreign key on question_id: job edits replace the question
            -- set wholesale and answers must outlive it.
            CREATE TABLE application_answers (
                id              TEXT PRIMARY KEY,
                application_id  TEXT NOT NULL REFERENCES applications(id) ON DELETE CASCADE,
                question_id     TEXT NOT NULL,
                question        TEXT NOT NULL,
                question_type   TEXT NOT NULL,
                position        INTEGER NOT NULL,
                answer          TEXT NOT NULL
            );

            CREATE INDEX idx_application_answers_app ON application_answers(application_id);

            CREATE TABLE application_logs (
                id              TEXT PRIMARY KEY,
                application_id  TEXT NOT NULL REFERENCES applications(id) ON DELETE CASCADE,
                action          TEXT NOT NULL,
                notes           TEXT,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_application_logs_app ON application_logs(application_id);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
