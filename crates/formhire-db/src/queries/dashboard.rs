use anyhow::Result;

use formhire_types::api::{DashboardStats, RecentApplication};

use crate::Database;
use crate::codec::{enum_at, time_at, uuid_at};

impl Database {
    /// Headline counts plus the `recent_limit` most recent applications.
    pub fn dashboard_stats(&self, recent_limit: u32) -> Result<DashboardStats> {
        self.with_conn(|conn| {
            let (total_jobs, active_jobs, total_applications, pending_applications, total_users) =
                conn.query_row(
                    "SELECT
                         (SELECT COUNT(*) FROM jobs),
                         (SELECT COUNT(*) FROM jobs WHERE is_active = 1),
                         (SELECT COUNT(*) FROM applications),
                         (SELECT COUNT(*) FROM applications WHERE status = 'PENDING'),
                         (SELECT COUNT(*) FROM users)",
                    [],
                    |row| {
                        Ok((
                            row.get(0)?,
                            row.get(1)?,
                            row.get(2)?,
                            row.get(3)?,
                            row.get(4)?,
                        ))
                    },
                )?;

            let mut stmt = conn.prepare(
                "SELECT ap.id, ap.applicant_name, ap.applicant_email, j.title, j.company_name,
                        ap.applied_at, ap.status
                 FROM applications ap JOIN jobs j ON j.id = ap.job_id
                 ORDER BY ap.applied_at DESC, ap.id DESC
                 LIMIT ?1",
            )?;
            let recent_applications = stmt
                .query_map([i64::from(recent_limit)], |row| {
                    Ok(RecentApplication {
                        id: uuid_at(row, 0)?,
                        applicant_name: row.get(1)?,
                        applicant_email: row.get(2)?,
                        job_title: row.get(3)?,
                        company_name: row.get(4)?,
                        applied_at: time_at(row, 5)?,
                        status: enum_at(row, 6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(DashboardStats {
                total_jobs,
                active_jobs,
                total_applications,
                pending_applications,
                total_users,
                recent_applications,
            })
        })
    }
}
