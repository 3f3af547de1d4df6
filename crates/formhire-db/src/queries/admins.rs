use anyhow::Result;
use rusqlite::{Connection, Row};

use formhire_types::models::Admin;

use super::OptionalExt;
use crate::Database;
use crate::codec::{new_id, now, time_at, uuid_at};
use crate::models::Principal;

impl Database {
    /// Find the admin by email or create an active one. Same race-safe
    /// upsert shape as `find_or_create_user`.
    pub fn find_or_create_admin(&self, principal: &Principal) -> Result<(Admin, bool)> {
        self.with_conn(|conn| {
            let name = if principal.name.trim().is_empty() {
                "Admin"
            } else {
                principal.name.trim()
            };

            let inserted = conn.execute(
                "INSERT INTO admins (id, email, name, image, is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, 1, ?5)
                 ON CONFLICT(email) DO NOTHING",
                rusqlite::params![new_id(), &principal.email, name, &principal.image, now()],
            )?;

            let admin = query_admin_by_email(conn, &principal.email)?
                .ok_or_else(|| anyhow::anyhow!("admin {} vanished after upsert", principal.email))?;
            Ok((admin, inserted == 1))
        })
    }

    pub fn get_admin_by_email(&self, email: &str) -> Result<Option<Admin>> {
        self.with_conn(|conn| query_admin_by_email(conn, email))
    }

    /// Activate or deactivate an admin. Returns false if no such admin.
    pub fn set_admin_active(&self, email: &str, active: bool) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE admins SET is_active = ?2 WHERE email = ?1",
                rusqlite::params![email, active],
            )?;
            Ok(changed > 0)
        })
    }
}

fn query_admin_by_email(conn: &Connection, email: &str) -> Result<Option<Admin>> {
    conn.query_row(
        "SELECT id, email, name, image, is_active, created_at FROM admins WHERE email = ?1",
        [email],
        map_admin,
    )
    .optional()
}

fn map_admin(row: &Row<'_>) -> rusqlite::Result<Admin> {
    Ok(Admin {
        id: uuid_at(row, 0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        image: row.get(3)?,
        is_active: row.get(4)?,
        created_at: time_at(row, 5)?,
    })
}
