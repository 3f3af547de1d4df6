use anyhow::Result;
use rusqlite::{Connection, Row};

use formhire_types::models::User;

use super::OptionalExt;
use crate::Database;
use crate::codec::{new_id, now, time_at, uuid_at};
use crate::models::{Principal, ProfileUpdate};

const USER_COLUMNS: &str =
    "id, email, name, image, bio, location, website, github, linkedin, phone, created_at";

impl Database {
    /// Find the user by email, creating it if absent. Returns the row and
    /// whether this call created it. Safe under concurrent first requests:
    /// the insert is a no-op when another request won the race.
    pub fn find_or_create_user(&self, principal: &Principal) -> Result<(User, bool)> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, email, name, image, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(email) DO NOTHING",
                rusqlite::params![
                    new_id(),
                    &principal.email,
                    &principal.name,
                    &principal.image,
                    now()
                ],
            )?;

            let user = query_user_by_email(conn, &principal.email)?
                .ok_or_else(|| anyhow::anyhow!("user {} vanished after upsert", principal.email))?;
            Ok((user, inserted == 1))
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    /// Apply profile edits. Returns `None` if no user has this email.
    pub fn update_profile(&self, email: &str, update: &ProfileUpdate) -> Result<Option<User>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let Some(mut user) = query_user_by_email(&tx, email)? else {
                return Ok(None);
            };

            if let Some(name) = &update.name {
                user.name = name.trim().to_string();
            }
            merge_optional(&mut user.bio, &update.bio);
            merge_optional(&mut user.location, &update.location);
            merge_optional(&mut user.website, &update.website);
            merge_optional(&mut user.github, &update.github);
            merge_optional(&mut user.linkedin, &update.linkedin);
            merge_optional(&mut user.phone, &update.phone);

            tx.execute(
                "UPDATE users
                 SET name = ?2, bio = ?3, location = ?4, website = ?5,
                     github = ?6, linkedin = ?7, phone = ?8
                 WHERE id = ?1",
                rusqlite::params![
                    user.id.to_string(),
                    &user.name,
                    &user.bio,
                    &user.location,
                    &user.website,
                    &user.github,
                    &user.linkedin,
                    &user.phone,
                ],
            )?;
            tx.commit()?;

            Ok(Some(user))
        })
    }
}

fn merge_optional(slot: &mut Option<String>, edit: &Option<String>) {
    if let Some(value) = edit {
        let value = value.trim();
        *slot = (!value.is_empty()).then(|| value.to_string());
    }
}

pub(crate) fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS);
    conn.query_row(&sql, [email], map_user).optional()
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_at(row, 0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        image: row.get(3)?,
        bio: row.get(4)?,
        location: row.get(5)?,
        website: row.get(6)?,
        github: row.get(7)?,
        linkedin: row.get(8)?,
        phone: row.get(9)?,
        created_at: time_at(row, 10)?,
    })
}
