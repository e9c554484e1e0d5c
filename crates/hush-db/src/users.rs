use anyhow::Result;
use hush_types::models::Role;
use rusqlite::{Connection, OptionalExtension};
use tracing::warn;

use crate::Database;
use crate::models::UserRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created(i64),
    Conflict,
}

impl Database {
    /// Insert a new user. Every insert failure is reported as `Conflict`;
    /// the unique index on `username` is the usual cause.
    pub fn create_user(&self, username: &str, password_hash: &str, role: Role) -> Result<RegisterOutcome> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, password, role) VALUES (?1, ?2, ?3)",
                (username, password_hash, role.as_str()),
            );

            match inserted {
                Ok(_) => Ok(RegisterOutcome::Created(conn.last_insert_rowid())),
                Err(e) => {
                    warn!("Registration for {} rejected: {}", username, e);
                    Ok(RegisterOutcome::Conflict)
                }
            }
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn count_users(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?))
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {} FROM users WHERE username = ?1", UserRow::COLUMNS);
    let row = conn.query_row(&sql, [username], UserRow::from_row).optional()?;
    Ok(row)
}
