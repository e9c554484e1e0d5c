use anyhow::Result;
use rusqlite::Connection;

use crate::Database;
use crate::models::NotificationRow;

pub fn comment_notice(author: &str) -> String {
    format!("{} commented on your post", author)
}

impl Database {
    pub fn notify(&self, recipient: &str, text: &str) -> Result<()> {
        self.with_conn(|conn| insert_notification(conn, recipient, text))
    }

    pub fn unseen_count(&self, username: &str) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM notifications WHERE username = ?1 AND seen = 0",
                [username],
                |row| row.get(0),
            )?)
        })
    }

    /// Newest first, seen and unseen alike.
    pub fn list_notifications(&self, username: &str) -> Result<Vec<NotificationRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM notifications WHERE username = ?1 ORDER BY id DESC",
                NotificationRow::COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([username], NotificationRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn mark_all_seen(&self, username: &str) -> Result<usize> {
        self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE notifications SET seen = 1 WHERE username = ?1 AND seen = 0",
                [username],
            )?)
        })
    }
}

pub(crate) fn insert_notification(conn: &Connection, recipient: &str, text: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO notifications (username, text, seen) VALUES (?1, ?2, 0)",
        (recipient, text),
    )?;
    Ok(())
}
