use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::Database;
use crate::models::CommentRow;
use crate::notifications::{comment_notice, insert_notification};

impl Database {
    /// Insert a comment and notify the post's owner when someone else wrote
    /// it. The post id is not checked: a comment on a missing post is still
    /// stored, it just notifies nobody.
    pub fn create_comment(&self, post_id: i64, author: &str, text: &str) -> Result<Option<CommentRow>> {
        if text.is_empty() {
            return Ok(None);
        }

        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO comments (post_id, username, comment) VALUES (?1, ?2, ?3)",
                (post_id, author, text),
            )?;
            let comment_id = tx.last_insert_rowid();

            match query_post_owner(tx, post_id)? {
                Some(owner) if owner != author => {
                    insert_notification(tx, &owner, &comment_notice(author))?;
                    debug!("Notified {} of comment {} on post {}", owner, comment_id, post_id);
                }
                Some(_) => {}
                None => debug!("Comment {} references missing post {}", comment_id, post_id),
            }

            query_comment(tx, comment_id)
        })
    }

    pub fn post_owner(&self, post_id: i64) -> Result<Option<String>> {
        self.with_conn(|conn| query_post_owner(conn, post_id))
    }

    /// Every comment on the board, oldest first.
    pub fn list_comments(&self) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| query_all_comments(conn, "ASC"))
    }
}

fn query_post_owner(conn: &Connection, post_id: i64) -> Result<Option<String>> {
    let owner = conn
        .query_row("SELECT username FROM posts WHERE id = ?1", [post_id], |row| row.get(0))
        .optional()?;
    Ok(owner)
}

fn query_comment(conn: &Connection, id: i64) -> Result<Option<CommentRow>> {
    let sql = format!("SELECT {} FROM comments WHERE id = ?1", CommentRow::COLUMNS);
    let row = conn.query_row(&sql, [id], CommentRow::from_row).optional()?;
    Ok(row)
}

/// `order` is interpolated into the SQL and must be "ASC" or "DESC".
pub(crate) fn query_all_comments(conn: &Connection, order: &'static str) -> Result<Vec<CommentRow>> {
    let sql = format!("SELECT {} FROM comments ORDER BY id {}", CommentRow::COLUMNS, order);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], CommentRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
