//! Database row types. These map directly to SQLite rows.
//! Distinct from hush-types API models to keep the DB layer independent.

use hush_types::models::{Comment, Notification, Post, Role};
use rusqlite::Row;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role: String,
    pub created_at: String,
}

impl UserRow {
    pub(crate) const COLUMNS: &'static str = "id, username, password, role, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            password: row.get(2)?,
            role: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    /// Unrecognised role strings fall back to the least privileged role.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct PostRow {
    pub id: i64,
    pub message: String,
    pub emoji: String,
    pub grade: Option<String>,
    pub username: String,
    pub likes: i64,
    pub created_at: String,
}

impl PostRow {
    pub(crate) const COLUMNS: &'static str = "id, message, emoji, grade, username, likes, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            message: row.get(1)?,
            emoji: row.get(2)?,
            grade: row.get(3)?,
            username: row.get(4)?,
            likes: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub username: String,
    pub comment: String,
    pub created_at: String,
}

impl CommentRow {
    pub(crate) const COLUMNS: &'static str = "id, post_id, username, comment, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            post_id: row.get(1)?,
            username: row.get(2)?,
            comment: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NotificationRow {
    pub id: i64,
    pub username: String,
    pub text: String,
    pub seen: bool,
    pub created_at: String,
}

impl NotificationRow {
    pub(crate) const COLUMNS: &'static str = "id, username, text, seen, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            text: row.get(2)?,
            seen: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            message: row.message,
            emoji: row.emoji,
            grade: row.grade,
            username: row.username,
            likes: row.likes,
            created_at: row.created_at,
        }
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            post_id: row.post_id,
            username: row.username,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id,
            username: row.username,
            text: row.text,
            seen: row.seen,
            created_at: row.created_at,
        }
    }
}
