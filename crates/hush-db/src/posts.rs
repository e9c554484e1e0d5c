use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

use crate::Database;
use crate::models::PostRow;

impl Database {
    /// Returns `None` without touching the table when message or emoji is
    /// blank. An empty grade is stored as NULL.
    pub fn create_post(&self, author: &str, message: &str, emoji: &str, grade: Option<&str>) -> Result<Option<PostRow>> {
        if message.is_empty() || emoji.is_empty() {
            return Ok(None);
        }
        let grade = grade.filter(|g| !g.is_empty());

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (message, emoji, grade, username, likes) VALUES (?1, ?2, ?3, ?4, 0)",
                (message, emoji, grade, author),
            )?;
            query_post(conn, conn.last_insert_rowid())
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| query_post(conn, id))
    }

    /// Every post, newest first.
    pub fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(query_all_posts)
    }

    pub fn list_posts_by_user(&self, username: &str) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM posts WHERE username = ?1 ORDER BY id DESC",
                PostRow::COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([username], PostRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Increment the like counter. Not idempotent; returns false when no
    /// post has that id.
    pub fn like_post(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("UPDATE posts SET likes = likes + 1 WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn query_post(conn: &Connection, id: i64) -> Result<Option<PostRow>> {
    let sql = format!("SELECT {} FROM posts WHERE id = ?1", PostRow::COLUMNS);
    let row = conn.query_row(&sql, [id], PostRow::from_row).optional()?;
    Ok(row)
}

pub(crate) fn query_all_posts(conn: &Connection) -> Result<Vec<PostRow>> {
    let sql = format!("SELECT {} FROM posts ORDER BY id DESC", PostRow::COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], PostRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_post_starts_with_zero_likes() {
        let db = Database::open_in_memory().unwrap();
        let post = db.create_post("alice", "hello", "🙂", None).unwrap().unwrap();

        assert_eq!(post.likes, 0);
        assert_eq!(post.username, "alice");
        assert_eq!(post.grade, None);
    }

    #[test]
    fn blank_message_or_emoji_is_ignored() {
        let db = Database::open_in_memory().unwrap();

        assert!(db.create_post("alice", "", "🙂", None).unwrap().is_none());
        assert!(db.create_post("alice", "hello", "", None).unwrap().is_none());
        assert!(db.list_posts().unwrap().is_empty());
    }

    #[test]
    fn posts_are_listed_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let p1 = db.create_post("a", "one", "1", None).unwrap().unwrap();
        let p2 = db.create_post("b", "two", "2", Some("10B")).unwrap().unwrap();
        let p3 = db.create_post("a", "three", "3", Some("")).unwrap().unwrap();

        let ids: Vec<i64> = db.list_posts().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![p3.id, p2.id, p1.id]);

        let mine: Vec<i64> = db.list_posts_by_user("a").unwrap().iter().map(|p| p.id).collect();
        assert_eq!(mine, vec![p3.id, p1.id]);

        assert_eq!(db.get_post(p2.id).unwrap().unwrap().grade.as_deref(), Some("10B"));
        assert_eq!(db.get_post(p3.id).unwrap().unwrap().grade, None);
    }

    #[test]
    fn likes_accumulate_and_missing_posts_are_a_no_op() {
        let db = Database::open_in_memory().unwrap();
        let post = db.create_post("alice", "hello", "🙂", None).unwrap().unwrap();
        let other = db.create_post("bob", "hey", "😀", None).unwrap().unwrap();

        for _ in 0..5 {
            assert!(db.like_post(post.id).unwrap());
        }
        assert!(!db.like_post(9999).unwrap());

        assert_eq!(db.get_post(post.id).unwrap().unwrap().likes, 5);
        assert_eq!(db.get_post(other.id).unwrap().unwrap().likes, 0);
    }
}
