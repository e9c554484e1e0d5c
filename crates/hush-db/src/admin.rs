use anyhow::Result;
use tracing::info;

use crate::Database;
use crate::comments::query_all_comments;
use crate::models::{CommentRow, PostRow};
use crate::posts::query_all_posts;

impl Database {
    /// Unfiltered dump for moderation, newest first on both sides.
    pub fn list_all(&self) -> Result<(Vec<PostRow>, Vec<CommentRow>)> {
        self.with_conn(|conn| Ok((query_all_posts(conn)?, query_all_comments(conn, "DESC")?)))
    }

    /// Delete a post together with every comment pointing at it.
    pub fn delete_post(&self, id: i64) -> Result<bool> {
        self.with_tx(|tx| {
            let comments = tx.execute("DELETE FROM comments WHERE post_id = ?1", [id])?;
            let posts = tx.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            info!("Deleted post {} ({} comments)", id, comments);
            Ok(posts > 0)
        })
    }

    pub fn delete_comment(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM comments WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }
}
