//! Ordered schema migrations.
//!
//! Each migration runs once, tracked by `PRAGMA user_version`. The additive
//! column migrations also check the live table structure first, so a board
//! database created before versioning existed gains the columns it lacks
//! instead of failing on a duplicate column.

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    up: fn(&Connection) -> Result<()>,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        up: initial_schema,
    },
    Migration {
        version: 2,
        name: "legacy_columns",
        up: legacy_columns,
    },
    Migration {
        version: 3,
        name: "user_roles",
        up: user_roles,
    },
];

pub fn current_version(conn: &Connection) -> Result<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

pub fn run(conn: &Connection) -> Result<()> {
    let current = current_version(conn)?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        info!("Applying migration v{} ({})", migration.version, migration.name);
        (migration.up)(conn)
            .with_context(|| format!("migration v{} ({}) failed", migration.version, migration.name))?;
        conn.pragma_update(None, "user_version", migration.version)?;
    }

    info!("Database migrations complete");
    Ok(())
}

pub fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        (table, column),
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn add_column_if_missing(conn: &Connection, table: &str, column: &str, decl: &str) -> Result<()> {
    if column_exists(conn, table, column)? {
        return Ok(());
    }
    info!("Adding column {}.{}", table, column);
    conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} {decl};"))?;
    Ok(())
}

fn initial_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS posts (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            message     TEXT NOT NULL,
            emoji       TEXT NOT NULL,
            grade       TEXT,
            username    TEXT NOT NULL,
            likes       INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS comments (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id     INTEGER NOT NULL,
            username    TEXT NOT NULL,
            comment     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_post
            ON comments(post_id);

        CREATE TABLE IF NOT EXISTS notifications (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL,
            text        TEXT NOT NULL,
            seen        INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_user
            ON notifications(username, seen);
        ",
    )?;
    Ok(())
}

/// Older boards created `posts` with only a message column and grew the
/// rest over time, and never stored timestamps. A fresh database already has
/// every column here, so this is a no-op for it.
fn legacy_columns(conn: &Connection) -> Result<()> {
    add_column_if_missing(conn, "posts", "emoji", "TEXT NOT NULL DEFAULT ''")?;
    add_column_if_missing(conn, "posts", "grade", "TEXT")?;
    add_column_if_missing(conn, "posts", "likes", "INTEGER NOT NULL DEFAULT 0")?;
    add_column_if_missing(conn, "posts", "username", "TEXT NOT NULL DEFAULT ''")?;

    // SQLite refuses a non-constant default on ADD COLUMN.
    for table in ["users", "posts", "comments", "notifications"] {
        add_column_if_missing(conn, table, "created_at", "TEXT NOT NULL DEFAULT ''")?;
    }
    Ok(())
}

fn user_roles(conn: &Connection) -> Result<()> {
    add_column_if_missing(conn, "users", "role", "TEXT NOT NULL DEFAULT 'user'")
}
