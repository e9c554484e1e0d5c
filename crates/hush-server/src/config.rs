//! Server configuration loaded from environment variables.
//!
//! Every setting has a default so the board starts with zero configuration
//! for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

/// Upper bound for `HUSH_SESSION_TTL_DAYS` (ten years).
pub const MAX_SESSION_TTL_DAYS: i64 = 3650;

/// Placeholder session secrets that must not reach production.
pub const PLACEHOLDER_SECRETS: &[&str] = &["dev-secret-change-me", "change-me-to-a-random-string"];

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Env: `HUSH_HOST` / `HUSH_PORT`. Default: `0.0.0.0:3000`.
    pub addr: SocketAddr,

    /// SQLite file holding users, posts, comments and notifications.
    /// Env: `HUSH_DB_PATH`. Default: `hush.db`.
    pub db_path: PathBuf,

    /// HMAC key for session cookies.
    /// Env: `HUSH_SESSION_SECRET`.
    pub session_secret: String,

    /// Username granted the admin role on registration.
    /// Env: `HUSH_ADMIN_USERNAME`. Default: `admin`.
    pub admin_username: String,

    /// Env: `HUSH_SESSION_TTL_DAYS`. Default: 30, at most 3650.
    pub session_ttl_days: i64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HUSH_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("HUSH_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("HUSH_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .context("HUSH_HOST must be an IP address")?;

        let db_path = std::env::var("HUSH_DB_PATH")
            .unwrap_or_else(|_| "hush.db".into())
            .into();
        let session_secret =
            std::env::var("HUSH_SESSION_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
        let admin_username = std::env::var("HUSH_ADMIN_USERNAME").unwrap_or_else(|_| "admin".into());

        let session_ttl_days = parse_session_ttl_days(std::env::var("HUSH_SESSION_TTL_DAYS").ok().as_deref());

        Ok(Self {
            addr,
            db_path,
            session_secret,
            admin_username,
            session_ttl_days,
        })
    }

    pub fn uses_placeholder_secret(&self) -> bool {
        self.session_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&self.session_secret.as_str())
    }
}

/// Anything outside `1..=MAX_SESSION_TTL_DAYS` falls back to the default.
fn parse_session_ttl_days(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return DEFAULT_SESSION_TTL_DAYS;
    };
    match raw.parse::<i64>() {
        Ok(days) if (1..=MAX_SESSION_TTL_DAYS).contains(&days) => days,
        _ => {
            tracing::warn!(
                "HUSH_SESSION_TTL_DAYS={} is not between 1 and {}, using {}",
                raw,
                MAX_SESSION_TTL_DAYS,
                DEFAULT_SESSION_TTL_DAYS
            );
            DEFAULT_SESSION_TTL_DAYS
        }
    }
}
