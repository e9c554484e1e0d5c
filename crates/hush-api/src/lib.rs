pub mod admin;
pub mod auth;
pub mod error;
pub mod feed;
pub mod middleware;
pub mod profile;
pub mod router;
