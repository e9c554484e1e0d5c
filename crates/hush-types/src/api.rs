use serde::{Deserialize, Serialize};

use crate::models::{Comment, Notification, Post, Role};

// -- Session Claims --

/// Claims carried by the signed session cookie. Issued at login and trusted
/// as-is until they expire or the user logs out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

/// Missing form fields deserialize as empty strings so handlers can treat
/// them the same way as blank input.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Describes an input form for clients that render their own markup.
#[derive(Debug, Serialize)]
pub struct FormDescriptor {
    pub form: &'static str,
    pub action: &'static str,
    pub fields: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logged_in_as: Option<String>,
}

// -- Feed --

#[derive(Debug, Deserialize)]
pub struct NewPostForm {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub grade: String,
}

#[derive(Debug, Deserialize)]
pub struct NewCommentForm {
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub username: String,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub unseen_notifications: i64,
}

// -- Profile --

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub username: String,
    pub posts: Vec<Post>,
    pub notifications: Vec<Notification>,
}

// -- Admin --

#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
