use std::sync::Arc;

use anyhow::anyhow;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};

use hush_db::models::UserRow;
use hush_db::{Database, RegisterOutcome};
use hush_types::api::{Claims, FormDescriptor, LoginForm, RegisterForm};
use hush_types::models::Role;

use crate::error::ApiError;
use crate::middleware::{SESSION_COOKIE, Session};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session_secret: String,
    /// Username that is given the admin role when it registers.
    pub admin_username: String,
    pub session_ttl_days: i64,
}

const CREDENTIAL_FIELDS: &[&str] = &["username", "password"];

pub async fn register_form() -> Json<FormDescriptor> {
    Json(FormDescriptor {
        form: "register",
        action: "/register",
        fields: CREDENTIAL_FIELDS,
        logged_in_as: None,
    })
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, ApiError> {
    if form.username.is_empty() || form.password.is_empty() {
        return Ok(Redirect::to("/register"));
    }

    let password_hash = hash_password(&form.password)?;
    let role = if form.username == state.admin_username {
        Role::Admin
    } else {
        Role::User
    };

    match state.db.create_user(&form.username, &password_hash, role)? {
        RegisterOutcome::Created(id) => {
            info!("Registered user {} ({}) as {}", form.username, id, role);
            Ok(Redirect::to("/login"))
        }
        RegisterOutcome::Conflict => Err(ApiError::Conflict),
    }
}

pub async fn login_form(session: Session) -> Json<FormDescriptor> {
    Json(FormDescriptor {
        form: "login",
        action: "/login",
        fields: CREDENTIAL_FIELDS,
        logged_in_as: session.0.map(|claims| claims.username),
    })
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let user = authenticate(&state.db, &form.username, &form.password)?
        .ok_or(ApiError::InvalidCredentials)?;

    let token = create_token(
        &state.session_secret,
        user.id,
        &user.username,
        user.role(),
        state.session_ttl_days,
    )?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    info!("{} logged in", user.username);
    Ok((jar.add(cookie), Redirect::to("/feed")).into_response())
}

pub async fn logout(jar: CookieJar, session: Session) -> Response {
    if let Some(claims) = session.0 {
        info!("{} logged out", claims.username);
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/login")).into_response()
}

/// Look up `username` and check `password` against the stored hash.
pub fn authenticate(db: &Database, username: &str, password: &str) -> anyhow::Result<Option<UserRow>> {
    if username.is_empty() || password.is_empty() {
        return Ok(None);
    }

    let Some(user) = db.get_user_by_username(username)? else {
        return Ok(None);
    };

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| anyhow!("stored password for {} is not a valid hash: {}", username, e))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(Some(user)),
        Err(_) => {
            warn!("Failed login for {}", username);
            Ok(None)
        }
    }
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

/// A negative `ttl_days` yields an already expired token.
pub fn create_token(secret: &str, user_id: i64, username: &str, role: Role, ttl_days: i64) -> anyhow::Result<String> {
    let expires_at = chrono::Duration::try_days(ttl_days)
        .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| anyhow!("session lifetime of {} days is out of range", ttl_days))?;

    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role,
        exp: expires_at.timestamp().max(0) as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
