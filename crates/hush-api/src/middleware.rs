use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::debug;

use hush_types::api::Claims;
use hush_types::models::Capability;

use crate::auth::AppState;
use crate::error::ApiError;

pub const SESSION_COOKIE: &str = "hush_session";

/// Per-request authentication context. `None` means the request carried no
/// valid session cookie.
#[derive(Debug, Clone, Default)]
pub struct Session(pub Option<Claims>);

/// Decode the session cookie, if any, and attach the result to the request.
/// A missing, expired or tampered cookie is not an error here; the route's
/// extractor decides what an anonymous request gets.
pub async fn session_context(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let claims = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| decode_session(&state.session_secret, cookie.value()));

    req.extensions_mut().insert(Session(claims));
    next.run(req).await
}

pub fn decode_session(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| debug!("Rejected session token: {}", e))
    .ok()
    .map(|data| data.claims)
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Session>().cloned().unwrap_or_default())
    }
}

/// A logged-in user. Anonymous requests are redirected to the login page.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Session>() {
            Some(Session(Some(claims))) => Ok(CurrentUser(claims.clone())),
            _ => Err(Redirect::to("/login")),
        }
    }
}

/// A session allowed to moderate. Everyone else, anonymous or not, gets 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Session>() {
            Some(Session(Some(claims))) => authorize(claims, Capability::Moderate).map(|_| AdminUser(claims.clone())),
            _ => Err(ApiError::Forbidden),
        }
    }
}

pub fn authorize(claims: &Claims, capability: Capability) -> Result<(), ApiError> {
    if claims.role.can(capability) {
        Ok(())
    } else {
        debug!("{} lacks {:?}", claims.username, capability);
        Err(ApiError::Forbidden)
    }
}
