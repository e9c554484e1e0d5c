use axum::{
    Json, Router, middleware,
    response::Redirect,
    routing::{get, post},
};

use hush_types::api::HealthResponse;

use crate::auth::{self, AppState};
use crate::middleware::session_context;
use crate::{admin, feed, profile};

/// Every route sits behind the session middleware; each handler's
/// extractors decide whether an anonymous request may proceed.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/feed") }))
        .route("/health", get(health))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/feed", get(feed::get_feed).post(feed::create_post))
        .route("/comment/{post_id}", post(feed::create_comment))
        .route("/like/{post_id}", get(feed::like_post))
        .route("/profile", get(profile::get_profile))
        .route("/admin", get(admin::panel))
        .route("/admin/delete_post/{id}", get(admin::delete_post))
        .route("/admin/delete_comment/{id}", get(admin::delete_comment))
        .layer(middleware::from_fn_with_state(state.clone(), session_context))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
