use axum::{
    Json,
    extract::{Path, State},
    response::Redirect,
};
use tracing::info;

use hush_types::api::AdminResponse;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::AdminUser;

pub async fn panel(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<AdminResponse>, ApiError> {
    let (posts, comments) = state.db.list_all()?;

    Ok(Json(AdminResponse {
        posts: posts.into_iter().map(Into::into).collect(),
        comments: comments.into_iter().map(Into::into).collect(),
    }))
}

pub async fn delete_post(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    if state.db.delete_post(id)? {
        info!("{} deleted post {}", admin.username, id);
    }
    Ok(Redirect::to("/admin"))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    if state.db.delete_comment(id)? {
        info!("{} deleted comment {}", admin.username, id);
    }
    Ok(Redirect::to("/admin"))
}
