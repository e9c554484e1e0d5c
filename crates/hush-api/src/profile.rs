use axum::{Json, extract::State};

use hush_types::api::ProfileResponse;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

/// Viewing the profile marks every notification as seen. The response still
/// shows the state from before the update.
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let posts = state.db.list_posts_by_user(&claims.username)?;
    let notifications = state.db.list_notifications(&claims.username)?;
    state.db.mark_all_seen(&claims.username)?;

    Ok(Json(ProfileResponse {
        username: claims.username,
        posts: posts.into_iter().map(Into::into).collect(),
        notifications: notifications.into_iter().map(Into::into).collect(),
    }))
}
