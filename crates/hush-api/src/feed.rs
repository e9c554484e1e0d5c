use axum::{
    Form, Json,
    extract::{Path, State},
    response::Redirect,
};
use tracing::{debug, error};

use hush_types::api::{FeedResponse, NewCommentForm, NewPostForm};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

pub async fn get_feed(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<Json<FeedResponse>, ApiError> {
    let posts = state.db.list_posts()?;
    let comments = state.db.list_comments()?;
    let unseen_notifications = state.db.unseen_count(&claims.username)?;

    Ok(Json(FeedResponse {
        username: claims.username,
        posts: posts.into_iter().map(Into::into).collect(),
        comments: comments.into_iter().map(Into::into).collect(),
        unseen_notifications,
    }))
}

/// Always answers with a redirect back to the feed so a browser refresh does
/// not resubmit the form.
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Form(form): Form<NewPostForm>,
) -> Result<Redirect, ApiError> {
    match state
        .db
        .create_post(&claims.username, &form.message, &form.emoji, Some(form.grade.as_str()))?
    {
        Some(post) => debug!("{} created post {}", claims.username, post.id),
        None => debug!("Ignored incomplete post from {}", claims.username),
    }

    Ok(Redirect::to("/feed"))
}

pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(post_id): Path<i64>,
    Form(form): Form<NewCommentForm>,
) -> Result<Redirect, ApiError> {
    // Comment insert and owner notification share a transaction; keep the
    // blocking work off the async runtime.
    let st = state.clone();
    let author = claims.username;
    let created = tokio::task::spawn_blocking(move || st.db.create_comment(post_id, &author, &form.comment))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            anyhow::anyhow!("comment task failed: {}", e)
        })??;

    if let Some(comment) = created {
        debug!("Comment {} added to post {}", comment.id, post_id);
    }

    Ok(Redirect::to("/feed"))
}

/// Open to anonymous visitors; every call counts.
pub async fn like_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Redirect, ApiError> {
    if !state.db.like_post(post_id)? {
        debug!("Like for missing post {}", post_id);
    }
    Ok(Redirect::to("/feed"))
}
