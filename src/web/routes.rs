use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Deserialize;

use super::AppState;
use crate::db::{cursor_timestamp, get_comments, get_post_with_comments, list_subreddit_posts};

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(hello))
        .route("/r/:subreddit", get(subreddit_posts))
        .route("/post/:id", get(post_detail))
        .route("/post/:id/comments", get(post_comments))
}

// Every failure category collapses to a plain 500 here; the not-found /
// corrupt / unavailable split stays internal.

async fn hello() -> &'static str {
    "Hello, World 👋!"
}

#[derive(Debug, Deserialize)]
struct ListParams {
    /// Pagination cursor: the id of the last post from the previous page.
    after: Option<String>,
}

async fn subreddit_posts(
    State(state): State<AppState>,
    Path(subreddit): Path<String>,
    Query(params): Query<ListParams>,
) -> Response {
    let before = match params.after.as_deref() {
        Some(cursor_id) => match cursor_timestamp(&state.db, cursor_id).await {
            Ok(timestamp) => Some(timestamp),
            Err(e) => {
                tracing::error!(cursor = %cursor_id, "Failed to resolve page cursor: {e}");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
            }
        },
        None => None,
    };

    match list_subreddit_posts(&state.db, &subreddit, before).await {
        Ok(posts) => Json(posts).into_response(),
        Err(e) => {
            tracing::error!(subreddit = %subreddit, "Failed to list subreddit posts: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

async fn post_detail(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match get_post_with_comments(&state.db, &id).await {
        Ok(post) => Json(post).into_response(),
        Err(e) => {
            tracing::error!(post_id = %id, "Failed to fetch post: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

async fn post_comments(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match get_comments(&state.db, &id).await {
        Ok(comments) => Json(comments).into_response(),
        Err(e) => {
            tracing::error!(post_id = %id, "Failed to fetch comments: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}
