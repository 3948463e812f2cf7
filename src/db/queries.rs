use tracing::debug;

use super::models::{subreddit_key, Comment, Post};
use super::store::StoreError;
use super::Database;

// ========== Posts ==========

/// Get a post by id, without its comment tree.
///
/// # Errors
///
/// Returns `NotFound` when no record exists, `Corrupt` when the stored blob
/// fails to decode, or `Unavailable` when the store call fails.
pub async fn get_post(db: &Database, id: &str) -> Result<Post, StoreError> {
    let record = db
        .store()
        .get_post_record(id)
        .await?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

    decode_blob(&record.id, &record.data)
}

/// Get a post by id with its full comment tree populated.
///
/// # Errors
///
/// Fails if either the post or the comment fetch fails.
pub async fn get_post_with_comments(db: &Database, id: &str) -> Result<Post, StoreError> {
    let mut post = get_post(db, id).await?;
    post.comments = get_comments(db, id).await?;
    Ok(post)
}

/// List the most recent posts in a subreddit, newest first.
///
/// `name` may be given bare (`rust`) or in stored form (`r/rust`). When
/// `before` is set, only posts with a coarse timestamp strictly below it are
/// returned. At most one page of results; comments are left empty.
///
/// # Errors
///
/// Returns `Corrupt` when a stored blob fails to decode, or `Unavailable`
/// when the index query fails.
pub async fn list_subreddit_posts(
    db: &Database,
    name: &str,
    before: Option<u64>,
) -> Result<Vec<Post>, StoreError> {
    let subreddit = subreddit_key(name);
    let records = db.store().query_subreddit_posts(&subreddit, before).await?;

    debug!(subreddit = %subreddit, count = records.len(), "Fetched subreddit page");

    records
        .iter()
        .map(|record| decode_blob(&record.id, &record.data))
        .collect()
}

/// Resolve a pagination cursor (a previously returned post's id) to that
/// post's coarse timestamp for use as a `before` bound.
///
/// Cursors on the wire are opaque post ids, never raw timestamps; the sort
/// key is only ever derived server-side from the cursor post's record.
///
/// # Errors
///
/// Returns `NotFound` when the cursor id has no record, or `Unavailable`
/// when the store call fails.
pub async fn cursor_timestamp(db: &Database, cursor_id: &str) -> Result<u64, StoreError> {
    let record = db
        .store()
        .get_post_record(cursor_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(cursor_id.to_string()))?;

    Ok(record.timestamp)
}

// ========== Comments ==========

/// Get the comment forest for a post.
///
/// # Errors
///
/// Returns `NotFound` when no record exists, `Corrupt` when the stored
/// forest fails to decode, or `Unavailable` when the store call fails.
pub async fn get_comments(db: &Database, post_id: &str) -> Result<Vec<Comment>, StoreError> {
    let record = db
        .store()
        .get_comment_record(post_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(post_id.to_string()))?;

    decode_blob(&record.id, &record.data)
}

fn decode_blob<T: serde::de::DeserializeOwned>(id: &str, data: &str) -> Result<T, StoreError> {
    serde_json::from_str(data).map_err(|e| StoreError::Corrupt {
        id: id.to_string(),
        message: e.to_string(),
    })
}
