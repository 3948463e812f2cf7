//! Splits inbound post-plus-comments payloads into record pairs and
//! persists them.

pub mod consumer;

use thiserror::Error;
use tracing::debug;

use crate::db::{coarse_timestamp, CommentRecord, Database, Post, PostRecord, StoreError};

/// Failure categories for the ingestion path.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The inbound message body is not a valid post document.
    #[error("failed to decode post message: {0}")]
    Decode(#[source] serde_json::Error),

    /// A record blob could not be serialized.
    #[error("failed to encode record data: {0}")]
    Encode(#[source] serde_json::Error),

    /// A store write failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Decode one queue message body into a post document.
///
/// # Errors
///
/// Returns `Decode` when the body is not valid post JSON.
pub fn parse_post(body: &str) -> Result<Post, IngestError> {
    serde_json::from_str(body).map_err(IngestError::Decode)
}

/// Persist a post as a `PostRecord`/`CommentRecord` pair.
///
/// The comment forest is detached from the post before serialization, so the
/// stored post blob never carries comments. Both writes are unconditional
/// upserts; reprocessing the same message overwrites the same records. The
/// comment record is written first, and a post-write failure after a
/// successful comment write leaves the orphaned comment record in place.
///
/// # Errors
///
/// Returns `Encode` when blob serialization fails, or `Store` when either
/// write fails. A comment-write failure aborts before the post write.
pub async fn store_post(db: &Database, mut post: Post) -> Result<(), IngestError> {
    let comments = std::mem::take(&mut post.comments);

    let post_data = serde_json::to_string(&post).map_err(IngestError::Encode)?;
    let comment_data = serde_json::to_string(&comments).map_err(IngestError::Encode)?;

    let post_record = PostRecord {
        id: post.id.clone(),
        subreddit: post.subreddit.clone(),
        timestamp: coarse_timestamp(post.timestamp_millis),
        data: post_data,
    };

    let comment_record = CommentRecord {
        id: post.id.clone(),
        data: comment_data,
    };

    db.store().put_comment_record(&comment_record).await?;
    db.store().put_post_record(&post_record).await?;

    debug!(post_id = %post.id, subreddit = %post.subreddit, "Stored post and comment records");

    Ok(())
}

/// Process a batch of queue message bodies strictly in order.
///
/// Each message is fully persisted (both records) before the next one
/// begins. The first failure aborts the remainder of the batch; messages
/// already persisted stay persisted. Returns the number of messages
/// processed, which on success equals the batch size.
///
/// # Errors
///
/// Returns the first decode or store failure encountered.
pub async fn process_batch(db: &Database, bodies: &[String]) -> Result<usize, IngestError> {
    for (index, body) in bodies.iter().enumerate() {
        let post = parse_post(body)?;
        store_post(db, post).await?;

        debug!(index, total = bodies.len(), "Processed batch message");
    }

    Ok(bodies.len())
}
