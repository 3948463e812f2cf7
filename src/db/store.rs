//! The [`RecordStore`] trait defining the record storage interface.
//!
//! The data-access layer composes against this trait rather than a concrete
//! client, so the DynamoDB backend and the in-memory backend used by tests
//! are interchangeable.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{CommentRecord, PostRecord};

/// Failure categories for record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the requested id.
    #[error("no record for id {0}")]
    NotFound(String),

    /// A stored item or blob failed to decode into the expected shape.
    #[error("stored data for {id} failed to decode: {message}")]
    Corrupt { id: String, message: String },

    /// The store call itself failed (network, throttling, timeout). Not
    /// retried here; retry policy belongs to the caller's environment.
    #[error("store request failed: {0}")]
    Unavailable(String),
}

/// Storage backend for post and comment records.
///
/// Implementations provide single-record get/put plus one range query over
/// the subreddit secondary index. All puts are unconditional upserts; there
/// are no updates, deletes, or cross-record transactions.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a post record by id. Returns `Ok(None)` when absent.
    async fn get_post_record(&self, id: &str) -> Result<Option<PostRecord>, StoreError>;

    /// Fetch a comment record by post id. Returns `Ok(None)` when absent.
    async fn get_comment_record(&self, id: &str) -> Result<Option<CommentRecord>, StoreError>;

    /// Upsert a post record.
    async fn put_post_record(&self, record: &PostRecord) -> Result<(), StoreError>;

    /// Upsert a comment record.
    async fn put_comment_record(&self, record: &CommentRecord) -> Result<(), StoreError>;

    /// Query the subreddit index for post records, newest first.
    ///
    /// `subreddit` is the stored key form (`r/<name>`). When `before` is
    /// set, only records with `timestamp` strictly less than it are
    /// returned. At most [`crate::constants::PAGE_SIZE`] records.
    async fn query_subreddit_posts(
        &self,
        subreddit: &str,
        before: Option<u64>,
    ) -> Result<Vec<PostRecord>, StoreError>;
}
