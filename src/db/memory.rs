//! In-memory record store for testing and local development.
//!
//! [`MemoryStore`] keeps both tables in `HashMap`s behind a `Mutex` and
//! reproduces the DynamoDB query semantics (descending sort, strict
//! `before` bound, page limit). Data is lost when the store is dropped.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::models::{CommentRecord, PostRecord};
use super::store::{RecordStore, StoreError};
use crate::constants::PAGE_SIZE;

/// An in-memory implementation of [`RecordStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    posts: Mutex<HashMap<String, PostRecord>>,
    comments: Mutex<HashMap<String, CommentRecord>>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_post_record(&self, id: &str) -> Result<Option<PostRecord>, StoreError> {
        let posts = self
            .posts
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        Ok(posts.get(id).cloned())
    }

    async fn get_comment_record(&self, id: &str) -> Result<Option<CommentRecord>, StoreError> {
        let comments = self
            .comments
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        Ok(comments.get(id).cloned())
    }

    async fn put_post_record(&self, record: &PostRecord) -> Result<(), StoreError> {
        let mut posts = self
            .posts
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        posts.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn put_comment_record(&self, record: &CommentRecord) -> Result<(), StoreError> {
        let mut comments = self
            .comments
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        comments.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn query_subreddit_posts(
        &self,
        subreddit: &str,
        before: Option<u64>,
    ) -> Result<Vec<PostRecord>, StoreError> {
        let posts = self
            .posts
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;

        let mut matching: Vec<PostRecord> = posts
            .values()
            .filter(|record| record.subreddit == subreddit)
            .filter(|record| before.is_none_or(|ts| record.timestamp < ts))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching.truncate(PAGE_SIZE as usize);

        Ok(matching)
    }
}
