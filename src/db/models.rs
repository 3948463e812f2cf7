use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::SUBREDDIT_PREFIX;

/// A scraped Reddit post.
///
/// Field names match the JSON produced by the scraper and stored in the
/// record blobs, so this shape doubles as the wire format for API responses.
/// `comments` is only populated transiently when serving a post together
/// with its comment tree; the persisted post blob never carries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub subreddit: String,
    #[serde(rename = "dataType")]
    pub data_type: String,
    #[serde(rename = "dataURL")]
    pub data_url: String,
    #[serde(rename = "isPromoted")]
    pub is_promoted: bool,
    #[serde(rename = "isGallery")]
    pub is_gallery: bool,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub timestamp_millis: u64,
    pub author: String,
    pub url: String,
    pub points: i64,
    #[serde(rename = "scrapedAt")]
    pub scraped_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
}

/// A node in a post's comment tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    #[serde(rename = "time")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "comment")]
    pub content: String,
    pub points: i64,
    #[serde(rename = "isDeleted")]
    pub is_deleted: bool,
    #[serde(default)]
    pub children: Vec<Comment>,
}

/// Persisted projection of a post: the indexable scalar fields plus the
/// serialized post (comments stripped) as an opaque blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub id: String,
    pub subreddit: String,
    /// Seconds-resolution sort key, always `timestamp_millis / 1000`.
    pub timestamp: u64,
    pub data: String,
}

/// Persisted projection of a post's entire comment forest, keyed by the
/// same id as its `PostRecord`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub id: String,
    pub data: String,
}

/// Normalize a subreddit name to the stored `r/<name>` key form.
///
/// Idempotent: a name that already carries the prefix is returned as-is.
#[must_use]
pub fn subreddit_key(name: &str) -> String {
    if name.starts_with(SUBREDDIT_PREFIX) {
        name.to_string()
    } else {
        format!("{SUBREDDIT_PREFIX}{name}")
    }
}

/// Coarsen a millisecond timestamp to the seconds-resolution sort key.
#[must_use]
pub fn coarse_timestamp(timestamp_millis: u64) -> u64 {
    timestamp_millis / 1000
}
