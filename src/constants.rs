//! Shared constants used across the application.

/// Fixed page size for subreddit listings. The underlying index query never
/// returns more than this many records, and the page size is not
/// configurable per call.
pub const PAGE_SIZE: i32 = 25;

/// Textual prefix for stored subreddit keys (`r/<name>`).
pub const SUBREDDIT_PREFIX: &str = "r/";

/// Maximum number of messages fetched per queue poll (the SQS ceiling).
pub const QUEUE_BATCH_SIZE: i32 = 10;
