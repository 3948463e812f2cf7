//! Integration tests for the data-access layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reddit_feed_api::db::{
    cursor_timestamp, get_comments, get_post, get_post_with_comments, list_subreddit_posts,
    Comment, Database, MemoryStore, Post, PostRecord, RecordStore, StoreError,
};
use reddit_feed_api::ingest::store_post;

fn setup_db() -> Database {
    Database::with_store(Arc::new(MemoryStore::new()))
}

fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).expect("valid timestamp")
}

fn make_post(id: &str, subreddit: &str, millis: u64) -> Post {
    Post {
        id: id.to_string(),
        subreddit: subreddit.to_string(),
        data_type: "image".to_string(),
        data_url: format!("https://i.example.com/{id}.png"),
        is_promoted: false,
        is_gallery: false,
        title: format!("Post {id}"),
        timestamp: ts((millis / 1000) as i64),
        timestamp_millis: millis,
        author: "tester".to_string(),
        url: format!("https://reddit.com/r/test/comments/{id}"),
        points: 1,
        scraped_at: ts(1_700_000_000),
        comments: Vec::new(),
    }
}

fn make_comment(id: &str, children: Vec<Comment>) -> Comment {
    Comment {
        id: id.to_string(),
        author: "commenter".to_string(),
        timestamp: ts(1_700_000_100),
        content: format!("comment {id}"),
        points: 2,
        is_deleted: false,
        children,
    }
}

#[tokio::test]
async fn test_get_post_leaves_comments_empty() {
    let db = setup_db();

    let mut post = make_post("abc", "r/test", 5000);
    post.comments = vec![make_comment("c1", Vec::new())];
    store_post(&db, post).await.expect("Failed to store post");

    let fetched = get_post(&db, "abc").await.expect("Failed to get post");
    assert_eq!(fetched.id, "abc");
    assert!(fetched.comments.is_empty());
}

#[tokio::test]
async fn test_get_post_with_comments_merges_forest() {
    let db = setup_db();

    let mut post = make_post("abc", "r/test", 5000);
    post.comments = vec![
        make_comment("c1", vec![make_comment("c2", Vec::new())]),
        make_comment("c3", Vec::new()),
    ];
    store_post(&db, post).await.expect("Failed to store post");

    let bare = get_post(&db, "abc").await.expect("Failed to get post");
    let full = get_post_with_comments(&db, "abc")
        .await
        .expect("Failed to get post with comments");
    let forest = get_comments(&db, "abc")
        .await
        .expect("Failed to get comments");

    assert_eq!(full.comments, forest);
    assert_eq!(forest.len(), 2);
    assert_eq!(forest[0].children.len(), 1);
    assert_eq!(forest[0].children[0].id, "c2");

    // Identical to the bare post apart from the comment forest.
    let mut stripped = full.clone();
    stripped.comments = Vec::new();
    assert_eq!(stripped, bare);
}

#[tokio::test]
async fn test_missing_post_is_not_found() {
    let db = setup_db();

    let err = get_post(&db, "nope").await.expect_err("Expected an error");
    assert!(matches!(err, StoreError::NotFound(_)));

    let err = get_post_with_comments(&db, "nope")
        .await
        .expect_err("Expected an error");
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_missing_comments_are_not_found() {
    let db = setup_db();

    let err = get_comments(&db, "nope")
        .await
        .expect_err("Expected an error");
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_list_caps_at_page_size() {
    let db = setup_db();

    for i in 0..30u64 {
        let post = make_post(&format!("p{i}"), "r/test", (i + 1) * 1000);
        store_post(&db, post).await.expect("Failed to store post");
    }

    let posts = list_subreddit_posts(&db, "r/test", None)
        .await
        .expect("Failed to list posts");

    assert_eq!(posts.len(), 25);
    for pair in posts.windows(2) {
        assert!(
            pair[0].timestamp_millis > pair[1].timestamp_millis,
            "Posts must be strictly newest-first"
        );
    }
    // The newest post leads the page, the oldest five fall off the end.
    assert_eq!(posts[0].id, "p29");
    assert_eq!(posts[24].id, "p5");
}

#[tokio::test]
async fn test_list_before_bound_is_strict() {
    let db = setup_db();

    for i in 1..=5u64 {
        let post = make_post(&format!("p{i}"), "r/test", i * 1000);
        store_post(&db, post).await.expect("Failed to store post");
    }

    // Coarse timestamps are 1..=5; before=3 keeps only 1 and 2.
    let posts = list_subreddit_posts(&db, "r/test", Some(3))
        .await
        .expect("Failed to list posts");

    let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p2", "p1"]);
}

#[tokio::test]
async fn test_list_orders_newest_first() {
    let db = setup_db();

    store_post(&db, make_post("older", "r/test", 1000))
        .await
        .expect("Failed to store post");
    store_post(&db, make_post("newer", "r/test", 2000))
        .await
        .expect("Failed to store post");

    let posts = list_subreddit_posts(&db, "r/test", None)
        .await
        .expect("Failed to list posts");

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, "newer");
    assert_eq!(posts[1].id, "older");
}

#[tokio::test]
async fn test_list_accepts_bare_and_prefixed_names() {
    let db = setup_db();

    store_post(&db, make_post("abc", "r/test", 1000))
        .await
        .expect("Failed to store post");

    let bare = list_subreddit_posts(&db, "test", None)
        .await
        .expect("Failed to list posts");
    let prefixed = list_subreddit_posts(&db, "r/test", None)
        .await
        .expect("Failed to list posts");

    assert_eq!(bare.len(), 1);
    assert_eq!(bare, prefixed);
}

#[tokio::test]
async fn test_list_does_not_leak_other_subreddits() {
    let db = setup_db();

    store_post(&db, make_post("a", "r/test", 1000))
        .await
        .expect("Failed to store post");
    store_post(&db, make_post("b", "r/other", 2000))
        .await
        .expect("Failed to store post");

    let posts = list_subreddit_posts(&db, "test", None)
        .await
        .expect("Failed to list posts");

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "a");
}

#[tokio::test]
async fn test_cursor_resolves_to_coarse_timestamp() {
    let db = setup_db();

    store_post(&db, make_post("abc", "r/test", 5999))
        .await
        .expect("Failed to store post");

    let timestamp = cursor_timestamp(&db, "abc")
        .await
        .expect("Failed to resolve cursor");
    assert_eq!(timestamp, 5);

    let err = cursor_timestamp(&db, "missing")
        .await
        .expect_err("Expected an error");
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_cursor_pages_through_listing() {
    let db = setup_db();

    for i in 1..=4u64 {
        let post = make_post(&format!("p{i}"), "r/test", i * 1000);
        store_post(&db, post).await.expect("Failed to store post");
    }

    let first_page = list_subreddit_posts(&db, "r/test", None)
        .await
        .expect("Failed to list posts");
    let boundary = first_page.last().expect("Page must not be empty");

    let before = cursor_timestamp(&db, &boundary.id)
        .await
        .expect("Failed to resolve cursor");
    let second_page = list_subreddit_posts(&db, "r/test", Some(before))
        .await
        .expect("Failed to list posts");

    // With 4 posts the first page holds them all, so the cursor of the last
    // entry yields an empty follow-up page.
    assert_eq!(first_page.len(), 4);
    assert!(second_page.is_empty());
}

#[tokio::test]
async fn test_corrupt_blob_is_reported() {
    let db = setup_db();

    let record = PostRecord {
        id: "bad".to_string(),
        subreddit: "r/test".to_string(),
        timestamp: 1,
        data: "{not valid json".to_string(),
    };
    db.store()
        .put_post_record(&record)
        .await
        .expect("Failed to put record");

    let err = get_post(&db, "bad").await.expect_err("Expected an error");
    assert!(matches!(err, StoreError::Corrupt { .. }));

    let err = list_subreddit_posts(&db, "r/test", None)
        .await
        .expect_err("Expected an error");
    assert!(matches!(err, StoreError::Corrupt { .. }));
}
