use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::debug;

use super::models::{CommentRecord, PostRecord};
use super::store::{RecordStore, StoreError};
use crate::config::Config;
use crate::constants::PAGE_SIZE;

/// DynamoDB-backed record store.
///
/// Layout: the post table is keyed by `post_id` (S) and carries `subreddit`
/// (S), `timestamp` (N, seconds) and `data` (S); a secondary index keyed by
/// `subreddit` + `timestamp` serves the listing query. The comment table is
/// keyed by `post_id` (S) and carries `data` (S).
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: Client,
    post_table: String,
    comment_table: String,
    post_index: String,
}

impl DynamoStore {
    /// Create a store from the ambient AWS credential chain.
    pub async fn new(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(endpoint) = &config.aws_endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        Self {
            client: Client::new(&sdk_config),
            post_table: config.post_table_name.clone(),
            comment_table: config.comment_table_name.clone(),
            post_index: config.post_index_name.clone(),
        }
    }
}

#[async_trait]
impl RecordStore for DynamoStore {
    async fn get_post_record(&self, id: &str) -> Result<Option<PostRecord>, StoreError> {
        debug!(post_id = %id, table = %self.post_table, "Fetching post record");

        let output = self
            .client
            .get_item()
            .table_name(&self.post_table)
            .key("post_id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(DisplayErrorContext(&e).to_string()))?;

        output.item.map(|item| post_record_from_item(&item)).transpose()
    }

    async fn get_comment_record(&self, id: &str) -> Result<Option<CommentRecord>, StoreError> {
        debug!(post_id = %id, table = %self.comment_table, "Fetching comment record");

        let output = self
            .client
            .get_item()
            .table_name(&self.comment_table)
            .key("post_id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(DisplayErrorContext(&e).to_string()))?;

        output
            .item
            .map(|item| {
                Ok(CommentRecord {
                    id: id.to_string(),
                    data: string_attr(id, &item, "data")?,
                })
            })
            .transpose()
    }

    async fn put_post_record(&self, record: &PostRecord) -> Result<(), StoreError> {
        debug!(post_id = %record.id, table = %self.post_table, "Writing post record");

        self.client
            .put_item()
            .table_name(&self.post_table)
            .item("post_id", AttributeValue::S(record.id.clone()))
            .item("subreddit", AttributeValue::S(record.subreddit.clone()))
            .item("timestamp", AttributeValue::N(record.timestamp.to_string()))
            .item("data", AttributeValue::S(record.data.clone()))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    async fn put_comment_record(&self, record: &CommentRecord) -> Result<(), StoreError> {
        debug!(post_id = %record.id, table = %self.comment_table, "Writing comment record");

        self.client
            .put_item()
            .table_name(&self.comment_table)
            .item("post_id", AttributeValue::S(record.id.clone()))
            .item("data", AttributeValue::S(record.data.clone()))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    async fn query_subreddit_posts(
        &self,
        subreddit: &str,
        before: Option<u64>,
    ) -> Result<Vec<PostRecord>, StoreError> {
        debug!(subreddit = %subreddit, ?before, "Querying subreddit index");

        // `timestamp` is a DynamoDB reserved word, so both key names go
        // through expression attribute names.
        let mut query = self
            .client
            .query()
            .table_name(&self.post_table)
            .index_name(&self.post_index)
            .expression_attribute_names("#sub", "subreddit")
            .expression_attribute_values(":sub", AttributeValue::S(subreddit.to_string()))
            .scan_index_forward(false)
            .limit(PAGE_SIZE);

        query = if let Some(before) = before {
            query
                .key_condition_expression("#sub = :sub AND #ts < :before")
                .expression_attribute_names("#ts", "timestamp")
                .expression_attribute_values(":before", AttributeValue::N(before.to_string()))
        } else {
            query.key_condition_expression("#sub = :sub")
        };

        let output = query
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(DisplayErrorContext(&e).to_string()))?;

        output
            .items
            .unwrap_or_default()
            .iter()
            .map(post_record_from_item)
            .collect()
    }
}

fn post_record_from_item(item: &HashMap<String, AttributeValue>) -> Result<PostRecord, StoreError> {
    let id = string_attr("unknown", item, "post_id")?;
    Ok(PostRecord {
        subreddit: string_attr(&id, item, "subreddit")?,
        timestamp: number_attr(&id, item, "timestamp")?,
        data: string_attr(&id, item, "data")?,
        id,
    })
}

fn string_attr(
    id: &str,
    item: &HashMap<String, AttributeValue>,
    name: &str,
) -> Result<String, StoreError> {
    item.get(name)
        .and_then(|attr| attr.as_s().ok())
        .cloned()
        .ok_or_else(|| StoreError::Corrupt {
            id: id.to_string(),
            message: format!("missing or non-string attribute {name}"),
        })
}

fn number_attr(
    id: &str,
    item: &HashMap<String, AttributeValue>,
    name: &str,
) -> Result<u64, StoreError> {
    item.get(name)
        .and_then(|attr| attr.as_n().ok())
        .ok_or_else(|| StoreError::Corrupt {
            id: id.to_string(),
            message: format!("missing or non-numeric attribute {name}"),
        })?
        .parse()
        .map_err(|e| StoreError::Corrupt {
            id: id.to_string(),
            message: format!("attribute {name} is not a valid u64: {e}"),
        })
}
