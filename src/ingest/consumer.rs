//! Queue consumer feeding the ingestion transform.
//!
//! Messages are only deleted once the whole batch has persisted, so any
//! failure leaves the batch to redeliver after the visibility timeout. A
//! persistently malformed message therefore redelivers forever; skipping it
//! would drop data silently, so that policy is left to the queue's own
//! dead-letter configuration.

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use aws_sdk_sqs::Client;
use tracing::{debug, error, info};

use super::process_batch;
use crate::config::Config;
use crate::constants::QUEUE_BATCH_SIZE;
use crate::db::Database;

/// Run the queue polling loop forever.
///
/// Each iteration receives one batch, hands it to the ingestion transform,
/// and deletes the messages only when every one of them persisted. Errors
/// are logged and the loop continues; there are no internal retries beyond
/// the queue's own redelivery.
pub async fn run_loop(config: Config, db: Database) {
    let queue_url = match config.queue_url.as_deref() {
        Some(url) => url.to_string(),
        None => {
            error!("Queue consumer started without QUEUE_URL");
            return;
        }
    };

    let client = build_client(&config).await;
    info!(queue_url = %queue_url, "Queue consumer started");

    loop {
        match poll_once(&client, &queue_url, &config, &db).await {
            Ok(processed) => {
                if processed > 0 {
                    info!(processed, "Ingested posts from queue");
                } else {
                    debug!("Queue empty");
                    tokio::time::sleep(config.queue_idle_interval).await;
                }
            }
            Err(e) => {
                error!("Queue poll error: {e:#}");
                tokio::time::sleep(config.queue_idle_interval).await;
            }
        }
    }
}

/// Receive and process a single batch from the queue.
///
/// Returns the number of messages persisted and deleted. When the batch
/// fails partway, nothing is deleted and the whole batch redelivers.
///
/// # Errors
///
/// Returns an error if the receive call, the ingestion transform, or a
/// message delete fails.
pub async fn poll_once(
    client: &Client,
    queue_url: &str,
    config: &Config,
    db: &Database,
) -> Result<usize> {
    let wait_secs = i32::try_from(config.queue_wait_time.as_secs()).unwrap_or(20);

    let output = client
        .receive_message()
        .queue_url(queue_url)
        .max_number_of_messages(QUEUE_BATCH_SIZE)
        .wait_time_seconds(wait_secs)
        .send()
        .await
        .context("Failed to receive messages")?;

    let messages = output.messages.unwrap_or_default();
    if messages.is_empty() {
        return Ok(0);
    }

    let bodies: Vec<String> = messages
        .iter()
        .map(|m| m.body.clone().unwrap_or_default())
        .collect();

    process_batch(db, &bodies)
        .await
        .context("Failed to process message batch")?;

    for message in &messages {
        if let Some(handle) = message.receipt_handle.as_deref() {
            client
                .delete_message()
                .queue_url(queue_url)
                .receipt_handle(handle)
                .send()
                .await
                .context("Failed to delete processed message")?;
        }
    }

    Ok(messages.len())
}

async fn build_client(config: &Config) -> Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(endpoint) = &config.aws_endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }
    Client::new(&loader.load().await)
}
