use std::time::Duration;

use thiserror::Error;

/// SQS caps long-poll wait times at 20 seconds.
const MAX_QUEUE_WAIT_SECS: u64 = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // DynamoDB
    pub post_table_name: String,
    pub comment_table_name: String,
    pub post_index_name: String,
    pub aws_endpoint_url: Option<String>,

    // Ingestion queue (consumer disabled when unset)
    pub queue_url: Option<String>,
    pub queue_wait_time: Duration,
    pub queue_idle_interval: Duration,

    // Web Server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or
    /// invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // DynamoDB
            post_table_name: required_env("POST_TABLE_NAME")?,
            comment_table_name: required_env("COMMENT_TABLE_NAME")?,
            post_index_name: required_env("POST_INDEX_NAME")?,
            aws_endpoint_url: optional_env("AWS_ENDPOINT_URL"),

            // Ingestion queue
            queue_url: optional_env("QUEUE_URL"),
            queue_wait_time: Duration::from_secs(parse_env_u64("QUEUE_WAIT_TIME_SECS", 20)?),
            queue_idle_interval: Duration::from_secs(parse_env_u64(
                "QUEUE_IDLE_INTERVAL_SECS",
                5,
            )?),

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8080)?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.post_table_name.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "POST_TABLE_NAME".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.comment_table_name.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "COMMENT_TABLE_NAME".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.post_index_name.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "POST_INDEX_NAME".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.queue_wait_time.as_secs() > MAX_QUEUE_WAIT_SECS {
            return Err(ConfigError::InvalidValue {
                name: "QUEUE_WAIT_TIME_SECS".to_string(),
                message: format!("must be at most {MAX_QUEUE_WAIT_SECS}"),
            });
        }
        Ok(())
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            post_table_name: "posts".to_string(),
            comment_table_name: "comments".to_string(),
            post_index_name: "subreddit-timestamp-index".to_string(),
            aws_endpoint_url: None,
            queue_url: None,
            queue_wait_time: Duration::from_secs(20),
            queue_idle_interval: Duration::from_secs(5),
            web_host: "127.0.0.1".to_string(),
            web_port: 8080,
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_table() {
        let mut config = test_config();
        config.post_table_name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_long_wait() {
        let mut config = test_config();
        config.queue_wait_time = Duration::from_secs(21);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_env_u64_default() {
        assert_eq!(parse_env_u64("NONEXISTENT_VAR", 7).unwrap(), 7);
    }
}
