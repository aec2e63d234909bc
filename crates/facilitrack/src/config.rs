use std::{env, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// DynamoDB table holding every entity (default: "facilitrack")
    pub table_name: String,
    /// Upper bound on a single store call (default: 3s)
    pub store_timeout: Duration,
    /// AWS region (default: "us-east-1")
    pub region: String,
    /// Custom endpoint, e.g. a local DynamoDB
    pub endpoint_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DYNAMODB_TABLE_NAME` - Table name (default: "facilitrack")
    /// - `STORE_TIMEOUT_MS` - Per-call store timeout in milliseconds (default: 3000)
    /// - `AWS_REGION` - AWS region (default: "us-east-1")
    /// - `AWS_ENDPOINT_URL` - Custom endpoint URL (optional)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            table_name: lookup("DYNAMODB_TABLE_NAME").unwrap_or_else(|| "facilitrack".to_string()),
            store_timeout: Duration::from_millis(
                lookup("STORE_TIMEOUT_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3_000),
            ),
            region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            endpoint_url: lookup("AWS_ENDPOINT_URL").filter(|url| !url.is_empty()),
        }
    }

    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({url}), table {}", self.table_name),
            None => format!(
                "AWS DynamoDB (region: {}), table {}",
                self.region, self.table_name
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
