//! Configuration types for excel-report-service

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

use crate::error::{Error, Result};
use crate::types::ReportFormat;

/// Message broker settings
///
/// The connection endpoint and credentials are carried for transport implementations;
/// the in-process channel transport ignores them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Broker connection endpoint (default: "tcp://localhost:61616")
    #[serde(default = "default_broker_url")]
    pub url: String,

    /// Username for authentication
    #[serde(default)]
    pub username: Option<String>,

    /// Password for authentication
    #[serde(default)]
    pub password: Option<String>,

    /// Queue report batches are consumed from (default: "processing")
    #[serde(default = "default_queue")]
    pub inbound_queue: String,

    /// Destination for status messages when a request carries no reply-to (default: "processing")
    #[serde(default = "default_queue")]
    pub status_queue: String,

    /// Only messages whose format property matches this value are consumed (default: "xlsx")
    #[serde(default = "default_format_selector")]
    pub format_selector: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: default_broker_url(),
            username: None,
            password: None,
            inbound_queue: default_queue(),
            status_queue: default_queue(),
            format_selector: default_format_selector(),
        }
    }
}

/// Worker pool settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Maximum pipelines running at once (default: 4)
    ///
    /// Pipelines dispatched beyond this wait for a free worker.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Number of movies requested per page (default: 50)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// How long shutdown waits for in-flight pipelines (default: 30 seconds)
    #[serde(default = "default_shutdown_timeout", with = "duration_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            page_size: default_page_size(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

/// Report data source (movie catalogue service) settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataSourceConfig {
    /// Base URL of the catalogue service (default: "http://localhost:8080")
    #[serde(default = "default_data_source_url")]
    pub base_url: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_data_source_url(),
            timeout: default_request_timeout(),
        }
    }
}

/// Artifact storage settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory artifacts are written to (default: "./reports")
    #[serde(default = "default_storage_root")]
    pub root_dir: PathBuf,

    /// URL prefix under which `root_dir` is served (default: "http://localhost/reports/")
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: default_storage_root(),
            public_base_url: default_public_base_url(),
        }
    }
}

/// Report layout settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportConfig {
    /// `chrono` format string for date cells (default: "%Y-%m-%d %H:%M:%S")
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
        }
    }
}

/// Main configuration for ReportService
///
/// Every section has defaults, so an empty JSON object is a valid configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Queue connection and destinations
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Worker pool sizing and pagination
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Report data source
    #[serde(default)]
    pub data_source: DataSourceConfig,

    /// Artifact storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Report layout
    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    /// Parse a configuration from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json).map_err(|e| Error::Config {
            message: e.to_string(),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that would stall or misroute the pipeline
    pub fn validate(&self) -> Result<()> {
        if self.worker.pool_size == 0 {
            return Err(invalid("worker.pool_size", "pool size must be at least 1"));
        }
        if self.worker.pool_size > tokio::sync::Semaphore::MAX_PERMITS {
            return Err(invalid(
                "worker.pool_size",
                &format!("pool size must be at most {}", tokio::sync::Semaphore::MAX_PERMITS),
            ));
        }
        if self.worker.page_size == 0 {
            return Err(invalid("worker.page_size", "page size must be at least 1"));
        }
        if self.broker.inbound_queue.trim().is_empty() {
            return Err(invalid("broker.inbound_queue", "queue name is empty"));
        }
        if self.broker.status_queue.trim().is_empty() {
            return Err(invalid("broker.status_queue", "queue name is empty"));
        }
        if ReportFormat::from_name(&self.broker.format_selector).is_none() {
            return Err(invalid(
                "broker.format_selector",
                &format!("unknown report format {:?}", self.broker.format_selector),
            ));
        }
        if StrftimeItems::new(&self.report.date_format).any(|item| matches!(item, Item::Error))
            || render_sample_date(&self.report.date_format).is_err()
        {
            return Err(invalid(
                "report.date_format",
                &format!("invalid date format {:?}", self.report.date_format),
            ));
        }
        if let Err(e) = url::Url::parse(&self.data_source.base_url) {
            return Err(invalid(
                "data_source.base_url",
                &format!("invalid url: {}", e),
            ));
        }
        if let Err(e) = url::Url::parse(&self.storage.public_base_url) {
            return Err(invalid(
                "storage.public_base_url",
                &format!("invalid url: {}", e),
            ));
        }
        Ok(())
    }
}

// Some specifiers parse but need an offset to render (%z, %Z, %:z)
fn render_sample_date(format: &str) -> std::fmt::Result {
    use std::fmt::Write;

    let sample = chrono::NaiveDateTime::default();
    write!(String::new(), "{}", sample.format(format))
}

fn invalid(key: &str, message: &str) -> Error {
    Error::Config {
        message: message.to_string(),
        key: Some(key.to_string()),
    }
}

fn default_broker_url() -> String {
    "tcp://localhost:61616".into()
}

fn default_queue() -> String {
    "processing".into()
}

fn default_format_selector() -> String {
    "xlsx".into()
}

fn default_pool_size() -> usize {
    4
}

fn default_page_size() -> usize {
    50
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_data_source_url() -> String {
    "http://localhost:8080".into()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("reports")
}

fn default_public_base_url() -> String {
    "http://localhost/reports/".into()
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M:%S".into()
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = Config::from_json("{}").unwrap();

        assert_eq!(config.worker.pool_size, 4);
        assert_eq!(config.worker.page_size, 50);
        assert_eq!(config.broker.inbound_queue, "processing");
        assert_eq!(config.broker.format_selector, "xlsx");
        assert_eq!(config.data_source.timeout, Duration::from_secs(30));
    }

    #[test]
    fn durations_are_read_as_seconds() {
        let config =
            Config::from_json(r#"{"worker": {"shutdown_timeout": 5}, "data_source": {"timeout": 2}}"#)
                .unwrap();

        assert_eq!(config.worker.shutdown_timeout, Duration::from_secs(5));
        assert_eq!(config.data_source.timeout, Duration::from_secs(2));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = Config::from_json(r#"{"worker": {"page_size": 0}}"#).unwrap_err();

        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("worker.page_size")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let mut config = Config::default();
        config.worker.pool_size = 0;

        assert!(matches!(
            config.validate(),
            Err(Error::Config { key: Some(k), .. }) if k == "worker.pool_size"
        ));
    }

    #[test]
    fn unknown_format_selector_is_rejected() {
        let mut config = Config::default();
        config.broker.format_selector = "pdf".into();

        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let mut config = Config::default();
        config.data_source.base_url = "not a url".into();

        assert!(matches!(
            config.validate(),
            Err(Error::Config { key: Some(k), .. }) if k == "data_source.base_url"
        ));
    }

    #[test]
    fn invalid_date_format_is_rejected() {
        let mut config = Config::default();
        config.report.date_format = "%Y-%m-%".into();

        assert!(matches!(
            config.validate(),
            Err(Error::Config { key: Some(k), .. }) if k == "report.date_format"
        ));
    }

    #[test]
    fn date_format_needing_an_offset_is_rejected() {
        for format in ["%Y-%m-%d %z", "%Z", "%H:%M %:z"] {
            let mut config = Config::default();
            config.report.date_format = format.into();

            assert!(
                matches!(
                    config.validate(),
                    Err(Error::Config { key: Some(ref k), .. }) if k == "report.date_format"
                ),
                "format {format:?} should be rejected"
            );
        }
    }

    #[test]
    fn pool_size_above_semaphore_limit_is_rejected() {
        let mut config = Config::default();
        config.worker.pool_size = tokio::sync::Semaphore::MAX_PERMITS + 1;

        assert!(matches!(
            config.validate(),
            Err(Error::Config { key: Some(k), .. }) if k == "worker.pool_size"
        ));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            Config::from_json("{"),
            Err(Error::Config { key: None, .. })
        ));
    }
}
