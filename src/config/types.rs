use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the pipeline
///
/// Every section and key is optional; omitted values fall back to the
/// reference defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub http: HttpConfig,
    pub storage: StorageConfig,
}

/// Queue, worker pool and retry scheduler settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of task tokens buffered in the queue
    #[serde(rename = "queue-capacity")]
    pub queue_capacity: usize,

    /// Number of concurrent scrape workers
    #[serde(rename = "worker-count")]
    pub worker_count: usize,

    /// Deadline for a single scrape cycle (seconds)
    #[serde(rename = "task-timeout-secs")]
    pub task_timeout_secs: u64,

    /// Interval between retry scheduler passes (seconds)
    #[serde(rename = "scheduler-interval-secs")]
    pub scheduler_interval_secs: u64,

    /// Failed articles with this many attempts are never retried again
    #[serde(rename = "max-retries")]
    pub max_retries: u32,
}

impl PipelineConfig {
    pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
    pub const DEFAULT_WORKER_COUNT: usize = 2;
    pub const DEFAULT_TASK_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_SCHEDULER_INTERVAL_SECS: u64 = 5 * 60;
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    pub fn scheduler_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler_interval_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
            worker_count: Self::DEFAULT_WORKER_COUNT,
            task_timeout_secs: Self::DEFAULT_TASK_TIMEOUT_SECS,
            scheduler_interval_secs: Self::DEFAULT_SCHEDULER_INTERVAL_SECS,
            max_retries: Self::DEFAULT_MAX_RETRIES,
        }
    }
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every page fetch
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// TCP/TLS connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Maximum number of redirects followed per fetch
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("PreviewPipeline/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout_secs: 10,
            max_redirects: 10,
        }
    }
}

/// Persistence settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "./articles.db".to_string(),
        }
    }
}
