//! Configuration for the ledger host

use gradeblock_record::RemovalMode;
use serde::{Deserialize, Serialize};

/// Main ledger configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Transaction execution configuration
    #[serde(default)]
    pub execution: ExecutionConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Transaction execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Removal mode given to delegated records at deployment
    #[serde(default)]
    pub removal_mode: RemovalMode,

    /// Capacity of the sequencer's submission queue
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            removal_mode: RemovalMode::default(),
            queue_depth: default_queue_depth(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_queue_depth() -> usize {
    256
}

impl LedgerConfig {
    /// Load configuration: defaults, then the optional file at `path`, then
    /// `GRADEBLOCK_`-prefixed environment variables
    /// (e.g. `GRADEBLOCK_EXECUTION__QUEUE_DEPTH=64`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&LedgerConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("GRADEBLOCK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
