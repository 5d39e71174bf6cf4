use anyhow::{Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::default::Default;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::database::DatabaseConnection;
use crate::errors::ConfigError;
use crate::language_utils;
use crate::translation::concurrency::PipelineOptions;

/// Environment toggle consulted when no dry-run value is configured
pub const DRY_RUN_ENV: &str = "TRANSLATE_DRY_RUN";

/// Environment variable holding the production API key
pub const API_KEY_ENV: &str = "TRANSLATE_API_KEY";

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Target languages, processed in this order
    #[serde(default = "default_languages")]
    pub languages: Vec<Language>,

    /// Bypass the real backend; `None` defers to `TRANSLATE_DRY_RUN`
    #[serde(default)]
    pub dry_run: Option<bool>,

    /// SQLite database file; `None` uses the per-user data directory
    #[serde(default)]
    pub database_path: Option<String>,

    /// Worker pool settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Production backend settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// A target language
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Language {
    /// Language tag sent to the backend and used as the store partition key
    pub code: String,

    /// Optional display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Language {
    /// Create a language from its code
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: None,
        }
    }

    /// Configured name, else the ISO name, else the code itself
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| language_utils::get_language_name(&self.code).ok())
            .unwrap_or_else(|| self.code.clone())
    }
}

/// What to do when the backend returns a different number of strings than sent
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShortBatchPolicy {
    /// Fail the job with `BackendError::BatchLengthMismatch`
    #[default]
    Reject,
    /// Overwrite the fields that came back, keep source text in the rest
    KeepSource,
}

/// Worker pool configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Languages translated at the same time
    #[serde(default = "default_language_concurrency")]
    pub language_concurrency: usize,

    /// Report jobs in flight per language
    #[serde(default = "default_report_concurrency")]
    pub report_concurrency: usize,

    /// Per-job timeout in seconds; 0 disables the timeout
    #[serde(default = "default_job_timeout_secs")]
    pub job_timeout_secs: u64,

    /// Handling of short or long backend responses
    #[serde(default)]
    pub short_batch_policy: ShortBatchPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            language_concurrency: default_language_concurrency(),
            report_concurrency: default_report_concurrency(),
            job_timeout_secs: default_job_timeout_secs(),
            short_batch_policy: ShortBatchPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Pool options derived from this configuration
    pub fn options(&self) -> PipelineOptions {
        PipelineOptions {
            language_concurrency: self.language_concurrency,
            report_concurrency: self.report_concurrency,
            job_timeout: (self.job_timeout_secs > 0).then(|| Duration::from_secs(self.job_timeout_secs)),
        }
    }
}

/// Production translation backend configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BackendConfig {
    /// Service endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_languages() -> Vec<Language> {
    vec![Language::new("es"), Language::new("fr"), Language::new("ja")]
}

fn default_language_concurrency() -> usize {
    10
}

fn default_report_concurrency() -> usize {
    100
}

fn default_job_timeout_secs() -> u64 {
    120
}

fn default_endpoint() -> String {
    "https://translation.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Upper bound for `backend.retry_count`
pub const MAX_RETRY_COUNT: u32 = 10;

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

/// Resolve the dry-run flag once at startup
///
/// An explicit value wins. Otherwise the run is a dry run unless the
/// environment toggle is exactly `false`.
pub fn resolve_dry_run(explicit: Option<bool>, env_value: Option<&str>) -> bool {
    explicit.unwrap_or_else(|| env_value != Some("false"))
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load the configuration, writing a default one first if the file is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;

        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Dry-run flag given the environment toggle value
    pub fn resolved_dry_run(&self, env_value: Option<&str>) -> bool {
        resolve_dry_run(self.dry_run, env_value)
    }

    /// Database file to open
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => DatabaseConnection::default_database_path(),
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self, dry_run: bool) -> Result<(), ConfigError> {
        if self.languages.is_empty() {
            return Err(ConfigError::NoLanguages);
        }

        let mut seen = HashSet::new();
        for language in &self.languages {
            language_utils::validate_language_code(&language.code)
                .map_err(|_| ConfigError::InvalidLanguage(language.code.clone()))?;

            if !seen.insert(language.code.to_lowercase()) {
                return Err(ConfigError::DuplicateLanguage(language.code.clone()));
            }
        }

        if self.pipeline.language_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency("language_concurrency"));
        }
        if self.pipeline.report_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency("report_concurrency"));
        }

        if self.backend.retry_count > MAX_RETRY_COUNT {
            return Err(ConfigError::InvalidRetryCount {
                value: self.backend.retry_count,
                max: MAX_RETRY_COUNT,
            });
        }

        if !dry_run {
            url::Url::parse(&self.backend.endpoint)
                .map_err(|_| ConfigError::InvalidEndpoint(self.backend.endpoint.clone()))?;

            if self.backend.api_key.is_empty() {
                return Err(ConfigError::MissingApiKey);
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            languages: default_languages(),
            dry_run: None,
            database_path: None,
            pipeline: PipelineConfig::default(),
            backend: BackendConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
