//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,

    #[serde(default)]
    pub jobs: JobsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub alerting: AlertingConfig,
}

/// Daemon lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Deployment environment the process runs in.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Environments treated as production for alerting purposes.
    #[serde(default = "default_production_like")]
    pub production_like: Vec<String>,

    /// Time allowed for in-flight fires to finish at shutdown (in seconds).
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Install SIGTERM/SIGINT handlers.
    #[serde(default = "default_true")]
    pub handle_signals: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            production_like: default_production_like(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            handle_signals: default_true(),
        }
    }
}

impl DaemonConfig {
    /// Whether the configured environment is production-like.
    pub fn is_production_like(&self) -> bool {
        self.production_like.iter().any(|env| env == &self.environment)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_production_like() -> Vec<String> {
    vec!["production".to_string(), "staging".to_string()]
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// Where job sources are discovered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Directory holding one source file per job.
    #[serde(default = "default_jobs_dir")]
    pub dir: PathBuf,

    /// Glob pattern matched inside `dir`.
    #[serde(default = "default_jobs_pattern")]
    pub pattern: String,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            dir: default_jobs_dir(),
            pattern: default_jobs_pattern(),
        }
    }
}

fn default_jobs_dir() -> PathBuf {
    PathBuf::from("lib/scheduled_tasks")
}

fn default_jobs_pattern() -> String {
    "*.toml".to_string()
}

/// Timezone used for log timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTimezone {
    /// Local time when the host has a configured zone, otherwise UTC.
    #[default]
    Auto,
    Local,
    Utc,
}

impl LogTimezone {
    /// Resolve `Auto` against the host once, at startup.
    pub fn resolve(self) -> LogTimezone {
        let tz_env = std::env::var("TZ").ok();
        self.resolve_with(tz_env.as_deref(), Path::new("/etc/localtime").exists())
    }

    pub(crate) fn resolve_with(self, tz_env: Option<&str>, has_localtime: bool) -> LogTimezone {
        match self {
            LogTimezone::Auto => {
                let tz_set = tz_env.is_some_and(|tz| !tz.trim().is_empty());
                if tz_set || has_localtime {
                    LogTimezone::Local
                } else {
                    LogTimezone::Utc
                }
            }
            resolved => resolved,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub timezone: LogTimezone,

    /// Directory for daily rolling log files; console only when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timezone: LogTimezone::default(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Alerting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertingConfig {
    /// Webhook receiving `{"text": ...}` payloads; alerting disabled when unset.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Per-alert delivery timeout (in seconds).
    #[serde(default = "default_alert_timeout")]
    pub timeout_secs: u64,

    /// Also alert on job load failures in production-like environments.
    #[serde(default)]
    pub alert_on_discovery_failure: bool,

    /// Extra HTTP headers sent with every webhook request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: default_alert_timeout(),
            alert_on_discovery_failure: false,
            headers: HashMap::new(),
        }
    }
}

impl AlertingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_alert_timeout() -> u64 {
    10
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
