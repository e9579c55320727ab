//! Structured failure records produced by the fault boundary.

use std::error::Error as StdError;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle phase a failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePhase {
    Discovery,
    Registration,
    Execution,
}

impl fmt::Display for FailurePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePhase::Discovery => write!(f, "discovery"),
            FailurePhase::Registration => write!(f, "registration"),
            FailurePhase::Execution => write!(f, "execution"),
        }
    }
}

/// One caught failure.
#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    pub phase: FailurePhase,
    pub job_identity: String,
    /// Top-level failure message.
    pub cause: String,
    /// Causes underneath `cause`, outermost first.
    pub causal_trace: Vec<String>,
    pub occurred_at: DateTime<Utc>,
}

impl FailureRecord {
    /// Build a record from an error, walking its `source()` chain.
    pub fn from_error(
        phase: FailurePhase,
        job_identity: impl Into<String>,
        error: &(dyn StdError + 'static),
    ) -> Self {
        let mut causal_trace = Vec::new();
        let mut current = error.source();
        while let Some(source) = current {
            causal_trace.push(source.to_string());
            current = source.source();
        }

        Self {
            phase,
            job_identity: job_identity.into(),
            cause: error.to_string(),
            causal_trace,
            occurred_at: Utc::now(),
        }
    }

    /// Build a record from a plain message with no underlying chain.
    pub fn from_message(
        phase: FailurePhase,
        job_identity: impl Into<String>,
        cause: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            job_identity: job_identity.into(),
            cause: cause.into(),
            causal_trace: Vec::new(),
            occurred_at: Utc::now(),
        }
    }

    /// Condensed one-line summary suitable for an alerting channel.
    pub fn summary(&self, environment: &str) -> String {
        let mut summary = format!(
            "[{}] job {} failed during {}: {}",
            environment, self.job_identity, self.phase, self.cause
        );
        if let Some(root) = self.causal_trace.last() {
            summary.push_str(&format!(" (root cause: {})", root));
        }
        summary.push_str(", see log for trace");
        summary
    }

    /// Multi-line trace for logging.
    pub fn trace(&self) -> String {
        self.causal_trace
            .iter()
            .enumerate()
            .map(|(depth, cause)| format!("  {}: {}", depth, cause))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
