//! Error types for the taskherd protocol layer.

use std::time::Duration;

use thiserror::Error;

/// Why a candidate source failed to become a job.
#[derive(Debug, Error)]
pub enum DiscoveryCause {
    /// The source name does not normalise to a usable job identity.
    #[error("cannot derive a job identity from {0:?}")]
    InvalidIdentity(String),

    /// No registered factory or loader accepts the candidate.
    #[error("no job factory or loader accepts this source")]
    Unresolved,

    /// Another candidate already produced the same identity.
    #[error("duplicate job identity (already loaded from {first_source})")]
    Duplicate { first_source: String },

    /// The factory built a job under a different identity.
    #[error("factory produced job {actual} instead of {expected}")]
    IdentityMismatch { expected: String, actual: String },

    /// The factory panicked.
    #[error("panicked while loading: {0}")]
    Panicked(String),

    /// The factory or loader returned an error.
    #[error(transparent)]
    Load(#[from] anyhow::Error),
}

/// A candidate source that could not be loaded.
#[derive(Debug, Error)]
#[error("error loading job {identity_guess} from {source_location}: {cause}")]
pub struct DiscoveryError {
    pub identity_guess: String,
    pub source_location: String,
    #[source]
    pub cause: DiscoveryCause,
}

impl DiscoveryError {
    pub fn new(
        identity_guess: impl Into<String>,
        source_location: impl Into<String>,
        cause: impl Into<DiscoveryCause>,
    ) -> Self {
        Self {
            identity_guess: identity_guess.into(),
            source_location: source_location.into(),
            cause: cause.into(),
        }
    }
}

/// A job the timing engine refused to register.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("invalid recurrence rule {rule:?} for job {job_id}: {reason}")]
    InvalidRecurrence {
        job_id: String,
        rule: String,
        reason: String,
    },

    #[error("job {0} is already registered")]
    AlreadyRegistered(String),

    #[error("timing engine is shut down; cannot register job {0}")]
    EngineClosed(String),

    #[error("registration of job {job_id} panicked: {message}")]
    Panicked { job_id: String, message: String },
}

impl RegistrationError {
    /// Identity of the job the error concerns.
    pub fn job_id(&self) -> &str {
        match self {
            RegistrationError::InvalidRecurrence { job_id, .. } => job_id,
            RegistrationError::AlreadyRegistered(job_id) => job_id,
            RegistrationError::EngineClosed(job_id) => job_id,
            RegistrationError::Panicked { job_id, .. } => job_id,
        }
    }
}

/// A failure during one scheduled fire of a job.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("job {job_id} failed: {source}")]
    Failed {
        job_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("job {job_id} panicked: {message}")]
    Panicked { job_id: String, message: String },

    /// The engine observed the fire ending abnormally outside the job body.
    #[error("job {job_id} fire aborted: {reason}")]
    Aborted { job_id: String, reason: String },
}

/// Errors from the timing engine itself.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("timing engine is already running")]
    AlreadyRunning,

    #[error("timing engine has been shut down")]
    Closed,

    #[error("timing engine failed to start: {0}")]
    Startup(String),
}

/// Errors while enumerating candidate job sources.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid job source pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors while forwarding an alert.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("alert delivery failed: {0}")]
    Delivery(String),

    #[error("alert delivery timed out after {0:?}")]
    Timeout(Duration),

    #[error("alert sink panicked: {0}")]
    Panicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_discovery_error_display() {
        let err = DiscoveryError::new(
            "NewsfeedTask",
            "jobs/newsfeed_task.toml",
            DiscoveryCause::Unresolved,
        );
        let msg = err.to_string();
        assert!(msg.contains("NewsfeedTask"));
        assert!(msg.contains("jobs/newsfeed_task.toml"));
        assert!(msg.contains("no job factory"));
    }

    #[test]
    fn test_discovery_error_keeps_load_chain() {
        let cause = anyhow::anyhow!("missing field `schedule`").context("invalid manifest");
        let err = DiscoveryError::new("Broken", "jobs/broken.toml", cause);
        assert!(err.to_string().contains("invalid manifest"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_duplicate_cause_display() {
        let cause = DiscoveryCause::Duplicate {
            first_source: "jobs/a/report.toml".to_string(),
        };
        assert!(cause.to_string().contains("jobs/a/report.toml"));
    }

    #[test]
    fn test_registration_error_job_id() {
        let err = RegistrationError::InvalidRecurrence {
            job_id: "Report".to_string(),
            rule: "every banana".to_string(),
            reason: "bad duration".to_string(),
        };
        assert_eq!(err.job_id(), "Report");
        assert!(err.to_string().contains("every banana"));

        assert_eq!(RegistrationError::AlreadyRegistered("X".into()).job_id(), "X");
        assert_eq!(RegistrationError::EngineClosed("Y".into()).job_id(), "Y");
    }

    #[test]
    fn test_execution_error_source() {
        let err = ExecutionError::Failed {
            job_id: "Report".to_string(),
            source: anyhow::anyhow!("connection refused"),
        };
        assert!(err.to_string().contains("connection refused"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_alert_error_timeout_display() {
        let err = AlertError::Timeout(Duration::from_secs(5));
        assert!(err.to_string().contains("5s"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: SourceError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
