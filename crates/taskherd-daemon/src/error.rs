//! Daemon-related errors.

use taskherd_protocols::{EngineError, SourceError};
use thiserror::Error;

/// Errors that abort daemon startup.
///
/// Failures of individual jobs never surface here; the fault boundary
/// contains them.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Job sources could not be enumerated.
    #[error("Failed to enumerate job sources: {0}")]
    Sources(#[from] SourceError),

    /// The timing engine refused to run.
    #[error("Timing engine error: {0}")]
    Engine(#[from] EngineError),

    /// Failed to set up signal handlers.
    #[error("Failed to set up signal handlers: {0}")]
    SignalSetup(String),

    /// Invalid daemon state transition.
    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition { from: DaemonState, to: DaemonState },
}

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    /// Initial state.
    Idle,
    /// Discovering, filtering and registering jobs.
    Starting,
    /// The timing engine owns the run loop.
    Running,
    /// Draining in-flight fires.
    ShuttingDown,
    /// Run loop has returned.
    Stopped,
}

impl std::fmt::Display for DaemonState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DaemonState::Idle => write!(f, "idle"),
            DaemonState::Starting => write!(f, "starting"),
            DaemonState::Running => write!(f, "running"),
            DaemonState::ShuttingDown => write!(f, "shutting_down"),
            DaemonState::Stopped => write!(f, "stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daemon_state_display() {
        assert_eq!(DaemonState::Idle.to_string(), "idle");
        assert_eq!(DaemonState::Starting.to_string(), "starting");
        assert_eq!(DaemonState::Running.to_string(), "running");
        assert_eq!(DaemonState::ShuttingDown.to_string(), "shutting_down");
        assert_eq!(DaemonState::Stopped.to_string(), "stopped");
    }

    #[test]
    fn test_invalid_state_transition() {
        let err = DaemonError::InvalidStateTransition {
            from: DaemonState::Running,
            to: DaemonState::Starting,
        };
        let msg = err.to_string();
        assert!(msg.contains("Running"));
        assert!(msg.contains("Starting"));
    }

    #[test]
    fn test_engine_error_conversion() {
        let err: DaemonError = EngineError::Startup("no runtime".to_string()).into();
        assert!(err.to_string().contains("no runtime"));
    }

    #[test]
    fn test_source_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DaemonError = SourceError::from(io_err).into();
        assert!(err.to_string().contains("denied"));
    }
}
