//! Error types for the timing engine.

use thiserror::Error;

/// Errors parsing a recurrence rule.
#[derive(Debug, Error)]
pub enum RecurrenceError {
    /// The rule is blank.
    #[error("Empty recurrence rule")]
    Empty,

    /// Not a valid cron expression.
    #[error("Invalid cron expression {expr:?}: {reason}")]
    Cron { expr: String, reason: String },

    /// The duration after `every` / `in` could not be parsed.
    #[error("Invalid duration {input:?}: {reason}")]
    Duration { input: String, reason: String },

    /// `every 0s` would fire in a tight loop.
    #[error("Interval must be greater than zero")]
    ZeroInterval,
}
