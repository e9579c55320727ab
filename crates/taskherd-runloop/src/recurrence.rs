//! Recurrence rule parsing.
//!
//! Supported forms:
//!
//! - cron expressions with 6 or 7 fields
//!   (`second minute hour day_of_month month day_of_week [year]`)
//! - classic 5-field cron expressions, which fire at second 0
//! - `every <duration>`, e.g. `every 30s` or `every 1h 30m`
//! - `in <duration>`, a one-shot delay from engine start
//!
//! Examples:
//! - `"0 */5 * * * *"` - Every 5 minutes
//! - `"*/15 * * * *"` - Every 15 minutes (5-field form)
//! - `"0 0 9 * * MON-FRI"` - 9 AM on weekdays
//! - `"every 10m"` - Every 10 minutes from engine start

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;

use crate::error::RecurrenceError;

/// A parsed recurrence rule.
#[derive(Debug, Clone)]
pub enum Recurrence {
    Cron(Box<Schedule>),
    Every(Duration),
    Once(Duration),
}

impl Recurrence {
    pub fn parse(rule: &str) -> Result<Self, RecurrenceError> {
        let rule = rule.trim();
        if rule.is_empty() {
            return Err(RecurrenceError::Empty);
        }

        if let Some(interval) = rule.strip_prefix("every ") {
            let interval = parse_duration(interval)?;
            if interval.is_zero() {
                return Err(RecurrenceError::ZeroInterval);
            }
            return Ok(Recurrence::Every(interval));
        }

        if let Some(delay) = rule.strip_prefix("in ") {
            return Ok(Recurrence::Once(parse_duration(delay)?));
        }

        let expr = if rule.split_whitespace().count() == 5 {
            format!("0 {}", rule)
        } else {
            rule.to_string()
        };
        let schedule = Schedule::from_str(&expr).map_err(|e| RecurrenceError::Cron {
            expr: rule.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Recurrence::Cron(Box::new(schedule)))
    }

    /// Delay until the next fire, measured from `now`.
    ///
    /// `first` is true before the job has fired at all. `None` means the rule
    /// has no further fires.
    pub fn next_delay(&self, now: DateTime<Utc>, first: bool) -> Option<Duration> {
        match self {
            Recurrence::Cron(schedule) => schedule
                .after(&now)
                .next()
                .map(|next| (next - now).to_std().unwrap_or(Duration::ZERO)),
            Recurrence::Every(interval) => Some(*interval),
            Recurrence::Once(delay) => first.then_some(*delay),
        }
    }

    pub fn is_one_shot(&self) -> bool {
        matches!(self, Recurrence::Once(_))
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recurrence::Cron(schedule) => write!(f, "cron({})", schedule),
            Recurrence::Every(interval) => {
                write!(f, "every {}", humantime::format_duration(*interval))
            }
            Recurrence::Once(delay) => write!(f, "once in {}", humantime::format_duration(*delay)),
        }
    }
}

fn parse_duration(input: &str) -> Result<Duration, RecurrenceError> {
    let input = input.trim();
    humantime::parse_duration(input).map_err(|e| RecurrenceError::Duration {
        input: input.to_string(),
        reason: e.to_string(),
    })
}
