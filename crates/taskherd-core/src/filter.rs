//! Environment filter.
//!
//! Decides the runnable subset of discovered jobs from the operator's
//! `--only` / `--except` lists and each job's own environment constraint.

use std::fmt;

use taskherd_protocols::JobDescriptor;

/// Operator-supplied inclusion and exclusion lists.
///
/// Entries are literal, case-sensitive substrings matched against a job's
/// source location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub only: Vec<String>,
    pub except: Vec<String>,
}

impl FilterSpec {
    pub fn new<I, J, S, T>(only: I, except: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            only: only.into_iter().map(Into::into).collect(),
            except: except.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.only.is_empty() && self.except.is_empty()
    }

    /// Operator decision for one discovery key. `None` means not filtered.
    pub fn check(&self, key: &str) -> Option<FilterReason> {
        if !self.only.is_empty() && !self.only.iter().any(|term| key.contains(term.as_str())) {
            return Some(FilterReason::NotOnly);
        }
        if self.except.iter().any(|term| key.contains(term.as_str())) {
            return Some(FilterReason::Excepted);
        }
        None
    }
}

/// Why an operator filter dropped a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterReason {
    /// `--only` was given and no entry matched.
    NotOnly,
    /// An `--except` entry matched.
    Excepted,
}

/// Outcome of evaluating one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Runnable,
    FilteredOut(FilterReason),
    /// The job's own environment constraint excludes the current environment.
    SkippedEnvironment,
}

impl SelectionOutcome {
    pub fn is_runnable(&self) -> bool {
        matches!(self, SelectionOutcome::Runnable)
    }
}

impl fmt::Display for SelectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionOutcome::Runnable => write!(f, "runnable"),
            SelectionOutcome::FilteredOut(FilterReason::NotOnly) => {
                write!(f, "filtered out (not matched by --only)")
            }
            SelectionOutcome::FilteredOut(FilterReason::Excepted) => {
                write!(f, "filtered out (matched by --except)")
            }
            SelectionOutcome::SkippedEnvironment => write!(f, "skipped (environment mismatch)"),
        }
    }
}

/// Recorded outcome for one discovered job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub identity: String,
    pub source: String,
    pub outcome: SelectionOutcome,
}

/// Result of [`select`].
#[derive(Debug, Clone)]
pub struct Selection {
    /// Runnable jobs, in discovery order.
    pub runnable: Vec<JobDescriptor>,
    /// One decision per input job, in discovery order.
    pub decisions: Vec<Decision>,
}

impl Selection {
    /// Decisions for jobs that will not run.
    pub fn excluded(&self) -> impl Iterator<Item = &Decision> {
        self.decisions.iter().filter(|d| !d.outcome.is_runnable())
    }
}

/// Evaluate a single job. Operator filters take precedence over the job's
/// environment constraint.
pub fn evaluate(job: &JobDescriptor, spec: &FilterSpec, environment: &str) -> SelectionOutcome {
    if let Some(reason) = spec.check(job.source()) {
        return SelectionOutcome::FilteredOut(reason);
    }
    if !job.runs_in(environment) {
        return SelectionOutcome::SkippedEnvironment;
    }
    SelectionOutcome::Runnable
}

/// Select the runnable subset of `jobs`, preserving order.
pub fn select(jobs: &[JobDescriptor], spec: &FilterSpec, environment: &str) -> Selection {
    let mut runnable = Vec::new();
    let mut decisions = Vec::with_capacity(jobs.len());

    for job in jobs {
        let outcome = evaluate(job, spec, environment);
        if outcome.is_runnable() {
            runnable.push(job.clone());
        }
        decisions.push(Decision {
            identity: job.identity().to_string(),
            source: job.source().to_string(),
            outcome,
        });
    }

    Selection {
        runnable,
        decisions,
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
