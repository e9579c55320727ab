//! Fault boundary.
//!
//! Every unit of work a job can fail in (loading one candidate, registering
//! one job, one fire of one job) runs inside the boundary. A failure is turned
//! into a [`FailureRecord`], logged, optionally forwarded to the alert sink,
//! and never propagated further.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::FutureExt;
use taskherd_protocols::{
    AlertError, AlertSink, DiscoveryCause, DiscoveryError, ExecutionError, FailureHook,
    FailurePhase, FailureRecord, JobBody, JobDescriptor, RegistrationError,
};
use tracing::{debug, error, warn};

/// Settings the boundary needs from the daemon configuration.
#[derive(Debug, Clone)]
pub struct FaultBoundaryConfig {
    /// Current deployment environment, used in alert summaries.
    pub environment: String,
    /// Whether execution failures are forwarded to the alert sink.
    pub production_like: bool,
    /// Upper bound on a single alert delivery.
    pub alert_timeout: Duration,
    /// Also alert on discovery failures (only when production-like).
    pub alert_on_discovery_failure: bool,
}

impl Default for FaultBoundaryConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            production_like: false,
            alert_timeout: Duration::from_secs(10),
            alert_on_discovery_failure: false,
        }
    }
}

impl FaultBoundaryConfig {
    pub fn new(environment: impl Into<String>, production_like: bool) -> Self {
        Self {
            environment: environment.into(),
            production_like,
            ..Default::default()
        }
    }
}

/// State of one invocation. `Caught` ends the invocation, never the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Running,
    Succeeded,
    Caught,
}

/// Result of one contained fire.
#[derive(Debug, Clone)]
pub enum FireOutcome {
    Succeeded,
    Caught(FailureRecord),
}

impl FireOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FireOutcome::Succeeded)
    }
}

/// Per-job execution counters.
#[derive(Debug, Clone, Default)]
pub struct JobStats {
    pub fires: u64,
    pub failures: u64,
    pub last_state: Option<InvocationState>,
    pub last_failure: Option<FailureRecord>,
}

/// Catches, records and reports failures for every job.
pub struct FaultBoundary {
    config: FaultBoundaryConfig,
    alert_sink: Arc<dyn AlertSink>,
    stats: DashMap<String, JobStats>,
    total_failures: AtomicU64,
}

impl FaultBoundary {
    pub fn new(config: FaultBoundaryConfig, alert_sink: Arc<dyn AlertSink>) -> Self {
        Self {
            config,
            alert_sink,
            stats: DashMap::new(),
            total_failures: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &FaultBoundaryConfig {
        &self.config
    }

    /// Load one candidate, converting a panic into a [`DiscoveryError`].
    pub fn contain_discovery<F>(
        &self,
        identity_guess: &str,
        location: &str,
        load: F,
    ) -> Result<JobDescriptor, DiscoveryError>
    where
        F: FnOnce() -> Result<JobDescriptor, DiscoveryError>,
    {
        let result = match panic::catch_unwind(AssertUnwindSafe(load)) {
            Ok(result) => result,
            Err(payload) => Err(DiscoveryError::new(
                identity_guess,
                location,
                DiscoveryCause::Panicked(panic_message(payload.as_ref())),
            )),
        };

        if let Err(err) = &result {
            self.record_discovery_failure(err);
        }
        result
    }

    /// Record a discovery failure detected outside [`contain_discovery`](Self::contain_discovery).
    pub fn record_discovery_failure(&self, err: &DiscoveryError) -> FailureRecord {
        let record = FailureRecord::from_error(FailurePhase::Discovery, &err.identity_guess, err);
        self.report(&record);
        self.total_failures.fetch_add(1, Ordering::Relaxed);

        if self.config.production_like && self.config.alert_on_discovery_failure {
            self.spawn_alert(record.summary(&self.config.environment));
        }
        record
    }

    /// Register one job, converting a panic into a [`RegistrationError`].
    pub fn contain_registration<T, F>(&self, job_id: &str, register: F) -> Result<T, RegistrationError>
    where
        F: FnOnce() -> Result<T, RegistrationError>,
    {
        let result = match panic::catch_unwind(AssertUnwindSafe(register)) {
            Ok(result) => result,
            Err(payload) => Err(RegistrationError::Panicked {
                job_id: job_id.to_string(),
                message: panic_message(payload.as_ref()),
            }),
        };

        if let Err(err) = &result {
            let record = FailureRecord::from_error(FailurePhase::Registration, job_id, err);
            self.report(&record);
            self.total_failures.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    /// Run one fire of a job body. Never fails and never panics.
    pub async fn execute(&self, job_id: &str, body: &dyn JobBody) -> FireOutcome {
        self.update(job_id, |stats| {
            stats.fires += 1;
            stats.last_state = Some(InvocationState::Running);
        });

        let error = match AssertUnwindSafe(body.run()).catch_unwind().await {
            Ok(Ok(())) => {
                self.update(job_id, |stats| stats.last_state = Some(InvocationState::Succeeded));
                debug!(job = job_id, "Job finished");
                return FireOutcome::Succeeded;
            }
            Ok(Err(source)) => ExecutionError::Failed {
                job_id: job_id.to_string(),
                source,
            },
            Err(payload) => ExecutionError::Panicked {
                job_id: job_id.to_string(),
                message: panic_message(payload.as_ref()),
            },
        };

        let record = FailureRecord::from_error(FailurePhase::Execution, job_id, &error);
        self.record_execution_failure(&record);

        if self.config.production_like {
            let summary = record.summary(&self.config.environment);
            let _ = deliver_alert(self.alert_sink.as_ref(), &summary, self.config.alert_timeout).await;
        }

        FireOutcome::Caught(record)
    }

    /// Counters for one job, if it has fired or failed at least once.
    pub fn stats(&self, job_id: &str) -> Option<JobStats> {
        self.stats.get(job_id).map(|s| s.clone())
    }

    /// Failures caught across all phases since startup.
    pub fn total_failures(&self) -> u64 {
        self.total_failures.load(Ordering::Relaxed)
    }

    fn record_execution_failure(&self, record: &FailureRecord) {
        self.report(record);
        self.total_failures.fetch_add(1, Ordering::Relaxed);
        self.update(&record.job_identity, |stats| {
            stats.failures += 1;
            stats.last_state = Some(InvocationState::Caught);
            stats.last_failure = Some(record.clone());
        });
    }

    fn update(&self, job_id: &str, f: impl FnOnce(&mut JobStats)) {
        let mut entry = self.stats.entry(job_id.to_string()).or_default();
        f(entry.value_mut());
    }

    fn report(&self, record: &FailureRecord) {
        error!(
            phase = %record.phase,
            job = %record.job_identity,
            "Error in {} of job {}: {}",
            record.phase,
            record.job_identity,
            record.cause
        );
        if !record.causal_trace.is_empty() {
            error!(job = %record.job_identity, "Caused by:\n{}", record.trace());
        }
    }

    fn spawn_alert(&self, summary: String) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let sink = self.alert_sink.clone();
                let timeout = self.config.alert_timeout;
                handle.spawn(async move {
                    let _ = deliver_alert(sink.as_ref(), &summary, timeout).await;
                });
            }
            Err(_) => warn!("No runtime to deliver alert, dropping: {}", summary),
        }
    }
}

/// Failures the timing engine observes outside a contained fire.
impl FailureHook for FaultBoundary {
    fn on_job_failure(&self, job_id: &str, cause: &str) {
        let record = FailureRecord::from_message(FailurePhase::Execution, job_id, cause);
        self.record_execution_failure(&record);

        if self.config.production_like {
            self.spawn_alert(record.summary(&self.config.environment));
        }
    }
}

/// Forward a summary to the alert sink.
///
/// Timeouts, errors and panics are logged and returned; they never escape as
/// a panic.
pub async fn deliver_alert(
    sink: &dyn AlertSink,
    summary: &str,
    timeout: Duration,
) -> Result<(), AlertError> {
    let attempt = AssertUnwindSafe(sink.alert(summary)).catch_unwind();
    let result = match tokio::time::timeout(timeout, attempt).await {
        Ok(Ok(result)) => result,
        Ok(Err(payload)) => Err(AlertError::Panicked(panic_message(payload.as_ref()))),
        Err(_) => Err(AlertError::Timeout(timeout)),
    };

    match &result {
        Ok(()) => debug!(sink = sink.name(), "Alert delivered"),
        Err(e) => warn!(sink = sink.name(), "Failed to deliver alert: {}", e),
    }
    result
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "boundary_tests.rs"]
mod tests;
