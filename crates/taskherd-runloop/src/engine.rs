//! CronEngine - recurring timer engine driving job callbacks.
//!
//! Each registered job gets one supervisor task that sleeps until the next
//! fire, runs the callback in its own task and waits for it to finish before
//! computing the next fire. A job therefore never overlaps itself; fires that
//! fall due while a previous fire is still running are skipped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use taskherd_protocols::{
    EngineError, FailureHook, JobCallback, RecurrenceRule, RegistrationError, RegistrationHandle,
    TimingEngine,
};
use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinError};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::recurrence::Recurrence;

/// Default time allowed for in-flight fires at shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

struct ScheduledJob {
    id: String,
    recurrence: Recurrence,
    callback: JobCallback,
    token: CancellationToken,
    fire_count: AtomicU64,
    next_fire: Mutex<Option<DateTime<Utc>>>,
}

enum EngineState {
    Idle,
    Running(Handle),
    Stopped,
}

struct Inner {
    state: EngineState,
    jobs: Vec<Arc<ScheduledJob>>,
}

struct Shared {
    inner: Mutex<Inner>,
    hook: RwLock<Option<Arc<dyn FailureHook>>>,
    in_flight: DashMap<String, AbortHandle>,
    tracker: TaskTracker,
    root: CancellationToken,
    shutdown_timeout: Duration,
}

/// Cron and interval based timing engine.
pub struct CronEngine {
    shared: Arc<Shared>,
}

impl CronEngine {
    pub fn new(shutdown_timeout: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: EngineState::Idle,
                    jobs: Vec::new(),
                }),
                hook: RwLock::new(None),
                in_flight: DashMap::new(),
                tracker: TaskTracker::new(),
                root: CancellationToken::new(),
                shutdown_timeout,
            }),
        }
    }

    /// Registered job ids, in registration order.
    pub fn job_ids(&self) -> Vec<String> {
        self.shared.inner.lock().jobs.iter().map(|j| j.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.shared.inner.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fire_count(&self, job_id: &str) -> Option<u64> {
        self.find(job_id).map(|j| j.fire_count.load(Ordering::Relaxed))
    }

    /// Next scheduled fire, if the job is scheduled and the engine running.
    pub fn next_fire_time(&self, job_id: &str) -> Option<DateTime<Utc>> {
        self.find(job_id).and_then(|j| *j.next_fire.lock())
    }

    fn find(&self, job_id: &str) -> Option<Arc<ScheduledJob>> {
        self.shared
            .inner
            .lock()
            .jobs
            .iter()
            .find(|j| j.id == job_id)
            .cloned()
    }

    fn spawn_job(shared: &Arc<Shared>, job: Arc<ScheduledJob>, handle: &Handle) {
        let shared_clone = shared.clone();
        shared
            .tracker
            .spawn_on(Self::supervise(shared_clone, job), handle);
    }

    async fn supervise(shared: Arc<Shared>, job: Arc<ScheduledJob>) {
        let mut first = true;
        loop {
            if job.token.is_cancelled() {
                break;
            }
            let now = Utc::now();
            let Some(delay) = job.recurrence.next_delay(now, first) else {
                if job.recurrence.is_one_shot() {
                    debug!("One-shot job {} has fired", job.id);
                } else {
                    debug!("Job {} has no upcoming fire", job.id);
                }
                break;
            };
            first = false;
            *job.next_fire.lock() = chrono::TimeDelta::from_std(delay)
                .ok()
                .and_then(|d| now.checked_add_signed(d));

            tokio::select! {
                biased;
                _ = job.token.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }

            let fires = job.fire_count.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(job = %job.id, fires, "Firing job");

            let fire = shared.tracker.spawn((job.callback)());
            shared.in_flight.insert(job.id.clone(), fire.abort_handle());
            let result = fire.await;
            shared.in_flight.remove(&job.id);

            if let Err(e) = result {
                shared.notify_failure(&job.id, e);
            }
        }
        *job.next_fire.lock() = None;
    }
}

impl Shared {
    fn notify_failure(&self, job_id: &str, error: JoinError) {
        let cause = if error.is_panic() {
            format!("fire panicked: {}", panic_message(error.into_panic()))
        } else if self.root.is_cancelled() {
            "fire aborted at shutdown".to_string()
        } else {
            format!("fire task ended abnormally: {}", error)
        };
        warn!(job = job_id, "{}", cause);

        let hook = self.hook.read().clone();
        if let Some(hook) = hook {
            hook.on_job_failure(job_id, &cause);
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => message.to_string(),
            Err(_) => "unknown panic payload".to_string(),
        },
    }
}

impl Default for CronEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SHUTDOWN_TIMEOUT)
    }
}

#[async_trait]
impl TimingEngine for CronEngine {
    fn register(
        &self,
        job_id: &str,
        rule: &RecurrenceRule,
        callback: JobCallback,
    ) -> Result<RegistrationHandle, RegistrationError> {
        let recurrence =
            Recurrence::parse(rule.as_str()).map_err(|e| RegistrationError::InvalidRecurrence {
                job_id: job_id.to_string(),
                rule: rule.to_string(),
                reason: e.to_string(),
            })?;

        let mut inner = self.shared.inner.lock();
        if matches!(inner.state, EngineState::Stopped) {
            return Err(RegistrationError::EngineClosed(job_id.to_string()));
        }
        if inner.jobs.iter().any(|j| j.id == job_id) {
            return Err(RegistrationError::AlreadyRegistered(job_id.to_string()));
        }

        let token = self.shared.root.child_token();
        let job = Arc::new(ScheduledJob {
            id: job_id.to_string(),
            recurrence,
            callback,
            token: token.clone(),
            fire_count: AtomicU64::new(0),
            next_fire: Mutex::new(None),
        });
        debug!("Registered job {} with {}", job_id, job.recurrence);

        if let EngineState::Running(handle) = &inner.state {
            Self::spawn_job(&self.shared, job.clone(), handle);
        }
        inner.jobs.push(job);

        Ok(RegistrationHandle::new(job_id, token))
    }

    fn set_failure_hook(&self, hook: Arc<dyn FailureHook>) {
        *self.shared.hook.write() = Some(hook);
    }

    async fn run(&self, shutdown: CancellationToken) -> Result<(), EngineError> {
        let count = {
            let mut inner = self.shared.inner.lock();
            match inner.state {
                EngineState::Running(_) => return Err(EngineError::AlreadyRunning),
                EngineState::Stopped => return Err(EngineError::Closed),
                EngineState::Idle => {}
            }
            let handle = Handle::current();
            for job in &inner.jobs {
                Self::spawn_job(&self.shared, job.clone(), &handle);
            }
            inner.state = EngineState::Running(handle);
            inner.jobs.len()
        };
        info!("Timing engine running with {} jobs", count);

        shutdown.cancelled().await;

        self.shared.inner.lock().state = EngineState::Stopped;
        self.shared.root.cancel();
        self.shared.tracker.close();

        let in_flight = self.shared.in_flight.len();
        if in_flight > 0 {
            info!("Waiting for {} in-flight fires to finish", in_flight);
        }
        if tokio::time::timeout(self.shared.shutdown_timeout, self.shared.tracker.wait())
            .await
            .is_err()
        {
            warn!(
                "Fires still running after {:?}, aborting",
                self.shared.shutdown_timeout
            );
            let stuck: Vec<AbortHandle> = self
                .shared
                .in_flight
                .iter()
                .map(|entry| entry.value().clone())
                .collect();
            for fire in stuck {
                fire.abort();
            }
            // supervisors report the aborted fires before exiting
            self.shared.tracker.wait().await;
        }

        info!("Timing engine stopped");
        Ok(())
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
