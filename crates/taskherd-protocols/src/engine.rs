//! Timing engine protocol.
//!
//! The timing engine owns recurrence parsing, next-fire computation and the
//! run loop. The supervisor core only hands it `(rule, callback)` pairs.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::{EngineError, RegistrationError};
use crate::job::RecurrenceRule;

/// Future produced by one fire of a job callback.
pub type FireFuture = BoxFuture<'static, ()>;

/// Callback invoked by the engine once per fire.
pub type JobCallback = Arc<dyn Fn() -> FireFuture + Send + Sync>;

/// Hook the engine calls when it observes a fire ending abnormally
/// outside the callback's own error handling.
pub trait FailureHook: Send + Sync {
    fn on_job_failure(&self, job_id: &str, cause: &str);
}

/// Handle to a registered job, used to cancel it at shutdown.
#[derive(Debug, Clone)]
pub struct RegistrationHandle {
    job_id: String,
    token: CancellationToken,
}

impl RegistrationHandle {
    pub fn new(job_id: impl Into<String>, token: CancellationToken) -> Self {
        Self {
            job_id: job_id.into(),
            token,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Stop scheduling further fires. An in-flight fire is not interrupted.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Recurring-timer engine.
#[async_trait]
pub trait TimingEngine: Send + Sync {
    /// Bind a recurrence rule to a callback.
    fn register(
        &self,
        job_id: &str,
        rule: &RecurrenceRule,
        callback: JobCallback,
    ) -> Result<RegistrationHandle, RegistrationError>;

    /// Install the hook notified about abnormally ended fires.
    fn set_failure_hook(&self, hook: Arc<dyn FailureHook>);

    /// Drive callbacks until `shutdown` is cancelled, then drain.
    async fn run(&self, shutdown: CancellationToken) -> Result<(), EngineError>;
}
