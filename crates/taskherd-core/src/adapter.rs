//! Scheduler adapter: binds runnable jobs to the timing engine.

use std::sync::Arc;

use futures::FutureExt;
use taskherd_protocols::{
    JobCallback, JobDescriptor, RegistrationError, RegistrationHandle, TimingEngine,
};
use tracing::info;

use crate::boundary::FaultBoundary;

/// A job the engine accepted.
#[derive(Debug, Clone)]
pub struct RegisteredJob {
    pub descriptor: JobDescriptor,
    pub handle: RegistrationHandle,
}

/// Every job registered at startup, held for the process lifetime.
#[derive(Debug, Default)]
pub struct RegistrationTable {
    jobs: Vec<RegisteredJob>,
    failures: Vec<RegistrationError>,
}

impl RegistrationTable {
    pub fn jobs(&self) -> &[RegisteredJob] {
        &self.jobs
    }

    /// Jobs the engine refused, in runnable order.
    pub fn failures(&self) -> &[RegistrationError] {
        &self.failures
    }

    pub fn identities(&self) -> Vec<&str> {
        self.jobs.iter().map(|j| j.descriptor.identity()).collect()
    }

    pub fn handle(&self, identity: &str) -> Option<&RegistrationHandle> {
        self.jobs
            .iter()
            .find(|j| j.descriptor.identity() == identity)
            .map(|j| &j.handle)
    }

    /// Stop scheduling every job. Used at shutdown only.
    pub fn cancel_all(&self) {
        for job in &self.jobs {
            job.handle.cancel();
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Registers jobs one by one, each wrapped by the fault boundary.
pub struct SchedulerAdapter {
    boundary: Arc<FaultBoundary>,
}

impl SchedulerAdapter {
    pub fn new(boundary: Arc<FaultBoundary>) -> Self {
        Self { boundary }
    }

    /// Register every runnable job. A rejected job never blocks the rest.
    pub fn register(
        &self,
        runnable: &[JobDescriptor],
        engine: &dyn TimingEngine,
    ) -> RegistrationTable {
        engine.set_failure_hook(self.boundary.clone());

        let mut table = RegistrationTable::default();
        for job in runnable {
            let callback = self.callback_for(job);
            let registered = self.boundary.contain_registration(job.identity(), || {
                engine.register(job.identity(), job.recurrence(), callback)
            });

            match registered {
                Ok(handle) => {
                    info!("Scheduled job {} ({})", job.identity(), job.recurrence());
                    table.jobs.push(RegisteredJob {
                        descriptor: job.clone(),
                        handle,
                    });
                }
                Err(err) => table.failures.push(err),
            }
        }
        table
    }

    /// Callback running the job body once per fire inside the boundary.
    pub fn callback_for(&self, job: &JobDescriptor) -> JobCallback {
        let boundary = self.boundary.clone();
        let body = job.body().clone();
        let job_id: Arc<str> = Arc::from(job.identity());

        Arc::new(move || {
            let boundary = boundary.clone();
            let body = body.clone();
            let job_id = job_id.clone();
            async move {
                boundary.execute(&job_id, body.as_ref()).await;
            }
            .boxed()
        })
    }
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
