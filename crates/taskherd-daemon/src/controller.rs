//! Daemon controller: the top-level lifecycle.
//!
//! `start` runs discovery, filtering and registration in that order, then
//! hands control to the timing engine until shutdown.

use std::sync::Arc;

use parking_lot::Mutex;
use taskherd_core::{
    filter, Decision, FaultBoundary, FilterSpec, JobRegistry, RegistrationTable,
    SchedulerAdapter, SelectionOutcome,
};
use taskherd_protocols::{JobSources, TimingEngine};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::args::{StartupArgs, StartupMode};
use crate::error::{DaemonError, DaemonState};

/// Counts from one startup pass.
#[derive(Debug, Clone, Default)]
pub struct StartupSummary {
    pub discovered: usize,
    pub discovery_failures: usize,
    pub runnable: usize,
    pub registered: usize,
    pub registration_failures: usize,
    /// Jobs that were discovered but will not run, with the reason.
    pub excluded: Vec<Decision>,
}

/// How `start` returned.
#[derive(Debug)]
pub enum StartOutcome {
    /// No-op mode: nothing was discovered or scheduled.
    NoOp,
    /// The run loop ran and was shut down.
    Stopped(StartupSummary),
}

/// Jobs registered and ready for the run loop.
pub struct Prepared {
    pub table: RegistrationTable,
    pub summary: StartupSummary,
}

/// Owns the startup pipeline and the run loop.
pub struct DaemonController {
    environment: String,
    sources: Arc<dyn JobSources>,
    registry: JobRegistry,
    adapter: SchedulerAdapter,
    boundary: Arc<FaultBoundary>,
    engine: Arc<dyn TimingEngine>,
    shutdown: CancellationToken,
    state: Mutex<DaemonState>,
}

impl DaemonController {
    pub fn new(
        sources: Arc<dyn JobSources>,
        registry: JobRegistry,
        engine: Arc<dyn TimingEngine>,
        boundary: Arc<FaultBoundary>,
    ) -> Self {
        Self {
            environment: boundary.config().environment.clone(),
            sources,
            registry,
            adapter: SchedulerAdapter::new(boundary.clone()),
            boundary,
            engine,
            shutdown: CancellationToken::new(),
            state: Mutex::new(DaemonState::Idle),
        }
    }

    /// Use an externally owned shutdown token, e.g. one wired to signals.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Token that stops the run loop when cancelled.
    pub fn shutdown_handle(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn state(&self) -> DaemonState {
        *self.state.lock()
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Failure counters for every job this controller supervises.
    pub fn boundary(&self) -> &Arc<FaultBoundary> {
        &self.boundary
    }

    /// Start the daemon. Blocks until shutdown unless `args` select no-op mode.
    pub async fn start(&self, args: &StartupArgs) -> Result<StartOutcome, DaemonError> {
        let spec = match &args.mode {
            StartupMode::NoOp => {
                info!("No-op startup requested; not scheduling anything");
                return Ok(StartOutcome::NoOp);
            }
            StartupMode::Run(spec) => spec,
        };

        self.transition(DaemonState::Idle, DaemonState::Starting)?;
        info!("Starting scheduler in {}", self.environment);

        let prepared = match self.prepare(spec) {
            Ok(prepared) => prepared,
            Err(e) => {
                *self.state.lock() = DaemonState::Stopped;
                return Err(e);
            }
        };

        self.transition(DaemonState::Starting, DaemonState::Running)?;
        let result = self.engine.run(self.shutdown.clone()).await;

        *self.state.lock() = DaemonState::ShuttingDown;
        prepared.table.cancel_all();
        *self.state.lock() = DaemonState::Stopped;

        result?;
        info!("Scheduler stopped");
        Ok(StartOutcome::Stopped(prepared.summary))
    }

    /// Discover, filter and register jobs without entering the run loop.
    pub fn prepare(&self, spec: &FilterSpec) -> Result<Prepared, DaemonError> {
        let locations = self.sources.enumerate()?;
        let discovery = self.registry.discover(locations.as_slice());

        let selection = filter::select(&discovery.jobs, spec, &self.environment);
        for decision in selection.excluded() {
            log_exclusion(decision, &self.environment);
        }

        let table = self.adapter.register(&selection.runnable, self.engine.as_ref());

        let summary = StartupSummary {
            discovered: discovery.jobs.len(),
            discovery_failures: discovery.errors.len(),
            runnable: selection.runnable.len(),
            registered: table.len(),
            registration_failures: table.failures().len(),
            excluded: selection.excluded().cloned().collect(),
        };

        info!(
            "{} jobs scheduled ({} discovered, {} failed to load, {} excluded, {} rejected)",
            summary.registered,
            summary.discovered,
            summary.discovery_failures,
            summary.excluded.len(),
            summary.registration_failures
        );

        Ok(Prepared { table, summary })
    }

    fn transition(&self, from: DaemonState, to: DaemonState) -> Result<(), DaemonError> {
        let mut state = self.state.lock();
        if *state != from {
            return Err(DaemonError::InvalidStateTransition { from: *state, to });
        }
        *state = to;
        Ok(())
    }
}

fn log_exclusion(decision: &Decision, environment: &str) {
    match decision.outcome {
        SelectionOutcome::FilteredOut(_) => info!(
            job = %decision.identity,
            "Not scheduling {} ({}): {}",
            decision.identity,
            decision.source,
            decision.outcome
        ),
        SelectionOutcome::SkippedEnvironment => info!(
            job = %decision.identity,
            "{} configured not to run in {} environment; skipping",
            decision.identity,
            environment
        ),
        SelectionOutcome::Runnable => {}
    }
}
