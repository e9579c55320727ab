//! taskherd - periodic job supervisor
//!
//! Discovers job definitions, filters them by environment and operator
//! flags, and keeps them firing on their recurrence rules until shutdown.

mod cli;
mod logging;
mod register;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use taskherd_config::{Config, ConfigLoader, ConfigValidator};
use taskherd_core::{FaultBoundary, FaultBoundaryConfig, GlobSources};
use taskherd_daemon::{DaemonController, SignalHandler, StartOutcome, StartupArgs};
use taskherd_runloop::CronEngine;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    cli.apply(&mut config);

    logging::init_tracing(&config.logging)?;

    let warnings = ConfigValidator::validate(&config)?.into_result()?;
    for warning in warnings {
        warn!("{}: {}", warning.path, warning.message);
    }

    let args = StartupArgs::parse(&cli.startup_args);
    let controller = build_controller(&config)?;

    if cli.check {
        return check(&controller, &args);
    }

    if config.daemon.handle_signals {
        SignalHandler::with_token(controller.shutdown_handle()).setup_os_signals()?;
    }

    match controller.start(&args).await? {
        StartOutcome::NoOp => info!("Nothing to do"),
        StartOutcome::Stopped(summary) => info!(
            "Stopped after running {} jobs ({} failures caught)",
            summary.registered,
            controller.boundary().total_failures()
        ),
    }
    Ok(())
}

fn build_controller(config: &Config) -> anyhow::Result<DaemonController> {
    let boundary = Arc::new(FaultBoundary::new(
        FaultBoundaryConfig {
            environment: config.daemon.environment.clone(),
            production_like: config.daemon.is_production_like(),
            alert_timeout: config.alerting.timeout(),
            alert_on_discovery_failure: config.alerting.alert_on_discovery_failure,
        },
        register::alert_sink(&config.alerting),
    ));

    let sources = Arc::new(GlobSources::new(&config.jobs.dir, &config.jobs.pattern));
    let registry = register::build_registry(boundary.clone())?;
    let engine = Arc::new(CronEngine::new(config.daemon.shutdown_timeout()));

    Ok(DaemonController::new(sources, registry, engine, boundary))
}

/// Print what would be scheduled without running anything.
fn check(controller: &DaemonController, args: &StartupArgs) -> anyhow::Result<()> {
    if args.is_no_op() {
        println!("--do-nothing given: no jobs would be scheduled");
        return Ok(());
    }

    let prepared = controller.prepare(&args.filter())?;
    println!("Environment: {}", controller.environment());
    println!();
    for job in prepared.table.jobs() {
        println!(
            "  {:<32} {:<24} {}",
            job.descriptor.identity(),
            job.descriptor.recurrence().as_str(),
            job.descriptor.source()
        );
    }
    for decision in &prepared.summary.excluded {
        println!("  {:<32} {}", decision.identity, decision.outcome);
    }
    for failure in prepared.table.failures() {
        println!("  {:<32} rejected: {}", failure.job_id(), failure);
    }
    println!();
    println!(
        "{} scheduled, {} excluded, {} failed to load, {} rejected",
        prepared.summary.registered,
        prepared.summary.excluded.len(),
        prepared.summary.discovery_failures,
        prepared.summary.registration_failures
    );
    Ok(())
}
