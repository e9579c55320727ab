//! Built-in jobs, loaders and alert sink selection.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use taskherd_alert_webhook::{WebhookAlertConfig, WebhookAlertSink};
use taskherd_config::AlertingConfig;
use taskherd_core::{Candidate, CatalogError, FaultBoundary, JobCatalog, JobRegistry};
use taskherd_jobs_command::ManifestLoader;
use taskherd_protocols::{job_fn, AlertSink, JobDescriptor, NoopAlertSink};

pub(crate) const HEARTBEAT_JOB: &str = "HeartbeatTask";
const HEARTBEAT_RULE: &str = "every 1m";

/// Catalog of jobs compiled into the binary.
///
/// A built-in job is scheduled only when a source with its name (e.g.
/// `heartbeat_task.toml`) exists in the job directory; the file's content
/// is not read.
pub(crate) fn builtin_catalog() -> Result<Arc<JobCatalog>, CatalogError> {
    let catalog = JobCatalog::new();
    catalog.register(HEARTBEAT_JOB, Arc::new(heartbeat))?;
    Ok(Arc::new(catalog))
}

fn heartbeat(candidate: &Candidate) -> anyhow::Result<JobDescriptor> {
    let body = job_fn(|| async {
        info!("Scheduler heartbeat");
        Ok(())
    });
    Ok(JobDescriptor::new(
        &candidate.identity,
        &candidate.location,
        HEARTBEAT_RULE,
        body,
    ))
}

/// Registry resolving built-in jobs first, then command manifests.
pub(crate) fn build_registry(boundary: Arc<FaultBoundary>) -> anyhow::Result<JobRegistry> {
    let catalog = builtin_catalog().context("registering built-in jobs")?;
    Ok(JobRegistry::with_catalog(catalog, boundary).with_loader(Arc::new(ManifestLoader::new())))
}

/// Webhook sink when configured, otherwise a sink that drops alerts.
pub(crate) fn alert_sink(config: &AlertingConfig) -> Arc<dyn AlertSink> {
    let Some(webhook) = webhook_config(config) else {
        return Arc::new(NoopAlertSink);
    };

    match WebhookAlertSink::new(webhook) {
        Ok(sink) => {
            info!("Alerting via webhook {}", sink.url());
            Arc::new(sink)
        }
        Err(e) => {
            warn!("Alerting disabled: {}", e);
            Arc::new(NoopAlertSink)
        }
    }
}

fn webhook_config(config: &AlertingConfig) -> Option<WebhookAlertConfig> {
    let url = config.webhook_url.as_ref()?;
    Some(
        WebhookAlertConfig::new(url.clone())
            .with_timeout(config.timeout())
            .with_headers(config.headers.clone()),
    )
}
