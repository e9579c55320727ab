//! Job protocol definitions.
//!
//! A job is described once at startup by a [`JobDescriptor`] and executed on
//! every scheduled fire through its [`JobBody`].

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The executable part of a job.
///
/// Bodies are opaque to the supervisor: once started a run is never
/// interrupted, and any error it returns is contained by the fault boundary.
#[async_trait]
pub trait JobBody: Send + Sync {
    /// Run the job once.
    async fn run(&self) -> anyhow::Result<()>;
}

/// Adapter turning an async closure into a [`JobBody`].
pub struct FnJob<F> {
    f: F,
}

impl<F> FnJob<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> JobBody for FnJob<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn run(&self) -> anyhow::Result<()> {
        (self.f)().await
    }
}

/// Wrap an async closure as a shareable job body.
pub fn job_fn<F, Fut>(f: F) -> Arc<dyn JobBody>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(FnJob::new(f))
}

/// Recurrence rule handed unmodified to the timing engine.
///
/// The supervisor core never interprets the rule; only the engine parses it
/// at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecurrenceRule(String);

impl RecurrenceRule {
    pub fn new(rule: impl Into<String>) -> Self {
        Self(rule.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecurrenceRule {
    fn from(rule: &str) -> Self {
        Self::new(rule)
    }
}

/// Immutable description of one schedulable job.
#[derive(Clone)]
pub struct JobDescriptor {
    identity: String,
    source: String,
    recurrence: RecurrenceRule,
    environments: Option<BTreeSet<String>>,
    body: Arc<dyn JobBody>,
}

impl JobDescriptor {
    /// Create a descriptor eligible in every environment.
    pub fn new(
        identity: impl Into<String>,
        source: impl Into<String>,
        recurrence: impl Into<RecurrenceRule>,
        body: Arc<dyn JobBody>,
    ) -> Self {
        Self {
            identity: identity.into(),
            source: source.into(),
            recurrence: recurrence.into(),
            environments: None,
            body,
        }
    }

    /// Restrict the job to the given environments.
    pub fn with_environments<I, S>(mut self, environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environments = Some(environments.into_iter().map(Into::into).collect());
        self
    }

    /// Canonical job name, e.g. `NewsfeedTask`.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Source location the job was discovered from. Filters match on this key.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn recurrence(&self) -> &RecurrenceRule {
        &self.recurrence
    }

    /// Environments the job is restricted to, `None` meaning everywhere.
    pub fn environments(&self) -> Option<&BTreeSet<String>> {
        self.environments.as_ref()
    }

    pub fn body(&self) -> &Arc<dyn JobBody> {
        &self.body
    }

    /// Whether the job's own environment constraint admits `environment`.
    pub fn runs_in(&self, environment: &str) -> bool {
        match &self.environments {
            None => true,
            Some(allowed) => allowed.contains(environment),
        }
    }
}

impl fmt::Debug for JobDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobDescriptor")
            .field("identity", &self.identity)
            .field("source", &self.source)
            .field("recurrence", &self.recurrence)
            .field("environments", &self.environments)
            .finish_non_exhaustive()
    }
}
