//! Manifest format and loader.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use taskherd_core::{Candidate, JobFactory, JobLoader};
use taskherd_protocols::{JobDescriptor, RecurrenceRule};

use crate::command::CommandJob;
use crate::error::ManifestError;

pub const MANIFEST_EXTENSION: &str = "toml";

/// One job manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobManifest {
    /// Recurrence rule, passed to the timing engine unmodified.
    pub schedule: RecurrenceRule,
    /// Environments the job may run in. Absent means all.
    #[serde(default)]
    pub environments: Option<Vec<String>>,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub workdir: Option<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Per-run time limit. The child is killed when it expires.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl JobManifest {
    pub fn parse(path: &str, content: &str) -> Result<Self, ManifestError> {
        let manifest: JobManifest = toml::from_str(content).map_err(|source| ManifestError::Parse {
            path: path.to_string(),
            source,
        })?;

        if manifest.command.trim().is_empty() {
            return Err(ManifestError::EmptyCommand(path.to_string()));
        }
        if manifest.schedule.as_str().trim().is_empty() {
            return Err(ManifestError::EmptySchedule(path.to_string()));
        }
        if manifest.timeout_secs == Some(0) {
            return Err(ManifestError::ZeroTimeout(path.to_string()));
        }
        Ok(manifest)
    }

    pub fn load(path: &str) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::parse(path, &content)
    }

    fn into_job(self) -> CommandJob {
        let mut job = CommandJob::new(shellexpand::tilde(&self.command).to_string(), self.args)
            .with_env(self.env);
        if let Some(dir) = self.workdir {
            job = job.with_workdir(PathBuf::from(shellexpand::tilde(&dir).to_string()));
        }
        if let Some(secs) = self.timeout_secs {
            job = job.with_timeout(Duration::from_secs(secs));
        }
        job
    }
}

/// Loads `*.toml` candidates as command jobs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestLoader;

impl ManifestLoader {
    pub fn new() -> Self {
        Self
    }
}

impl JobFactory for ManifestLoader {
    fn build(&self, candidate: &Candidate) -> anyhow::Result<JobDescriptor> {
        let manifest = JobManifest::load(&candidate.location)?;
        let schedule = manifest.schedule.clone();
        let environments = manifest.environments.clone();

        let job = JobDescriptor::new(
            &candidate.identity,
            &candidate.location,
            schedule,
            Arc::new(manifest.into_job()),
        );
        Ok(match environments {
            Some(envs) => job.with_environments(envs),
            None => job,
        })
    }
}

impl JobLoader for ManifestLoader {
    fn name(&self) -> &str {
        "command-manifest"
    }

    fn accepts(&self, candidate: &Candidate) -> bool {
        candidate
            .location
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext == MANIFEST_EXTENSION)
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
