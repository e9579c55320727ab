//! Job registry: turns candidate source locations into job descriptors.

use std::collections::HashMap;
use std::sync::Arc;

use taskherd_protocols::{DiscoveryCause, DiscoveryError, JobDescriptor};
use tracing::{debug, info};

use crate::boundary::FaultBoundary;
use crate::catalog::{Candidate, JobCatalog, JobLoader};
use crate::identity::{base_name, derive_identity};

/// Result of one discovery pass.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Loaded jobs, in input order.
    pub jobs: Vec<JobDescriptor>,
    /// Candidates that failed to load, in input order.
    pub errors: Vec<DiscoveryError>,
}

/// Resolves candidates through the catalog first, then through loaders in
/// the order they were added.
pub struct JobRegistry {
    catalog: Arc<JobCatalog>,
    loaders: Vec<Arc<dyn JobLoader>>,
    boundary: Arc<FaultBoundary>,
}

impl JobRegistry {
    pub fn new(boundary: Arc<FaultBoundary>) -> Self {
        Self::with_catalog(Arc::new(JobCatalog::new()), boundary)
    }

    pub fn with_catalog(catalog: Arc<JobCatalog>, boundary: Arc<FaultBoundary>) -> Self {
        Self {
            catalog,
            loaders: Vec::new(),
            boundary,
        }
    }

    pub fn with_loader(mut self, loader: Arc<dyn JobLoader>) -> Self {
        self.loaders.push(loader);
        self
    }

    pub fn catalog(&self) -> &Arc<JobCatalog> {
        &self.catalog
    }

    /// Load every candidate. A failing candidate never stops the others.
    pub fn discover<S: AsRef<str>>(&self, locations: &[S]) -> Discovery {
        let mut discovery = Discovery::default();
        let mut seen: HashMap<String, String> = HashMap::new();

        for location in locations {
            let location = location.as_ref();
            let guess = derive_identity(location).unwrap_or_else(|_| base_name(location).to_string());
            info!("Loading job {}", guess);

            let loaded = self
                .boundary
                .contain_discovery(&guess, location, || self.load_one(location));

            match loaded {
                Ok(job) => {
                    if let Some(first_source) = seen.get(job.identity()) {
                        let err = DiscoveryError::new(
                            job.identity(),
                            location,
                            DiscoveryCause::Duplicate {
                                first_source: first_source.clone(),
                            },
                        );
                        self.boundary.record_discovery_failure(&err);
                        discovery.errors.push(err);
                        continue;
                    }
                    seen.insert(job.identity().to_string(), location.to_string());
                    discovery.jobs.push(job);
                }
                Err(err) => discovery.errors.push(err),
            }
        }

        debug!(
            loaded = discovery.jobs.len(),
            failed = discovery.errors.len(),
            "Discovery finished"
        );
        discovery
    }

    fn load_one(&self, location: &str) -> Result<JobDescriptor, DiscoveryError> {
        let identity = derive_identity(location)
            .map_err(|cause| DiscoveryError::new(base_name(location), location, cause))?;
        let candidate = Candidate::new(identity, location);

        let job = if let Some(factory) = self.catalog.get(&candidate.identity) {
            factory.build(&candidate)
        } else if let Some(loader) = self.loaders.iter().find(|l| l.accepts(&candidate)) {
            debug!(loader = loader.name(), "Loading {} via loader", candidate.location);
            loader.build(&candidate)
        } else {
            return Err(DiscoveryError::new(
                &candidate.identity,
                location,
                DiscoveryCause::Unresolved,
            ));
        };

        let job = job.map_err(|e| DiscoveryError::new(&candidate.identity, location, e))?;
        if job.identity() != candidate.identity {
            return Err(DiscoveryError::new(
                &candidate.identity,
                location,
                DiscoveryCause::IdentityMismatch {
                    expected: candidate.identity.clone(),
                    actual: job.identity().to_string(),
                },
            ));
        }
        Ok(job)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
