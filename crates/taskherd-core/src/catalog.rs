//! Job catalog: the explicit registration table of job factories.
//!
//! Jobs are never resolved by reflecting on names at runtime. Each job type
//! registers a [`JobFactory`] under its canonical identity at process
//! initialisation; sources that no factory claims can still be handled by a
//! [`JobLoader`] (e.g. a manifest file format).

use std::sync::Arc;

use dashmap::DashMap;
use taskherd_protocols::JobDescriptor;

use crate::error::CatalogError;
use crate::identity::camelize;

/// A candidate job source, already mapped to its expected identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub identity: String,
    pub location: String,
}

impl Candidate {
    pub fn new(identity: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            location: location.into(),
        }
    }
}

/// Builds the descriptor for one candidate.
///
/// The returned descriptor must carry `candidate.identity`.
pub trait JobFactory: Send + Sync {
    fn build(&self, candidate: &Candidate) -> anyhow::Result<JobDescriptor>;
}

impl<F> JobFactory for F
where
    F: Fn(&Candidate) -> anyhow::Result<JobDescriptor> + Send + Sync,
{
    fn build(&self, candidate: &Candidate) -> anyhow::Result<JobDescriptor> {
        self(candidate)
    }
}

/// Factory that decides for itself which candidates it can load.
pub trait JobLoader: JobFactory {
    /// Name used in log lines.
    fn name(&self) -> &str;

    fn accepts(&self, candidate: &Candidate) -> bool;
}

/// Registration table mapping job identity to factory.
pub struct JobCatalog {
    factories: DashMap<String, Arc<dyn JobFactory>>,
}

impl JobCatalog {
    pub fn new() -> Self {
        Self {
            factories: DashMap::new(),
        }
    }

    /// Register a factory under a canonical identity (e.g. `NewsfeedTask`).
    ///
    /// Returns an error if the identity is already taken or is not in
    /// canonical form.
    pub fn register(
        &self,
        identity: impl Into<String>,
        factory: Arc<dyn JobFactory>,
    ) -> Result<(), CatalogError> {
        let identity = identity.into();
        if camelize(&identity).as_deref() != Some(identity.as_str()) {
            return Err(CatalogError::InvalidIdentity(identity));
        }

        match self.factories.entry(identity) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                Err(CatalogError::AlreadyRegistered(entry.key().clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(factory);
                Ok(())
            }
        }
    }

    pub fn get(&self, identity: &str) -> Option<Arc<dyn JobFactory>> {
        self.factories.get(identity).map(|f| f.clone())
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.factories.contains_key(identity)
    }

    /// Registered identities, sorted.
    pub fn identities(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for JobCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskherd_protocols::job_fn;

    fn heartbeat_factory() -> Arc<dyn JobFactory> {
        Arc::new(|candidate: &Candidate| -> anyhow::Result<JobDescriptor> {
            Ok(JobDescriptor::new(
                candidate.identity.clone(),
                candidate.location.clone(),
                "every 1m",
                job_fn(|| async { Ok(()) }),
            ))
        })
    }

    #[test]
    fn test_catalog_new() {
        let catalog = JobCatalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
    }

    #[test]
    fn test_register_and_get() {
        let catalog = JobCatalog::new();
        catalog.register("Heartbeat", heartbeat_factory()).unwrap();

        assert!(catalog.contains("Heartbeat"));
        let factory = catalog.get("Heartbeat").unwrap();
        let job = factory
            .build(&Candidate::new("Heartbeat", "heartbeat"))
            .unwrap();
        assert_eq!(job.identity(), "Heartbeat");
        assert_eq!(job.source(), "heartbeat");
    }

    #[test]
    fn test_register_duplicate() {
        let catalog = JobCatalog::new();
        catalog.register("Heartbeat", heartbeat_factory()).unwrap();
        let err = catalog.register("Heartbeat", heartbeat_factory()).unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyRegistered(ref id) if id == "Heartbeat"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_register_non_canonical_identity() {
        let catalog = JobCatalog::new();
        let err = catalog.register("heartbeat", heartbeat_factory()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidIdentity(_)));
        assert!(catalog.register("news feed", heartbeat_factory()).is_err());
    }

    #[test]
    fn test_identities_sorted() {
        let catalog = JobCatalog::new();
        catalog.register("Report", heartbeat_factory()).unwrap();
        catalog.register("Heartbeat", heartbeat_factory()).unwrap();
        assert_eq!(catalog.identities(), vec!["Heartbeat", "Report"]);
    }
}
