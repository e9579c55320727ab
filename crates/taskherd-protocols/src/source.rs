//! Job source enumeration protocol.

use crate::error::SourceError;

/// Enumerates candidate job source locations, one job per location.
pub trait JobSources: Send + Sync {
    fn enumerate(&self) -> Result<Vec<String>, SourceError>;
}

/// Fixed list of source locations.
#[derive(Debug, Clone, Default)]
pub struct StaticSources {
    locations: Vec<String>,
}

impl StaticSources {
    pub fn new<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            locations: locations.into_iter().map(Into::into).collect(),
        }
    }
}

impl JobSources for StaticSources {
    fn enumerate(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.locations.clone())
    }
}
