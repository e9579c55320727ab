//! Filesystem job sources.

use std::path::{Path, PathBuf};

use taskherd_protocols::{JobSources, SourceError};
use tracing::warn;

/// Enumerates files matching a glob pattern inside a jobs directory.
///
/// Results are sorted so discovery order does not depend on the filesystem.
#[derive(Debug, Clone)]
pub struct GlobSources {
    dir: PathBuf,
    pattern: String,
}

impl GlobSources {
    pub fn new(dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            pattern: pattern.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl JobSources for GlobSources {
    fn enumerate(&self) -> Result<Vec<String>, SourceError> {
        // only the pattern may contain wildcards; the directory is literal
        let dir = glob::Pattern::escape(&self.dir.to_string_lossy());
        let full_pattern = Path::new(&dir).join(&self.pattern);
        let pattern_str = full_pattern.to_string_lossy();

        let entries = glob::glob(&pattern_str).map_err(|e| SourceError::InvalidPattern {
            pattern: self.pattern.clone(),
            reason: e.to_string(),
        })?;

        if !self.dir.is_dir() {
            warn!("Jobs directory {} does not exist", self.dir.display());
            return Ok(Vec::new());
        }

        let mut locations = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => locations.push(path.display().to_string()),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable job source: {}", e),
            }
        }
        locations.sort();
        Ok(locations)
    }
}
