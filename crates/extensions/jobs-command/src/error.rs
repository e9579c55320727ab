//! Manifest loading errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("manifest {0} has an empty command")]
    EmptyCommand(String),

    #[error("manifest {0} has an empty schedule")]
    EmptySchedule(String),

    #[error("manifest {0} sets timeout_secs to 0")]
    ZeroTimeout(String),
}
