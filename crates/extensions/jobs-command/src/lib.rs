//! # taskherd jobs - Command
//!
//! Jobs defined by a TOML manifest that runs an external command on every
//! fire. A manifest named `disk_cleanup_task.toml` defines the job
//! `DiskCleanupTask`:
//!
//! ```toml
//! schedule = "0 3 * * *"
//! environments = ["production"]
//! command = "/usr/local/bin/cleanup"
//! args = ["--older-than", "7d"]
//! timeout_secs = 600
//! ```

mod command;
mod error;
mod manifest;

pub use command::CommandJob;
pub use error::ManifestError;
pub use manifest::{JobManifest, ManifestLoader, MANIFEST_EXTENSION};
