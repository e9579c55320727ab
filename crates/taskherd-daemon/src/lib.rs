//! # taskherd Daemon
//!
//! Process lifecycle for the taskherd job supervisor.
//!
//! ## Features
//!
//! - Startup arguments (`--only=`, `--except=`, `--do-nothing`)
//! - Signal handling (SIGTERM/SIGINT for graceful shutdown)
//! - [`DaemonController`]: discovery, filtering and registration, then the
//!   timing engine's run loop
//!
//! ## Usage
//!
//! ```rust,ignore
//! use taskherd_daemon::{DaemonController, StartupArgs};
//!
//! let controller = DaemonController::new(sources, registry, engine, boundary);
//! controller.start(&StartupArgs::parse(std::env::args().skip(1))).await?;
//! ```

pub mod args;
pub mod controller;
pub mod error;
pub mod signal;

pub use args::{StartupArgs, StartupMode};
pub use controller::{DaemonController, Prepared, StartOutcome, StartupSummary};
pub use error::{DaemonError, DaemonState};
pub use signal::SignalHandler;
