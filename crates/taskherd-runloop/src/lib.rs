//! # taskherd RunLoop
//!
//! Timing engine for the taskherd job supervisor.
//!
//! - [`Recurrence`]: parses cron expressions, `every <duration>` intervals and
//!   `in <duration>` one-shot delays
//! - [`CronEngine`]: implements
//!   [`TimingEngine`](taskherd_protocols::TimingEngine), one supervisor task
//!   per job, graceful drain on shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use futures::FutureExt;
//! use taskherd_protocols::{RecurrenceRule, TimingEngine};
//! use taskherd_runloop::CronEngine;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = CronEngine::default();
//!     engine
//!         .register(
//!             "Heartbeat",
//!             &RecurrenceRule::new("every 30s"),
//!             Arc::new(|| async { println!("alive") }.boxed()),
//!         )
//!         .unwrap();
//!
//!     let shutdown = CancellationToken::new();
//!     engine.run(shutdown).await.unwrap();
//! }
//! ```

pub mod engine;
pub mod error;
pub mod recurrence;

pub use engine::{CronEngine, DEFAULT_SHUTDOWN_TIMEOUT};
pub use error::RecurrenceError;
pub use recurrence::Recurrence;
