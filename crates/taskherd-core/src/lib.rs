//! # taskherd Core
//!
//! The supervisor core: decides which jobs exist, which of them may run in
//! the current deployment, and contains every failure a job can produce.
//!
//! ## Pipeline
//!
//! ```text
//! JobSources ──▶ JobRegistry::discover ──▶ filter::select ──▶ SchedulerAdapter::register ──▶ TimingEngine
//!                      │                                              │
//!                      └──────────── FaultBoundary ◀──────────────────┘
//! ```
//!
//! - [`JobRegistry`]: resolves candidate source locations into
//!   [`JobDescriptor`](taskherd_protocols::JobDescriptor)s through an explicit
//!   [`JobCatalog`] of factories plus fallback [`JobLoader`]s
//! - [`filter::select`]: applies `--only` / `--except` and per-job
//!   environment constraints
//! - [`SchedulerAdapter`]: binds each runnable job to the timing engine
//! - [`FaultBoundary`]: catches, logs and alerts on failures in every phase

pub mod adapter;
pub mod boundary;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod identity;
pub mod registry;
pub mod source;

pub use adapter::{RegisteredJob, RegistrationTable, SchedulerAdapter};
pub use boundary::{FaultBoundary, FaultBoundaryConfig, FireOutcome, InvocationState, JobStats};
pub use catalog::{Candidate, JobCatalog, JobFactory, JobLoader};
pub use error::CatalogError;
pub use filter::{select, Decision, FilterReason, FilterSpec, Selection, SelectionOutcome};
pub use identity::{base_name, camelize, derive_identity};
pub use registry::{Discovery, JobRegistry};
pub use source::GlobSources;
