//! # taskherd Protocols
//!
//! Core protocol definitions for the taskherd job supervisor.
//! Contains the seams between the supervisor core and its collaborators:
//!
//! - [`JobBody`] - the executable part of a job
//! - [`JobDescriptor`] - immutable description of one schedulable job
//! - [`TimingEngine`] - the recurring-timer engine that drives callbacks
//! - [`AlertSink`] - external alerting for production failures
//! - [`JobSources`] - enumeration of candidate job source locations

pub mod alert;
pub mod engine;
pub mod error;
pub mod failure;
pub mod job;
pub mod source;

pub use alert::{AlertSink, NoopAlertSink};
pub use engine::{FailureHook, FireFuture, JobCallback, RegistrationHandle, TimingEngine};
pub use error::{
    AlertError, DiscoveryCause, DiscoveryError, EngineError, ExecutionError, RegistrationError,
    SourceError,
};
pub use failure::{FailurePhase, FailureRecord};
pub use job::{job_fn, FnJob, JobBody, JobDescriptor, RecurrenceRule};
pub use source::{JobSources, StaticSources};
