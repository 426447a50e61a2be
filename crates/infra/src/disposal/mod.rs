//! Throttled, strictly sequential execution of a disposal schedule.
//!
//! ## Design
//!
//! - One release call per schedule entry, never concurrent or batched
//! - Mandatory pause after each completed call, before the next one is issued
//! - Failed calls are recorded and skip the pause; the loop always continues
//! - Optional retry policy and failure-burst backoff (off by default)
//! - Cancellable between calls; an in-flight call always completes
//!
//! ## Components
//!
//! - `DisposalExecutor`: runs a `DisposalSchedule` against a release handler
//! - `Pacer`: the only place that blocks (sleep / wait-for-cancel)
//! - `DisposalReport`: per-entry outcome for the caller

pub mod executor;
pub mod pacer;
pub mod types;

pub use executor::{DisposalExecutor, DisposalExecutorConfig};
pub use pacer::{CancelHandle, ManualPacer, Pace, Pacer, ShutdownPacer, cancellation};
pub use types::{
    BackoffStrategy, BurstBackoff, DisposalRecord, DisposalReport, DisposalStats, DisposalStatus,
    RetryPolicy,
};
