//! ovh-reconcile - async task polling and state reconciliation for OVH resources
//!
//! Waits for the asynchronous tasks behind OVH mutations and merges the
//! entity read back afterwards with the declared one.

pub mod cli;
pub mod config;
pub mod merge;
pub mod output;
pub mod poller;
pub mod providers;
pub mod reconcile;
pub mod task;

mod error;

pub use error::Error;
pub use merge::{Attr, Merge, MergeError, Snapshot, Value, merge, merge_attrs};
pub use poller::{FetchError, PollConfig, PollError, StatusSource, await_completion};
pub use providers::ovh::{OvhClient, OvhError};
pub use reconcile::Reconciler;
pub use task::{OperationHandle, TaskKind, TaskPhase, TaskStatus};
