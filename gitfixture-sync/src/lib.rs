//! # gitfixture-sync
//!
//! Publish in-memory file contents to a git remote by shelling out to `git`.
//!
//! Call [`Synchronizer::sync`] with a [`gitfixture_core::SyncRequest`]: it
//! clones, writes, stages, and commits/pushes only when the staged diff is
//! non-empty.

pub mod cancel;
pub mod command;
pub mod diagnostics;
pub mod error;
pub mod plan;
pub mod runner;
pub mod synchronizer;

pub use cancel::{CancelReason, Cancellation};
pub use command::GitCommand;
pub use diagnostics::{DiagnosticSink, LogSink, RecordingSink};
pub use error::{CommandFailure, Step, SyncError};
pub use plan::SyncPlan;
pub use runner::{CommandResult, CommandRunner, ProcessRunner, RunError};
pub use synchronizer::{SyncOutcome, SyncState, Synchronizer};
