//! Error types for gitfixture-sync.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::cancel::CancelReason;

/// A sync step, as named in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Clone,
    Write,
    Stage,
    Diff,
    Commit,
    Push,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::Clone => "clone",
            Step::Write => "write",
            Step::Stage => "stage",
            Step::Diff => "diff",
            Step::Commit => "commit",
            Step::Push => "push",
        };
        f.write_str(s)
    }
}

/// Why a single git invocation failed.
#[derive(Debug, Error)]
pub enum CommandFailure {
    /// The process ran and exited non-zero (or was killed by a signal).
    #[error("`{command}` exited with {}: {}", status_label(.status), .output.trim())]
    Exited {
        command: String,
        status: Option<i32>,
        output: String,
    },

    /// The process could not be started at all.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl CommandFailure {
    /// Captured combined output, when the process ran.
    pub fn output(&self) -> Option<&str> {
        match self {
            CommandFailure::Exited { output, .. } => Some(output),
            CommandFailure::Spawn { .. } => None,
        }
    }
}

fn status_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "no exit status".to_string(),
    }
}

/// All errors that can arise from a sync.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("missing git repo name")]
    MissingIdentifier,

    #[error("missing git dir")]
    MissingDirectory,

    #[error("error getting absolute path for {path}: {source}")]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File key that is absolute, empty, or climbs out with `..`.
    #[error("file path {path} is not inside the working directory")]
    UnsafePath { path: PathBuf },

    #[error("clone of {url} failed: {failure}")]
    Clone {
        url: String,
        #[source]
        failure: CommandFailure,
    },

    #[error("error writing {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("staging {path} failed: {failure}")]
    Stage {
        path: PathBuf,
        #[source]
        failure: CommandFailure,
    },

    /// Only raised when the diff process cannot be spawned; a non-zero exit
    /// means "changes staged", not failure.
    #[error("staged diff check failed: {failure}")]
    Diff {
        #[source]
        failure: CommandFailure,
    },

    #[error("commit failed: {failure}")]
    Commit {
        #[source]
        failure: CommandFailure,
    },

    #[error("push failed: {failure}")]
    Push {
        #[source]
        failure: CommandFailure,
    },

    #[error("sync {reason} during {step}")]
    Cancelled { step: Step, reason: CancelReason },
}

impl SyncError {
    /// The step that failed; `None` for precondition errors.
    pub fn step(&self) -> Option<Step> {
        match self {
            SyncError::MissingIdentifier
            | SyncError::MissingDirectory
            | SyncError::PathResolution { .. }
            | SyncError::UnsafePath { .. } => None,
            SyncError::Clone { .. } => Some(Step::Clone),
            SyncError::FileWrite { .. } => Some(Step::Write),
            SyncError::Stage { .. } => Some(Step::Stage),
            SyncError::Diff { .. } => Some(Step::Diff),
            SyncError::Commit { .. } => Some(Step::Commit),
            SyncError::Push { .. } => Some(Step::Push),
            SyncError::Cancelled { step, .. } => Some(*step),
        }
    }

    /// Captured git output attached to a process failure.
    pub fn output(&self) -> Option<&str> {
        match self {
            SyncError::Clone { failure, .. }
            | SyncError::Stage { failure, .. }
            | SyncError::Diff { failure }
            | SyncError::Commit { failure }
            | SyncError::Push { failure } => failure.output(),
            _ => None,
        }
    }
}
