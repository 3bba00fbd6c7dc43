//! Clone / write / stage / commit / push orchestration.
//!
//! ## Sequence
//!
//! 1. Validate the request and resolve the directory to an absolute path.
//! 2. `git clone <url> <dir>`.
//! 3. Write every file (mode `0755` when created). All writes finish before
//!    any staging starts.
//! 4. `git add <path>` per file.
//! 5. `git diff --exit-code --cached` → exit 0 means nothing changed: stop.
//! 6. `git commit -m <message>`, then `git push origin main`.
//!
//! Any failure is terminal and nothing is rolled back: a half-cloned
//! directory or partially written tree is left for the caller to clean up.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use gitfixture_core::SyncRequest;

use crate::cancel::{CancelReason, Cancellation};
use crate::command::GitCommand;
use crate::diagnostics::{failure_message, DiagnosticSink, LogSink};
use crate::error::{CommandFailure, Step, SyncError};
use crate::plan::SyncPlan;
use crate::runner::{CommandResult, CommandRunner, ProcessRunner, RunError};

// ---------------------------------------------------------------------------
// Outcome / state
// ---------------------------------------------------------------------------

/// Result of a successful sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcome {
    /// Staged tree matched HEAD; no commit, no push.
    Unchanged,
    /// A commit was created and pushed.
    Pushed,
}

/// Progress through a single sync call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Init,
    Cloned,
    FilesWritten,
    Staged,
    Clean,
    Committed,
    Pushed,
    Failed,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncState::Init => "init",
            SyncState::Cloned => "cloned",
            SyncState::FilesWritten => "files-written",
            SyncState::Staged => "staged",
            SyncState::Clean => "clean",
            SyncState::Committed => "committed",
            SyncState::Pushed => "pushed",
            SyncState::Failed => "failed",
        };
        f.write_str(s)
    }
}

fn advance(state: &mut SyncState, next: SyncState) {
    tracing::debug!("sync state: {state} -> {next}");
    *state = next;
}

// ---------------------------------------------------------------------------
// Synchronizer
// ---------------------------------------------------------------------------

/// Publishes file contents to a git remote through an external `git`.
#[derive(Debug, Clone)]
pub struct Synchronizer<R = ProcessRunner, D = LogSink> {
    runner: R,
    sink: D,
}

impl Synchronizer {
    /// Real `git` processes, diagnostics through the logging facade.
    pub fn new() -> Self {
        Self::with_parts(ProcessRunner::new(), LogSink)
    }
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner, D: DiagnosticSink> Synchronizer<R, D> {
    pub fn with_parts(runner: R, sink: D) -> Self {
        Self { runner, sink }
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    /// Run one full sync for `request`.
    pub async fn sync(
        &self,
        request: &SyncRequest,
        cancel: &Cancellation,
    ) -> Result<SyncOutcome, SyncError> {
        let mut state = SyncState::Init;
        let result = self.sync_steps(request, cancel, &mut state).await;
        if let Err(e) = &result {
            tracing::debug!("sync of {} failed in state {state}: {e}", request.repository);
            advance(&mut state, SyncState::Failed);
        }
        result
    }

    async fn sync_steps(
        &self,
        request: &SyncRequest,
        cancel: &Cancellation,
        state: &mut SyncState,
    ) -> Result<SyncOutcome, SyncError> {
        let plan = SyncPlan::build(request)?;
        let url = &plan.url;

        tracing::info!("cloning {url} into {}", plan.dir.display());
        self.run_step(Step::Clone, &plan.clone, cancel)
            .await
            .map_err(|e| e.into_sync(|failure| SyncError::Clone { url: url.clone(), failure }))?;
        advance(state, SyncState::Cloned);

        if let Some(reason) = cancel.check() {
            return Err(SyncError::Cancelled {
                step: Step::Write,
                reason,
            });
        }
        for ((path, abs), content) in plan.writes.iter().zip(request.files.values()) {
            write_file(path, abs, content)?;
        }
        advance(state, SyncState::FilesWritten);

        for ((path, _), cmd) in plan.writes.iter().zip(&plan.stage) {
            self.run_step(Step::Stage, cmd, cancel).await.map_err(|e| {
                e.into_sync(|failure| SyncError::Stage {
                    path: path.clone(),
                    failure,
                })
            })?;
        }
        advance(state, SyncState::Staged);

        if !self.has_staged_changes(&plan.diff, cancel).await? {
            tracing::info!("no staged changes in {}; skipping commit", plan.dir.display());
            advance(state, SyncState::Clean);
            return Ok(SyncOutcome::Unchanged);
        }

        self.run_step(Step::Commit, &plan.commit, cancel)
            .await
            .map_err(|e| e.into_sync(|failure| SyncError::Commit { failure }))?;
        advance(state, SyncState::Committed);

        self.run_step(Step::Push, &plan.push, cancel)
            .await
            .map_err(|e| e.into_sync(|failure| SyncError::Push { failure }))?;
        advance(state, SyncState::Pushed);

        tracing::info!("pushed {} to {url}", request.repository);
        Ok(SyncOutcome::Pushed)
    }

    /// Exit 0 → clean. Any non-zero exit → changes staged.
    async fn has_staged_changes(
        &self,
        cmd: &GitCommand,
        cancel: &Cancellation,
    ) -> Result<bool, SyncError> {
        match self.runner.run(cmd, cancel).await {
            Ok(result) => {
                tracing::debug!("`{cmd}` exited with {:?}", result.status);
                Ok(!result.succeeded())
            }
            Err(RunError::Cancelled(reason)) => Err(SyncError::Cancelled {
                step: Step::Diff,
                reason,
            }),
            Err(RunError::Spawn(source)) => {
                self.sink
                    .write_message(&failure_message(&cmd.to_string(), &source.to_string()));
                Err(SyncError::Diff {
                    failure: CommandFailure::Spawn {
                        command: cmd.to_string(),
                        source,
                    },
                })
            }
        }
    }

    /// Run `cmd`; a non-zero exit is reported to the sink and returned as failure.
    async fn run_step(
        &self,
        step: Step,
        cmd: &GitCommand,
        cancel: &Cancellation,
    ) -> Result<CommandResult, StepError> {
        let command = cmd.to_string();
        match self.runner.run(cmd, cancel).await {
            Ok(result) if result.succeeded() => Ok(result),
            Ok(result) => {
                self.sink
                    .write_message(&failure_message(&command, &result.output));
                Err(StepError::Failed(CommandFailure::Exited {
                    command,
                    status: result.status,
                    output: result.output,
                }))
            }
            Err(RunError::Spawn(source)) => {
                self.sink
                    .write_message(&failure_message(&command, &source.to_string()));
                Err(StepError::Failed(CommandFailure::Spawn { command, source }))
            }
            Err(RunError::Cancelled(reason)) => {
                tracing::warn!("{step} {reason}: {command}");
                Err(StepError::Cancelled(step, reason))
            }
        }
    }
}

enum StepError {
    Failed(CommandFailure),
    Cancelled(Step, CancelReason),
}

impl StepError {
    fn into_sync(self, wrap: impl FnOnce(CommandFailure) -> SyncError) -> SyncError {
        match self {
            StepError::Failed(failure) => wrap(failure),
            StepError::Cancelled(step, reason) => SyncError::Cancelled { step, reason },
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create or truncate `abs`. Parent directories are not created; errors
/// name the request-relative `path`.
fn write_file(path: &Path, abs: &Path, content: &[u8]) -> Result<(), SyncError> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o755);
    }

    let write_err = |source| SyncError::FileWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut file = options.open(abs).map_err(write_err)?;
    file.write_all(content).map_err(write_err)?;
    tracing::debug!("wrote: {}", abs.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
