//! External process execution.
//!
//! [`CommandRunner`] is the seam between the synchronizer and the OS: the
//! production [`ProcessRunner`] shells out through `tokio::process`, tests
//! substitute a scripted runner.

use std::io::Read;
use std::process::Stdio;

use async_trait::async_trait;

use crate::cancel::{CancelReason, Cancellation};
use crate::command::GitCommand;

/// Outcome of a process that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Stdout and stderr interleaved as written, lossily decoded.
    pub output: String,
    /// Exit code; `None` when the process was terminated by a signal.
    pub status: Option<i32>,
}

impl CommandResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            status: Some(0),
        }
    }

    pub fn failure(status: i32, output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            status: Some(status),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == Some(0)
    }
}

/// Why a process produced no [`CommandResult`].
#[derive(Debug)]
pub enum RunError {
    Spawn(std::io::Error),
    Cancelled(CancelReason),
}

/// Runs one command to completion, honouring cancellation.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, cmd: &GitCommand, cancel: &Cancellation) -> Result<CommandResult, RunError>;
}

#[async_trait]
impl<T: CommandRunner + ?Sized> CommandRunner for std::sync::Arc<T> {
    async fn run(&self, cmd: &GitCommand, cancel: &Cancellation) -> Result<CommandResult, RunError> {
        (**self).run(cmd, cancel).await
    }
}

/// Spawns real processes.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    envs: Vec<(String, String)>,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self {
            envs: vec![("GIT_TERMINAL_PROMPT".to_string(), "0".to_string())],
        }
    }
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra environment variable for every spawned process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, cmd: &GitCommand, cancel: &Cancellation) -> Result<CommandResult, RunError> {
        if let Some(reason) = cancel.check() {
            return Err(RunError::Cancelled(reason));
        }

        // Both streams share one pipe so the output keeps git's ordering.
        let (mut reader, writer) = std::io::pipe().map_err(RunError::Spawn)?;
        let err_writer = writer.try_clone().map_err(RunError::Spawn)?;

        let mut command = cmd.to_tokio();
        command
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(err_writer)
            .kill_on_drop(true);

        tracing::debug!("spawning: {cmd}");
        let mut child = command.spawn().map_err(RunError::Spawn)?;
        // The parent's write ends must close for the reader to see EOF.
        drop(command);

        let collect = tokio::task::spawn_blocking(move || {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf).map(|_| buf)
        });

        // Dropping the child on the cancel path kills it.
        let (status, bytes) = tokio::select! {
            done = async {
                let status = child.wait().await?;
                let bytes = collect.await.map_err(std::io::Error::other)??;
                Ok::<_, std::io::Error>((status, bytes))
            } => done.map_err(RunError::Spawn)?,
            reason = cancel.triggered() => {
                tracing::debug!("{reason}; killing: {cmd}");
                return Err(RunError::Cancelled(reason));
            }
        };

        let combined = String::from_utf8_lossy(&bytes).into_owned();

        Ok(CommandResult {
            output: combined,
            status: status.code(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn sh(script: &str) -> GitCommand {
        GitCommand::new("sh").arg("-c").arg(script)
    }

    #[tokio::test]
    async fn captures_stdout_and_stderr() {
        let result = ProcessRunner::new()
            .run(&sh("echo out; echo err >&2; exit 3"), &Cancellation::new())
            .await
            .expect("run");
        assert_eq!(result.status, Some(3));
        assert!(!result.succeeded());
        assert_eq!(result.output, "out\nerr\n");
    }

    #[tokio::test]
    async fn combined_output_keeps_write_order() {
        let result = ProcessRunner::new()
            .run(
                &sh("echo one; echo two >&2; echo three; echo four >&2"),
                &Cancellation::new(),
            )
            .await
            .expect("run");
        assert!(result.succeeded());
        assert_eq!(result.output, "one\ntwo\nthree\nfour\n");
    }

    #[tokio::test]
    async fn runs_in_current_dir_with_extra_env() {
        let dir = tempfile::TempDir::new().unwrap();
        let cmd = sh("pwd; echo \"$FIXTURE_VAR\"").current_dir(dir.path());
        let result = ProcessRunner::new()
            .env("FIXTURE_VAR", "hello")
            .run(&cmd, &Cancellation::new())
            .await
            .expect("run");
        assert!(result.succeeded());
        let canonical = dir.path().canonicalize().unwrap();
        let file_name = canonical.file_name().unwrap().to_string_lossy().into_owned();
        assert!(result.output.contains(&file_name), "got: {}", result.output);
        assert!(result.output.contains("hello"));
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let cmd = GitCommand::new("definitely-not-a-real-binary-4f1c");
        let err = ProcessRunner::new()
            .run(&cmd, &Cancellation::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Spawn(_)));
    }

    #[tokio::test]
    async fn deadline_kills_long_running_process() {
        let started = Instant::now();
        let cancel = Cancellation::new().with_timeout(Duration::from_millis(100));
        let err = ProcessRunner::new()
            .run(&sh("exec sleep 30"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Cancelled(CancelReason::DeadlineExceeded)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn already_cancelled_does_not_spawn() {
        let dir = tempfile::TempDir::new().unwrap();
        let marker = dir.path().join("ran");
        let cancel = Cancellation::new();
        cancel.cancel();
        let cmd = sh(&format!("touch {}", marker.display()));
        let err = ProcessRunner::new().run(&cmd, &cancel).await.unwrap_err();
        assert!(matches!(err, RunError::Cancelled(CancelReason::Cancelled)));
        assert!(!marker.exists());
    }
}
