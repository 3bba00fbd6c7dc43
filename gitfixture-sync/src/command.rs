//! Git command construction.
//!
//! Building a command never spawns anything; [`crate::runner`] executes it.
//! Argument vectors are fixed: the `diff --exit-code --cached` form is what
//! decides whether a commit happens at all.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

use gitfixture_core::{DEFAULT_BRANCH, DEFAULT_REMOTE};

/// Executable looked up on `PATH` for every step.
pub const GIT: &str = "git";

/// One external invocation: program, arguments, optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub current_dir: Option<PathBuf>,
}

impl GitCommand {
    /// Arbitrary program; the git constructors below are the normal entry points.
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// `git clone <url> <dir>`, not scoped to any directory.
    pub fn clone_repo(url: &str, dir: &Path) -> Self {
        Self::new(GIT).arg("clone").arg(url).arg(dir)
    }

    /// `git add <path>` inside `dir`.
    pub fn add(dir: &Path, path: &Path) -> Self {
        Self::new(GIT).arg("add").arg(path).current_dir(dir)
    }

    /// `git diff --exit-code --cached` inside `dir`. Exit 0 means nothing staged.
    pub fn diff_cached(dir: &Path) -> Self {
        Self::new(GIT)
            .arg("diff")
            .arg("--exit-code")
            .arg("--cached")
            .current_dir(dir)
    }

    /// `git commit -m <message>` inside `dir`.
    pub fn commit(dir: &Path, message: &str) -> Self {
        Self::new(GIT).arg("commit").arg("-m").arg(message).current_dir(dir)
    }

    /// `git push origin main` inside `dir`.
    pub fn push(dir: &Path) -> Self {
        Self::new(GIT)
            .arg("push")
            .arg(DEFAULT_REMOTE)
            .arg(DEFAULT_BRANCH)
            .current_dir(dir)
    }

    /// Arguments as lossy UTF-8, for logging and assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    pub(crate) fn to_tokio(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl fmt::Display for GitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
