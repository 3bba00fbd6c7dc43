//! Request validation and the fixed command sequence derived from it.

use std::path::{Component, Path, PathBuf};

use gitfixture_core::SyncRequest;

use crate::command::GitCommand;
use crate::error::SyncError;

/// Every command a sync may run, in order. Building one spawns nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    /// Absolute clone target.
    pub dir: PathBuf,
    pub url: String,
    pub clone: GitCommand,
    /// Relative path and absolute destination of every file write.
    pub writes: Vec<(PathBuf, PathBuf)>,
    pub stage: Vec<GitCommand>,
    pub diff: GitCommand,
    /// Only run when `diff` reports staged changes.
    pub commit: GitCommand,
    pub push: GitCommand,
}

impl SyncPlan {
    /// Validate `request` and derive the command sequence.
    ///
    /// Fails with `MissingIdentifier` / `MissingDirectory` before touching
    /// anything, `PathResolution` if the directory cannot be made absolute,
    /// or `UnsafePath` for a file key that would land outside it.
    pub fn build(request: &SyncRequest) -> Result<Self, SyncError> {
        if request.repository.is_empty() {
            return Err(SyncError::MissingIdentifier);
        }
        if request.working_directory.as_os_str().is_empty() {
            return Err(SyncError::MissingDirectory);
        }
        let dir = absolute(&request.working_directory)?;
        if let Some(path) = request.files.keys().find(|path| !stays_inside(path)) {
            return Err(SyncError::UnsafePath { path: path.clone() });
        }
        let url = request.repository.remote_url();

        Ok(Self {
            clone: GitCommand::clone_repo(&url, &dir),
            writes: request
                .files
                .keys()
                .map(|path| (path.clone(), dir.join(path)))
                .collect(),
            stage: request
                .files
                .keys()
                .map(|path| GitCommand::add(&dir, path))
                .collect(),
            diff: GitCommand::diff_cached(&dir),
            commit: GitCommand::commit(&dir, &request.commit_message),
            push: GitCommand::push(&dir),
            url,
            dir,
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf, SyncError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|source| SyncError::PathResolution {
            path: path.to_path_buf(),
            source,
        })
}

/// Relative, names at least one entry, and never steps above its start.
fn stays_inside(path: &Path) -> bool {
    let mut named = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => named = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    named
}
