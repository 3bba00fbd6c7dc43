//! Flags shared by `gitfixture sync` and `gitfixture plan`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gitfixture_core::{Manifest, RepoIdentifier, SyncRequest};

/// `<relative path>=<local file>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArg {
    pub path: PathBuf,
    pub source: PathBuf,
}

fn parse_file_arg(s: &str) -> std::result::Result<FileArg, String> {
    match s.split_once('=') {
        Some((path, source)) if !path.is_empty() && !source.is_empty() => Ok(FileArg {
            path: PathBuf::from(path),
            source: PathBuf::from(source),
        }),
        _ => Err(format!(
            "expected <relative path>=<local file>, got '{s}'"
        )),
    }
}

/// Request inputs: a manifest, flags, or both (flags win).
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// YAML manifest with repository, directory, message, and files.
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Repository as `owner/name`; cloned from git@github.com:<owner>/<name>.git.
    #[arg(long)]
    pub repo: Option<String>,

    /// Directory to clone into.
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Commit message used when something changed.
    #[arg(long, short)]
    pub message: Option<String>,

    /// File to publish, as `<relative path>=<local file>`. Repeatable.
    #[arg(long = "file", value_name = "REL=LOCAL", value_parser = parse_file_arg)]
    pub files: Vec<FileArg>,
}

impl RequestArgs {
    pub fn build(&self) -> Result<SyncRequest> {
        let mut request = match &self.manifest {
            Some(path) => {
                let manifest = Manifest::load_at(path)
                    .with_context(|| format!("failed to load manifest {}", path.display()))?;
                tracing::debug!(
                    "loaded manifest {} ({} files)",
                    path.display(),
                    manifest.files.len()
                );
                manifest
                    .to_request()
                    .with_context(|| format!("failed to read files for {}", path.display()))?
            }
            None => SyncRequest::default(),
        };

        if let Some(repo) = &self.repo {
            request.repository = RepoIdentifier::from(repo.as_str());
        }
        if let Some(dir) = &self.dir {
            request.working_directory = dir.clone();
        }
        if let Some(message) = &self.message {
            request.commit_message = message.clone();
        }
        for file in &self.files {
            let bytes = std::fs::read(&file.source)
                .with_context(|| format!("failed to read {}", file.source.display()))?;
            request.files.insert(file.path.clone(), bytes);
        }

        Ok(request)
    }
}
