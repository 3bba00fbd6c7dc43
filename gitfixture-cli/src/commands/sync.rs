//! `gitfixture sync`: clone, write, and push only when something changed.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use gitfixture_core::{SyncRequest, DEFAULT_BRANCH, DEFAULT_REMOTE};
use gitfixture_sync::{Cancellation, SyncOutcome, Synchronizer};

use super::request::RequestArgs;

/// Arguments for `gitfixture sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Cancel the in-flight git step after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the outcome as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let request = self.request.build()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start tokio runtime")?;

        let outcome = runtime
            .block_on(async {
                let mut cancel = Cancellation::new();
                if let Some(secs) = self.timeout {
                    cancel = cancel.with_timeout(Duration::from_secs(secs));
                }

                let token = cancel.token().clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        token.cancel();
                    }
                });

                Synchronizer::new().sync(&request, &cancel).await
            })
            .with_context(|| format!("sync failed for '{}'", request.repository))?;

        if self.json {
            let payload = serde_json::json!({
                "repository": request.repository.as_str(),
                "url": request.repository.remote_url(),
                "directory": request.working_directory.display().to_string(),
                "files": request.files.len(),
                "outcome": outcome,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to render sync JSON")?
            );
        } else {
            print_outcome(&request, outcome);
        }

        Ok(())
    }
}

fn print_outcome(request: &SyncRequest, outcome: SyncOutcome) {
    let tick = "✓".green().bold();
    match outcome {
        SyncOutcome::Unchanged => println!(
            "{tick} '{}': nothing to commit ({} files unchanged)",
            request.repository,
            request.files.len()
        ),
        SyncOutcome::Pushed => println!(
            "{tick} '{}' pushed to {DEFAULT_REMOTE}/{DEFAULT_BRANCH} ({} files)",
            request.repository,
            request.files.len()
        ),
    }
}
