//! `gitfixture plan`: show the git commands a sync would run.

use anyhow::{Context, Result};
use clap::Args;
use gitfixture_sync::SyncPlan;

use super::request::RequestArgs;

/// Arguments for `gitfixture plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub request: RequestArgs,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let request = self.request.build()?;
        let plan = SyncPlan::build(&request)
            .with_context(|| format!("invalid sync request for '{}'", request.repository))?;

        println!("[plan] {}", plan.clone);
        for ((_, abs), content) in plan.writes.iter().zip(request.files.values()) {
            println!("[plan] write {} ({} bytes)", abs.display(), content.len());
        }
        for cmd in &plan.stage {
            println!("[plan] {cmd}");
        }
        println!("[plan] {}", plan.diff);
        println!("[plan] {}  (if staged changes)", plan.commit);
        println!("[plan] {}  (if staged changes)", plan.push);
        Ok(())
    }
}
