//! gitfixture: publish generated files to a git remote.
//!
//! # Usage
//!
//! ```text
//! gitfixture sync --repo <owner/name> --dir <path> --message <msg> [--file <rel>=<local>]... [--manifest <yaml>] [--timeout <secs>] [--json]
//! gitfixture plan --repo <owner/name> --dir <path> --message <msg> [--file <rel>=<local>]... [--manifest <yaml>]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{plan::PlanArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "gitfixture",
    version,
    about = "Clone a repository, write files, and push only when something changed",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone, write, stage, and commit/push if the staged diff is non-empty.
    Sync(SyncArgs),

    /// Print the git commands a sync would run, without running them.
    Plan(PlanArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Plan(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
