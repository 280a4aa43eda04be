//! # Stop Command
//!
//! File: cli/src/commands/stop.rs
//!
//! Context-aware shutdown, the mirror of `start`: inside a project this stops
//! the project and then the global stack; outside one it stops just the
//! global stack.
//!
use crate::commands::{down, global};
use crate::core::config;
use crate::core::error::Result;
use clap::Args;
use tracing::info;

/// Arguments for `phpier stop`.
#[derive(Debug, Args)]
pub struct StopArgs {
    /// Stop the global stack even when other projects are still running on it
    #[arg(long)]
    pub force: bool,
}

/// Handles `phpier stop`.
pub async fn handle_stop(args: StopArgs) -> Result<()> {
    if config::in_project() {
        info!("Detected phpier project: stopping project and global services...");
        down::handle_down(down::DownArgs {
            project: None,
            global: true,
            remove_volumes: false,
            force: args.force,
        })
        .await
    } else {
        info!("No phpier project detected: stopping global services only...");
        global::handle_global_down(args.force).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: StopArgs,
    }

    #[test]
    fn test_stop_args_force() {
        assert!(!TestCli::parse_from(["test"]).args.force);
        assert!(TestCli::parse_from(["test", "--force"]).args.force);
    }
}
