//! # Logs Command
//!
//! File: cli/src/commands/logs.rs
//!
//! Streams compose logs for the current project, optionally narrowed to one
//! service and windowed by tail count or start time.
//!
use crate::common::docker::client::DockerClient;
use crate::common::docker::compose::{ComposeManager, ComposeTarget, LogsOptions};
use crate::core::config;
use crate::core::error::Result;
use clap::Args;

/// Arguments for `phpier logs`.
#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Service to show logs for (all services when omitted)
    pub service: Option<String>,

    /// Follow log output
    #[arg(short = 'f', long)]
    pub follow: bool,

    /// Number of lines to show from the end of the logs
    #[arg(long)]
    pub tail: Option<u32>,

    /// Show logs since a timestamp or relative duration (e.g. 10m, 2h)
    #[arg(long)]
    pub since: Option<String>,
}

/// Handles `phpier logs`.
pub async fn handle_logs(args: LogsArgs) -> Result<()> {
    let project_root = config::require_project_root()?;
    let project_cfg = config::load_project_config()?;

    let client = DockerClient::new().await?;
    let manager = ComposeManager::new(
        client,
        ComposeTarget::Project {
            name: project_cfg.name,
            root: project_root,
        },
    );

    manager
        .logs(&LogsOptions {
            service: args.service,
            follow: args.follow,
            tail: args.tail,
            since: args.since,
        })
        .await
}
