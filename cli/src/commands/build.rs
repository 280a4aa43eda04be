//! # Build Command
//!
//! File: cli/src/commands/build.rs
//!
//! Rebuilds the current project's app image without touching running state.
//!
use crate::common::docker::client::DockerClient;
use crate::common::docker::compose::{ComposeManager, ComposeTarget};
use crate::core::config;
use crate::core::error::Result;
use clap::Args;
use tracing::info;

/// Arguments for `phpier build`.
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Build without the image cache
    #[arg(long = "no-cache")]
    pub no_cache: bool,
}

/// Handles `phpier build`.
pub async fn handle_build(args: BuildArgs) -> Result<()> {
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

    info!("Building project image...");
    manager.build(args.no_cache, &["app".to_string()]).await?;
    info!("Project image built");
    Ok(())
}
