//! # Global Stack Commands
//!
//! File: cli/src/commands/global/mod.rs
//!
//! ## Overview
//!
//! Manages the shared services stack in `~/.phpier`: the Traefik reverse
//! proxy, the enabled databases and caches, and the web tools. Projects
//! attach to this stack over the shared Docker network, so it is started
//! once and reused by every project.
//!
use crate::commands::down;
use crate::common::docker::client::DockerClient;
use crate::common::docker::compose::{ComposeManager, ComposeTarget};
use crate::core::config;
use crate::core::error::Result;
use clap::Subcommand;
use tracing::info;

/// Subcommands of `phpier global`.
#[derive(Debug, Subcommand)]
pub enum GlobalCommand {
    /// Start the global services stack
    Up,
    /// Stop the global services stack
    Down {
        /// Stop even when other projects are still running on the stack
        #[arg(long)]
        force: bool,
    },
}

/// Dispatches `phpier global` subcommands.
pub async fn handle_global(command: GlobalCommand) -> Result<()> {
    match command {
        GlobalCommand::Up => handle_global_up().await,
        GlobalCommand::Down { force } => handle_global_down(force).await,
    }
}

/// Handles `phpier global up`.
pub async fn handle_global_up() -> Result<()> {
    config::load_global_config()?;
    let home = config::phpier_home()?;

    let client = DockerClient::new().await?;
    let manager = ComposeManager::new(client, ComposeTarget::Global { home });

    info!("Starting global services...");
    manager.up(true).await?;
    info!("Global services started");
    Ok(())
}

/// Handles `phpier global down`.
pub async fn handle_global_down(force: bool) -> Result<()> {
    let client = DockerClient::new().await?;
    down::stop_global_services(&client, force).await
}
