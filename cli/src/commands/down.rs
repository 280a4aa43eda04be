//! # Down Command
//!
//! File: cli/src/commands/down.rs
//!
//! ## Overview
//!
//! Stops and removes a project's containers: the current directory's project
//! by default, or a named project resolved through discovery so it can be
//! stopped from anywhere. With `--global` the shared stack comes down too,
//! refusing when other projects still run on it unless `--force` is given.
//!
use crate::common::docker::client::DockerClient;
use crate::common::docker::compose::{ComposeManager, ComposeTarget, DownOptions};
use crate::core::config;
use crate::core::discovery;
use crate::core::error::{PhpierError, Result};
use anyhow::anyhow;
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

/// Arguments for `phpier down`.
#[derive(Debug, Args)]
pub struct DownArgs {
    /// Project name to stop (defaults to the current directory's project)
    pub project: Option<String>,

    /// Also stop global services after stopping the project
    #[arg(long = "global")]
    pub global: bool,

    /// Remove all volumes including persistent data
    #[arg(long = "remove-volumes")]
    pub remove_volumes: bool,

    /// Proceed even when other projects still depend on the global stack,
    /// and remove orphaned containers
    #[arg(long)]
    pub force: bool,
}

/// Handles `phpier down`.
pub async fn handle_down(args: DownArgs) -> Result<()> {
    let (name, root) = match &args.project {
        Some(name) => {
            info!("Looking for project '{name}'...");
            let root = resolve_project_root(name).await?;
            info!("Found project at: {}", root.display());
            (name.clone(), root)
        }
        None => {
            let root = config::require_project_root()?;
            let cfg = config::load_project_config()?;
            (cfg.name, root)
        }
    };

    let client = DockerClient::new().await?;
    let manager = ComposeManager::new(client.clone(), ComposeTarget::Project { name, root });

    info!("Stopping project containers...");
    manager
        .down_with_options(&DownOptions {
            remove_volumes: args.remove_volumes,
            remove_orphans: args.force,
            timeout: None,
        })
        .await?;
    info!("Project containers stopped");

    if args.global {
        stop_global_services(&client, args.force).await?;
    }
    Ok(())
}

/// Brings the global stack down. Other projects still running on the stack
/// abort the operation unless forced. Global volumes are always kept.
pub async fn stop_global_services(client: &DockerClient, force: bool) -> Result<()> {
    match client.running_phpier_projects().await {
        Ok(projects) => ensure_no_running_projects(&projects, force)?,
        Err(err) => warn!("Could not check for running projects: {err}"),
    }

    let home = config::phpier_home()?;
    let manager = ComposeManager::new(client.clone(), ComposeTarget::Global { home });

    info!("Stopping global services...");
    manager
        .down_with_options(&DownOptions {
            remove_volumes: false,
            remove_orphans: force,
            timeout: None,
        })
        .await?;
    info!("Global services stopped");
    Ok(())
}

/// Refuses to take the global stack down while other projects still run on
/// it, unless forced. Forcing only warns.
fn ensure_no_running_projects(projects: &[String], force: bool) -> Result<()> {
    if projects.is_empty() {
        return Ok(());
    }
    if force {
        warn!(
            "Other phpier projects are still running: {}",
            projects.join(", ")
        );
        warn!("Stopping global services will affect these projects");
        return Ok(());
    }
    Err(anyhow!(PhpierError::UserAborted(format!(
        "other phpier projects are still running: {}",
        projects.join(", ")
    ))))
}

/// Resolves a named project to its root directory via discovery. A project
/// known only from Docker images with no recoverable path cannot be operated
/// on by name.
async fn resolve_project_root(name: &str) -> Result<PathBuf> {
    let projects = discovery::discover_all().await;
    let project = discovery::resolve_by_name(name, &projects)?;
    project.path().cloned().ok_or_else(|| {
        anyhow!(PhpierError::ProjectNotFound {
            name: name.to_string(),
        })
    })
}
