//! # Up Command
//!
//! File: cli/src/commands/up.rs
//!
//! ## Overview
//!
//! Starts the current project's app container, making sure the shared global
//! stack (Traefik and the enabled services) is running first. The global
//! startup check can be skipped for setups where the stack is managed
//! elsewhere.
//!
use crate::common::docker::client::DockerClient;
use crate::common::docker::compose::{ComposeManager, ComposeTarget};
use crate::core::config;
use crate::core::error::Result;
use clap::Args;
use tracing::info;

/// Arguments for `phpier up`.
#[derive(Debug, Args)]
pub struct UpArgs {
    /// Run services in the background
    #[arg(short = 'd', long = "detach")]
    pub detach: bool,

    /// Build the app image before starting services
    #[arg(long)]
    pub build: bool,

    /// Skip the automatic global service startup check
    #[arg(long = "skip-global")]
    pub skip_global: bool,
}

/// Handles `phpier up`.
pub async fn handle_up(args: UpArgs) -> Result<()> {
    let project_root = config::require_project_root()?;
    let project_cfg = config::load_project_config()?;
    config::load_global_config()?;

    let client = DockerClient::new().await?;

    if args.skip_global {
        info!("Skipping global service startup check");
    } else {
        ensure_global_running(&client).await?;
    }

    let manager = ComposeManager::new(
        client,
        ComposeTarget::Project {
            name: project_cfg.name.clone(),
            root: project_root,
        },
    );

    if args.build {
        info!("Building project image...");
        manager.build(false, &[]).await?;
    }

    info!("Starting project container...");
    manager.up(args.detach).await?;

    info!("Project services started");
    if args.detach {
        info!("Services are running in the background; use 'phpier down' to stop them");
    }
    Ok(())
}

/// Starts the global stack when it is not already up.
pub async fn ensure_global_running(client: &DockerClient) -> Result<()> {
    let home = config::phpier_home()?;
    let manager = ComposeManager::new(client.clone(), ComposeTarget::Global { home });
    manager.start_global_services_if_needed().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: UpArgs,
    }

    #[test]
    fn test_up_args_defaults() {
        let cli = TestCli::parse_from(["test"]);
        assert!(!cli.args.detach);
        assert!(!cli.args.build);
        assert!(!cli.args.skip_global);
    }

    #[test]
    fn test_up_args_flags() {
        let cli = TestCli::parse_from(["test", "-d", "--build", "--skip-global"]);
        assert!(cli.args.detach);
        assert!(cli.args.build);
        assert!(cli.args.skip_global);
    }
}
