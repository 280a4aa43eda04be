//! # Uninstall Command
//!
//! File: cli/src/commands/uninstall.rs
//!
//! ## Overview
//!
//! Removes phpier's global footprint from the machine: brings the global
//! stack down (optionally with its volumes) and deletes `~/.phpier`.
//! Project directories and their `.phpier.yml` files are left untouched.
//! A confirmation prompt guards the whole thing unless `--force` is given.
//!
use crate::common::docker::client::DockerClient;
use crate::common::docker::compose::{ComposeManager, ComposeTarget, DownOptions};
use crate::common::ui;
use crate::core::config;
use crate::core::error::{PhpierError, Result};
use anyhow::anyhow;
use clap::Args;
use tracing::{info, warn};

/// Arguments for `phpier uninstall`.
#[derive(Debug, Args)]
pub struct UninstallArgs {
    /// Skip the confirmation prompt
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Also remove global stack volumes (database data is lost)
    #[arg(long = "remove-volumes")]
    pub remove_volumes: bool,
}

/// Handles `phpier uninstall`.
pub async fn handle_uninstall(args: UninstallArgs) -> Result<()> {
    let home = config::phpier_home()?;

    if !args.force {
        println!("This will stop the global services and delete {}.", home.display());
        if args.remove_volumes {
            println!("Global stack volumes (including database data) will also be removed.");
        }
        if !ui::confirm("Continue?")? {
            return Err(anyhow!(PhpierError::UserAborted(
                "uninstall cancelled".into()
            )));
        }
    }

    // Stop the stack first so no container keeps the files below busy. A
    // failed probe is not fatal: the directory should still be removed.
    match DockerClient::new().await {
        Ok(client) => {
            let manager = ComposeManager::new(client, ComposeTarget::Global { home: home.clone() });
            info!("Stopping global services...");
            if let Err(err) = manager
                .down_with_options(&DownOptions {
                    remove_volumes: args.remove_volumes,
                    remove_orphans: true,
                    timeout: None,
                })
                .await
            {
                warn!("Could not stop global services: {err}");
            }
        }
        Err(err) => warn!("Docker unavailable, skipping global shutdown: {err}"),
    }

    if home.exists() {
        info!("Removing {}", home.display());
        std::fs::remove_dir_all(&home).map_err(|e| {
            anyhow!(PhpierError::FileSystem(format!(
                "failed to remove {}: {e}",
                home.display()
            )))
        })?;
    }

    info!("phpier has been uninstalled");
    println!("Done. Project directories and their .phpier.yml files were not touched.");
    Ok(())
}
