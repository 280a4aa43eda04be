//! # Reload Command
//!
//! File: cli/src/commands/reload.rs
//!
//! ## Overview
//!
//! Restarts the current project's services: graceful stop, optional image
//! rebuild (with optional base-image pull and cache bypass), then start.
//! `--pull` and `--no-cache` only make sense together with `--build`, so the
//! combination is validated before anything is stopped.
//!
use crate::commands::up;
use crate::common::docker::client::DockerClient;
use crate::common::docker::compose::{ComposeManager, ComposeTarget, ReloadOptions};
use crate::common::docker::exec;
use crate::core::config;
use crate::core::error::{PhpierError, Result};
use anyhow::anyhow;
use clap::Args;
use tracing::{info, warn};

/// Arguments for `phpier reload`.
#[derive(Debug, Args)]
pub struct ReloadArgs {
    /// Run services in the background after the restart
    #[arg(short = 'd', long = "detach")]
    pub detach: bool,

    /// Rebuild the app image before restarting
    #[arg(long)]
    pub build: bool,

    /// Remove containers that don't respond to graceful shutdown
    #[arg(long)]
    pub force: bool,

    /// Timeout in seconds for stopping containers
    #[arg(long, default_value_t = 30)]
    pub timeout: u32,

    /// Skip checking/starting global services during reload
    #[arg(long = "skip-global")]
    pub skip_global: bool,

    /// Pull latest base images before rebuilding (requires --build)
    #[arg(long)]
    pub pull: bool,

    /// Rebuild without the image cache (requires --build)
    #[arg(long = "no-cache")]
    pub no_cache: bool,
}

/// Checks flag combinations that clap cannot express.
pub fn validate_args(args: &ReloadArgs) -> Result<()> {
    if args.pull && !args.build {
        return Err(anyhow!(PhpierError::InvalidArguments(
            "--pull flag requires --build flag".into()
        )));
    }
    if args.no_cache && !args.build {
        return Err(anyhow!(PhpierError::InvalidArguments(
            "--no-cache flag requires --build flag".into()
        )));
    }
    if args.timeout == 0 {
        return Err(anyhow!(PhpierError::InvalidArguments(
            "--timeout must be greater than 0".into()
        )));
    }
    Ok(())
}

/// Handles `phpier reload`.
pub async fn handle_reload(args: ReloadArgs) -> Result<()> {
    validate_args(&args)?;

    let project_root = config::require_project_root()?;
    let project_cfg = config::load_project_config()?;
    config::load_global_config()?;

    if let Err(err) = exec::set_www_user() {
        warn!("Failed to set WWWUSER: {err}");
    }

    let client = DockerClient::new().await?;

    if args.skip_global {
        info!("Skipping global service startup check");
    } else {
        up::ensure_global_running(&client).await?;
    }

    let manager = ComposeManager::new(
        client,
        ComposeTarget::Project {
            name: project_cfg.name,
            root: project_root,
        },
    );

    info!("Reloading project services...");
    manager
        .reload(&ReloadOptions {
            detached: args.detach,
            build: args.build,
            pull: args.pull,
            no_cache: args.no_cache,
            remove_orphans: args.force,
            timeout: Some(args.timeout),
        })
        .await?;

    info!("Project services reloaded");
    if args.detach {
        info!("Services are running in the background; use 'phpier down' to stop them");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ReloadArgs,
    }

    fn parse(argv: &[&str]) -> ReloadArgs {
        TestCli::parse_from(argv).args
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["test"]);
        assert!(!args.build);
        assert_eq!(args.timeout, 30);
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_pull_requires_build() {
        let args = parse(&["test", "--pull"]);
        let err = validate_args(&args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PhpierError>(),
            Some(PhpierError::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_no_cache_requires_build() {
        let args = parse(&["test", "--no-cache"]);
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let args = parse(&["test", "--timeout", "0"]);
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_full_refresh_combination() {
        let args = parse(&["test", "--build", "--pull", "--no-cache", "-d"]);
        assert!(validate_args(&args).is_ok());
        assert!(args.detach && args.build && args.pull && args.no_cache);
    }
}
