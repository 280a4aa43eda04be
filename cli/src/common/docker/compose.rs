//! # Compose Lifecycle Manager
//!
//! File: cli/src/common/docker/compose.rs
//!
//! ## Overview
//!
//! Drives `docker compose` (or the standalone `docker-compose`) for two kinds
//! of targets: a single project, whose compose file is the `.phpier.yml`
//! marker at its root, and the shared global stack in `~/.phpier`. Argument
//! vectors are built by pure functions so flag composition stays testable,
//! and every spawn sets the child's working directory explicitly instead of
//! chdir-ing the phpier process around.
//!
//! Reload is a fixed sequence (down, optional pull, build the app image,
//! up) that aborts on the first failed step so a broken build never brings
//! the stack back up on the stale image.
//!
use crate::common::docker::client::{ComposeFlavor, DockerClient};
use crate::core::config::{GLOBAL_COMPOSE_FILE, GLOBAL_PROJECT_NAME, PROJECT_MARKER};
use crate::core::error::{PhpierError, Result};
use anyhow::anyhow;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Options for the `down` operation.
#[derive(Debug, Clone, Default)]
pub struct DownOptions {
    pub remove_volumes: bool,
    pub remove_orphans: bool,
    /// Shutdown timeout in seconds; omitted from the argv when `None`.
    pub timeout: Option<u32>,
}

/// Options for the `reload` sequence.
#[derive(Debug, Clone)]
pub struct ReloadOptions {
    pub detached: bool,
    pub build: bool,
    pub pull: bool,
    pub no_cache: bool,
    pub remove_orphans: bool,
    pub timeout: Option<u32>,
}

/// Options for the `logs` operation.
#[derive(Debug, Clone, Default)]
pub struct LogsOptions {
    pub service: Option<String>,
    pub follow: bool,
    pub tail: Option<u32>,
    pub since: Option<String>,
}

/// What a compose invocation points at.
#[derive(Debug, Clone)]
pub enum ComposeTarget {
    /// One project: compose file is the marker file at the project root.
    Project { name: String, root: PathBuf },
    /// The shared stack under the phpier home directory.
    Global { home: PathBuf },
}

impl ComposeTarget {
    pub fn compose_file(&self) -> &'static str {
        match self {
            ComposeTarget::Project { .. } => PROJECT_MARKER,
            ComposeTarget::Global { .. } => GLOBAL_COMPOSE_FILE,
        }
    }

    pub fn project_name(&self) -> &str {
        match self {
            ComposeTarget::Project { name, .. } => name,
            ComposeTarget::Global { .. } => GLOBAL_PROJECT_NAME,
        }
    }

    pub fn workdir(&self) -> &Path {
        match self {
            ComposeTarget::Project { root, .. } => root,
            ComposeTarget::Global { home } => home,
        }
    }
}

/// Base argv for one compose operation: the plugin prefix when applicable,
/// then `-f <file> -p <project> <op>`.
pub fn base_args(flavor: ComposeFlavor, file: &str, project: &str, op: &str) -> Vec<String> {
    let mut args = Vec::new();
    if flavor == ComposeFlavor::Plugin {
        args.push("compose".to_string());
    }
    args.extend([
        "-f".to_string(),
        file.to_string(),
        "-p".to_string(),
        project.to_string(),
        op.to_string(),
    ]);
    args
}

/// Appends `down` flags in a fixed order: `-v`, `--remove-orphans`,
/// `--timeout <n>`.
pub fn append_down_flags(args: &mut Vec<String>, options: &DownOptions) {
    if options.remove_volumes {
        args.push("-v".into());
    }
    if options.remove_orphans {
        args.push("--remove-orphans".into());
    }
    if let Some(timeout) = options.timeout {
        args.push("--timeout".into());
        args.push(timeout.to_string());
    }
}

/// Appends `logs` flags, then the optional service selector last.
pub fn append_logs_flags(args: &mut Vec<String>, options: &LogsOptions) {
    if options.follow {
        args.push("-f".into());
    }
    if let Some(tail) = options.tail {
        args.push("--tail".into());
        args.push(tail.to_string());
    }
    if let Some(since) = &options.since {
        args.push("--since".into());
        args.push(since.clone());
    }
    if let Some(service) = &options.service {
        args.push(service.clone());
    }
}

/// One step of the reload sequence, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadStep {
    Down,
    Pull,
    BuildApp,
    Up,
}

/// The steps a reload with these options will run, in order. Pull and build
/// only appear when building was requested.
pub fn reload_plan(options: &ReloadOptions) -> Vec<ReloadStep> {
    let mut plan = vec![ReloadStep::Down];
    if options.build {
        if options.pull {
            plan.push(ReloadStep::Pull);
        }
        plan.push(ReloadStep::BuildApp);
    }
    plan.push(ReloadStep::Up);
    plan
}

/// Runs compose operations against one target.
pub struct ComposeManager {
    client: DockerClient,
    target: ComposeTarget,
}

impl ComposeManager {
    pub fn new(client: DockerClient, target: ComposeTarget) -> Self {
        Self { client, target }
    }

    pub fn target(&self) -> &ComposeTarget {
        &self.target
    }

    fn args_for(&self, op: &str) -> Vec<String> {
        base_args(
            self.client.compose_flavor(),
            self.target.compose_file(),
            self.target.project_name(),
            op,
        )
    }

    /// Spawns the compose command in the target's directory with inherited
    /// stdio. Fails up front with a configuration error when the compose file
    /// has not been generated yet.
    async fn run(&self, args: Vec<String>) -> Result<()> {
        let workdir = self.target.workdir();
        let compose_path = workdir.join(self.target.compose_file());
        if !compose_path.exists() {
            return Err(anyhow!(PhpierError::Config(format!(
                "compose file not found at {}",
                compose_path.display()
            ))));
        }

        let (program, _) = self.client.compose_flavor().invocation();
        debug!(
            "Executing in {}: {} {}",
            workdir.display(),
            program,
            args.join(" ")
        );

        let status = Command::new(program)
            .args(&args)
            .current_dir(workdir)
            .status()
            .await
            .map_err(|_| {
                anyhow!(PhpierError::CommandFailed {
                    command: program.to_string(),
                    args: args.clone(),
                })
            })?;

        if !status.success() {
            return Err(anyhow!(PhpierError::CommandFailed {
                command: program.to_string(),
                args,
            }));
        }
        Ok(())
    }

    async fn ensure_daemon(&self) -> Result<()> {
        if !self.client.is_docker_running().await {
            return Err(anyhow!(PhpierError::DockerNotRunning));
        }
        Ok(())
    }

    /// Every compose operation goes through here: the daemon probe runs
    /// before any compose invocation so an unreachable daemon surfaces as
    /// the distinct not-running error rather than a compose-level failure.
    async fn run_checked(&self, args: Vec<String>) -> Result<()> {
        self.ensure_daemon().await?;
        self.run(args).await
    }

    pub async fn up(&self, detached: bool) -> Result<()> {
        let mut args = self.args_for("up");
        if detached {
            args.push("-d".into());
        }
        self.run_checked(args).await
    }

    pub async fn down(&self, remove_volumes: bool) -> Result<()> {
        self.down_with_options(&DownOptions {
            remove_volumes,
            ..Default::default()
        })
        .await
    }

    pub async fn down_with_options(&self, options: &DownOptions) -> Result<()> {
        let mut args = self.args_for("down");
        append_down_flags(&mut args, options);
        self.run_checked(args).await
    }

    pub async fn build(&self, no_cache: bool, services: &[String]) -> Result<()> {
        let mut args = self.args_for("build");
        if no_cache {
            args.push("--no-cache".into());
        }
        args.extend(services.iter().cloned());
        self.run_checked(args).await.map_err(|err| {
            match services.first() {
                Some(service) => err.context(PhpierError::BuildFailed {
                    service: service.clone(),
                }),
                None => err,
            }
        })
    }

    pub async fn pull(&self) -> Result<()> {
        self.run_checked(self.args_for("pull")).await
    }

    pub async fn logs(&self, options: &LogsOptions) -> Result<()> {
        let mut args = self.args_for("logs");
        append_logs_flags(&mut args, options);
        self.run_checked(args).await
    }

    /// Stops, optionally rebuilds, and restarts the project stack. Not
    /// available for the global target, whose images are pulled rather than
    /// built.
    pub async fn reload(&self, options: &ReloadOptions) -> Result<()> {
        if matches!(self.target, ComposeTarget::Global { .. }) {
            return Err(anyhow!(PhpierError::GlobalReloadUnsupported));
        }
        self.ensure_daemon().await?;

        for step in reload_plan(options) {
            match step {
                ReloadStep::Down => {
                    info!("Stopping project services...");
                    self.down_with_options(&DownOptions {
                        remove_volumes: false,
                        remove_orphans: options.remove_orphans,
                        timeout: options.timeout,
                    })
                    .await?;
                }
                ReloadStep::Pull => {
                    info!("Pulling latest base images...");
                    self.pull().await?;
                }
                ReloadStep::BuildApp => {
                    info!("Building project image...");
                    self.build(options.no_cache, &["app".to_string()]).await?;
                }
                ReloadStep::Up => {
                    info!("Starting project services...");
                    self.up(options.detached).await?;
                }
            }
        }
        Ok(())
    }

    /// Whether the global stack's entry point (Traefik) is running. Probe
    /// failures are treated as "not running" so callers can attempt a start
    /// rather than give up.
    pub async fn is_global_service_running(&self) -> Result<bool> {
        self.ensure_daemon().await?;

        // Compose v2 uses dashes in container names, v1 used underscores.
        for name in ["phpier-traefik-1", "phpier_traefik_1"] {
            match self.client.is_container_running(name).await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(err) => debug!("Could not check {name}: {err}"),
            }
        }
        Ok(false)
    }

    /// Starts the global stack in detached mode unless it is already up.
    pub async fn start_global_services_if_needed(&self) -> Result<()> {
        if self.is_global_service_running().await? {
            debug!("Global services are already running");
            return Ok(());
        }
        info!("Starting global services (Traefik)...");
        self.up(true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_args_plugin_prefix() {
        let args = base_args(ComposeFlavor::Plugin, ".phpier.yml", "blog", "up");
        assert_eq!(args, ["compose", "-f", ".phpier.yml", "-p", "blog", "up"]);
    }

    #[test]
    fn test_base_args_standalone_has_no_prefix() {
        let args = base_args(ComposeFlavor::Standalone, "docker-compose.yml", "phpier", "down");
        assert_eq!(args, ["-f", "docker-compose.yml", "-p", "phpier", "down"]);
    }

    #[test]
    fn test_down_flags_full() {
        let mut args = vec!["down".to_string()];
        append_down_flags(
            &mut args,
            &DownOptions {
                remove_volumes: true,
                remove_orphans: true,
                timeout: Some(15),
            },
        );
        assert_eq!(args, ["down", "-v", "--remove-orphans", "--timeout", "15"]);
    }

    #[test]
    fn test_down_flags_bare() {
        let mut args = vec!["down".to_string()];
        append_down_flags(&mut args, &DownOptions::default());
        assert_eq!(args, ["down"]);
    }

    #[test]
    fn test_logs_flags_service_comes_last() {
        let mut args = vec!["logs".to_string()];
        append_logs_flags(
            &mut args,
            &LogsOptions {
                service: Some("app".into()),
                follow: true,
                tail: Some(100),
                since: Some("10m".into()),
            },
        );
        assert_eq!(args, ["logs", "-f", "--tail", "100", "--since", "10m", "app"]);
    }

    #[test]
    fn test_reload_plan_without_build() {
        let options = ReloadOptions {
            detached: true,
            build: false,
            pull: false,
            no_cache: false,
            remove_orphans: false,
            timeout: None,
        };
        assert_eq!(reload_plan(&options), [ReloadStep::Down, ReloadStep::Up]);
    }

    #[test]
    fn test_reload_plan_with_build_and_pull() {
        let options = ReloadOptions {
            detached: true,
            build: true,
            pull: true,
            no_cache: true,
            remove_orphans: false,
            timeout: Some(30),
        };
        assert_eq!(
            reload_plan(&options),
            [
                ReloadStep::Down,
                ReloadStep::Pull,
                ReloadStep::BuildApp,
                ReloadStep::Up
            ]
        );
    }

    #[test]
    fn test_pull_never_runs_without_build() {
        let options = ReloadOptions {
            detached: true,
            build: false,
            pull: true,
            no_cache: false,
            remove_orphans: false,
            timeout: None,
        };
        assert!(!reload_plan(&options).contains(&ReloadStep::Pull));
    }

    #[test]
    fn test_target_paths() {
        let project = ComposeTarget::Project {
            name: "blog".into(),
            root: PathBuf::from("/home/dev/blog"),
        };
        assert_eq!(project.compose_file(), ".phpier.yml");
        assert_eq!(project.project_name(), "blog");

        let global = ComposeTarget::Global {
            home: PathBuf::from("/home/dev/.phpier"),
        };
        assert_eq!(global.compose_file(), "docker-compose.yml");
        assert_eq!(global.project_name(), "phpier");
    }
}
