//! # Docker CLI Client
//!
//! File: cli/src/common/docker/client.rs
//!
//! ## Overview
//!
//! The process-spawning facade over the `docker` and `docker-compose` binaries.
//! Every Docker interaction in phpier goes through this module: availability
//! probing (with distinct "not installed" / "daemon not running" / "compose
//! missing" classifications), fire-and-forget commands with inherited stdio,
//! and query-style commands with captured output.
//!
//! All calls are synchronous child-process invocations awaited to completion;
//! there are no background tasks and no connection state beyond knowing which
//! compose flavor (standalone binary vs `docker compose` plugin) is in use.
//!
use crate::core::error::{PhpierError, Result};
use anyhow::anyhow;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Which Docker Compose implementation is available on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeFlavor {
    /// The standalone `docker-compose` binary.
    Standalone,
    /// The `docker compose` plugin.
    Plugin,
}

impl ComposeFlavor {
    /// The program to spawn and the leading arguments (before any compose
    /// flags) for this flavor.
    pub fn invocation(self) -> (&'static str, &'static [&'static str]) {
        match self {
            ComposeFlavor::Standalone => ("docker-compose", &[]),
            ComposeFlavor::Plugin => ("docker", &["compose"]),
        }
    }
}

/// Wrapper around the `docker` CLI. Construction verifies the toolchain is
/// usable so commands can assume a reachable daemon at creation time.
#[derive(Debug, Clone)]
pub struct DockerClient {
    compose: ComposeFlavor,
}

impl DockerClient {
    /// Probes the Docker toolchain and returns a client on success.
    ///
    /// Classification is deliberate: a missing binary, an unresponsive daemon,
    /// and an absent compose implementation each surface as their own taxonomy
    /// variant so the user gets the right suggestion.
    pub async fn new() -> Result<Self> {
        if which::which("docker").is_err() {
            return Err(anyhow!(PhpierError::DockerNotInstalled));
        }

        if !daemon_responds().await {
            return Err(anyhow!(PhpierError::DockerNotRunning));
        }

        let compose = detect_compose_flavor().await.ok_or_else(|| {
            anyhow!(PhpierError::ComposeNotFound)
        })?;

        Ok(Self { compose })
    }

    pub fn compose_flavor(&self) -> ComposeFlavor {
        self.compose
    }

    /// Non-failing daemon probe, used before compose operations so a dead
    /// daemon surfaces as a clear error instead of a compose-level one.
    pub async fn is_docker_running(&self) -> bool {
        daemon_responds().await
    }

    /// Runs a command with stdout/stderr inherited by the terminal. Used for
    /// build/up/down/logs where the underlying tool's output is the UI.
    pub async fn run_command(&self, command: &str, args: &[String]) -> Result<()> {
        debug!("Executing: {} {}", command, args.join(" "));
        let status = Command::new(command)
            .args(args)
            .status()
            .await
            .map_err(|_| command_failed(command, args))?;

        if !status.success() {
            return Err(anyhow!(command_failed(command, args)));
        }
        Ok(())
    }

    /// Runs a command capturing stdout, trimmed of surrounding whitespace.
    /// Used for query-style commands (`ps`, `images`, `inspect`).
    pub async fn run_command_output(&self, command: &str, args: &[String]) -> Result<String> {
        debug!("Executing: {} {}", command, args.join(" "));
        let output = Command::new(command)
            .args(args)
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|_| command_failed(command, args))?;

        if !output.status.success() {
            return Err(anyhow!(command_failed(command, args)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Resolves the container id of a compose service within a project via
    /// `compose -p <project> ps -q <service>`. Empty output means the service
    /// has no container, reported as [`PhpierError::ContainerNotFound`].
    pub async fn container_id(&self, project: &str, service: &str) -> Result<String> {
        let (program, lead) = self.compose.invocation();
        let mut args: Vec<String> = lead.iter().map(|s| s.to_string()).collect();
        args.extend([
            "-p".into(),
            project.into(),
            "ps".into(),
            "-q".into(),
            service.into(),
        ]);

        let id = self.run_command_output(program, &args).await?;
        if id.is_empty() {
            return Err(anyhow!(PhpierError::ContainerNotFound {
                name: service.to_string(),
            }));
        }
        // Multiple replicas would print one id per line; the first one is the
        // `-1` instance.
        Ok(id.lines().next().unwrap_or_default().to_string())
    }

    /// True when a container with exactly this name is in the `running` state.
    pub async fn is_container_running(&self, name: &str) -> Result<bool> {
        let args = vec![
            "ps".to_string(),
            "--filter".into(),
            format!("name={name}"),
            "--filter".into(),
            "status=running".into(),
            "--format".into(),
            "{{.Names}}".into(),
        ];
        let output = self.run_command_output("docker", &args).await?;
        Ok(output.lines().any(|line| line.trim() == name))
    }

    /// Distinct compose project names with at least one running container,
    /// excluding the global stack itself.
    pub async fn running_phpier_projects(&self) -> Result<Vec<String>> {
        let args = vec![
            "ps".to_string(),
            "--filter".into(),
            "label=com.docker.compose.project".into(),
            "--format".into(),
            "{{.Label \"com.docker.compose.project\"}}".into(),
        ];
        let output = self.run_command_output("docker", &args).await?;

        let mut projects = Vec::new();
        for line in output.lines() {
            let project = line.trim();
            if !project.is_empty()
                && project != crate::core::config::GLOBAL_PROJECT_NAME
                && !projects.iter().any(|p| p == project)
            {
                projects.push(project.to_string());
            }
        }
        Ok(projects)
    }

    /// True when the container behind `id` reports `running` via inspect.
    pub async fn is_container_running_by_id(&self, id: &str) -> Result<bool> {
        if id.is_empty() {
            return Ok(false);
        }
        let args = vec![
            "inspect".to_string(),
            "--format".into(),
            "{{.State.Status}}".into(),
            id.into(),
        ];
        let status = self.run_command_output("docker", &args).await?;
        Ok(status.trim() == "running")
    }
}

/// `docker version --format {{.Server.Version}}` succeeds only when the
/// daemon answers.
async fn daemon_responds() -> bool {
    Command::new("docker")
        .args(["version", "--format", "{{.Server.Version}}"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Prefers the standalone binary when both are installed, matching the
/// historical behavior users have scripts built around.
async fn detect_compose_flavor() -> Option<ComposeFlavor> {
    if which::which("docker-compose").is_ok() {
        return Some(ComposeFlavor::Standalone);
    }
    let plugin_ok = Command::new("docker")
        .args(["compose", "version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false);
    plugin_ok.then_some(ComposeFlavor::Plugin)
}

fn command_failed(command: &str, args: &[String]) -> PhpierError {
    PhpierError::CommandFailed {
        command: command.to_string(),
        args: args.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_flavor_invocation() {
        let (program, lead) = ComposeFlavor::Standalone.invocation();
        assert_eq!(program, "docker-compose");
        assert!(lead.is_empty());

        let (program, lead) = ComposeFlavor::Plugin.invocation();
        assert_eq!(program, "docker");
        assert_eq!(lead, ["compose"]);
    }

    #[test]
    fn test_command_failed_carries_context() {
        let err = command_failed("docker", &["ps".into(), "-a".into()]);
        let pairs = err.context_pairs();
        assert!(pairs.iter().any(|(k, v)| *k == "command" && v == "docker"));
        assert!(pairs.iter().any(|(k, v)| *k == "arguments" && v == "ps -a"));
    }
}
