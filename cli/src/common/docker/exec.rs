//! # Container Exec
//!
//! File: cli/src/common/docker/exec.rs
//!
//! Builds and runs `docker exec` invocations for interactive shells and for
//! proxied developer tools (composer, artisan, node, ...). The exec flags are
//! assembled by a pure function so flag composition is unit-testable without
//! a daemon.
//!
use crate::common::docker::client::DockerClient;
use crate::core::config::ProjectConfig;
use crate::core::error::{PhpierError, Result};
use anyhow::anyhow;
use tokio::process::Command;
use tracing::debug;

/// Default user for commands run inside app containers. Matches the user the
/// PHP-FPM processes run as, so artifacts created by proxied tools stay
/// writable by the web server.
pub const APP_USER: &str = "www-data";

/// Default working directory inside app containers.
pub const APP_WORKDIR: &str = "/var/www/html";

/// Sets `WWWUSER` to the invoking user's numeric id when unset, so bind
/// mounts written from inside containers keep host-owned permissions.
/// Prefers `$UID`, falling back to `id -u`.
pub fn set_www_user() -> Result<()> {
    if std::env::var_os("WWWUSER").is_some() {
        return Ok(());
    }

    let uid = match std::env::var("UID") {
        Ok(uid) if !uid.is_empty() => uid,
        _ => {
            let output = std::process::Command::new("id")
                .arg("-u")
                .output()
                .map_err(|_| {
                    anyhow!(PhpierError::CommandFailed {
                        command: "id".to_string(),
                        args: vec!["-u".to_string()],
                    })
                })?;
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        }
    };

    std::env::set_var("WWWUSER", &uid);
    debug!("Set WWWUSER={uid}");
    Ok(())
}

/// Everything needed to run a command in a container.
#[derive(Debug, Clone)]
pub struct ExecConfig {
    pub container: String,
    pub command: Vec<String>,
    pub working_dir: Option<String>,
    pub user: Option<String>,
    pub tty: bool,
    pub attach_stdin: bool,
    pub env: Vec<(String, String)>,
}

impl ExecConfig {
    /// Interactive exec defaults: a TTY with stdin attached, as the app user
    /// in the app workdir.
    pub fn interactive(container: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            container: container.into(),
            command,
            working_dir: Some(APP_WORKDIR.to_string()),
            user: Some(APP_USER.to_string()),
            tty: true,
            attach_stdin: true,
            env: Vec::new(),
        }
    }
}

/// Assembles the argument vector for `docker exec`. The flag order mirrors
/// what `docker exec --help` documents: attach/tty flags first, then user,
/// workdir, environment, container and finally the command.
pub fn build_exec_args(config: &ExecConfig) -> Vec<String> {
    let mut args = vec!["exec".to_string()];

    match (config.attach_stdin, config.tty) {
        (true, true) => args.push("-it".into()),
        (true, false) => args.push("-i".into()),
        (false, true) => args.push("-t".into()),
        (false, false) => {}
    }

    if let Some(user) = &config.user {
        args.push("--user".into());
        args.push(user.clone());
    }
    if let Some(dir) = &config.working_dir {
        args.push("-w".into());
        args.push(dir.clone());
    }
    for (key, value) in &config.env {
        args.push("-e".into());
        args.push(format!("{key}={value}"));
    }

    args.push(config.container.clone());
    args.extend(config.command.iter().cloned());
    args
}

/// Runs `docker exec` with stdio inherited and returns the command's exit
/// code. A signal-terminated process maps to exit code 1.
pub async fn exec_interactive(config: &ExecConfig) -> Result<i32> {
    let args = build_exec_args(config);
    debug!("Executing: docker {}", args.join(" "));

    let status = Command::new("docker")
        .args(&args)
        .status()
        .await
        .map_err(|_| {
            anyhow!(PhpierError::CommandFailed {
                command: "docker".to_string(),
                args: args.clone(),
            })
        })?;

    Ok(status.code().unwrap_or(1))
}

/// Runs `tool args...` inside the project's app container as the app user,
/// mirroring the tool's exit code back to the caller.
///
/// The container is resolved through compose so replica naming never needs to
/// be guessed, and a stopped container gets a "start the environment first"
/// hint instead of a raw exec failure.
pub async fn run_in_app_container(
    client: &DockerClient,
    project: &ProjectConfig,
    tool: &str,
    args: &[String],
) -> Result<i32> {
    let container_id = client
        .container_id(&project.name, "app")
        .await
        .map_err(|_| {
            anyhow!(PhpierError::ContainerNotFound {
                name: format!("{}-app", project.name),
            })
        })?;

    if !client.is_container_running_by_id(&container_id).await? {
        return Err(anyhow!(PhpierError::ContainerNotRunning {
            name: format!("{}-app", project.name),
        }));
    }

    let mut command = vec![tool.to_string()];
    command.extend(args.iter().cloned());

    let config = ExecConfig::interactive(container_id, command);
    exec_interactive(&config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ExecConfig {
        ExecConfig {
            container: "abc123".into(),
            command: vec!["bash".into()],
            working_dir: None,
            user: None,
            tty: false,
            attach_stdin: false,
            env: Vec::new(),
        }
    }

    #[test]
    fn test_minimal_exec_args() {
        let args = build_exec_args(&base_config());
        assert_eq!(args, ["exec", "abc123", "bash"]);
    }

    #[test]
    fn test_interactive_exec_args() {
        let config = ExecConfig::interactive("abc123", vec!["bash".into()]);
        let args = build_exec_args(&config);
        assert_eq!(
            args,
            [
                "exec", "-it", "--user", "www-data", "-w", "/var/www/html", "abc123", "bash"
            ]
        );
    }

    #[test]
    fn test_stdin_only_uses_i_flag() {
        let mut config = base_config();
        config.attach_stdin = true;
        let args = build_exec_args(&config);
        assert_eq!(args[1], "-i");
    }

    #[test]
    fn test_tty_only_uses_t_flag() {
        let mut config = base_config();
        config.tty = true;
        let args = build_exec_args(&config);
        assert_eq!(args[1], "-t");
    }

    #[test]
    fn test_env_vars_rendered_as_pairs() {
        let mut config = base_config();
        config.env.push(("WWWUSER".into(), "1000".into()));
        let args = build_exec_args(&config);
        let pos = args.iter().position(|a| a == "-e").unwrap();
        assert_eq!(args[pos + 1], "WWWUSER=1000");
    }
}
