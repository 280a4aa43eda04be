//! # Developer Tool Proxying
//!
//! File: cli/src/commands/tools/mod.rs
//!
//! ## Overview
//!
//! Runs developer tools inside app containers: the `sh` shell, the generic
//! `proxy` command, and the named wrappers (`composer`, `artisan`, `php`,
//! `node`, `npm`, `npx`). All proxied argument tails are forwarded verbatim;
//! no flag parsing happens on them, so `phpier php -v` passes `-v` to PHP
//! rather than to phpier.
//!
//! `proxy` is context-aware: inside a project the first argument is the tool;
//! outside one it names the project whose app container to use, resolved
//! through discovery.
//!
use crate::common::docker::client::DockerClient;
use crate::common::docker::exec::{self, ExecConfig, APP_USER, APP_WORKDIR};
use crate::core::config;
use crate::core::discovery;
use crate::core::error::{PhpierError, Result};
use anyhow::anyhow;
use clap::Args;
use tracing::{debug, warn};

/// Arguments for `phpier sh`.
#[derive(Debug, Args)]
pub struct ShArgs {
    /// Run a single command instead of an interactive shell
    #[arg(short = 'c', long = "command")]
    pub command: Option<String>,

    /// User to run the shell as
    #[arg(long, default_value = APP_USER)]
    pub user: String,
}

/// Arguments for `phpier proxy`.
#[derive(Debug, Args)]
pub struct ProxyArgs {
    /// `[app] <tool> [args...]`; everything after the tool is forwarded
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    pub args: Vec<String>,
}

/// Handles `phpier sh`.
pub async fn handle_sh(args: ShArgs) -> Result<i32> {
    let project_cfg = config::load_project_config()?;

    if let Err(err) = exec::set_www_user() {
        warn!("Failed to set WWWUSER: {err}");
    }

    let client = DockerClient::new().await?;
    let container = app_container(&client, &project_cfg.name).await?;

    let interactive = args.command.is_none();
    let command = match &args.command {
        Some(cmd) => vec!["/bin/bash".to_string(), "-c".into(), cmd.clone()],
        None => vec!["/bin/bash".to_string()],
    };

    let mut exec_config = ExecConfig {
        container,
        command,
        working_dir: Some(APP_WORKDIR.to_string()),
        user: Some(args.user),
        tty: interactive,
        attach_stdin: interactive,
        env: Vec::new(),
    };
    debug!("Opening shell as {:?}", exec_config.user);
    let code = exec::exec_interactive(&exec_config).await?;

    // 126/127 from an interactive exec means bash is missing in the image.
    if interactive && (code == 126 || code == 127) {
        debug!("bash not available, falling back to /bin/sh");
        exec_config.command = vec!["/bin/sh".to_string()];
        return exec::exec_interactive(&exec_config).await;
    }
    Ok(code)
}

/// Handles `phpier proxy` with its context-aware argument layout.
pub async fn handle_proxy(args: ProxyArgs) -> Result<i32> {
    let (project, tool, tail) = split_proxy_args(&args.args, config::in_project())?;
    match project {
        Some(name) => run_tool_in_named_project(&name, &tool, tail).await,
        None => run_tool(&tool, tail).await,
    }
}

/// Splits the proxy tail into (named project, tool, tool args) depending on
/// whether we are inside a project.
fn split_proxy_args(
    args: &[String],
    in_project: bool,
) -> Result<(Option<String>, String, Vec<String>)> {
    if in_project {
        match args {
            [tool, rest @ ..] => Ok((None, tool.clone(), rest.to_vec())),
            [] => Err(invalid_proxy_usage()),
        }
    } else {
        match args {
            [app, tool, rest @ ..] => Ok((Some(app.clone()), tool.clone(), rest.to_vec())),
            _ => Err(invalid_proxy_usage()),
        }
    }
}

fn invalid_proxy_usage() -> anyhow::Error {
    anyhow!(PhpierError::InvalidArguments(
        "usage: phpier proxy <tool> [args...] inside a project, or \
         phpier proxy <app> <tool> [args...] from anywhere"
            .into()
    ))
}

/// Runs a tool in the current project's app container.
pub async fn run_tool(tool: &str, args: Vec<String>) -> Result<i32> {
    let project_cfg = config::load_project_config()?;

    if let Err(err) = exec::set_www_user() {
        warn!("Failed to set WWWUSER: {err}");
    }

    let client = DockerClient::new().await?;
    exec::run_in_app_container(&client, &project_cfg, tool, &args).await
}

/// Runs a tool in a named project's app container, resolved via discovery.
async fn run_tool_in_named_project(name: &str, tool: &str, args: Vec<String>) -> Result<i32> {
    let projects = discovery::discover_all().await;
    discovery::resolve_by_name(name, &projects)?;

    let client = DockerClient::new().await?;
    let container = app_container(&client, name).await?;

    let mut command = vec![tool.to_string()];
    command.extend(args);
    let exec_config = ExecConfig::interactive(container, command);
    exec::exec_interactive(&exec_config).await
}

/// The running app container for a project, with start hints on failure.
async fn app_container(client: &DockerClient, project: &str) -> Result<String> {
    let id = client.container_id(project, "app").await.map_err(|_| {
        anyhow!(PhpierError::ContainerNotFound {
            name: format!("{project}-app"),
        })
    })?;
    if !client.is_container_running_by_id(&id).await? {
        return Err(anyhow!(PhpierError::ContainerNotRunning {
            name: format!("{project}-app"),
        }));
    }
    Ok(id)
}

/// `phpier composer [args...]`
pub async fn handle_composer(args: Vec<String>) -> Result<i32> {
    run_tool("composer", args).await
}

/// `phpier artisan [args...]`, shorthand for `php artisan`.
pub async fn handle_artisan(args: Vec<String>) -> Result<i32> {
    let mut full = vec!["artisan".to_string()];
    full.extend(args);
    run_tool("php", full).await
}

/// `phpier php [args...]`
pub async fn handle_php(args: Vec<String>) -> Result<i32> {
    run_tool("php", args).await
}

/// `phpier node [args...]`
pub async fn handle_node(args: Vec<String>) -> Result<i32> {
    run_tool("node", args).await
}

/// `phpier npm [args...]`
pub async fn handle_npm(args: Vec<String>) -> Result<i32> {
    run_tool("npm", args).await
}

/// `phpier npx [args...]`
pub async fn handle_npx(args: Vec<String>) -> Result<i32> {
    run_tool("npx", args).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ProxyArgs,
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_proxy_tail_keeps_flags_verbatim() {
        let cli = TestCli::parse_from(["test", "php", "-d", "memory_limit=512M", "script.php"]);
        assert_eq!(
            cli.args.args,
            strings(&["php", "-d", "memory_limit=512M", "script.php"])
        );
    }

    #[test]
    fn test_split_in_project_context() {
        let (app, tool, tail) =
            split_proxy_args(&strings(&["composer", "install", "--no-dev"]), true).unwrap();
        assert!(app.is_none());
        assert_eq!(tool, "composer");
        assert_eq!(tail, strings(&["install", "--no-dev"]));
    }

    #[test]
    fn test_split_global_context_takes_app_first() {
        let (app, tool, tail) =
            split_proxy_args(&strings(&["myapp", "php", "-v"]), false).unwrap();
        assert_eq!(app.as_deref(), Some("myapp"));
        assert_eq!(tool, "php");
        assert_eq!(tail, strings(&["-v"]));
    }

    #[test]
    fn test_split_global_context_requires_two_args() {
        let err = split_proxy_args(&strings(&["composer"]), false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PhpierError>(),
            Some(PhpierError::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_sh_args_default_user() {
        #[derive(Parser)]
        struct ShCli {
            #[command(flatten)]
            args: ShArgs,
        }
        let cli = ShCli::parse_from(["test"]);
        assert_eq!(cli.args.user, APP_USER);
        assert!(cli.args.command.is_none());

        let cli = ShCli::parse_from(["test", "-c", "php -v", "--user", "root"]);
        assert_eq!(cli.args.command.as_deref(), Some("php -v"));
        assert_eq!(cli.args.user, "root");
    }
}
