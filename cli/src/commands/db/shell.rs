//! # Database and Cache Shells
//!
//! File: cli/src/commands/db/shell.rs
//!
//! ## Overview
//!
//! The top-level shell commands (`phpier mysql`, `psql`, `maria`, `redis`,
//! `memcached`) that drop the user into the corresponding client inside the
//! global stack's container. With no arguments the shell is interactive (TTY
//! attached); with arguments the client runs one command and the exit code is
//! mirrored to the caller.
//!
use crate::common::docker::client::DockerClient;
use crate::common::docker::exec::{self, ExecConfig};
use crate::core::config::{self, DbKind, GLOBAL_PROJECT_NAME};
use crate::core::error::{PhpierError, Result};
use anyhow::anyhow;
use tracing::debug;

/// Resolves the running container for a global stack service, with hints
/// pointing at `phpier global up` when it is missing or stopped.
async fn global_service_container(client: &DockerClient, service: &str) -> Result<String> {
    let id = client
        .container_id(GLOBAL_PROJECT_NAME, service)
        .await
        .map_err(|_| {
            anyhow!(PhpierError::ContainerNotFound {
                name: format!("{GLOBAL_PROJECT_NAME}-{service}"),
            })
        })?;

    if !client.is_container_running_by_id(&id).await? {
        return Err(anyhow!(PhpierError::ContainerNotRunning {
            name: format!("{GLOBAL_PROJECT_NAME}-{service}"),
        }));
    }
    debug!("Found {service} container: {id}");
    Ok(id)
}

/// Requires a database engine to be enabled before opening its shell.
fn require_enabled(kind: DbKind) -> Result<config::GlobalConfig> {
    let cfg = config::load_global_config()?;
    if !cfg.is_database_enabled(kind) {
        return Err(anyhow!(PhpierError::Config(format!(
            "{} is not enabled; run 'phpier db enable {}' first",
            kind.display_name(),
            kind.name()
        ))));
    }
    Ok(cfg)
}

/// Runs a client command in a global-stack container. Interactive mode (no
/// arguments) attaches a TTY and stdin.
async fn run_client_shell(
    service: &str,
    command: Vec<String>,
    interactive: bool,
    user: Option<&str>,
    env: Vec<(String, String)>,
) -> Result<i32> {
    let client = DockerClient::new().await?;
    let container = global_service_container(&client, service).await?;

    let exec_config = ExecConfig {
        container,
        command,
        working_dir: Some("/".to_string()),
        user: user.map(str::to_string),
        tty: interactive,
        attach_stdin: interactive,
        env,
    };
    exec::exec_interactive(&exec_config).await
}

/// Joins trailing arguments into one inline query for clients taking `-e`.
/// A leading `-e`/`--execute` is stripped so `phpier mysql -e "SHOW TABLES"`
/// and `phpier mysql "SHOW TABLES"` both work. `None` means interactive.
fn inline_query(args: &[String]) -> Option<String> {
    let query = match args.split_first() {
        Some((first, rest)) if first == "-e" || first == "--execute" => rest,
        _ => args,
    };
    if query.is_empty() {
        None
    } else {
        Some(query.join(" "))
    }
}

/// `phpier mysql [query...]`
pub async fn handle_mysql(args: Vec<String>) -> Result<i32> {
    let cfg = require_enabled(DbKind::Mysql)?;
    let db = cfg.database(DbKind::Mysql);

    let mut command = vec![
        "mysql".to_string(),
        "-u".into(),
        "root".into(),
        format!("-p{}", db.password),
    ];
    let query = inline_query(&args);
    let interactive = query.is_none();
    if let Some(query) = query {
        command.push("-e".into());
        command.push(query);
    }
    run_client_shell("mysql", command, interactive, Some("root"), Vec::new()).await
}

/// `phpier psql [args...]`
pub async fn handle_psql(args: Vec<String>) -> Result<i32> {
    let cfg = require_enabled(DbKind::Postgresql)?;
    let db = cfg.database(DbKind::Postgresql);

    let mut command = vec![
        "psql".to_string(),
        "-U".into(),
        db.username.clone(),
        "-d".into(),
        db.database.clone(),
    ];
    let interactive = args.is_empty();
    command.extend(args);
    let env = vec![("PGPASSWORD".to_string(), db.password.clone())];
    run_client_shell(
        DbKind::Postgresql.service_name(),
        command,
        interactive,
        Some("postgres"),
        env,
    )
    .await
}

/// `phpier maria [query...]`
pub async fn handle_maria(args: Vec<String>) -> Result<i32> {
    let cfg = require_enabled(DbKind::Mariadb)?;
    let db = cfg.database(DbKind::Mariadb);

    let mut command = vec![
        "mariadb".to_string(),
        "-u".into(),
        db.username.clone(),
        format!("-p{}", db.password),
        db.database.clone(),
    ];
    let query = inline_query(&args);
    let interactive = query.is_none();
    if let Some(query) = query {
        command.push("-e".into());
        command.push(query);
    }
    run_client_shell("mariadb", command, interactive, Some("root"), Vec::new()).await
}

/// `phpier redis [args...]`: everything is forwarded to redis-cli.
pub async fn handle_redis(args: Vec<String>) -> Result<i32> {
    let interactive = args.is_empty();
    let mut command = vec!["redis-cli".to_string()];
    command.extend(args);
    run_client_shell("redis", command, interactive, None, Vec::new()).await
}

/// `phpier memcached [args...]` opens a telnet session to the memcached
/// port inside the container.
pub async fn handle_memcached(args: Vec<String>) -> Result<i32> {
    let cfg = config::load_global_config()?;
    if !cfg.services.cache.memcached.enabled {
        return Err(anyhow!(PhpierError::Config(
            "Memcached is not enabled in the global configuration".into()
        )));
    }

    let interactive = args.is_empty();
    let mut command = vec![
        "telnet".to_string(),
        "memcached".into(),
        cfg.services.cache.memcached.port.to_string(),
    ];
    command.extend(args);
    run_client_shell("memcached", command, interactive, None, Vec::new()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_inline_query_joins_arguments() {
        assert_eq!(
            inline_query(&args(&["SHOW", "TABLES"])).as_deref(),
            Some("SHOW TABLES")
        );
    }

    #[test]
    fn test_inline_query_strips_leading_execute_flag() {
        assert_eq!(
            inline_query(&args(&["-e", "SHOW TABLES"])).as_deref(),
            Some("SHOW TABLES")
        );
        assert_eq!(
            inline_query(&args(&["--execute", "SELECT 1"])).as_deref(),
            Some("SELECT 1")
        );
    }

    #[test]
    fn test_inline_query_empty_means_interactive() {
        assert_eq!(inline_query(&[]), None);
        assert_eq!(inline_query(&args(&["-e"])), None);
    }
}
