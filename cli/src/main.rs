//! # Phpier Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the phpier CLI. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the command handlers
//! - Translating errors into the process exit code taxonomy
//!
//! ## Architecture
//!
//! Each top-level command is a variant of the `Commands` enum and maps to a
//! handler in `commands::`. Handlers that run something inside a container
//! return that command's exit code so it can be mirrored to the caller;
//! everything else returns `()` and exits zero on success. Failures flow up
//! as `anyhow` errors and are rendered (message, context, suggestions) by
//! `core::error::report`, which also picks the exit code.
//!
//! ## Examples
//!
//! ```bash
//! # Start the current project in the background
//! phpier up -d
//!
//! # Run composer inside the app container with extra verbosity
//! phpier -v composer install
//! ```
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod common;
mod core;

use crate::commands::db::shell;
use crate::commands::tools;

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "phpier",
    about = "Dockerized PHP development environments behind a shared Traefik proxy",
    long_about = "Manage per-project PHP app containers and the shared global stack\n\
                  (Traefik, databases, caches, web tools) they attach to.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Enum defining all available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    /// Start the current project's services
    Up(commands::up::UpArgs),
    /// Stop project services, optionally the global stack too
    Down(commands::down::DownArgs),
    /// Context-aware start (project + global stack, or global stack only)
    Start(commands::start::StartArgs),
    /// Context-aware stop (project + global stack, or global stack only)
    Stop(commands::stop::StopArgs),
    /// Restart project services with optional rebuild
    Reload(commands::reload::ReloadArgs),
    /// Build the project's app image
    Build(commands::build::BuildArgs),
    /// Show project service logs
    Logs(commands::logs::LogsArgs),
    /// List discovered phpier projects
    List(commands::list::ListArgs),
    /// Show status of all phpier services
    Services(commands::services::ServicesArgs),
    /// Manage database services
    #[command(subcommand)]
    Db(commands::db::DbCommand),
    /// Manage the global services stack
    #[command(subcommand)]
    Global(commands::global::GlobalCommand),
    /// Open a MySQL shell, or run a query
    #[command(trailing_var_arg = true)]
    Mysql {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Open a PostgreSQL shell; arguments are forwarded to psql
    #[command(trailing_var_arg = true, visible_alias = "postgres")]
    Psql {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Open a MariaDB shell, or run a query
    #[command(trailing_var_arg = true, visible_alias = "mariadb")]
    Maria {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run redis-cli in the Redis container
    #[command(trailing_var_arg = true)]
    Redis {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Open a telnet session to Memcached
    #[command(trailing_var_arg = true)]
    Memcached {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Open a shell in the app container
    Sh(tools::ShArgs),
    /// Run a tool in an app container (context-aware)
    Proxy(tools::ProxyArgs),
    /// Run composer in the app container
    #[command(trailing_var_arg = true)]
    Composer {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run php artisan in the app container
    #[command(trailing_var_arg = true)]
    Artisan {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run php in the app container
    #[command(trailing_var_arg = true)]
    Php {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run node in the app container
    #[command(trailing_var_arg = true)]
    Node {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run npm in the app container
    #[command(trailing_var_arg = true)]
    Npm {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run npx in the app container
    #[command(trailing_var_arg = true)]
    Npx {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Show version information
    Version,
    /// Remove the global stack and ~/.phpier
    Uninstall(commands::uninstall::UninstallArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    // Exit-code-bearing handlers mirror the container command's code;
    // the rest map success to zero.
    let result: core::error::Result<i32> = match cli.command {
        Commands::Up(args) => commands::up::handle_up(args).await.map(|_| 0),
        Commands::Down(args) => commands::down::handle_down(args).await.map(|_| 0),
        Commands::Start(args) => commands::start::handle_start(args).await.map(|_| 0),
        Commands::Stop(args) => commands::stop::handle_stop(args).await.map(|_| 0),
        Commands::Reload(args) => commands::reload::handle_reload(args).await.map(|_| 0),
        Commands::Build(args) => commands::build::handle_build(args).await.map(|_| 0),
        Commands::Logs(args) => commands::logs::handle_logs(args).await.map(|_| 0),
        Commands::List(args) => commands::list::handle_list(args).await.map(|_| 0),
        Commands::Services(args) => commands::services::handle_services(args).await.map(|_| 0),
        Commands::Db(command) => commands::db::handle_db(command).await.map(|_| 0),
        Commands::Global(command) => commands::global::handle_global(command).await.map(|_| 0),
        Commands::Mysql { args } => shell::handle_mysql(args).await,
        Commands::Psql { args } => shell::handle_psql(args).await,
        Commands::Maria { args } => shell::handle_maria(args).await,
        Commands::Redis { args } => shell::handle_redis(args).await,
        Commands::Memcached { args } => shell::handle_memcached(args).await,
        Commands::Sh(args) => tools::handle_sh(args).await,
        Commands::Proxy(args) => tools::handle_proxy(args).await,
        Commands::Composer { args } => tools::handle_composer(args).await,
        Commands::Artisan { args } => tools::handle_artisan(args).await,
        Commands::Php { args } => tools::handle_php(args).await,
        Commands::Node { args } => tools::handle_node(args).await,
        Commands::Npm { args } => tools::handle_npm(args).await,
        Commands::Npx { args } => tools::handle_npx(args).await,
        Commands::Version => commands::version::handle_version().map(|_| 0),
        Commands::Uninstall(args) => commands::uninstall::handle_uninstall(args).await.map(|_| 0),
    };

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(err) => {
            let code = core::error::report(&err);
            std::process::exit(code);
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use predicates::prelude::*;

    fn phpier_cmd() -> Command {
        Command::cargo_bin("phpier").expect("Failed to find phpier binary for testing")
    }

    #[test]
    fn test_main_help_flag() {
        phpier_cmd().arg("--help").assert().success();
    }

    #[test]
    fn test_main_version_flag() {
        phpier_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}
