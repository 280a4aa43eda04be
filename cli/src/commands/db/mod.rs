//! # Database Command Group
//!
//! File: cli/src/commands/db/mod.rs
//!
//! ## Overview
//!
//! Manages the database services of the global stack: listing configured
//! services, probing their running state, showing connection credentials, and
//! toggling them on or off in the global configuration. Multiple database
//! engines can be enabled at once.
//!
//! The interactive database shells (`phpier mysql`, `psql`, `maria`, `redis`,
//! `memcached`) live in the `shell` submodule; they are top-level commands
//! but share this group's configuration lookups.
//!
pub mod shell;

use crate::common::docker::client::DockerClient;
use crate::core::config::{self, DbKind, GLOBAL_PROJECT_NAME};
use crate::core::error::Result;
use clap::Subcommand;

/// Subcommands of `phpier db`.
#[derive(Debug, Subcommand)]
pub enum DbCommand {
    /// List all database services and their enabled/disabled status
    List,
    /// Show running status of database services with ports
    Status,
    /// Show credentials for enabled database services
    Credentials,
    /// Enable a database service (mysql, postgresql, mariadb)
    Enable { database: String },
    /// Disable a database service (mysql, postgresql, mariadb)
    Disable { database: String },
}

/// Dispatches `phpier db` subcommands.
pub async fn handle_db(command: DbCommand) -> Result<()> {
    match command {
        DbCommand::List => handle_list(),
        DbCommand::Status => handle_status().await,
        DbCommand::Credentials => handle_credentials(),
        DbCommand::Enable { database } => handle_enable(&database),
        DbCommand::Disable { database } => handle_disable(&database),
    }
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

fn handle_list() -> Result<()> {
    let cfg = config::load_global_config()?;
    println!("Database Services:");
    for kind in DbKind::ALL {
        let db = cfg.database(kind);
        println!(
            "  {:<12} [{}]",
            kind.display_name(),
            enabled_label(db.enabled)
        );
    }
    Ok(())
}

async fn handle_status() -> Result<()> {
    let cfg = config::load_global_config()?;
    println!("Database Services Status:");
    for kind in DbKind::ALL {
        let db = cfg.database(kind);
        if db.enabled {
            let running = database_running(kind).await;
            let state = if running { "running" } else { "stopped" };
            println!(
                "  {:<12} [enabled]  [{}]  localhost:{}",
                kind.display_name(),
                state,
                db.port
            );
        } else {
            println!(
                "  {:<12} [disabled] [stopped]  localhost:{}",
                kind.display_name(),
                db.port
            );
        }
    }
    Ok(())
}

fn handle_credentials() -> Result<()> {
    let cfg = config::load_global_config()?;
    let enabled = cfg.enabled_databases();
    if enabled.is_empty() {
        println!("No database services are currently enabled.");
        println!("Use 'phpier db enable <service>' to enable a database service.");
        return Ok(());
    }

    println!("Database Credentials (enabled services only):");
    println!();
    for (kind, db) in enabled {
        println!("{}:", kind.display_name());
        println!("  Host:     localhost:{}", db.port);
        println!("  Username: {}", db.username);
        println!("  Password: {}", db.password);
        println!("  Database: {}", db.database);
        println!();
    }
    Ok(())
}

fn handle_enable(database: &str) -> Result<()> {
    let kind = DbKind::parse(database)?;
    let mut cfg = config::load_global_config()?;

    if cfg.database(kind).enabled {
        println!("{} is already enabled.", kind.display_name());
        return Ok(());
    }

    cfg.database_mut(kind).enabled = true;
    config::save_global_config(&cfg)?;

    println!("{} has been enabled.", kind.display_name());
    println!("Run 'phpier global up' to start the service.");
    Ok(())
}

fn handle_disable(database: &str) -> Result<()> {
    let kind = DbKind::parse(database)?;
    let mut cfg = config::load_global_config()?;

    if !cfg.database(kind).enabled {
        println!("{} is already disabled.", kind.display_name());
        return Ok(());
    }

    cfg.database_mut(kind).enabled = false;
    config::save_global_config(&cfg)?;

    println!("{} has been disabled.", kind.display_name());
    println!("Run 'phpier global up' to apply changes (the service will be stopped).");
    Ok(())
}

/// Whether the global stack container for this engine is running. Probe
/// failures count as "not running".
async fn database_running(kind: DbKind) -> bool {
    let Ok(client) = DockerClient::new().await else {
        return false;
    };
    let Ok(id) = client.container_id(GLOBAL_PROJECT_NAME, kind.service_name()).await else {
        return false;
    };
    client.is_container_running_by_id(&id).await.unwrap_or(false)
}
