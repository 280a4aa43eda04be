//! # Services Command
//!
//! File: cli/src/commands/services.rs
//!
//! ## Overview
//!
//! Shows the status of every phpier-managed container across all projects:
//! state, health, uptime, published ports and proxy URL. Output can be
//! filtered by project, service type, or container status, and rendered as
//! JSON for scripting.
//!
use crate::common::docker::client::DockerClient;
use crate::common::docker::services::{self, ServiceInfo, ServicesFilter};
use crate::common::ui::Table;
use crate::core::error::Result;
use clap::Args;

/// Arguments for `phpier services`.
#[derive(Debug, Args)]
pub struct ServicesArgs {
    /// Only show services belonging to this project
    #[arg(short = 'p', long)]
    pub project: Option<String>,

    /// Filter by service type (app, db, cache, proxy, tools, or a name)
    #[arg(short = 't', long = "type")]
    pub service_type: Option<String>,

    /// Filter by container status (running, exited, ...)
    #[arg(short = 's', long)]
    pub status: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Handles `phpier services`.
pub async fn handle_services(args: ServicesArgs) -> Result<()> {
    let client = DockerClient::new().await?;
    let filter = ServicesFilter {
        project: args.project,
        service_type: args.service_type,
        status: args.status,
    };
    let services = services::gather_services(&client, &filter).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&services)?);
        return Ok(());
    }

    if services.is_empty() {
        println!("No phpier services found.");
        return Ok(());
    }

    print_table(&services);
    Ok(())
}

fn print_table(services: &[ServiceInfo]) {
    let mut table = Table::new(&["PROJECT", "SERVICE", "STATUS", "HEALTH", "UPTIME", "PORTS", "URL"]);
    for svc in services {
        let ports = svc
            .ports
            .iter()
            .map(|p| format!("{}->{}", p.host_address, p.container_port))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            svc.project.clone(),
            svc.service.clone(),
            svc.status.clone(),
            if svc.health.is_empty() { "-".into() } else { svc.health.clone() },
            if svc.uptime.is_empty() { "-".into() } else { svc.uptime.clone() },
            if ports.is_empty() { "-".into() } else { ports },
            if svc.url.is_empty() { "-".into() } else { svc.url.clone() },
        ]);
    }
    table.print();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ServicesArgs,
    }

    #[test]
    fn test_services_args() {
        let cli = TestCli::parse_from(["test", "-p", "blog", "-t", "db", "-s", "running", "--json"]);
        assert_eq!(cli.args.project.as_deref(), Some("blog"));
        assert_eq!(cli.args.service_type.as_deref(), Some("db"));
        assert_eq!(cli.args.status.as_deref(), Some("running"));
        assert!(cli.args.json);
    }
}
