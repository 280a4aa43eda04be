//! # List Command
//!
//! File: cli/src/commands/list.rs
//!
//! ## Overview
//!
//! Lists discovered phpier projects. By default both discovery sources are
//! consulted and merged; `--docker` or `--filesystem` restrict the listing to
//! one source, and `--all` adds paths (including every candidate path when a
//! name is ambiguous).
//!
use crate::core::discovery::{self, MergedProject};
use crate::core::error::Result;
use clap::Args;
use tracing::info;

/// Arguments for `phpier list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Show only projects discovered from Docker images and containers
    #[arg(long)]
    pub docker: bool,

    /// Show only projects discovered from the filesystem
    #[arg(long)]
    pub filesystem: bool,

    /// Show detailed information including paths
    #[arg(long)]
    pub all: bool,
}

/// Handles `phpier list`.
pub async fn handle_list(args: ListArgs) -> Result<()> {
    let include_docker = args.docker || !args.filesystem;
    let include_filesystem = args.filesystem || !args.docker;

    let mut sources = Vec::new();
    if include_docker {
        info!("Discovering projects from Docker images and containers...");
        sources.push(discovery::discover_from_docker().await);
        sources.push(discovery::discover_from_containers().await);
    }
    if include_filesystem {
        info!("Discovering projects from filesystem...");
        sources.push(discovery::discover_from_filesystem());
    }
    let projects = discovery::merge(&sources);

    print_projects(&projects, args.all);
    Ok(())
}

fn print_projects(projects: &[MergedProject], detailed: bool) {
    if projects.is_empty() {
        println!("No phpier projects found.");
        return;
    }

    if detailed {
        println!("Found {} phpier project(s):\n", projects.len());
        for project in projects {
            match project.paths.as_slice() {
                [] => println!("  {:<20} (path unknown)", project.name),
                [single] => println!("  {:<20} {}", project.name, single.display()),
                many => {
                    println!("  {:<20} (multiple locations)", project.name);
                    for path in many {
                        println!("  {:<20} - {}", "", path.display());
                    }
                }
            }
        }
    } else {
        println!("Available phpier projects ({}):", projects.len());
        for project in projects {
            println!("  {}", project.name);
        }
        println!();
        println!("Use 'phpier list --all' for detailed information");
    }

    println!();
    println!("Usage:");
    println!("  phpier up                     # Start the current project");
    println!("  phpier down <project-name>    # Stop a project from anywhere");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ListArgs,
    }

    #[test]
    fn test_list_args() {
        let cli = TestCli::parse_from(["test", "--docker", "--all"]);
        assert!(cli.args.docker);
        assert!(!cli.args.filesystem);
        assert!(cli.args.all);
    }
}
