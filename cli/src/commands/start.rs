//! # Start Command
//!
//! File: cli/src/commands/start.rs
//!
//! Context-aware startup: inside a project this behaves like `up -d`, outside
//! one it brings up just the global stack. The delegation builds explicit
//! argument structs for the target command rather than sharing flag state.
//!
use crate::commands::{global, up};
use crate::core::config;
use crate::core::error::Result;
use clap::Args;
use tracing::info;

/// Arguments for `phpier start`.
#[derive(Debug, Args)]
pub struct StartArgs {}

/// Handles `phpier start`.
pub async fn handle_start(_args: StartArgs) -> Result<()> {
    if config::in_project() {
        info!("Detected phpier project: starting global services and project...");
        up::handle_up(up::UpArgs {
            detach: true,
            build: false,
            skip_global: false,
        })
        .await
    } else {
        info!("No phpier project detected: starting global services only...");
        global::handle_global_up().await
    }
}
