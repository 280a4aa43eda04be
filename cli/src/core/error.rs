//! # Phpier Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types and error handling mechanisms used
//! throughout the phpier application. Errors carry a flat taxonomy (the
//! `PhpierError` enum), an exhaustive mapping to numeric process exit codes,
//! and an ordered list of actionable suggestions that is printed beneath the
//! error message when a command fails.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `PhpierError`: a closed, tagged-variant error enum using `thiserror`.
//!   Every variant belongs to one of the taxonomy groups (configuration,
//!   docker, filesystem, validation, network, command, user, internal) and
//!   maps to exactly one exit code via [`PhpierError::exit_code`].
//! - `Result<T>`: a type alias for `anyhow::Result<T>`. Handlers propagate
//!   errors with `?` and `.context(...)`; `main` downcasts the final error to
//!   `PhpierError` to pick the exit code and suggestions.
//!
//! Low-level facade failures (subprocess non-zero exit, JSON parse failure)
//! are wrapped into a taxonomy variant with contextual data (container name,
//! command, arguments) rather than passed through raw.
//!
use thiserror::Error;

/// Standard result type used across the crate.
pub type Result<T> = anyhow::Result<T>;

/// Process exit codes keyed off the error taxonomy.
///
/// The general code (1) covers errors that never made it into the taxonomy;
/// interactive/proxy sessions bypass this mapping entirely and mirror the
/// container command's own exit code instead.
pub const EXIT_GENERAL: i32 = 1;
pub const EXIT_DOCKER: i32 = 2;
pub const EXIT_CONFIGURATION: i32 = 3;
pub const EXIT_FILESYSTEM: i32 = 4;
pub const EXIT_VALIDATION: i32 = 5;
pub const EXIT_NETWORK: i32 = 6;
pub const EXIT_COMMAND: i32 = 7;
pub const EXIT_INTERNAL: i32 = 8;

/// Closed error taxonomy for the phpier application.
#[derive(Error, Debug)]
pub enum PhpierError {
    // --- Configuration ---
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Project not initialized - no .phpier.yml found")]
    ProjectNotInitialized,

    #[error("Configuration file is invalid: {0}")]
    InvalidConfig(String),

    // --- Docker ---
    #[error("Docker is not installed or not found in PATH")]
    DockerNotInstalled,

    #[error("Docker daemon is not running")]
    DockerNotRunning,

    #[error("Docker Compose is not available")]
    ComposeNotFound,

    #[error("Container '{name}' not found")]
    ContainerNotFound { name: String },

    #[error("Container '{name}' is not running")]
    ContainerNotRunning { name: String },

    #[error("Docker operation failed: {0}")]
    Docker(String),

    #[error("Failed to build {service} service")]
    BuildFailed { service: String },

    #[error("Reload is not supported for global services")]
    GlobalReloadUnsupported,

    // --- Project discovery ---
    #[error("Project '{name}' not found")]
    ProjectNotFound { name: String },

    #[error("Multiple projects named '{name}' found")]
    AmbiguousProject { name: String, paths: Vec<String> },

    // --- Filesystem ---
    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // --- Validation ---
    #[error("Unsupported database type: {0}")]
    InvalidDatabaseType(String),

    #[error("{0}")]
    InvalidArguments(String),

    // --- Network ---
    #[error("Network operation timed out: {0}")]
    NetworkTimeout(String),

    // --- Command execution ---
    #[error("Command failed: {command}")]
    CommandFailed { command: String, args: Vec<String> },

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    // --- User interaction ---
    #[error("{0}")]
    UserAborted(String),

    // --- Internal ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PhpierError {
    /// Maps every taxonomy variant to its process exit code. Exhaustive by
    /// construction; a new variant fails to compile until it is mapped.
    pub fn exit_code(&self) -> i32 {
        match self {
            PhpierError::Config(_)
            | PhpierError::ProjectNotInitialized
            | PhpierError::InvalidConfig(_) => EXIT_CONFIGURATION,

            PhpierError::DockerNotInstalled
            | PhpierError::DockerNotRunning
            | PhpierError::ComposeNotFound
            | PhpierError::ContainerNotFound { .. }
            | PhpierError::ContainerNotRunning { .. }
            | PhpierError::Docker(_)
            | PhpierError::BuildFailed { .. }
            | PhpierError::GlobalReloadUnsupported => EXIT_DOCKER,

            PhpierError::FileSystem(_) | PhpierError::FileNotFound { .. } => EXIT_FILESYSTEM,

            PhpierError::InvalidDatabaseType(_)
            | PhpierError::InvalidArguments(_)
            | PhpierError::ProjectNotFound { .. }
            | PhpierError::AmbiguousProject { .. } => EXIT_VALIDATION,

            PhpierError::NetworkTimeout(_) => EXIT_NETWORK,

            PhpierError::CommandFailed { .. } | PhpierError::CommandNotFound(_) => EXIT_COMMAND,

            PhpierError::UserAborted(_) => EXIT_GENERAL,

            PhpierError::Internal(_) => EXIT_INTERNAL,
        }
    }

    /// Key/value context pairs printed in the error's context block.
    pub fn context_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            PhpierError::ContainerNotFound { name }
            | PhpierError::ContainerNotRunning { name } => {
                vec![("container", name.clone())]
            }
            PhpierError::BuildFailed { service } => vec![("service", service.clone())],
            PhpierError::ProjectNotFound { name } => vec![("project", name.clone())],
            PhpierError::AmbiguousProject { name, paths } => {
                vec![("project", name.clone()), ("paths", paths.join(", "))]
            }
            PhpierError::CommandFailed { command, args } => {
                vec![("command", command.clone()), ("arguments", args.join(" "))]
            }
            _ => Vec::new(),
        }
    }

    /// Ordered, actionable suggestions shown to the user beneath the error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            PhpierError::DockerNotInstalled => vec![
                "Install Docker from https://docs.docker.com/get-docker/".into(),
                "Ensure Docker is added to your system PATH".into(),
            ],
            PhpierError::DockerNotRunning => vec![
                "Start Docker Desktop or the Docker daemon".into(),
                "Check Docker service status: 'docker version'".into(),
            ],
            PhpierError::ComposeNotFound => vec![
                "Install Docker Compose or use Docker with the compose plugin".into(),
                "For newer Docker installations, try 'docker compose' instead of 'docker-compose'"
                    .into(),
            ],
            PhpierError::ContainerNotFound { .. } => vec![
                "Check if the container exists: 'docker ps -a'".into(),
                "Start the phpier environment: 'phpier up'".into(),
            ],
            PhpierError::ContainerNotRunning { .. } => vec![
                "Start the container: 'phpier up'".into(),
                "Check container status: 'docker ps'".into(),
            ],
            PhpierError::BuildFailed { .. } => vec![
                "Check Docker build logs for detailed error information".into(),
                "Try rebuilding with: 'phpier build --no-cache'".into(),
            ],
            PhpierError::GlobalReloadUnsupported => vec![
                "Use 'phpier global down' followed by 'phpier global up' instead".into(),
            ],
            PhpierError::ProjectNotInitialized => vec![
                "Create a .phpier.yml at the project root".into(),
                "Ensure you're in the correct project directory".into(),
            ],
            PhpierError::Config(_) | PhpierError::InvalidConfig(_) => {
                vec!["Check your .phpier.yml configuration file".into()]
            }
            PhpierError::ProjectNotFound { .. } => vec![
                "Ensure the project name is correct".into(),
                "Use 'phpier list' to see available projects".into(),
            ],
            PhpierError::AmbiguousProject { paths, .. } => {
                let mut s = vec![
                    "Navigate to the specific project directory and run the command without a name"
                        .into(),
                    "Rename one of the projects to avoid the conflict".into(),
                ];
                for path in paths {
                    s.push(format!("Candidate: {path}"));
                }
                s
            }
            PhpierError::InvalidDatabaseType(_) => {
                vec!["Use one of the supported types: mysql, postgresql, mariadb".into()]
            }
            PhpierError::InvalidArguments(_) => vec!["Check command usage with --help".into()],
            PhpierError::CommandFailed { .. } => vec![
                "Check command syntax and arguments".into(),
                "Ensure all required dependencies are installed".into(),
            ],
            PhpierError::UserAborted(_) => {
                vec!["Use --force to override safety checks if needed".into()]
            }
            PhpierError::Internal(_) => vec![
                "This appears to be an internal error; please report it with the full message"
                    .into(),
            ],
            _ => Vec::new(),
        }
    }
}

/// Prints a surfaced error to stderr (message, context block, suggestions)
/// and returns the exit code the process should terminate with.
///
/// Non-taxonomy errors (plain `anyhow` chains) print their chain and map to
/// the general exit code.
pub fn report(err: &anyhow::Error) -> i32 {
    if let Some(perr) = err.downcast_ref::<PhpierError>() {
        eprintln!("Error: {perr}");

        let context = perr.context_pairs();
        if !context.is_empty() {
            eprintln!("\nContext:");
            for (key, value) in context {
                eprintln!("  {key}: {value}");
            }
        }

        let suggestions = perr.suggestions();
        if !suggestions.is_empty() {
            eprintln!("\nSuggestions:");
            for (i, suggestion) in suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
        }

        perr.exit_code()
    } else {
        eprintln!("Error: {err:#}");
        EXIT_GENERAL
    }
}
