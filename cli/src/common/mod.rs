//! # Phpier Common Utilities
//!
//! File: cli/src/common/mod.rs
//!
//! Shared infrastructure used across command handlers: the Docker facade
//! (`docker`) and small terminal helpers (`ui`). Command-specific logic lives
//! under `commands::`; this namespace is for cross-cutting plumbing only.
//!
pub mod docker;
pub mod ui;
