//! # Phpier Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Aggregates the foundational components every command relies on:
//!
//! - `config`: global (`~/.phpier/config.yaml`) and per-project
//!   (`.phpier.yml`) configuration, with defaults and project root lookup
//! - `discovery`: finding projects across Docker state and the filesystem
//! - `error`: the error taxonomy, exit codes, and terminal error reporting
//!
pub mod config;
pub mod discovery;
pub mod error;
