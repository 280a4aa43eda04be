//! # Phpier Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! One module per top-level command (or command group), each exposing a clap
//! `Args` struct and an async `handle_*` function. Handlers that run a
//! command inside a container return the container command's exit code so
//! `main` can mirror it; lifecycle handlers return `()`.
//!
//! ## Command Groups
//!
//! - lifecycle: `up`, `down`, `start`, `stop`, `reload`, `build`, `logs`
//! - discovery and status: `list`, `services`
//! - databases: `db` (list/status/credentials/enable/disable) plus the
//!   `mysql`, `psql`, `maria`, `redis`, `memcached` shells
//! - tools: `sh`, `proxy` and the named wrappers (`composer`, `artisan`,
//!   `php`, `node`, `npm`, `npx`)
//! - global stack: `global up`, `global down`
//! - maintenance: `version`, `uninstall`
//!
pub mod build;
pub mod db;
pub mod down;
pub mod global;
pub mod list;
pub mod logs;
pub mod reload;
pub mod services;
pub mod start;
pub mod stop;
pub mod tools;
pub mod up;
pub mod uninstall;
pub mod version;
