//! # Docker Interaction Layer
//!
//! File: cli/src/common/docker/mod.rs
//!
//! ## Overview
//!
//! Everything that talks to Docker lives here, organized by concern:
//!
//! - `client`: toolchain probing and raw `docker` invocations
//! - `compose`: compose lifecycle operations for projects and the global stack
//! - `exec`: running commands inside containers
//! - `inspect`: typed views of `docker inspect` output
//! - `services`: aggregated status of all phpier containers
//!
//! All of it shells out to the Docker CLI rather than the daemon API, so the
//! binaries users already have configured (contexts, credential helpers,
//! remote hosts) behave identically when driven by phpier.
//!
pub mod client;
pub mod compose;
pub mod exec;
pub mod inspect;
pub mod services;
