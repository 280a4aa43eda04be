//! # Version Command
//!
//! File: cli/src/commands/version.rs
//!
//! Prints version and build information. Commit and build date come from
//! `PHPIER_COMMIT` / `PHPIER_BUILD_DATE` environment variables baked in at
//! compile time by the release pipeline, with `unknown` fallbacks for local
//! builds.
//!
use crate::core::error::Result;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const COMMIT: &str = match option_env!("PHPIER_COMMIT") {
    Some(commit) => commit,
    None => "unknown",
};
const BUILD_DATE: &str = match option_env!("PHPIER_BUILD_DATE") {
    Some(date) => date,
    None => "unknown",
};

/// Handles `phpier version`.
pub fn handle_version() -> Result<()> {
    println!("phpier {VERSION}");
    println!("Commit: {COMMIT}");
    println!("Built: {BUILD_DATE}");
    println!("Platform: {}/{}", std::env::consts::OS, std::env::consts::ARCH);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches_manifest() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
        assert!(!VERSION.is_empty());
    }
}
