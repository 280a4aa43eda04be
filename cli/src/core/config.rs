//! # Phpier Configuration
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! Loading, defaulting, and saving of the two configuration layers phpier
//! works with:
//!
//! - **Global configuration** (`~/.phpier/config.yaml`): which shared services
//!   (databases, caches, dev tools) are enabled, their ports and credentials,
//!   and the Traefik routing settings. Created with defaults on first load.
//! - **Project configuration** (`.phpier.yml` at the project root): the marker
//!   file that identifies a directory as a phpier project. The project name is
//!   the directory's base name; PHP/Node versions and app container settings
//!   fall back to defaults when not recorded.
//!
//! The project root is resolved by walking parent directories from the current
//! working directory until the marker file is found, mirroring how the compose
//! lifecycle manager locates the compose file.
//!
use crate::core::error::{PhpierError, Result};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reserved compose project name for the global shared-services stack.
pub const GLOBAL_PROJECT_NAME: &str = "phpier";

/// Per-project marker/compose file. Its presence makes a directory a project root.
pub const PROJECT_MARKER: &str = ".phpier.yml";

/// Compose file for the global stack, generated under [`phpier_home`].
pub const GLOBAL_COMPOSE_FILE: &str = "docker-compose.yml";

// --- Global configuration ---

/// Global configuration (`~/.phpier/config.yaml`).
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GlobalConfig {
    pub services: ServicesConfig,
    pub traefik: TraefikConfig,
    #[serde(default = "default_network")]
    pub network: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            services: ServicesConfig::default(),
            traefik: TraefikConfig::default(),
            network: default_network(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ServicesConfig {
    pub databases: DatabasesConfig,
    pub cache: CacheConfig,
    pub tools: ToolsConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DatabasesConfig {
    pub mysql: DatabaseServiceConfig,
    pub postgresql: DatabaseServiceConfig,
    pub mariadb: DatabaseServiceConfig,
}

/// One database service entry in the global stack.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DatabaseServiceConfig {
    pub enabled: bool,
    pub version: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl Default for DatabaseServiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            version: String::new(),
            port: 0,
            username: "phpier".into(),
            password: "phpier".into(),
            database: "phpier".into(),
        }
    }
}

impl Default for DatabasesConfig {
    fn default() -> Self {
        Self {
            mysql: DatabaseServiceConfig {
                enabled: true,
                version: "8.0".into(),
                port: 3306,
                ..Default::default()
            },
            postgresql: DatabaseServiceConfig {
                version: "15".into(),
                port: 5432,
                ..Default::default()
            },
            mariadb: DatabaseServiceConfig {
                version: "10.11".into(),
                port: 3307,
                ..Default::default()
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub redis: CacheServiceConfig,
    pub memcached: CacheServiceConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis: CacheServiceConfig {
                enabled: true,
                port: 6379,
            },
            memcached: CacheServiceConfig {
                enabled: false,
                port: 11211,
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct CacheServiceConfig {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ToolsConfig {
    pub phpmyadmin: bool,
    pub mailpit: MailpitConfig,
    pub pgadmin: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            phpmyadmin: true,
            mailpit: MailpitConfig {
                enabled: true,
                port: 1025,
            },
            pgadmin: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct MailpitConfig {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TraefikConfig {
    pub domain: String,
    pub port: u16,
    pub ssl_port: u16,
}

impl Default for TraefikConfig {
    fn default() -> Self {
        Self {
            domain: "localhost".into(),
            port: 80,
            ssl_port: 443,
        }
    }
}

fn default_network() -> String {
    "phpier_global".into()
}

/// Database service identifiers accepted by `phpier db enable|disable` and the
/// direct shell commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Mysql,
    Postgresql,
    Mariadb,
}

impl DbKind {
    /// All kinds in display order.
    pub const ALL: [DbKind; 3] = [DbKind::Mysql, DbKind::Postgresql, DbKind::Mariadb];

    /// Config key / user-facing name.
    pub fn name(self) -> &'static str {
        match self {
            DbKind::Mysql => "mysql",
            DbKind::Postgresql => "postgresql",
            DbKind::Mariadb => "mariadb",
        }
    }

    /// Compose service name in the global stack. PostgreSQL runs under the
    /// `postgres` service name, unlike its config key.
    pub fn service_name(self) -> &'static str {
        match self {
            DbKind::Mysql => "mysql",
            DbKind::Postgresql => "postgres",
            DbKind::Mariadb => "mariadb",
        }
    }

    /// Capitalized product name for display.
    pub fn display_name(self) -> &'static str {
        match self {
            DbKind::Mysql => "MySQL",
            DbKind::Postgresql => "PostgreSQL",
            DbKind::Mariadb => "MariaDB",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(DbKind::Mysql),
            "postgresql" | "postgres" => Ok(DbKind::Postgresql),
            "mariadb" | "maria" => Ok(DbKind::Mariadb),
            other => Err(anyhow!(PhpierError::InvalidDatabaseType(other.to_string()))),
        }
    }
}

impl GlobalConfig {
    pub fn database(&self, kind: DbKind) -> &DatabaseServiceConfig {
        match kind {
            DbKind::Mysql => &self.services.databases.mysql,
            DbKind::Postgresql => &self.services.databases.postgresql,
            DbKind::Mariadb => &self.services.databases.mariadb,
        }
    }

    pub fn database_mut(&mut self, kind: DbKind) -> &mut DatabaseServiceConfig {
        match kind {
            DbKind::Mysql => &mut self.services.databases.mysql,
            DbKind::Postgresql => &mut self.services.databases.postgresql,
            DbKind::Mariadb => &mut self.services.databases.mariadb,
        }
    }

    pub fn is_database_enabled(&self, kind: DbKind) -> bool {
        self.database(kind).enabled
    }

    /// Enabled databases in a fixed display order.
    pub fn enabled_databases(&self) -> Vec<(DbKind, &DatabaseServiceConfig)> {
        [DbKind::Mysql, DbKind::Postgresql, DbKind::Mariadb]
            .into_iter()
            .filter(|kind| self.database(*kind).enabled)
            .map(|kind| (kind, self.database(kind)))
            .collect()
    }
}

/// The per-user phpier directory (`~/.phpier`) holding the global config,
/// the generated global compose file, and reverse-proxy configuration.
pub fn phpier_home() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        anyhow!(PhpierError::FileSystem(
            "could not determine the user home directory".into()
        ))
    })?;
    Ok(home.join(".phpier"))
}

/// Loads the global configuration, writing one with defaults on first use.
pub fn load_global_config() -> Result<GlobalConfig> {
    let dir = phpier_home()?;
    load_global_config_from(&dir)
}

pub(crate) fn load_global_config_from(dir: &Path) -> Result<GlobalConfig> {
    let path = dir.join("config.yaml");
    if !path.exists() {
        debug!("No global config at {}, writing defaults", path.display());
        let config = GlobalConfig::default();
        save_global_config_to(dir, &config)?;
        return Ok(config);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read global config: {}", path.display()))?;
    let config: GlobalConfig = serde_yaml::from_str(&content).map_err(|e| {
        anyhow!(PhpierError::InvalidConfig(format!(
            "{}: {e}",
            path.display()
        )))
    })?;
    debug!("Loaded global config from {}", path.display());
    Ok(config)
}

/// Persists the global configuration to `~/.phpier/config.yaml`.
pub fn save_global_config(config: &GlobalConfig) -> Result<()> {
    let dir = phpier_home()?;
    save_global_config_to(&dir, config)
}

pub(crate) fn save_global_config_to(dir: &Path, config: &GlobalConfig) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    let path = dir.join("config.yaml");
    let yaml = serde_yaml::to_string(config).context("Failed to serialize global config")?;
    fs::write(&path, yaml)
        .with_context(|| format!("Failed to write global config: {}", path.display()))?;
    Ok(())
}

// --- Project configuration ---

/// Project-specific configuration derived from the `.phpier.yml` marker.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Unique project name; the compose `-p` value and routing subdomain.
    pub name: String,
    pub php: String,
    pub node: String,
    pub app: AppConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Volume mappings for the app container, tilde-expanded on load.
    pub volumes: Vec<String>,
    pub environment: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            volumes: vec!["./:/var/www/html".into()],
            environment: vec!["APP_ENV=local".into(), "APP_DEBUG=true".into()],
        }
    }
}

impl ProjectConfig {
    /// Builds the project configuration for a given project root. The name is
    /// the directory base name; container settings use defaults until they are
    /// recorded in the generated compose file.
    pub fn from_root(root: &Path) -> Self {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| GLOBAL_PROJECT_NAME.to_string());
        let mut app = AppConfig::default();
        for volume in &mut app.volumes {
            *volume = shellexpand::tilde(volume).into_owned();
        }
        Self {
            name,
            php: "8.3".into(),
            node: "lts".into(),
            app,
        }
    }
}

/// Walks upward from the current directory looking for the project marker.
/// Returns the directory containing it, or `None` when outside any project.
pub fn find_project_root() -> Result<Option<PathBuf>> {
    let current = std::env::current_dir().context("Failed to get current directory")?;
    Ok(find_project_root_from(&current))
}

pub(crate) fn find_project_root_from(start: &Path) -> Option<PathBuf> {
    let mut dir: &Path = start;
    loop {
        if dir.join(PROJECT_MARKER).is_file() {
            return Some(dir.to_path_buf());
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return None,
        }
    }
}

/// Like [`find_project_root`] but fails with
/// [`PhpierError::ProjectNotInitialized`] when there is none.
pub fn require_project_root() -> Result<PathBuf> {
    find_project_root()?
        .ok_or_else(|| anyhow!(PhpierError::ProjectNotInitialized))
}

/// True when the current directory (or an ancestor) is a phpier project.
pub fn in_project() -> bool {
    find_project_root().ok().flatten().is_some()
}

/// Loads the project configuration for the enclosing project, failing with
/// [`PhpierError::ProjectNotInitialized`] outside a project.
pub fn load_project_config() -> Result<ProjectConfig> {
    let root = find_project_root()?.ok_or(PhpierError::ProjectNotInitialized)?;
    Ok(ProjectConfig::from_root(&root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_global_defaults() {
        let config = GlobalConfig::default();
        assert!(config.services.databases.mysql.enabled);
        assert!(!config.services.databases.postgresql.enabled);
        assert_eq!(config.services.databases.mysql.port, 3306);
        assert_eq!(config.services.databases.mariadb.port, 3307);
        assert_eq!(config.services.databases.mysql.username, "phpier");
        assert!(config.services.cache.redis.enabled);
        assert!(!config.services.cache.memcached.enabled);
        assert!(config.services.tools.phpmyadmin);
        assert_eq!(config.traefik.domain, "localhost");
        assert_eq!(config.network, "phpier_global");
    }

    #[test]
    fn test_deserialize_partial_yaml_fills_defaults() {
        let yaml = r#"
services:
  databases:
    postgresql:
      enabled: true
      port: 15432
traefik:
  port: 8000
"#;
        let config: GlobalConfig = serde_yaml::from_str(yaml).expect("parse");
        assert!(config.services.databases.postgresql.enabled);
        assert_eq!(config.services.databases.postgresql.port, 15432);
        // Untouched sections keep their defaults.
        assert_eq!(config.services.databases.postgresql.username, "phpier");
        assert!(config.services.cache.redis.enabled);
        assert_eq!(config.traefik.port, 8000);
        assert_eq!(config.traefik.ssl_port, 443);
    }

    #[test]
    fn test_first_load_writes_defaults_and_roundtrips() {
        let dir = tempdir().unwrap();
        let loaded = load_global_config_from(dir.path()).expect("first load");
        assert!(dir.path().join("config.yaml").exists());
        assert!(loaded.services.databases.mysql.enabled);

        // A second load reads the persisted file.
        let again = load_global_config_from(dir.path()).expect("second load");
        assert_eq!(
            again.services.databases.mysql.port,
            loaded.services.databases.mysql.port
        );
    }

    #[test]
    fn test_enabled_databases_order_is_fixed() {
        let mut config = GlobalConfig::default();
        config.services.databases.mariadb.enabled = true;
        config.services.databases.postgresql.enabled = true;
        let names: Vec<&str> = config
            .enabled_databases()
            .iter()
            .map(|(k, _)| k.name())
            .collect();
        assert_eq!(names, vec!["mysql", "postgresql", "mariadb"]);
    }

    #[test]
    fn test_db_kind_parsing() {
        assert_eq!(DbKind::parse("MySQL").unwrap(), DbKind::Mysql);
        assert_eq!(DbKind::parse("postgres").unwrap(), DbKind::Postgresql);
        assert_eq!(DbKind::parse("maria").unwrap(), DbKind::Mariadb);
        assert!(DbKind::parse("mongodb").is_err());
    }

    #[test]
    fn test_find_project_root_walks_up() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("app/src/deep");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("app").join(PROJECT_MARKER), "services: {}\n").unwrap();

        let root = find_project_root_from(&nested).expect("marker found");
        assert_eq!(root, dir.path().join("app"));
        assert!(find_project_root_from(dir.path()).is_none());
    }

    #[test]
    fn test_project_config_name_from_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("my-shop");
        fs::create_dir_all(&root).unwrap();
        let config = ProjectConfig::from_root(&root);
        assert_eq!(config.name, "my-shop");
        assert_eq!(config.php, "8.3");
        assert_eq!(config.app.volumes, vec!["./:/var/www/html".to_string()]);
    }
}
