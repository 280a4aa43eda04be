//! # Service Status Aggregation
//!
//! File: cli/src/common/docker/services.rs
//!
//! ## Overview
//!
//! Collects every phpier-managed container (running or stopped), inspects it,
//! and produces a uniform [`ServiceInfo`] view: project, service, state,
//! health, published ports, mounts, uptime and a best-effort browser URL.
//!
//! Containers are recognized by name pattern. A deny list is consulted before
//! the allow list so that e.g. a user's own `wordpress-mysql-1` container is
//! never claimed by phpier even though it matches the generic database
//! pattern.
//!
use crate::common::docker::client::DockerClient;
use crate::common::docker::inspect::ContainerInspect;
use crate::core::config::GLOBAL_PROJECT_NAME;
use crate::core::error::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Name patterns that are never phpier containers, even when an allow
/// pattern would match. Checked first.
const DENY_PATTERNS: &[&str] = &[
    r"^not-phpier-.*",
    r"^wordpress-.*",
    r"^laravel-.*",
    r"^drupal-.*",
    r"^magento-.*",
];

/// Name patterns that identify phpier-managed containers.
const ALLOW_PATTERNS: &[&str] = &[
    r"^phpier-.*",
    r".*-app-\d+$",
    r".*-mysql-\d+$",
    r".*-postgres-\d+$",
    r".*-mariadb-\d+$",
    r".*-redis-\d+$",
    r".*-valkey-\d+$",
    r".*-memcached-\d+$",
    r".*-phpmyadmin-\d+$",
    r".*-mailpit-\d+$",
];

fn deny_regexes() -> &'static Vec<Regex> {
    static CELL: OnceLock<Vec<Regex>> = OnceLock::new();
    CELL.get_or_init(|| {
        DENY_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("deny pattern"))
            .collect()
    })
}

fn allow_regexes() -> &'static Vec<Regex> {
    static CELL: OnceLock<Vec<Regex>> = OnceLock::new();
    CELL.get_or_init(|| {
        ALLOW_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("allow pattern"))
            .collect()
    })
}

/// Whether a container name belongs to phpier. Deny patterns take precedence.
pub fn is_phpier_container(name: &str) -> bool {
    if deny_regexes().iter().any(|re| re.is_match(name)) {
        return false;
    }
    allow_regexes().iter().any(|re| re.is_match(name))
}

/// One published port, flattened from the inspect binding map.
#[derive(Debug, Clone, Serialize)]
pub struct PortMapping {
    pub container_port: String,
    pub host_address: String,
}

/// One mount, reduced to what the services table shows.
#[derive(Debug, Clone, Serialize)]
pub struct MountInfo {
    pub source: String,
    pub destination: String,
    pub mode: String,
}

/// Aggregated view of one phpier container.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub project: String,
    pub service: String,
    pub container: String,
    pub image: String,
    pub status: String,
    pub health: String,
    pub created: String,
    pub started_at: String,
    pub uptime: String,
    pub url: String,
    pub ports: Vec<PortMapping>,
    pub mounts: Vec<MountInfo>,
    pub networks: Vec<String>,
    pub labels: HashMap<String, String>,
}

/// Filters for the `services` listing.
#[derive(Debug, Clone, Default)]
pub struct ServicesFilter {
    pub project: Option<String>,
    pub service_type: Option<String>,
    pub status: Option<String>,
}

const DB_SERVICES: &[&str] = &["mysql", "postgres", "postgresql", "mariadb"];
const CACHE_SERVICES: &[&str] = &["redis", "valkey", "memcached"];
const TOOL_SERVICES: &[&str] = &["phpmyadmin", "mailpit", "adminer", "pgadmin"];

/// Maps a `--type` filter value onto a concrete service name.
pub fn matches_service_type(service: &str, wanted: &str) -> bool {
    match wanted {
        "app" => service == "app",
        "db" | "database" => DB_SERVICES.contains(&service),
        "cache" => CACHE_SERVICES.contains(&service),
        "proxy" => service == "traefik",
        "tools" => TOOL_SERVICES.contains(&service),
        other => service == other,
    }
}

/// The URL a service answers on through the reverse proxy, or empty when the
/// service has no web surface.
pub fn service_url(project: &str, service: &str, ports: &[PortMapping]) -> String {
    match service {
        "app" => format!("http://{project}.localhost"),
        "phpmyadmin" => format!("http://pma.{project}.localhost"),
        "mailpit" => format!("http://mail.{project}.localhost"),
        "traefik" if project == GLOBAL_PROJECT_NAME => {
            // Dashboard is reachable only when the 8080 port is published.
            if ports.iter().any(|p| p.container_port.starts_with("8080")) {
                "http://localhost:8080".to_string()
            } else {
                String::new()
            }
        }
        _ => String::new(),
    }
}

/// Human-readable uptime in the coarsest unit that fits: `45s`, `12m`,
/// `1h 30m`, `1d 1h 30m`.
pub fn format_uptime(seconds: i64) -> String {
    if seconds < 0 {
        return String::new();
    }
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let hours = minutes / 60;
    let rem_minutes = minutes % 60;
    if hours < 24 {
        return format!("{hours}h {rem_minutes}m");
    }
    let days = hours / 24;
    let rem_hours = hours % 24;
    format!("{days}d {rem_hours}h {rem_minutes}m")
}

/// Derives the compose service name for a container, preferring the compose
/// label and falling back to the `<project>-<service>-<n>` name convention.
fn service_name(inspect: &ContainerInspect, container_name: &str) -> String {
    if let Some(service) = inspect.config.labels.get("com.docker.compose.service") {
        return service.clone();
    }
    parse_service_from_name(container_name).unwrap_or_else(|| container_name.to_string())
}

fn parse_service_from_name(name: &str) -> Option<String> {
    // <project>-<service>-<replica>
    let without_replica = name.rsplit_once('-').and_then(|(head, tail)| {
        tail.chars().all(|c| c.is_ascii_digit()).then_some(head)
    })?;
    without_replica
        .rsplit_once('-')
        .map(|(_, service)| service.to_string())
}

fn flatten_ports(inspect: &ContainerInspect) -> Vec<PortMapping> {
    let mut ports = Vec::new();
    for (container_port, bindings) in &inspect.network_settings.ports {
        let Some(bindings) = bindings else { continue };
        // Prefer a concrete host address over the 0.0.0.0 wildcard when both
        // are reported for the same port.
        let binding = bindings
            .iter()
            .find(|b| b.host_ip != "0.0.0.0" && b.host_ip != "::" && !b.host_ip.is_empty())
            .or_else(|| bindings.first());
        if let Some(binding) = binding {
            let host_ip = if binding.host_ip.is_empty() {
                "0.0.0.0"
            } else {
                &binding.host_ip
            };
            ports.push(PortMapping {
                container_port: container_port.clone(),
                host_address: format!("{}:{}", host_ip, binding.host_port),
            });
        }
    }
    ports.sort_by(|a, b| a.container_port.cmp(&b.container_port));
    ports
}

fn uptime_from(inspect: &ContainerInspect, now: DateTime<Utc>) -> String {
    if inspect.state.status != "running" {
        return String::new();
    }
    match DateTime::parse_from_rfc3339(&inspect.state.started_at) {
        Ok(started) => format_uptime((now - started.with_timezone(&Utc)).num_seconds()),
        Err(_) => String::new(),
    }
}

/// Builds a [`ServiceInfo`] from one inspect document.
fn build_service_info(name: &str, inspect: &ContainerInspect) -> ServiceInfo {
    let project = inspect
        .compose_project()
        .unwrap_or(GLOBAL_PROJECT_NAME)
        .to_string();
    let service = service_name(inspect, name);
    let ports = flatten_ports(inspect);
    let url = service_url(&project, &service, &ports);
    let health = inspect
        .state
        .health
        .as_ref()
        .map(|h| h.status.clone())
        .unwrap_or_default();

    let mut networks: Vec<String> = inspect.network_settings.networks.keys().cloned().collect();
    networks.sort();

    ServiceInfo {
        project,
        url,
        uptime: uptime_from(inspect, Utc::now()),
        service,
        container: name.to_string(),
        image: inspect.config.image.clone(),
        status: inspect.state.status.clone(),
        health,
        created: inspect.created.clone(),
        started_at: inspect.state.started_at.clone(),
        ports,
        mounts: inspect
            .mounts
            .iter()
            .map(|m| MountInfo {
                source: m.source.clone(),
                destination: m.destination.clone(),
                mode: m.mode.clone(),
            })
            .collect(),
        networks,
        labels: inspect.config.labels.clone(),
    }
}

/// Lists all phpier containers (including stopped ones), applies the filter,
/// and returns them sorted by project then service.
pub async fn gather_services(
    client: &DockerClient,
    filter: &ServicesFilter,
) -> Result<Vec<ServiceInfo>> {
    let names = client
        .run_command_output(
            "docker",
            &["ps".into(), "-a".into(), "--format".into(), "{{.Names}}".into()],
        )
        .await?;

    let mut services = Vec::new();
    for name in names.lines().map(str::trim).filter(|n| !n.is_empty()) {
        if !is_phpier_container(name) {
            continue;
        }
        let raw = match client
            .run_command_output("docker", &["inspect".into(), name.into()])
            .await
        {
            Ok(raw) => raw,
            Err(_) => {
                // Container vanished between ps and inspect.
                debug!("Skipping {name}: inspect failed");
                continue;
            }
        };
        let docs: Vec<ContainerInspect> = match serde_json::from_str(&raw) {
            Ok(docs) => docs,
            Err(err) => {
                debug!("Skipping {name}: unparseable inspect output: {err}");
                continue;
            }
        };
        let Some(inspect) = docs.first() else { continue };
        services.push(build_service_info(name, inspect));
    }

    services.retain(|s| {
        filter.project.as_deref().map_or(true, |p| s.project == p)
            && filter
                .service_type
                .as_deref()
                .map_or(true, |t| matches_service_type(&s.service, t))
            && filter.status.as_deref().map_or(true, |st| s.status == st)
    });
    services.sort_by(|a, b| a.project.cmp(&b.project).then(a.service.cmp(&b.service)));
    Ok(services)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_patterns_take_precedence() {
        // Matches the generic -mysql-1 allow pattern but is denied by prefix.
        assert!(!is_phpier_container("wordpress-mysql-1"));
        assert!(!is_phpier_container("not-phpier-app-1"));
        assert!(!is_phpier_container("laravel-redis-1"));
    }

    #[test]
    fn test_allow_patterns() {
        assert!(is_phpier_container("phpier-traefik-1"));
        assert!(is_phpier_container("blog-app-1"));
        assert!(is_phpier_container("shop-postgres-1"));
        assert!(is_phpier_container("blog-mailpit-1"));
        assert!(!is_phpier_container("blog-nginx-1"));
        assert!(!is_phpier_container("random-container"));
    }

    #[test]
    fn test_service_url_table() {
        assert_eq!(service_url("blog", "app", &[]), "http://blog.localhost");
        assert_eq!(
            service_url("blog", "phpmyadmin", &[]),
            "http://pma.blog.localhost"
        );
        assert_eq!(
            service_url("blog", "mailpit", &[]),
            "http://mail.blog.localhost"
        );
        assert_eq!(service_url("blog", "mysql", &[]), "");

        let dashboard = vec![PortMapping {
            container_port: "8080/tcp".into(),
            host_address: "0.0.0.0:8080".into(),
        }];
        assert_eq!(
            service_url("phpier", "traefik", &dashboard),
            "http://localhost:8080"
        );
        assert_eq!(service_url("phpier", "traefik", &[]), "");
        assert_eq!(service_url("blog", "traefik", &dashboard), "");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(45), "45s");
        assert_eq!(format_uptime(5 * 60), "5m");
        assert_eq!(format_uptime(90 * 60), "1h 30m");
        assert_eq!(format_uptime(25 * 3600 + 30 * 60), "1d 1h 30m");
    }

    #[test]
    fn test_matches_service_type_groups() {
        assert!(matches_service_type("mysql", "db"));
        assert!(matches_service_type("postgres", "db"));
        assert!(matches_service_type("redis", "cache"));
        assert!(matches_service_type("traefik", "proxy"));
        assert!(matches_service_type("phpmyadmin", "tools"));
        assert!(matches_service_type("mailpit", "tools"));
        assert!(!matches_service_type("mysql", "cache"));
        // Concrete names pass through.
        assert!(matches_service_type("mailpit", "mailpit"));
    }

    #[test]
    fn test_build_service_info_carries_inspect_fields() {
        let json = r#"{
            "Created": "2024-03-01T08:00:00Z",
            "State": {"Status": "running", "StartedAt": "2024-03-01T08:00:05Z"},
            "Config": {
                "Image": "phpier-blog",
                "Labels": {
                    "com.docker.compose.project": "blog",
                    "com.docker.compose.service": "app"
                }
            },
            "NetworkSettings": {
                "Ports": {},
                "Networks": {"phpier_global": {}, "blog_default": {}}
            },
            "Mounts": []
        }"#;
        let inspect: ContainerInspect = serde_json::from_str(json).unwrap();
        let info = build_service_info("blog-app-1", &inspect);

        assert_eq!(info.created, "2024-03-01T08:00:00Z");
        assert_eq!(info.started_at, "2024-03-01T08:00:05Z");
        assert_eq!(info.networks, vec!["blog_default", "phpier_global"]);
        assert_eq!(
            info.labels.get("com.docker.compose.service").map(String::as_str),
            Some("app")
        );

        // All of it must survive into the JSON the `--json` flag prints.
        let value: serde_json::Value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["created"], "2024-03-01T08:00:00Z");
        assert_eq!(value["started_at"], "2024-03-01T08:00:05Z");
        assert!(value["labels"].is_object());
        assert!(value["networks"].is_array());
    }

    #[test]
    fn test_parse_service_from_name() {
        assert_eq!(parse_service_from_name("blog-app-1").as_deref(), Some("app"));
        assert_eq!(
            parse_service_from_name("my-shop-mysql-2").as_deref(),
            Some("mysql")
        );
        assert_eq!(parse_service_from_name("no-replica-suffix"), None);
    }
}
