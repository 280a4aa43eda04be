//! # Container Inspect Records
//!
//! File: cli/src/common/docker/inspect.rs
//!
//! Typed deserialization targets for `docker inspect` output. Only the fields
//! phpier reads are modeled; everything else in the (large) inspect document
//! is ignored by serde. Every field is defaulted so older daemons that omit
//! sections still parse.
//!
use serde::Deserialize;
use std::collections::HashMap;

/// One element of the JSON array `docker inspect <name>` prints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerInspect {
    #[serde(rename = "Created", default)]
    pub created: String,
    #[serde(rename = "State", default)]
    pub state: ContainerState,
    #[serde(rename = "Config", default)]
    pub config: ContainerConfig,
    #[serde(rename = "NetworkSettings", default)]
    pub network_settings: NetworkSettings,
    #[serde(rename = "Mounts", default)]
    pub mounts: Vec<Mount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerState {
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "StartedAt", default)]
    pub started_at: String,
    #[serde(rename = "Health")]
    pub health: Option<Health>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Health {
    #[serde(rename = "Status", default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerConfig {
    #[serde(rename = "Image", default)]
    pub image: String,
    #[serde(rename = "Labels", default)]
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkSettings {
    /// Keyed by container port spec, e.g. `"3306/tcp"`. The value is `null`
    /// for unpublished ports.
    #[serde(rename = "Ports", default)]
    pub ports: HashMap<String, Option<Vec<PortBinding>>>,
    #[serde(rename = "Networks", default)]
    pub networks: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortBinding {
    #[serde(rename = "HostIp", default)]
    pub host_ip: String,
    #[serde(rename = "HostPort", default)]
    pub host_port: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Mount {
    #[serde(rename = "Type", default)]
    pub mount_type: String,
    #[serde(rename = "Source", default)]
    pub source: String,
    #[serde(rename = "Destination", default)]
    pub destination: String,
    #[serde(rename = "Mode", default)]
    pub mode: String,
}

impl ContainerInspect {
    /// The compose project this container belongs to, if compose-managed.
    pub fn compose_project(&self) -> Option<&str> {
        self.config
            .labels
            .get("com.docker.compose.project")
            .map(String::as_str)
    }

    /// The host directory the compose file lived in when the container was
    /// created. Used to recover project paths during discovery.
    pub fn compose_working_dir(&self) -> Option<&str> {
        self.config
            .labels
            .get("com.docker.compose.working-dir")
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_inspect_document() {
        let json = r#"[{
            "Created": "2024-05-01T10:00:00Z",
            "State": {
                "Status": "running",
                "StartedAt": "2024-05-01T10:00:01Z",
                "Health": { "Status": "healthy" }
            },
            "Config": {
                "Image": "phpier-blog:latest",
                "Labels": {
                    "com.docker.compose.project": "blog",
                    "com.docker.compose.working-dir": "/home/dev/blog"
                }
            },
            "NetworkSettings": {
                "Ports": {
                    "80/tcp": [{ "HostIp": "0.0.0.0", "HostPort": "8080" }],
                    "9000/tcp": null
                },
                "Networks": { "phpier_global": {} }
            },
            "Mounts": [{
                "Type": "bind",
                "Source": "/home/dev/blog",
                "Destination": "/var/www/html",
                "Mode": "rw"
            }]
        }]"#;

        let docs: Vec<ContainerInspect> = serde_json::from_str(json).unwrap();
        let doc = &docs[0];
        assert_eq!(doc.state.status, "running");
        assert_eq!(doc.state.health.as_ref().unwrap().status, "healthy");
        assert_eq!(doc.compose_project(), Some("blog"));
        assert_eq!(doc.compose_working_dir(), Some("/home/dev/blog"));
        let bindings = doc.network_settings.ports["80/tcp"].as_ref().unwrap();
        assert_eq!(bindings[0].host_port, "8080");
        assert!(doc.network_settings.ports["9000/tcp"].is_none());
        assert_eq!(doc.mounts[0].destination, "/var/www/html");
    }

    #[test]
    fn test_missing_sections_default() {
        let docs: Vec<ContainerInspect> = serde_json::from_str(r#"[{}]"#).unwrap();
        let doc = &docs[0];
        assert!(doc.state.status.is_empty());
        assert!(doc.state.health.is_none());
        assert!(doc.compose_project().is_none());
        assert!(doc.mounts.is_empty());
    }
}
