//! # Project Discovery
//!
//! File: cli/src/core/discovery.rs
//!
//! ## Overview
//!
//! Finds phpier projects from three independent sources: `phpier-<name>`
//! Docker images (with the project path recovered from compose labels when a
//! container exists), running containers carrying a compose project label,
//! and a filesystem scan of common development directories for `.phpier.yml`
//! markers.
//!
//! The sources are merged by name. An entry with a concrete path always
//! wins over a path-less one regardless of which source produced it, and when
//! several directories claim the same name the ambiguity is preserved so
//! name-based resolution can refuse with the candidate list instead of
//! silently picking one.
//!
//! Docker-side discovery never fails: a missing binary or an unresponsive
//! daemon yields an empty list, since filesystem results are still useful.
//!
use crate::core::config::{GLOBAL_PROJECT_NAME, PROJECT_MARKER};
use crate::core::error::{PhpierError, Result};
use anyhow::anyhow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Image prefix identifying project images built by phpier.
const IMAGE_PREFIX: &str = "phpier-";

/// How deep below each search root the marker scan descends.
const SCAN_DEPTH: usize = 3;

/// One discovered project from a single source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub name: String,
    /// Known project root, when the source could determine one.
    pub path: Option<PathBuf>,
}

/// The merged view of one project name across all sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedProject {
    pub name: String,
    /// Distinct concrete roots claiming this name, sorted.
    pub paths: Vec<PathBuf>,
}

impl MergedProject {
    /// The project root when it is unambiguous.
    pub fn path(&self) -> Option<&PathBuf> {
        match self.paths.as_slice() {
            [single] => Some(single),
            _ => None,
        }
    }
}

/// Discovers projects from `phpier-*` Docker images. Failures at any step
/// degrade to an empty (or partial) result rather than an error.
pub async fn discover_from_docker() -> Vec<ProjectInfo> {
    if which::which("docker").is_err() {
        return Vec::new();
    }

    let Some(output) = capture(&[
        "images",
        "--filter",
        &format!("reference={IMAGE_PREFIX}*"),
        "--format",
        "{{.Repository}}",
    ])
    .await
    else {
        return Vec::new();
    };

    let mut seen = BTreeMap::new();
    for line in output.lines() {
        let image = line.trim();
        let Some(name) = image.strip_prefix(IMAGE_PREFIX) else {
            continue;
        };
        if name.is_empty() || seen.contains_key(name) {
            continue;
        }
        let path = container_working_dir(image, name).await;
        seen.insert(name.to_string(), ProjectInfo {
            name: name.to_string(),
            path,
        });
    }
    seen.into_values().collect()
}

/// Discovers projects from running containers via their compose project
/// label. Catches projects whose image was removed but whose containers are
/// still up. Never fails; the global stack's own project is excluded.
pub async fn discover_from_containers() -> Vec<ProjectInfo> {
    if which::which("docker").is_err() {
        return Vec::new();
    }

    let Some(output) = capture(&[
        "ps",
        "--filter",
        "label=com.docker.compose.project",
        "--format",
        "{{.Label \"com.docker.compose.project\"}}",
    ])
    .await
    else {
        return Vec::new();
    };
    projects_from_labels(&output)
}

fn projects_from_labels(output: &str) -> Vec<ProjectInfo> {
    let mut seen = BTreeMap::new();
    for line in output.lines() {
        let name = line.trim();
        if name.is_empty() || name == GLOBAL_PROJECT_NAME || seen.contains_key(name) {
            continue;
        }
        seen.insert(name.to_string(), ProjectInfo {
            name: name.to_string(),
            path: None,
        });
    }
    seen.into_values().collect()
}

/// Recovers the project root from containers built from this image, via the
/// compose working-dir label. Falls back to a compose-project label match
/// when no container references the image directly.
async fn container_working_dir(image: &str, project: &str) -> Option<PathBuf> {
    let by_ancestor = capture(&[
        "ps",
        "-a",
        "--filter",
        &format!("ancestor={image}"),
        "--format",
        "{{.Label \"com.docker.compose.working-dir\"}}",
    ])
    .await;
    if let Some(dir) = first_nonempty_line(by_ancestor.as_deref()) {
        return Some(PathBuf::from(dir));
    }

    let by_label = capture(&[
        "ps",
        "-a",
        "--filter",
        &format!("label=com.docker.compose.project={project}"),
        "--format",
        "{{.Label \"com.docker.compose.working-dir\"}}",
    ])
    .await;
    first_nonempty_line(by_label.as_deref()).map(PathBuf::from)
}

fn first_nonempty_line(output: Option<&str>) -> Option<&str> {
    output?
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
}

async fn capture(args: &[&str]) -> Option<String> {
    let output = Command::new("docker")
        .args(args)
        .stderr(Stdio::null())
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        debug!("docker {} exited nonzero", args.join(" "));
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Scans the current directory plus common development locations for project
/// markers. Unreadable roots are skipped.
pub fn discover_from_filesystem() -> Vec<ProjectInfo> {
    let mut roots = vec![PathBuf::from(".")];
    if let Some(home) = dirs::home_dir() {
        for sub in ["projects", "code", "dev", "Sites", "workspace", "Development"] {
            roots.push(home.join(sub));
        }
    }
    roots.extend(["/var/www", "/srv", "/opt/projects"].map(PathBuf::from));

    let mut projects = Vec::new();
    for root in roots {
        if root.is_dir() {
            scan_root(&root, &mut projects);
        }
    }
    projects
}

/// Walks one root up to the scan depth, collecting directories that contain
/// the marker. Hidden directories are skipped, and the walk never descends
/// past a project root so nested markers stay invisible.
fn scan_root(root: &Path, projects: &mut Vec<ProjectInfo>) {
    let walker = WalkDir::new(root)
        .max_depth(SCAN_DEPTH + 1)
        .into_iter()
        .filter_entry(|entry| should_descend(entry));

    for entry in walker.filter_map(|e| e.ok()) {
        if entry.file_type().is_file() && entry.file_name() == PROJECT_MARKER {
            if let Some(dir) = entry.path().parent() {
                if let Some(info) = project_from_dir(dir) {
                    projects.push(info);
                }
            }
        }
    }
}

fn should_descend(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        // Files are yielded for the marker check.
        return true;
    }
    if entry.depth() == 0 {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return false;
    }
    // A directory whose parent is itself a project is not scanned.
    entry
        .path()
        .parent()
        .map_or(true, |parent| !parent.join(PROJECT_MARKER).exists())
}

fn project_from_dir(dir: &Path) -> Option<ProjectInfo> {
    let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    let name = canonical.file_name()?.to_string_lossy().to_string();
    Some(ProjectInfo {
        name,
        path: Some(canonical),
    })
}

/// Merges per-source project lists by name. Order of sources never matters:
/// a concrete path beats no path, and multiple distinct paths for the same
/// name are all kept.
pub fn merge(sources: &[Vec<ProjectInfo>]) -> Vec<MergedProject> {
    let mut by_name: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for source in sources {
        for info in source {
            let paths = by_name.entry(info.name.clone()).or_default();
            if let Some(path) = &info.path {
                if !paths.contains(path) {
                    paths.push(path.clone());
                }
            }
        }
    }
    by_name
        .into_iter()
        .map(|(name, mut paths)| {
            paths.sort();
            MergedProject { name, paths }
        })
        .collect()
}

/// Full discovery across all sources, merged.
pub async fn discover_all() -> Vec<MergedProject> {
    let docker = discover_from_docker().await;
    let containers = discover_from_containers().await;
    let filesystem = discover_from_filesystem();
    merge(&[docker, containers, filesystem])
}

/// Resolves one project by name. Unknown names and names claimed by several
/// directories are both errors; the latter lists every candidate path.
pub fn resolve_by_name(name: &str, projects: &[MergedProject]) -> Result<MergedProject> {
    let matched: Vec<&MergedProject> = projects.iter().filter(|p| p.name == name).collect();
    match matched.as_slice() {
        [] => Err(anyhow!(PhpierError::ProjectNotFound {
            name: name.to_string(),
        })),
        [single] => {
            if single.paths.len() > 1 {
                return Err(anyhow!(PhpierError::AmbiguousProject {
                    name: name.to_string(),
                    paths: single
                        .paths
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect(),
                }));
            }
            Ok((*single).clone())
        }
        _ => Err(anyhow!(PhpierError::AmbiguousProject {
            name: name.to_string(),
            paths: matched
                .iter()
                .flat_map(|p| p.paths.iter().map(|path| path.display().to_string()))
                .collect(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn info(name: &str, path: Option<&str>) -> ProjectInfo {
        ProjectInfo {
            name: name.to_string(),
            path: path.map(PathBuf::from),
        }
    }

    #[test]
    fn test_merge_path_wins_regardless_of_source_order() {
        let docker = vec![info("blog", None)];
        let filesystem = vec![info("blog", Some("/home/dev/blog"))];

        let forward = merge(&[docker.clone(), filesystem.clone()]);
        let reverse = merge(&[filesystem, docker]);
        assert_eq!(forward, reverse);
        assert_eq!(forward.len(), 1);
        assert_eq!(
            forward[0].path(),
            Some(&PathBuf::from("/home/dev/blog"))
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let source = vec![
            info("blog", Some("/home/dev/blog")),
            info("shop", None),
        ];
        let once = merge(&[source.clone()]);
        let twice = merge(&[source.clone(), source]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_preserves_ambiguity() {
        let a = vec![info("blog", Some("/home/dev/blog"))];
        let b = vec![info("blog", Some("/var/www/blog"))];
        let merged = merge(&[a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].paths.len(), 2);
        assert!(merged[0].path().is_none());
    }

    #[test]
    fn test_projects_from_labels_dedups_and_excludes_global() {
        let output = "blog\nphpier\nblog\n\n  shop  \n";
        let projects = projects_from_labels(output);
        let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["blog", "shop"]);
        assert!(projects.iter().all(|p| p.path.is_none()));
    }

    #[test]
    fn test_container_only_project_survives_merge() {
        // A running project with no image left and no scanned directory must
        // still be resolvable by name.
        let containers = vec![info("blog", None)];
        let merged = merge(&[Vec::new(), containers, Vec::new()]);
        let project = resolve_by_name("blog", &merged).unwrap();
        assert_eq!(project.name, "blog");
        assert!(project.path().is_none());
    }

    #[test]
    fn test_resolve_by_name_not_found() {
        let err = resolve_by_name("missing", &[]).unwrap_err();
        let resolved = err.downcast_ref::<PhpierError>().unwrap();
        assert!(matches!(resolved, PhpierError::ProjectNotFound { .. }));
    }

    #[test]
    fn test_resolve_by_name_ambiguous_lists_paths() {
        let merged = merge(&[
            vec![info("blog", Some("/home/dev/blog"))],
            vec![info("blog", Some("/var/www/blog"))],
        ]);
        let err = resolve_by_name("blog", &merged).unwrap_err();
        match err.downcast_ref::<PhpierError>().unwrap() {
            PhpierError::AmbiguousProject { paths, .. } => {
                assert_eq!(paths.len(), 2);
                assert!(paths.contains(&"/home/dev/blog".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_by_name_single_match() {
        let merged = merge(&[vec![info("blog", Some("/home/dev/blog"))]]);
        let project = resolve_by_name("blog", &merged).unwrap();
        assert_eq!(project.name, "blog");
        assert_eq!(project.path(), Some(&PathBuf::from("/home/dev/blog")));
    }

    #[test]
    fn test_filesystem_scan_finds_markers_and_skips_nested() {
        let tmp = TempDir::new().unwrap();
        let blog = tmp.path().join("blog");
        fs::create_dir_all(blog.join("nested")).unwrap();
        fs::write(blog.join(PROJECT_MARKER), "").unwrap();
        // Marker beneath an existing project must not be reported.
        fs::write(blog.join("nested").join(PROJECT_MARKER), "").unwrap();
        // Hidden directories are skipped entirely.
        let hidden = tmp.path().join(".cache").join("ghost");
        fs::create_dir_all(&hidden).unwrap();
        fs::write(hidden.join(PROJECT_MARKER), "").unwrap();

        let mut projects = Vec::new();
        scan_root(tmp.path(), &mut projects);

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "blog");
    }

    #[test]
    fn test_filesystem_scan_respects_depth_limit() {
        let tmp = TempDir::new().unwrap();
        let deep = tmp.path().join("a").join("b").join("c").join("d");
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join(PROJECT_MARKER), "").unwrap();

        let mut projects = Vec::new();
        scan_root(tmp.path(), &mut projects);
        assert!(projects.is_empty());
    }
}
