//! Package manifests and the manifest reader seam.
//!
//! A manifest (package spec) is the package-dependency declaration owned by
//! one project. Manifests that take part in a dependency graph also carry
//! restore metadata: the project's unique name, its build file and the
//! projects it references.

use restore_fs::{NormalizedPath, io};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::version::VersionRange;

/// Kind of restore output a project produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    #[default]
    Unknown,
    Uap,
    NetCore,
    Standalone,
    DotnetCliTool,
}

impl std::fmt::Display for OutputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::Uap => "uap",
            Self::NetCore => "netcore",
            Self::Standalone => "standalone",
            Self::DotnetCliTool => "dotnetclitool",
        };
        f.write_str(name)
    }
}

/// A package dependency declared in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDependency {
    pub name: String,
    #[serde(rename = "version")]
    pub range: VersionRange,
}

impl PackageDependency {
    pub fn new(name: impl Into<String>, range: VersionRange) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }
}

/// A reference from one project to another, by unique name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRestoreReference {
    pub project_unique_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<NormalizedPath>,
}

/// Restore metadata attached to manifests that live in a dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreMetadata {
    pub project_unique_name: String,
    pub project_path: NormalizedPath,
    #[serde(default)]
    pub output_type: OutputType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<NormalizedPath>,
    #[serde(default)]
    pub project_references: Vec<ProjectRestoreReference>,
}

/// A parsed package manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSpec {
    #[serde(default)]
    pub name: String,
    /// Location of the manifest on disk, when it came from a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<NormalizedPath>,
    #[serde(default)]
    pub dependencies: Vec<PackageDependency>,
    /// Compatibility profiles the project promises to support.
    #[serde(default)]
    pub supports: Vec<String>,
    #[serde(
        default,
        rename = "restore",
        skip_serializing_if = "Option::is_none"
    )]
    pub restore_metadata: Option<RestoreMetadata>,
}

impl PackageSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_path: None,
            dependencies: Vec::new(),
            supports: Vec::new(),
            restore_metadata: None,
        }
    }

    /// Whether any dependency is declared with a floating range.
    pub fn has_floating_dependencies(&self) -> bool {
        self.dependencies.iter().any(|d| d.range.is_floating())
    }

    /// Directory that settings and default outputs resolve against.
    ///
    /// The manifest's own directory when known, else the build file's.
    pub fn root_directory(&self) -> Option<NormalizedPath> {
        self.file_path
            .as_ref()
            .and_then(NormalizedPath::parent)
            .or_else(|| {
                self.restore_metadata
                    .as_ref()
                    .and_then(|m| m.project_path.parent())
            })
    }

    /// Unique names of the projects this manifest references.
    pub fn referenced_names(&self) -> Vec<String> {
        self.restore_metadata
            .as_ref()
            .map(|m| {
                m.project_references
                    .iter()
                    .map(|r| r.project_unique_name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Path of the lock file that a restore of `manifest_path` writes.
///
/// `project.json` -> `project.lock.json`,
/// `app.project.json` -> `app.project.lock.json`.
pub fn lock_file_path(manifest_path: &NormalizedPath) -> NormalizedPath {
    let file_name = manifest_path.file_name().unwrap_or("project.json");
    let lock_name = if file_name.to_ascii_lowercase().ends_with(".json") {
        let stem = &file_name[..file_name.len() - ".json".len()];
        format!("{stem}.lock.json")
    } else {
        format!("{file_name}.lock.json")
    };

    match manifest_path.parent() {
        Some(dir) => dir.join(&lock_name),
        None => NormalizedPath::new(lock_name),
    }
}

/// Reads manifests from wherever a host keeps them.
pub trait ManifestReader: Send + Sync {
    /// Read the manifest of project `name` located at `path`.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when the file does not exist and
    /// `Error::ManifestParse` when it cannot be parsed.
    fn read_manifest(&self, name: &str, path: &NormalizedPath) -> Result<PackageSpec>;
}

/// Reads JSON manifests from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonManifestReader;

impl ManifestReader for JsonManifestReader {
    fn read_manifest(&self, name: &str, path: &NormalizedPath) -> Result<PackageSpec> {
        if !path.is_file() {
            return Err(Error::NotFound {
                what: format!("Manifest for {name}"),
                path: path.to_native(),
            });
        }

        let content = io::read_text(path)?;
        let mut spec: PackageSpec =
            serde_json::from_str(&content).map_err(|e| Error::ManifestParse {
                path: path.to_native(),
                message: e.to_string(),
            })?;

        if spec.name.is_empty() {
            spec.name = name.to_string();
        }
        spec.file_path = Some(path.clone());

        tracing::debug!(project = name, path = %path, "read manifest");
        Ok(spec)
    }
}
