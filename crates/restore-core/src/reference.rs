//! Project nodes of a dependency graph.

use restore_fs::NormalizedPath;
use std::borrow::Borrow;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::manifest::PackageSpec;

/// One project node in a dependency graph.
///
/// Identity is the `unique_name` alone: equality, ordering and hashing
/// ignore every other field, so a set of references holds each project once.
#[derive(Debug, Clone)]
pub struct ProjectReference {
    /// Identifier, unique within a graph, compared ordinally.
    pub unique_name: String,
    /// The project's manifest, if it has one.
    pub manifest_path: Option<NormalizedPath>,
    /// Absolute path of the project's build file.
    pub project_path: NormalizedPath,
    /// Unique names of directly referenced projects. May dangle.
    pub direct_references: Vec<String>,
    /// Parsed manifest, when already known.
    pub manifest: Option<Arc<PackageSpec>>,
}

impl ProjectReference {
    pub fn new(unique_name: impl Into<String>, project_path: impl Into<NormalizedPath>) -> Self {
        Self {
            unique_name: unique_name.into(),
            manifest_path: None,
            project_path: project_path.into(),
            direct_references: Vec::new(),
            manifest: None,
        }
    }

    pub fn with_manifest_path(mut self, path: impl Into<NormalizedPath>) -> Self {
        self.manifest_path = Some(path.into());
        self
    }

    pub fn with_references<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.direct_references = names.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a parsed manifest, taking its file path when none is set.
    pub fn with_manifest(mut self, manifest: Arc<PackageSpec>) -> Self {
        if self.manifest_path.is_none() {
            self.manifest_path = manifest.file_path.clone();
        }
        self.manifest = Some(manifest);
        self
    }

    /// Build a node from a manifest carrying restore metadata.
    pub fn from_spec(spec: Arc<PackageSpec>) -> Result<Self> {
        let metadata = spec
            .restore_metadata
            .as_ref()
            .ok_or_else(|| Error::ValidationFailed {
                message: format!("project '{}' has no restore metadata", spec.name),
            })?;

        let reference = Self::new(
            metadata.project_unique_name.clone(),
            metadata.project_path.clone(),
        )
        .with_references(spec.referenced_names());

        Ok(reference.with_manifest(spec))
    }

    /// Paths recorded for this project in a cache entry: manifest, then build file.
    pub fn cache_paths(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.manifest_path
            .iter()
            .chain(std::iter::once(&self.project_path))
    }
}

impl PartialEq for ProjectReference {
    fn eq(&self, other: &Self) -> bool {
        self.unique_name == other.unique_name
    }
}

impl Eq for ProjectReference {}

impl Hash for ProjectReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.unique_name.hash(state);
    }
}

impl PartialOrd for ProjectReference {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProjectReference {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.unique_name.cmp(&other.unique_name)
    }
}

impl Borrow<str> for ProjectReference {
    fn borrow(&self) -> &str {
        &self.unique_name
    }
}

impl std::fmt::Display for ProjectReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.unique_name)
    }
}
