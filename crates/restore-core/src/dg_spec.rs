//! Dependency-graph spec documents.
//!
//! A dependency-graph spec lists every project manifest of a solution, each
//! carrying restore metadata, and names the restore roots. It is the input
//! format of the command-line front end and of
//! [`RestoreRequestBuilder::create_requests`](crate::request::RestoreRequestBuilder::create_requests).

use restore_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::graph::compute_closure;
use crate::manifest::PackageSpec;
use crate::reference::ProjectReference;

/// Projects of a graph plus the unique names to restore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGraphSpec {
    /// Unique names of the restore roots.
    #[serde(default)]
    pub restore: Vec<String>,
    #[serde(default)]
    pub projects: Vec<PackageSpec>,
}

impl DependencyGraphSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a spec document (JSON, TOML or YAML by extension).
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let spec: Self = ConfigStore::new().load(path)?;
        tracing::debug!(
            path = %path,
            projects = spec.projects.len(),
            roots = spec.restore.len(),
            "loaded dependency graph spec"
        );
        Ok(spec)
    }

    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        Ok(())
    }

    /// Add a project unless one with the same unique name exists.
    pub fn add_project(&mut self, spec: PackageSpec) {
        let name = unique_name(&spec);
        if name.is_some() && self.projects.iter().any(|p| unique_name(p) == name) {
            return;
        }
        self.projects.push(spec);
    }

    /// Mark a project as a restore root.
    pub fn add_restore(&mut self, unique_name: impl Into<String>) {
        let unique_name = unique_name.into();
        if !self.restore.contains(&unique_name) {
            self.restore.push(unique_name);
        }
    }

    /// The project with the given unique name.
    pub fn project(&self, name: &str) -> Option<&PackageSpec> {
        self.projects
            .iter()
            .find(|spec| unique_name(spec) == Some(name))
    }

    /// Graph nodes for every project.
    ///
    /// # Errors
    ///
    /// `Error::ValidationFailed` when a project has no restore metadata.
    pub fn references(&self) -> Result<Vec<ProjectReference>> {
        self.projects
            .iter()
            .map(|spec| ProjectReference::from_spec(Arc::new(spec.clone())))
            .collect()
    }

    /// Closure of `name`, sorted by unique name. Empty when absent.
    pub fn closure(&self, name: &str) -> Result<Vec<ProjectReference>> {
        let graph = self.references()?;
        let mut closure: Vec<ProjectReference> =
            compute_closure(name, &graph).into_iter().collect();
        closure.sort();
        Ok(closure)
    }

    /// Check the structure of the graph before any request is built.
    ///
    /// # Errors
    ///
    /// `Error::ValidationFailed` naming the first problem: a project without
    /// restore metadata, one unique name used for two different manifests,
    /// or a restore root missing from the graph.
    pub fn validate(&self) -> Result<()> {
        let mut manifests: HashMap<&str, Option<String>> = HashMap::new();

        for spec in &self.projects {
            let Some(metadata) = &spec.restore_metadata else {
                return Err(Error::ValidationFailed {
                    message: format!("project '{}' has no restore metadata", spec.name),
                });
            };

            let name = metadata.project_unique_name.as_str();
            let manifest = spec.file_path.as_ref().map(|p| p.full_path().case_key());
            match manifests.get(name) {
                Some(existing) if *existing != manifest => {
                    return Err(Error::ValidationFailed {
                        message: format!("project '{name}' is declared by different manifests"),
                    });
                }
                Some(_) => {}
                None => {
                    manifests.insert(name, manifest);
                }
            }
        }

        for root in &self.restore {
            if !manifests.contains_key(root.as_str()) {
                return Err(Error::ValidationFailed {
                    message: format!("restore root '{root}' is not in the graph"),
                });
            }
        }

        let known: HashSet<&str> = manifests.keys().copied().collect();
        for spec in &self.projects {
            for reference in spec.referenced_names() {
                if !known.contains(reference.as_str()) {
                    tracing::debug!(
                        project = %spec.name,
                        reference = %reference,
                        "reference is not in the graph"
                    );
                }
            }
        }

        Ok(())
    }
}

fn unique_name(spec: &PackageSpec) -> Option<&str> {
    spec.restore_metadata
        .as_ref()
        .map(|m| m.project_unique_name.as_str())
}
