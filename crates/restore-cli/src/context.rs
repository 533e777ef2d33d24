//! Loaded dependency graph shared by the commands.

use restore_core::{
    CacheStore, DeclaredProject, DependencyGraphProject, DependencyGraphSpec, ProjectReference,
    ReferenceCache, build_cache_store,
};
use restore_fs::NormalizedPath;
use std::path::Path;

use crate::error::{CliError, Result};

/// A validated dependency graph spec and its project nodes.
pub struct GraphContext {
    pub path: NormalizedPath,
    pub spec: DependencyGraphSpec,
    pub graph: Vec<ProjectReference>,
}

impl GraphContext {
    pub fn load(path: &Path) -> Result<Self> {
        let path = NormalizedPath::new(path).full_path();
        if !path.is_file() {
            return Err(CliError::user(format!(
                "Dependency graph spec not found: {path}"
            )));
        }

        let spec = DependencyGraphSpec::load(&path)?;
        spec.validate()?;
        let graph = spec.references()?;

        Ok(Self { path, spec, graph })
    }

    /// Directory holding the spec file.
    pub fn dir(&self) -> NormalizedPath {
        self.path
            .parent()
            .unwrap_or_else(|| NormalizedPath::new("."))
    }

    pub fn find(&self, name: &str) -> Result<&ProjectReference> {
        self.graph
            .iter()
            .find(|p| p.unique_name == name)
            .ok_or_else(|| CliError::user(format!("Project not found in graph: {name}")))
    }

    pub fn projects(&self) -> Vec<Box<dyn DependencyGraphProject>> {
        DeclaredProject::from_graph(self.graph.clone())
            .into_iter()
            .map(|p| Box::new(p) as Box<dyn DependencyGraphProject>)
            .collect()
    }

    /// Cache store of the graph as it is on disk now.
    pub async fn snapshot(&self, context: &mut ReferenceCache) -> Result<CacheStore> {
        Ok(build_cache_store(&self.projects(), context).await?)
    }
}
