//! Project capability trait and its implementations.
//!
//! The engine never asks how a host discovers a project's references. It
//! works against [`DependencyGraphProject`], which exposes the build file,
//! manifest timestamp and closure of one project. Two kinds ship here:
//!
//! - [`DeclaredProject`]: closure computed from a declared graph, such as a
//!   dependency-graph spec file.
//! - [`EnumeratedProject`]: closure supplied by a host-specific
//!   [`ReferenceEnumerator`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use restore_fs::{NormalizedPath, PackageFolderLayout, io};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::graph::{compute_closure, compute_direct_references};
use crate::lock_file::PackageIdentity;
use crate::manifest::{JsonManifestReader, ManifestReader, PackageSpec};
use crate::necessity::project_requires_restore;
use crate::reference::ProjectReference;
use crate::session::ReferenceCache;

/// Supplies the reference closure of a project from a host project system.
#[async_trait]
pub trait ReferenceEnumerator: Send + Sync {
    /// Every project reachable from `project`, `project` included.
    async fn get_closure(
        &self,
        project: &ProjectReference,
        context: &mut ReferenceCache,
    ) -> Result<Vec<ProjectReference>>;
}

/// What the engine needs to know about one project.
#[async_trait]
pub trait DependencyGraphProject: Send + Sync {
    fn unique_name(&self) -> &str;

    /// Absolute path of the build file; the project's cache key.
    fn project_path(&self) -> &NormalizedPath;

    fn manifest_path(&self) -> Option<&NormalizedPath>;

    /// Modification time of the manifest, `None` without one.
    fn last_modified(&self) -> Result<Option<DateTime<Utc>>> {
        match self.manifest_path() {
            Some(path) => Ok(io::last_modified(path)?),
            None => Ok(None),
        }
    }

    /// The project's manifest, `None` for projects without one.
    fn package_spec(&self, context: &mut ReferenceCache) -> Result<Option<Arc<PackageSpec>>>;

    /// Every project reachable from this one, itself included.
    async fn get_closure(&self, context: &mut ReferenceCache) -> Result<Vec<ProjectReference>>;

    /// Whether the existing restore output of this project is stale.
    fn is_restore_required(
        &self,
        package_folders: &[PackageFolderLayout],
        checked: &mut HashSet<PackageIdentity>,
        context: &mut ReferenceCache,
    ) -> Result<bool> {
        project_requires_restore(self, package_folders, checked, context)
    }
}

/// A project whose closure comes from a declared graph.
#[derive(Debug, Clone)]
pub struct DeclaredProject {
    reference: ProjectReference,
    graph: Arc<[ProjectReference]>,
}

impl DeclaredProject {
    pub fn new(reference: ProjectReference, graph: Arc<[ProjectReference]>) -> Self {
        Self { reference, graph }
    }

    /// One project per node, all sharing the graph.
    pub fn from_graph(graph: Vec<ProjectReference>) -> Vec<Self> {
        let shared: Arc<[ProjectReference]> = graph.into();
        shared
            .iter()
            .map(|reference| Self::new(reference.clone(), Arc::clone(&shared)))
            .collect()
    }

    pub fn reference(&self) -> &ProjectReference {
        &self.reference
    }

    /// First-level references that exist in the graph, sorted by name.
    pub fn direct_references(&self, context: &mut ReferenceCache) -> Vec<ProjectReference> {
        if let Some(cached) = context.direct_references(self.project_path()) {
            return cached.to_vec();
        }

        let mut direct: Vec<ProjectReference> =
            compute_direct_references(&self.reference.unique_name, &self.graph)
                .into_iter()
                .collect();
        direct.sort();

        context.set_direct_references(self.project_path(), direct.clone());
        direct
    }
}

#[async_trait]
impl DependencyGraphProject for DeclaredProject {
    fn unique_name(&self) -> &str {
        &self.reference.unique_name
    }

    fn project_path(&self) -> &NormalizedPath {
        &self.reference.project_path
    }

    fn manifest_path(&self) -> Option<&NormalizedPath> {
        self.reference.manifest_path.as_ref()
    }

    fn package_spec(&self, context: &mut ReferenceCache) -> Result<Option<Arc<PackageSpec>>> {
        if let Some(spec) = &self.reference.manifest {
            return Ok(Some(Arc::clone(spec)));
        }

        match self.manifest_path() {
            Some(path) => Ok(Some(context.manifest(
                self.unique_name(),
                path,
                &JsonManifestReader,
            )?)),
            None => Ok(None),
        }
    }

    async fn get_closure(&self, context: &mut ReferenceCache) -> Result<Vec<ProjectReference>> {
        if let Some(cached) = context.closure(self.project_path()) {
            return Ok(cached.to_vec());
        }

        let mut closure: Vec<ProjectReference> =
            compute_closure(&self.reference.unique_name, &self.graph)
                .into_iter()
                .collect();
        closure.sort();

        context.set_closure(self.project_path(), closure.clone());
        Ok(closure)
    }
}

/// A project whose closure comes from a host enumerator.
pub struct EnumeratedProject {
    reference: ProjectReference,
    enumerator: Arc<dyn ReferenceEnumerator>,
    reader: Arc<dyn ManifestReader>,
}

impl EnumeratedProject {
    pub fn new(reference: ProjectReference, enumerator: Arc<dyn ReferenceEnumerator>) -> Self {
        Self {
            reference,
            enumerator,
            reader: Arc::new(JsonManifestReader),
        }
    }

    pub fn with_reader(mut self, reader: Arc<dyn ManifestReader>) -> Self {
        self.reader = reader;
        self
    }

    pub fn reference(&self) -> &ProjectReference {
        &self.reference
    }
}

#[async_trait]
impl DependencyGraphProject for EnumeratedProject {
    fn unique_name(&self) -> &str {
        &self.reference.unique_name
    }

    fn project_path(&self) -> &NormalizedPath {
        &self.reference.project_path
    }

    fn manifest_path(&self) -> Option<&NormalizedPath> {
        self.reference.manifest_path.as_ref()
    }

    fn package_spec(&self, context: &mut ReferenceCache) -> Result<Option<Arc<PackageSpec>>> {
        match self.manifest_path() {
            Some(path) => Ok(Some(context.manifest(
                self.unique_name(),
                path,
                self.reader.as_ref(),
            )?)),
            None => Ok(None),
        }
    }

    async fn get_closure(&self, context: &mut ReferenceCache) -> Result<Vec<ProjectReference>> {
        if let Some(cached) = context.closure(self.project_path()) {
            return Ok(cached.to_vec());
        }

        let closure = self.enumerator.get_closure(&self.reference, context).await?;
        tracing::debug!(
            project = %self.reference.unique_name,
            size = closure.len(),
            "enumerated project closure"
        );

        context.set_closure(self.project_path(), closure.clone());
        Ok(closure)
    }
}
