//! Per-session memoization of graph queries.
//!
//! One [`ReferenceCache`] lives for a single restore session. The top-level
//! orchestrator creates it, threads it by `&mut` through every query and
//! drops it afterwards. It is not synchronized; concurrent callers each need
//! their own.

use restore_fs::NormalizedPath;
use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::ProjectCacheEntry;
use crate::error::Result;
use crate::manifest::{ManifestReader, PackageSpec};
use crate::reference::ProjectReference;

/// Session caches keyed by full project path, compared case-insensitively.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    direct_references: HashMap<String, Vec<ProjectReference>>,
    closures: HashMap<String, Vec<ProjectReference>>,
    manifests: HashMap<String, Arc<PackageSpec>>,
    project_entries: HashMap<String, ProjectCacheEntry>,
}

fn key(path: &NormalizedPath) -> String {
    path.full_path().case_key()
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direct_references(&self, project_path: &NormalizedPath) -> Option<&[ProjectReference]> {
        self.direct_references
            .get(&key(project_path))
            .map(Vec::as_slice)
    }

    pub fn set_direct_references(
        &mut self,
        project_path: &NormalizedPath,
        references: Vec<ProjectReference>,
    ) {
        self.direct_references.insert(key(project_path), references);
    }

    pub fn closure(&self, project_path: &NormalizedPath) -> Option<&[ProjectReference]> {
        self.closures.get(&key(project_path)).map(Vec::as_slice)
    }

    pub fn set_closure(&mut self, project_path: &NormalizedPath, closure: Vec<ProjectReference>) {
        self.closures.insert(key(project_path), closure);
    }

    /// Manifest at `path`, read through `reader` on first use.
    pub fn manifest(
        &mut self,
        name: &str,
        path: &NormalizedPath,
        reader: &dyn ManifestReader,
    ) -> Result<Arc<PackageSpec>> {
        let key = key(path);
        if let Some(spec) = self.manifests.get(&key) {
            return Ok(Arc::clone(spec));
        }

        let spec = Arc::new(reader.read_manifest(name, path)?);
        self.manifests.insert(key, Arc::clone(&spec));
        Ok(spec)
    }

    pub fn project_entry(&self, project_path: &NormalizedPath) -> Option<&ProjectCacheEntry> {
        self.project_entries.get(&key(project_path))
    }

    /// Remember the entry built for a project during this session.
    pub fn record_project_entry(
        &mut self,
        project_path: &NormalizedPath,
        entry: ProjectCacheEntry,
    ) {
        self.project_entries.insert(key(project_path), entry);
    }
}
