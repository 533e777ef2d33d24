//! Restore cache entries and the cache store comparator.
//!
//! A cache store snapshots, per project build file, the files reachable from
//! that project and the modification time of its manifest. Comparing the
//! previous session's store with the current one decides whether the
//! project graph changed since the last restore.

use chrono::{DateTime, Utc};
use restore_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::project::DependencyGraphProject;
use crate::reference::ProjectReference;
use crate::session::ReferenceCache;

/// Snapshot of one project's closure at restore time.
///
/// Entries are never edited; a changed project gets a new entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCacheEntry {
    reference_closure: BTreeSet<NormalizedPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_modified: Option<DateTime<Utc>>,
}

impl ProjectCacheEntry {
    pub fn new(
        reference_closure: BTreeSet<NormalizedPath>,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            reference_closure,
            last_modified,
        }
    }

    /// Collect the manifest and build-file path of every closure member.
    pub fn from_closure<'a>(
        closure: impl IntoIterator<Item = &'a ProjectReference>,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        let reference_closure = closure
            .into_iter()
            .flat_map(|reference| reference.cache_paths().cloned())
            .collect();

        Self::new(reference_closure, last_modified)
    }

    pub fn reference_closure(&self) -> &BTreeSet<NormalizedPath> {
        &self.reference_closure
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }
}

/// Cache entries keyed by full build-file path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStore {
    #[serde(default)]
    projects: BTreeMap<NormalizedPath, ProjectCacheEntry>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the entry for `project_path`.
    ///
    /// # Errors
    ///
    /// `Error::DuplicateProject` when the path already has an entry. The
    /// existing entry is kept.
    pub fn insert(
        &mut self,
        project_path: &NormalizedPath,
        entry: ProjectCacheEntry,
    ) -> Result<()> {
        let key = project_path.full_path();
        if self.projects.contains_key(&key) {
            return Err(Error::DuplicateProject {
                path: key.to_string(),
            });
        }
        self.projects.insert(key, entry);
        Ok(())
    }

    pub fn get(&self, project_path: &NormalizedPath) -> Option<&ProjectCacheEntry> {
        self.projects.get(&project_path.full_path())
    }

    pub fn contains(&self, project_path: &NormalizedPath) -> bool {
        self.get(project_path).is_some()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NormalizedPath, &ProjectCacheEntry)> {
        self.projects.iter()
    }

    /// Load a persisted store. A missing file yields an empty store.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        Ok(ConfigStore::new().load_optional(path)?.unwrap_or_default())
    }

    /// Persist the store atomically.
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        tracing::debug!(path = %path, projects = self.len(), "saved cache store");
        Ok(())
    }
}

/// Snapshot every project's closure, in list order.
///
/// # Errors
///
/// `Error::DuplicateProject` when two projects share a build file, and any
/// error raised while enumerating a closure.
pub async fn build_cache_store<P>(
    projects: &[P],
    context: &mut ReferenceCache,
) -> Result<CacheStore>
where
    P: AsRef<dyn DependencyGraphProject>,
{
    let mut store = CacheStore::new();

    for project in projects {
        let project = project.as_ref();
        let closure = project.get_closure(context).await?;
        let entry = ProjectCacheEntry::from_closure(&closure, project.last_modified()?);

        context.record_project_entry(project.project_path(), entry.clone());
        store.insert(project.project_path(), entry)?;
    }

    Ok(store)
}

/// Whether any project in `current` is new or changed relative to `previous`.
///
/// A project counts as changed when its manifest timestamp differs or its
/// closure differs as a set. Projects that exist only in `previous` are not
/// reported; see [`removed_projects`].
pub fn cache_has_changes(previous: &CacheStore, current: &CacheStore) -> bool {
    for (path, entry) in current.iter() {
        let Some(before) = previous.get(path) else {
            tracing::debug!(project = %path, "project added since last restore");
            return true;
        };

        if entry.last_modified != before.last_modified {
            tracing::debug!(project = %path, "manifest modified since last restore");
            return true;
        }

        if entry.reference_closure != before.reference_closure {
            tracing::debug!(project = %path, "project closure changed since last restore");
            return true;
        }
    }

    false
}

/// Build files present in `previous` but absent from `current`.
pub fn removed_projects(previous: &CacheStore, current: &CacheStore) -> Vec<NormalizedPath> {
    previous
        .iter()
        .filter(|(path, _)| !current.contains(path))
        .map(|(path, _)| path.clone())
        .collect()
}

/// [`cache_has_changes`] extended to also report removed projects.
pub fn cache_has_changes_or_removals(previous: &CacheStore, current: &CacheStore) -> bool {
    if cache_has_changes(previous, current) {
        return true;
    }

    let removed = removed_projects(previous, current);
    if !removed.is_empty() {
        tracing::debug!(count = removed.len(), "projects removed since last restore");
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn reference(name: &str) -> ProjectReference {
        ProjectReference::new(name, format!("/src/{name}/{name}.csproj"))
            .with_manifest_path(format!("/src/{name}/project.json"))
    }

    fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(secs, 0).single()
    }

    fn store(entries: &[(&str, Vec<&str>, Option<DateTime<Utc>>)]) -> CacheStore {
        let mut store = CacheStore::new();
        for (project, closure, modified) in entries {
            let closure: Vec<ProjectReference> = closure.iter().map(|n| reference(n)).collect();
            store
                .insert(
                    &reference(project).project_path,
                    ProjectCacheEntry::from_closure(&closure, *modified),
                )
                .unwrap();
        }
        store
    }

    #[test]
    fn test_from_closure_collects_both_paths() {
        let bare = ProjectReference::new("tool", "/src/tool/tool.csproj");
        let entry = ProjectCacheEntry::from_closure(&[reference("a"), bare], None);

        let paths: Vec<&str> = entry.reference_closure().iter().map(|p| p.as_str()).collect();
        assert_eq!(
            paths,
            vec!["/src/a/a.csproj", "/src/a/project.json", "/src/tool/tool.csproj"]
        );
    }

    #[test]
    fn test_duplicate_project_rejected() {
        let mut store = CacheStore::new();
        let path = NormalizedPath::new("/src/a/a.csproj");
        store
            .insert(&path, ProjectCacheEntry::new(BTreeSet::new(), timestamp(1)))
            .unwrap();

        let err = store
            .insert(&path, ProjectCacheEntry::new(BTreeSet::new(), timestamp(2)))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateProject { .. }));
        assert_eq!(store.get(&path).unwrap().last_modified(), timestamp(1));
    }

    #[test]
    fn test_same_cache_has_no_changes() {
        let before = store(&[
            ("project1", vec!["a", "b"], timestamp(10)),
            ("project2", vec![], None),
        ]);
        let after = store(&[
            ("project1", vec!["b", "a"], timestamp(10)),
            ("project2", vec![], None),
        ]);
        assert!(!cache_has_changes(&before, &after));
        assert!(!cache_has_changes(&after, &after));
    }

    #[test]
    fn test_cache_differs_on_closure() {
        let before = store(&[
            ("project1", vec!["a", "b"], timestamp(10)),
            ("project2", vec![], None),
        ]);
        let after = store(&[
            ("project1", vec!["a", "d"], timestamp(10)),
            ("project2", vec![], None),
        ]);
        assert!(cache_has_changes(&before, &after));
    }

    #[test]
    fn test_cache_differs_on_timestamp() {
        let before = store(&[("project1", vec!["a"], timestamp(10))]);
        let after = store(&[("project1", vec!["a"], timestamp(11))]);
        assert!(cache_has_changes(&before, &after));
    }

    #[test]
    fn test_cache_differs_on_new_project() {
        let before = store(&[("project1", vec!["a"], timestamp(10))]);
        let after = store(&[("project1", vec!["a"], timestamp(10)), ("project2", vec![], None)]);
        assert!(cache_has_changes(&before, &after));
    }

    #[test]
    fn test_removal_is_asymmetric() {
        let before = store(&[("project1", vec!["a"], timestamp(10)), ("project2", vec![], None)]);
        let after = store(&[("project1", vec!["a"], timestamp(10))]);

        assert!(!cache_has_changes(&before, &after));
        assert_eq!(
            removed_projects(&before, &after),
            vec![NormalizedPath::new("/src/project2/project2.csproj")]
        );
        assert!(cache_has_changes_or_removals(&before, &after));
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("obj/restore-cache.json"));

        assert!(CacheStore::load(&path).unwrap().is_empty());

        let original = store(&[
            ("project1", vec!["a", "b"], timestamp(10)),
            ("project2", vec![], None),
        ]);
        original.save(&path).unwrap();

        let loaded = CacheStore::load(&path).unwrap();
        assert_eq!(loaded, original);
        assert!(!cache_has_changes(&original, &loaded));
    }
}
