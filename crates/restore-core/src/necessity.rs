//! Decide whether a restore must run even though the graph is unchanged.
//!
//! A restore can be skipped only when every package recorded in each
//! project's lock file is still installed, with a hash file matching the
//! hash the lock file recorded. Floating dependencies and `supports`
//! profiles always force a restore since a newer match may exist upstream.

use restore_fs::{NormalizedPath, PackageFolderLayout, checksum, io};
use std::collections::HashSet;

use crate::error::Result;
use crate::lock_file::{LockFile, PackageIdentity};
use crate::manifest::lock_file_path;
use crate::project::DependencyGraphProject;
use crate::session::ReferenceCache;

/// Whether any project in `projects` requires restore.
///
/// `package_folder_paths` are searched in priority order: the global
/// packages folder first, then each fallback folder. A package shared by
/// several projects is checked against disk once per call.
pub fn is_restore_required<P>(
    projects: &[P],
    package_folder_paths: &[NormalizedPath],
    context: &mut ReferenceCache,
) -> Result<bool>
where
    P: AsRef<dyn DependencyGraphProject>,
{
    let folders: Vec<PackageFolderLayout> = package_folder_paths
        .iter()
        .cloned()
        .map(PackageFolderLayout::new)
        .collect();
    let mut checked = HashSet::new();

    for project in projects {
        let project = project.as_ref();
        if project.is_restore_required(&folders, &mut checked, context)? {
            tracing::debug!(project = %project.unique_name(), "restore required");
            return Ok(true);
        }
    }

    Ok(false)
}

/// Evaluate a single project; the body of
/// [`DependencyGraphProject::is_restore_required`].
///
/// Projects without a manifest have nothing to restore.
pub fn project_requires_restore<P>(
    project: &P,
    package_folders: &[PackageFolderLayout],
    checked: &mut HashSet<PackageIdentity>,
    context: &mut ReferenceCache,
) -> Result<bool>
where
    P: DependencyGraphProject + ?Sized,
{
    let Some(spec) = project.package_spec(context)? else {
        return Ok(false);
    };

    if spec.has_floating_dependencies() {
        tracing::debug!(project = %project.unique_name(), "manifest has floating versions");
        return Ok(true);
    }

    if !spec.supports.is_empty() {
        tracing::debug!(project = %project.unique_name(), "manifest declares supports profiles");
        return Ok(true);
    }

    let Some(manifest_path) = project.manifest_path().or(spec.file_path.as_ref()) else {
        return Ok(true);
    };

    let lock_path = lock_file_path(manifest_path);
    let Some(lock) = LockFile::load(&lock_path)? else {
        tracing::debug!(project = %project.unique_name(), lock_file = %lock_path, "no lock file");
        return Ok(true);
    };

    for library in lock.packages() {
        let Ok(identity) = library.identity() else {
            tracing::debug!(
                package = %library.name,
                version = %library.version,
                "unreadable version in lock file"
            );
            return Ok(true);
        };

        if !checked.insert(identity.clone()) {
            continue;
        }

        if !installed_hash_matches(&identity, library.sha512.as_deref(), package_folders)? {
            return Ok(true);
        }
    }

    Ok(false)
}

/// First folder holding the package decides; later folders are not consulted.
fn installed_hash_matches(
    identity: &PackageIdentity,
    expected: Option<&str>,
    package_folders: &[PackageFolderLayout],
) -> Result<bool> {
    let Some(expected) = expected else {
        tracing::debug!(package = %identity, "lock file records no hash");
        return Ok(false);
    };

    let version = identity.version().to_string();
    let hash_path = package_folders
        .iter()
        .map(|folder| folder.hash_path(identity.name(), &version))
        .find(NormalizedPath::is_file);

    let Some(hash_path) = hash_path else {
        tracing::debug!(package = %identity, "package not installed");
        return Ok(false);
    };

    let recorded = io::read_text(&hash_path)?;
    if !checksum::hashes_match(&recorded, expected) {
        tracing::debug!(package = %identity, path = %hash_path, "installed hash differs");
        return Ok(false);
    }

    Ok(true)
}
