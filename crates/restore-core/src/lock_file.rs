//! Lock files written by a previous restore, and package identities.

use restore_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::Result;
use crate::version::parse_version;

/// A package name and version coordinate.
///
/// Names compare case-insensitively, so they are lower-cased on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageIdentity {
    name: String,
    version: semver::Version,
}

impl PackageIdentity {
    pub fn new(name: &str, version: semver::Version) -> Self {
        Self {
            name: name.to_lowercase(),
            version,
        }
    }

    /// Build an identity from a name and an unparsed version string.
    pub fn parse(name: &str, version: &str) -> Result<Self> {
        Ok(Self::new(name, parse_version(version)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &semver::Version {
        &self.version
    }
}

impl std::fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Whether a lock file library is a package or another project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryKind {
    #[default]
    Package,
    Project,
}

/// One resolved library recorded in a lock file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockFileLibrary {
    pub name: String,
    pub version: String,
    #[serde(rename = "type", default)]
    pub kind: LibraryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha512: Option<String>,
}

impl LockFileLibrary {
    pub fn package(
        name: impl Into<String>,
        version: impl Into<String>,
        sha512: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            kind: LibraryKind::Package,
            sha512: Some(sha512.into()),
        }
    }

    pub fn identity(&self) -> Result<PackageIdentity> {
        PackageIdentity::parse(&self.name, &self.version)
    }
}

/// The restore output of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockFile {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub libraries: Vec<LockFileLibrary>,
}

impl LockFile {
    /// Lock file format version written by this crate.
    pub const FORMAT_VERSION: u32 = 1;

    pub fn new(libraries: Vec<LockFileLibrary>) -> Self {
        Self {
            version: Self::FORMAT_VERSION,
            libraries,
        }
    }

    /// Load a lock file, returning `None` when it does not exist.
    pub fn load(path: &NormalizedPath) -> Result<Option<Self>> {
        Ok(ConfigStore::new().load_optional(path)?)
    }

    /// Write the lock file atomically.
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        Ok(ConfigStore::new().save(path, self)?)
    }

    /// Package libraries, skipping project-to-project entries.
    pub fn packages(&self) -> impl Iterator<Item = &LockFileLibrary> {
        self.libraries
            .iter()
            .filter(|library| library.kind == LibraryKind::Package)
    }
}

/// Packages present in `updated` but not in `original`.
///
/// A missing original lock file means every package was added. Libraries
/// whose version cannot be parsed are skipped.
pub fn get_added_packages(
    original: Option<&LockFile>,
    updated: &LockFile,
) -> Vec<PackageIdentity> {
    let existing: HashSet<PackageIdentity> = original
        .map(|lock| {
            lock.packages()
                .filter_map(|library| library.identity().ok())
                .collect()
        })
        .unwrap_or_default();

    let mut seen = HashSet::new();
    updated
        .packages()
        .filter_map(|library| library.identity().ok())
        .filter(|identity| !existing.contains(identity) && seen.insert(identity.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn project(name: &str) -> LockFileLibrary {
        LockFileLibrary {
            name: name.into(),
            version: "1.0.0".into(),
            kind: LibraryKind::Project,
            sha512: None,
        }
    }

    #[test]
    fn test_identity_ignores_name_case() {
        let a = PackageIdentity::parse("Newtonsoft.Json", "9.0.1").unwrap();
        let b = PackageIdentity::parse("newtonsoft.json", "9.0.1.0").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "newtonsoft.json 9.0.1");
    }

    #[test]
    fn test_added_packages() {
        let original = LockFile::new(vec![
            LockFileLibrary::package("a", "1.0.0", "sha512:a"),
            LockFileLibrary::package("b", "1.0.0", "sha512:b"),
        ]);
        let updated = LockFile::new(vec![
            LockFileLibrary::package("A", "1.0.0", "sha512:a"),
            LockFileLibrary::package("b", "2.0.0", "sha512:b2"),
            LockFileLibrary::package("c", "1.0.0", "sha512:c"),
            project("lib"),
        ]);

        let added = get_added_packages(Some(&original), &updated);
        let added: Vec<String> = added.iter().map(ToString::to_string).collect();
        assert_eq!(added, vec!["b 2.0.0".to_string(), "c 1.0.0".to_string()]);
    }

    #[test]
    fn test_added_packages_without_original() {
        let updated = LockFile::new(vec![
            LockFileLibrary::package("a", "1.0.0", "sha512:a"),
            project("lib"),
        ]);
        assert_eq!(get_added_packages(None, &updated).len(), 1);
    }

    #[test]
    fn test_load_missing_and_saved() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("project.lock.json"));
        assert!(LockFile::load(&path).unwrap().is_none());

        let lock = LockFile::new(vec![LockFileLibrary::package("a", "1.0.0", "sha512:a")]);
        lock.save(&path).unwrap();
        assert_eq!(LockFile::load(&path).unwrap(), Some(lock));
    }

    #[test]
    fn test_library_kind_defaults_to_package() {
        let json = r#"{ "version": 1, "libraries": [ { "name": "a", "version": "1.0" } ] }"#;
        let lock: LockFile = serde_json::from_str(json).unwrap();
        assert_eq!(lock.packages().count(), 1);
        assert!(lock.libraries[0].sha512.is_none());
    }
}
