//! On-disk layout of a package folder
//!
//! Both the global packages folder and every fallback folder share one
//! layout, so a single resolver type serves all of them:
//!
//! ```text
//! <root>/<id>/<version>/
//!     <id>.<version>.nupkg
//!     <id>.<version>.nupkg.sha512
//! ```
//!
//! `id` and `version` are lower-cased so lookups are case-insensitive on
//! every platform.

use crate::NormalizedPath;

/// Resolves install, package and hash paths within one package folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageFolderLayout {
    root: NormalizedPath,
}

impl PackageFolderLayout {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Directory a package version is extracted into.
    pub fn install_path(&self, id: &str, version: &str) -> NormalizedPath {
        self.root
            .join(&id.to_lowercase())
            .join(&version.to_lowercase())
    }

    /// Path of the package archive inside its install directory.
    pub fn package_file_path(&self, id: &str, version: &str) -> NormalizedPath {
        self.install_path(id, version)
            .join(&format!("{}.nupkg", file_stem(id, version)))
    }

    /// Path of the hash file written once a package is fully installed.
    pub fn hash_path(&self, id: &str, version: &str) -> NormalizedPath {
        self.install_path(id, version)
            .join(&format!("{}.nupkg.sha512", file_stem(id, version)))
    }
}

fn file_stem(id: &str, version: &str) -> String {
    format!("{}.{}", id.to_lowercase(), version.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_path_is_lower_cased() {
        let layout = PackageFolderLayout::new("/packages");
        assert_eq!(
            layout.install_path("Newtonsoft.Json", "9.0.1-Beta1").as_str(),
            "/packages/newtonsoft.json/9.0.1-beta1"
        );
    }

    #[test]
    fn hash_path_sits_in_install_path() {
        let layout = PackageFolderLayout::new("/packages");
        let hash = layout.hash_path("nuget.versioning", "1.0.7");
        assert_eq!(
            hash.as_str(),
            "/packages/nuget.versioning/1.0.7/nuget.versioning.1.0.7.nupkg.sha512"
        );
        assert_eq!(
            hash.parent().unwrap(),
            layout.install_path("nuget.versioning", "1.0.7")
        );
    }
}
