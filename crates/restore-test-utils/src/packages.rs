//! [`TestPackageFolder`]: a temporary global or fallback packages folder.

use restore_fs::{NormalizedPath, PackageFolderLayout, checksum};
use std::fs;
use tempfile::TempDir;

/// A temporary package folder laid out like a real one.
///
/// # Example
///
/// ```rust,no_run
/// use restore_test_utils::TestPackageFolder;
///
/// let folder = TestPackageFolder::new();
/// let hash = folder.install("Newtonsoft.Json", "9.0.1", b"package bytes");
/// assert!(hash.starts_with("sha512:"));
/// ```
pub struct TestPackageFolder {
    temp_dir: TempDir,
    layout: PackageFolderLayout,
}

impl Default for TestPackageFolder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPackageFolder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let layout = PackageFolderLayout::new(temp_dir.path());
        Self { temp_dir, layout }
    }

    pub fn root(&self) -> NormalizedPath {
        NormalizedPath::new(self.temp_dir.path())
    }

    pub fn layout(&self) -> &PackageFolderLayout {
        &self.layout
    }

    /// Install a package archive and its hash file. Returns the hash.
    pub fn install(&self, id: &str, version: &str, content: &[u8]) -> String {
        let package = self.layout.package_file_path(id, version);
        fs::create_dir_all(self.layout.install_path(id, version).to_native()).unwrap();
        fs::write(package.to_native(), content).unwrap();
        let hash = checksum::compute_file_hash(&package.to_native()).unwrap();
        fs::write(self.layout.hash_path(id, version).to_native(), format!("{hash}\n")).unwrap();
        hash
    }

    /// Overwrite the hash file of an installed package.
    pub fn tamper_hash(&self, id: &str, version: &str) {
        let hash = checksum::compute_content_hash(b"tampered");
        fs::write(self.layout.hash_path(id, version).to_native(), hash).unwrap();
    }

    /// Delete an installed package entirely.
    pub fn uninstall(&self, id: &str, version: &str) {
        let install = self.layout.install_path(id, version).to_native();
        if install.exists() {
            fs::remove_dir_all(install).unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_records_archive_hash() {
        let folder = TestPackageFolder::new();
        let hash = folder.install("Json", "9.0.1", b"json package");

        assert_eq!(hash, checksum::compute_content_hash(b"json package"));
        let recorded = fs::read_to_string(folder.layout().hash_path("Json", "9.0.1").to_native())
            .unwrap();
        assert!(checksum::hashes_match(&recorded, &hash));

        folder.tamper_hash("json", "9.0.1");
        let recorded = fs::read_to_string(folder.layout().hash_path("Json", "9.0.1").to_native())
            .unwrap();
        assert!(!checksum::hashes_match(&recorded, &hash));
    }
}
