//! [`TestWorkspace`] builder for restore scenarios.

use restore_fs::NormalizedPath;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A temporary source tree of projects.
///
/// Each project lives at `src/<name>/` with a `<name>.csproj` build file and
/// a `project.json` manifest whose unique name is `<name>`.
///
/// # Example
///
/// ```rust,no_run
/// use restore_test_utils::TestWorkspace;
///
/// let mut ws = TestWorkspace::new();
/// ws.add_project("app", &[("json", "9.0.1")], &["lib"]);
/// ws.add_project("lib", &[], &[]);
/// ws.write_lock_file("app", &[("json", "9.0.1", "sha512:...")]);
/// let dg = ws.write_dg_spec(&["app"]);
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
    projects: Vec<Value>,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
            projects: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// `rel` under the workspace root.
    pub fn path(&self, rel: &str) -> NormalizedPath {
        NormalizedPath::new(self.root()).join(rel)
    }

    pub fn project_dir(&self, name: &str) -> NormalizedPath {
        self.path(&format!("src/{name}"))
    }

    pub fn build_file(&self, name: &str) -> NormalizedPath {
        self.project_dir(name).join(&format!("{name}.csproj"))
    }

    pub fn manifest(&self, name: &str) -> NormalizedPath {
        self.project_dir(name).join("project.json")
    }

    pub fn lock_file(&self, name: &str) -> NormalizedPath {
        self.project_dir(name).join("project.lock.json")
    }

    /// Write a project with package `dependencies` (name, range) and
    /// project `references` by name. Returns the manifest path.
    pub fn add_project(
        &mut self,
        name: &str,
        dependencies: &[(&str, &str)],
        references: &[&str],
    ) -> NormalizedPath {
        let spec = json!({
            "name": name,
            "filePath": self.manifest(name).as_str(),
            "dependencies": dependencies
                .iter()
                .map(|(id, range)| json!({ "name": id, "version": range }))
                .collect::<Vec<_>>(),
            "restore": {
                "projectUniqueName": name,
                "projectPath": self.build_file(name).as_str(),
                "outputType": "netcore",
                "projectReferences": references
                    .iter()
                    .map(|r| json!({ "projectUniqueName": r }))
                    .collect::<Vec<_>>(),
            },
        });

        fs::create_dir_all(self.project_dir(name).to_native()).unwrap();
        fs::write(self.build_file(name).to_native(), "<Project />\n").unwrap();
        self.write_json(&self.manifest(name), &spec);

        self.projects.retain(|p| p["name"] != name);
        self.projects.push(spec);
        self.manifest(name)
    }

    /// Replace a project's manifest contents, keeping it on disk.
    pub fn touch_manifest(&self, name: &str, content: &str) {
        fs::write(self.manifest(name).to_native(), content).unwrap();
    }

    /// Write `src/<name>/project.lock.json` listing (id, version, sha512) packages.
    pub fn write_lock_file(&self, name: &str, packages: &[(&str, &str, &str)]) {
        let lock = json!({
            "version": 1,
            "libraries": packages
                .iter()
                .map(|(id, version, sha512)| json!({
                    "name": id,
                    "version": version,
                    "type": "package",
                    "sha512": sha512,
                }))
                .collect::<Vec<_>>(),
        });
        self.write_json(&self.lock_file(name), &lock);
    }

    /// Write `dg.json` with every added project and the given roots.
    pub fn write_dg_spec(&self, roots: &[&str]) -> NormalizedPath {
        let path = self.path("dg.json");
        let spec = json!({ "restore": roots, "projects": self.projects });
        self.write_json(&path, &spec);
        path
    }

    /// Write a `restore.toml` into `rel_dir` (relative to the root).
    pub fn write_settings(&self, rel_dir: &str, content: &str) -> NormalizedPath {
        let dir = self.path(rel_dir);
        fs::create_dir_all(dir.to_native()).unwrap();
        let path = dir.join("restore.toml");
        fs::write(path.to_native(), content).unwrap();
        path
    }

    fn write_json(&self, path: &NormalizedPath, value: &Value) {
        let content = serde_json::to_string_pretty(value).unwrap();
        fs::write(path.to_native(), content).unwrap();
    }
}
