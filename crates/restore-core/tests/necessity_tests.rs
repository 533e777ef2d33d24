//! Restore necessity checks against real package folders.

use restore_core::{
    DeclaredProject, DependencyGraphProject, DependencyGraphSpec, ReferenceCache,
    is_restore_required,
};
use restore_test_utils::{TestPackageFolder, TestWorkspace};

struct Scenario {
    ws: TestWorkspace,
    global: TestPackageFolder,
    fallback: TestPackageFolder,
}

impl Scenario {
    /// `app` needs a 1.0.0 and b 2.0.0, `lib` needs a 1.0.0; all installed
    /// in the global folder with matching lock files.
    fn new() -> Self {
        let mut ws = TestWorkspace::new();
        let global = TestPackageFolder::new();
        let fallback = TestPackageFolder::new();

        ws.add_project("app", &[("a", "1.0.0"), ("B", "2.0.0")], &["lib"]);
        ws.add_project("lib", &[("a", "1.0.0")], &[]);

        let hash_a = global.install("a", "1.0.0", b"package a");
        let hash_b = global.install("B", "2.0.0", b"package b");
        ws.write_lock_file("app", &[("a", "1.0.0", &hash_a), ("B", "2.0.0", &hash_b)]);
        ws.write_lock_file("lib", &[("a", "1.0.0", &hash_a)]);

        Self {
            ws,
            global,
            fallback,
        }
    }

    fn projects(&self) -> Vec<Box<dyn DependencyGraphProject>> {
        let dg = DependencyGraphSpec::load(&self.ws.write_dg_spec(&["app"])).unwrap();
        DeclaredProject::from_graph(dg.references().unwrap())
            .into_iter()
            .map(|p| Box::new(p) as Box<dyn DependencyGraphProject>)
            .collect()
    }

    fn is_required(&self) -> bool {
        let folders = vec![self.global.root(), self.fallback.root()];
        let mut context = ReferenceCache::new();
        is_restore_required(&self.projects(), &folders, &mut context).unwrap()
    }
}

#[test]
fn test_no_changes_no_restore() {
    let scenario = Scenario::new();
    assert!(!scenario.is_required());
}

#[test]
fn test_changed_hash_requires_restore() {
    let scenario = Scenario::new();
    scenario.global.tamper_hash("b", "2.0.0");
    assert!(scenario.is_required());
}

#[test]
fn test_missing_package_requires_restore() {
    let scenario = Scenario::new();
    scenario.global.uninstall("a", "1.0.0");
    assert!(scenario.is_required());
}

#[test]
fn test_package_found_in_fallback_folder() {
    let scenario = Scenario::new();
    scenario.global.uninstall("b", "2.0.0");
    scenario.fallback.install("b", "2.0.0", b"package b");
    assert!(!scenario.is_required());
}

#[test]
fn test_first_folder_holding_package_wins() {
    let scenario = Scenario::new();
    scenario.fallback.install("a", "1.0.0", b"package a");
    scenario.global.tamper_hash("a", "1.0.0");
    assert!(scenario.is_required());
}

#[test]
fn test_floating_version_requires_restore() {
    let mut scenario = Scenario::new();
    scenario.ws.add_project("lib", &[("a", "1.0.*")], &[]);
    assert!(scenario.is_required());
}

#[test]
fn test_missing_lock_file_requires_restore() {
    let scenario = Scenario::new();
    std::fs::remove_file(scenario.ws.lock_file("lib").to_native()).unwrap();
    assert!(scenario.is_required());
}

#[test]
fn test_no_package_folders_requires_restore() {
    let scenario = Scenario::new();
    let mut context = ReferenceCache::new();
    assert!(is_restore_required(&scenario.projects(), &[], &mut context).unwrap());
}

#[test]
fn test_shared_package_checked_once_per_call() {
    let scenario = Scenario::new();
    let stale = restore_fs::checksum::compute_content_hash(b"older package a");
    scenario.ws.write_lock_file("lib", &[("a", "1.0.0", &stale)]);

    let projects = scenario.projects();
    let folders = vec![scenario.global.root(), scenario.fallback.root()];

    // `app` validates a 1.0.0 first; `lib` does not re-check it.
    let mut context = ReferenceCache::new();
    assert!(!is_restore_required(&projects, &folders, &mut context).unwrap());

    let lib_only: Vec<_> = projects
        .into_iter()
        .filter(|p| p.unique_name() == "lib")
        .collect();
    assert_eq!(lib_only.len(), 1);
    let mut context = ReferenceCache::new();
    assert!(is_restore_required(&lib_only, &folders, &mut context).unwrap());
}
