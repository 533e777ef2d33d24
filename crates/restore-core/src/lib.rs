//! Dependency closure, restore cache and restore planning engine
//!
//! This crate decides *what* to restore, in *what order*, and *whether* a
//! restore can be skipped:
//!
//! - **Closures**: transitive and direct references over a project graph
//! - **Cache stores**: per-project snapshots of closures and manifest times,
//!   compared across sessions to detect graph changes
//! - **Necessity checks**: installed package hashes validated against lock files
//! - **Ordering**: children-first sequencing of projects
//! - **Requests**: per-root restore requests with shared providers, dispatched
//!   to an external restore command with bounded parallelism
//!
//! # Architecture
//!
//! ```text
//!              restore-cli
//!                   |
//!             restore-core
//!                   |
//!              restore-fs
//! ```
//!
//! # Example
//!
//! ```
//! use restore_core::{ProjectReference, compute_closure};
//!
//! let graph = vec![
//!     ProjectReference::new("a", "/src/a/a.csproj").with_references(["b", "c"]),
//!     ProjectReference::new("b", "/src/b/b.csproj"),
//!     ProjectReference::new("c", "/src/c/c.csproj").with_references(["d"]),
//!     ProjectReference::new("d", "/src/d/d.csproj"),
//! ];
//!
//! assert_eq!(compute_closure("a", &graph).len(), 4);
//! assert_eq!(compute_closure("c", &graph).len(), 2);
//! assert!(compute_closure("z", &graph).is_empty());
//! ```

pub mod cache;
pub mod dg_spec;
pub mod dispatch;
pub mod error;
pub mod graph;
pub mod lock_file;
pub mod manifest;
pub mod necessity;
pub mod project;
pub mod providers;
pub mod reference;
pub mod request;
pub mod session;
pub mod settings;
pub mod version;

pub use cache::{
    CacheStore, ProjectCacheEntry, build_cache_store, cache_has_changes,
    cache_has_changes_or_removals, removed_projects,
};
pub use dg_spec::DependencyGraphSpec;
pub use dispatch::{
    RestoreCommand, RestoreOptions, RestoreResult, RestoreSummary, restore, restore_all,
};
pub use error::{Error, Result};
pub use graph::{
    ChildOrder, compute_closure, compute_direct_references, get_parents, order_children,
    restore_order,
};
pub use lock_file::{LockFile, LockFileLibrary, PackageIdentity, get_added_packages};
pub use manifest::{JsonManifestReader, ManifestReader, OutputType, PackageSpec};
pub use necessity::is_restore_required;
pub use project::{DeclaredProject, DependencyGraphProject, EnumeratedProject, ReferenceEnumerator};
pub use providers::{ProviderCache, ProviderKey, RestoreProviders};
pub use reference::ProjectReference;
pub use request::{RestoreRequest, RestoreRequestBuilder, RestoreSummaryRequest};
pub use session::ReferenceCache;
pub use settings::{FileSettingsResolver, Settings, SettingsResolver};
pub use version::VersionRange;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn error_messages_name_the_project() {
        let error = Error::NotFound {
            what: "Manifest for app".into(),
            path: PathBuf::from("/src/app/project.json"),
        };
        let display = error.to_string();
        assert!(display.contains("Manifest for app"), "got: {display}");
        assert!(display.contains("/src/app/project.json"), "got: {display}");

        let error = Error::RestoreFailed {
            project: "app".into(),
        };
        assert_eq!(error.to_string(), "Restore failed for app");
    }

    #[test]
    fn invalid_argument_names_the_input() {
        let error = Error::invalid_argument("target");
        assert_eq!(error.to_string(), "Invalid argument: target is required");
    }
}
