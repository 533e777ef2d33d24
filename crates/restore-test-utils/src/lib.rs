//! Shared test utilities for the restore-graph workspace.
//!
//! Dev-dependency only. Fixtures write plain JSON so that they do not depend
//! on the crates they help test.
//!
//! # Modules
//!
//! - [`workspace`]: [`TestWorkspace`] builder for project trees with
//!   manifests, build files, lock files and dependency-graph specs
//! - [`packages`]: [`TestPackageFolder`] for installed-package evidence

pub mod packages;
pub mod workspace;

pub use packages::TestPackageFolder;
pub use workspace::TestWorkspace;
