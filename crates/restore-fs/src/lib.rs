//! Filesystem layer for the restore graph engine
//!
//! Provides normalized path handling, content checksums, atomic I/O,
//! format-agnostic config loading and the on-disk layout of package folders.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod layout;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use layout::PackageFolderLayout;
pub use path::NormalizedPath;
