//! Error types for restore-core

use std::path::PathBuf;

/// Result type for restore-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in restore-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required input was absent
    #[error("Invalid argument: {name} is required")]
    InvalidArgument { name: &'static str },

    /// A manifest or graph node that must exist was not found
    #[error("{what} not found at {path}")]
    NotFound { what: String, path: PathBuf },

    /// A manifest exists but could not be parsed
    #[error("Failed to parse manifest at {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    /// Invalid version or version range string
    #[error("Invalid version range '{range}': {reason}")]
    InvalidVersionRange { range: String, reason: String },

    /// The dependency graph is structurally inconsistent
    #[error("Dependency graph validation failed: {message}")]
    ValidationFailed { message: String },

    /// Two projects share one build-file path in a cache store
    #[error("Duplicate project in cache store: {path}")]
    DuplicateProject { path: String },

    /// The operation was canceled before it could commit
    #[error("Restore canceled")]
    Canceled,

    /// The restore command reported failure for a project
    #[error("Restore failed for {project}")]
    RestoreFailed { project: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from restore-fs
    #[error(transparent)]
    Fs(#[from] restore_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    /// Shorthand for an absent required input.
    pub fn invalid_argument(name: &'static str) -> Self {
        Self::InvalidArgument { name }
    }
}
