//! SHA-512 package hash utilities
//!
//! Installed packages carry a hash file next to their content. Lock files
//! record the same value, so both sides must agree on a single canonical
//! format: `sha512:<hex>`.

use sha2::{Digest, Sha512};
use std::path::Path;

/// Prefix for all hashes produced by this module
const PREFIX: &str = "sha512:";

/// Compute the SHA-512 hash of in-memory package content.
///
/// Returns a string in the canonical format `"sha512:<hex>"`.
pub fn compute_content_hash(content: &[u8]) -> String {
    let mut hasher = Sha512::new();
    hasher.update(content);
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the SHA-512 hash of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_file_hash(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    Ok(compute_content_hash(&content))
}

/// Compare two recorded hashes, ignoring surrounding whitespace.
///
/// Hash files are frequently written with a trailing newline.
pub fn hashes_match(recorded: &str, expected: &str) -> bool {
    recorded.trim() == expected.trim()
}
