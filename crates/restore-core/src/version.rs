//! Package version parsing and dependency version ranges.
//!
//! Manifests declare dependency constraints in several forms:
//!
//! - **Pinned**: `1.0.7` or `[1.0.7]`
//! - **Wildcard**: `1.0.*`, `*`, or `1.0.0-*` (any prerelease of 1.0.0)
//! - **Interval**: `[1.0,2.0)`, `(1.0,)`, `[,2.0]`
//! - **Operator list**: `>=1.0,<2.0`
//!
//! Only pinned ranges can be validated against an existing restore result;
//! every other form is *floating* because a newer matching package may have
//! been published since the last restore. Ranges are parsed to reject
//! malformed input, and otherwise only classified.
//!
//! # Examples
//!
//! ```
//! use restore_core::version::VersionRange;
//!
//! let pinned = VersionRange::parse("9.0.1").unwrap();
//! assert!(!pinned.is_floating());
//!
//! let floating = VersionRange::parse(">=1.0,<2.0").unwrap();
//! assert!(floating.is_floating());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A parsed dependency version range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
    floating: bool,
    /// The original range string for display.
    raw: String,
}

impl VersionRange {
    /// Parse a version range string.
    pub fn parse(range: &str) -> Result<Self> {
        let raw = range.trim().to_string();
        if raw.is_empty() {
            return Err(invalid(&raw, "empty range"));
        }

        let floating = if raw.contains('*') {
            check_wildcard(&raw)?;
            true
        } else if raw.starts_with('[') || raw.starts_with('(') {
            interval_floats(&raw)?
        } else if raw.starts_with(['<', '>', '=', '!']) {
            operators_float(&raw)?
        } else {
            parse_version(&raw)?;
            false
        };

        Ok(Self { floating, raw })
    }

    /// Whether this range can resolve to different versions over time.
    pub fn is_floating(&self) -> bool {
        self.floating
    }

    /// Return the original range string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl std::fmt::Display for VersionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for VersionRange {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<VersionRange> for String {
    fn from(range: VersionRange) -> Self {
        range.raw
    }
}

/// Parse a package version, padding missing minor/patch components.
///
/// - `"1"` -> `1.0.0`
/// - `"1.0"` -> `1.0.0`
/// - `"1.0.0-beta"` -> `1.0.0-beta`
/// - `"1.0.0.0"` -> `1.0.0` (a zero revision is dropped)
pub fn parse_version(s: &str) -> Result<semver::Version> {
    let s = s.trim();

    if let Ok(v) = semver::Version::parse(s) {
        return Ok(v);
    }

    let split = s.find(['-', '+']).unwrap_or(s.len());
    let (release, suffix) = s.split_at(split);
    let mut parts: Vec<&str> = release.split('.').collect();

    if parts.len() == 4 && parts[3].trim_start_matches('0').is_empty() {
        parts.pop();
    }
    if parts.is_empty() || parts.len() > 3 {
        return Err(invalid(s, "expected one to three release components"));
    }
    while parts.len() < 3 {
        parts.push("0");
    }

    let padded = format!("{}{}", parts.join("."), suffix);
    semver::Version::parse(&padded).map_err(|e| invalid(s, &e.to_string()))
}

/// `*`, `1.*`, `1.0.*` or `1.0.0-*`.
fn check_wildcard(raw: &str) -> Result<()> {
    if raw == "*" {
        return Ok(());
    }

    if let Some(base) = raw.strip_suffix("-*") {
        parse_version(base)?;
        return Ok(());
    }

    let Some(base) = raw.strip_suffix(".*") else {
        return Err(invalid(raw, "wildcard must be the final component"));
    };

    let components: Vec<&str> = base.split('.').collect();
    if components.len() > 2 {
        return Err(invalid(raw, "too many components before wildcard"));
    }
    if let Some(part) = components.iter().find(|part| part.parse::<u64>().is_err()) {
        return Err(invalid(raw, &format!("invalid component '{part}'")));
    }

    Ok(())
}

/// Whether a bracketed interval admits more than one version.
fn interval_floats(raw: &str) -> Result<bool> {
    let lower_inclusive = raw.starts_with('[');
    let upper_inclusive = match raw.chars().last() {
        Some(']') => true,
        Some(')') => false,
        _ => return Err(invalid(raw, "unterminated interval")),
    };
    let inner = &raw[1..raw.len() - 1];

    let Some((lower, upper)) = inner.split_once(',') else {
        // `[1.0]` pins a single version
        if lower_inclusive && upper_inclusive {
            parse_version(inner)?;
            return Ok(false);
        }
        return Err(invalid(raw, "single-version interval must be inclusive"));
    };

    let bound = |s: &str| -> Result<Option<semver::Version>> {
        let s = s.trim();
        if s.is_empty() {
            Ok(None)
        } else {
            parse_version(s).map(Some)
        }
    };

    match (bound(lower)?, bound(upper)?) {
        (None, None) => Err(invalid(raw, "interval needs at least one bound")),
        (Some(l), Some(u)) if l > u => Err(invalid(raw, "lower bound exceeds upper bound")),
        (Some(l), Some(u)) => Ok(!(l == u && lower_inclusive && upper_inclusive)),
        _ => Ok(true),
    }
}

/// Whether a comma-separated operator list admits more than one version.
fn operators_float(raw: &str) -> Result<bool> {
    let mut operators = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        let version = part.trim_start_matches(['<', '>', '=', '!']);
        let operator = &part[..part.len() - version.len()];
        if !matches!(operator, "" | ">=" | "<=" | "!=" | "==" | ">" | "<") {
            return Err(invalid(raw, &format!("unknown operator '{operator}'")));
        }
        parse_version(version)?;
        operators.push(operator);
    }

    match operators.as_slice() {
        [] => Err(invalid(raw, "empty range")),
        ["==" | ""] => Ok(false),
        _ => Ok(true),
    }
}

fn invalid(range: &str, reason: &str) -> Error {
    Error::InvalidVersionRange {
        range: range.to_string(),
        reason: reason.to_string(),
    }
}
