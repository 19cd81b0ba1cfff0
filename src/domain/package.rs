//! Composer package identifiers and candidate list filtering

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

// vendor/name, both halves restricted to the characters composer allows in
// the packages we touch.
static PACKAGE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+/[A-Za-z0-9_-]+$").unwrap());

/// A validated `vendor/name` package identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageName(String);

impl PackageName {
    /// Parses a package identifier, trimming surrounding whitespace.
    ///
    /// Returns `None` for anything that is not `vendor/name`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if PACKAGE_NAME_RE.is_match(trimmed) {
            Some(Self(trimmed.to_string()))
        } else {
            None
        }
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Turns raw tool output into an ordered candidate list.
///
/// Lines are trimmed, anything that is not a package identifier is dropped
/// silently, and repeats keep their first position.
pub fn filter_candidates<'a, I>(lines: I) -> Vec<PackageName>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut packages: Vec<PackageName> = Vec::new();
    for line in lines {
        if let Some(package) = PackageName::parse(line) {
            if !packages.contains(&package) {
                packages.push(package);
            }
        }
    }
    packages
}
