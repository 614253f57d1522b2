//! Line identifiers and the closed registry of recognized lines.
//!
//! A [`Line`] can only be obtained from a [`LineRegistry`], so holding one
//! means the code has already been validated.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::error::Error;
use crate::result::Result;

/// Subway lines reported by the MTA service-status feed.
pub const SUBWAY_LINES: &[&str] = &[
    "1", "2", "3", "4", "5", "6", "7", "A", "C", "E", "B", "D", "F", "M", "G", "J", "Z", "L", "N",
    "Q", "R", "W", "S", "SR", "SF", "SIR",
];

/// Canonical identifier of a tracked line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Line(Arc<str>);

impl Line {
    /// The canonical code, e.g. `"A"` or `"SIR"`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Line {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Rewrite a feed-reported code into its canonical form.
///
/// The feed reports the Rockaway shuttle as `H` and the Franklin Avenue
/// shuttle as `FS`; every other code is already canonical.
#[must_use]
pub fn canonical_code(raw: &str) -> &str {
    match raw {
        "H" => "SR",
        "FS" => "SF",
        other => other,
    }
}

/// The fixed set of lines the service tracks.
#[derive(Debug, Clone)]
pub struct LineRegistry {
    lines: BTreeSet<Line>,
}

impl LineRegistry {
    /// Build a registry from an explicit set of codes.
    ///
    /// Codes are stored upper-cased; duplicates collapse.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = codes
            .into_iter()
            .map(|code| Line(Arc::from(code.as_ref().trim().to_uppercase())))
            .filter(|line| !line.0.is_empty())
            .collect();
        Self { lines }
    }

    /// Registry of every subway line in [`SUBWAY_LINES`].
    #[must_use]
    pub fn subway() -> Self {
        Self::new(SUBWAY_LINES)
    }

    /// Membership test, case-insensitive.
    #[must_use]
    pub fn is_valid(&self, code: &str) -> bool {
        self.lookup(code).is_some()
    }

    /// Validate a user-supplied code such as a URL path segment.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownLine` if the code is not registered.
    pub fn parse(&self, code: &str) -> Result<Line> {
        self.lookup(code)
            .cloned()
            .ok_or_else(|| Error::unknown_line(code))
    }

    /// Map a raw feed code to a canonical line.
    ///
    /// Case is folded before the alias rewrite, so `h` maps like `H`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownLine` if the rewritten code is not registered.
    pub fn normalize(&self, raw: &str) -> Result<Line> {
        let upper = raw.trim().to_uppercase();
        self.lookup(canonical_code(&upper))
            .cloned()
            .ok_or_else(|| Error::unknown_line(raw))
    }

    /// Iterate over every registered line in code order.
    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    /// Number of registered lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the registry holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn lookup(&self, code: &str) -> Option<&Line> {
        let upper = code.trim().to_uppercase();
        self.lines
            .iter()
            .find(|line| line.as_str() == upper.as_str())
    }
}

impl Default for LineRegistry {
    fn default() -> Self {
        Self::subway()
    }
}
