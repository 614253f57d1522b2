//! The per-poll set of lines the feed currently reports as delayed.

use std::collections::BTreeSet;

use crate::line::{Line, LineRegistry};

/// Lines reported as delayed by a single feed snapshot.
///
/// Built fresh for every poll and consumed by one reconcile call. Raw codes
/// that do not normalize to a registered line are kept in `unrecognized` so
/// the caller can log them; they are never tracked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedDelaySet {
    lines: BTreeSet<Line>,
    unrecognized: BTreeSet<String>,
}

impl ObservedDelaySet {
    /// An empty snapshot: nothing is delayed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize raw feed codes against the registry.
    pub fn from_raw_codes<I, S>(registry: &LineRegistry, raw_codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw_codes
            .into_iter()
            .fold(Self::new(), |mut observed, raw| {
                let raw = raw.as_ref();
                match registry.normalize(raw) {
                    Ok(line) => {
                        observed.lines.insert(line);
                    }
                    Err(_) => {
                        observed.unrecognized.insert(raw.to_string());
                    }
                }
                observed
            })
    }

    /// Add an already validated line.
    pub fn insert(&mut self, line: Line) -> bool {
        self.lines.insert(line)
    }

    /// Whether `line` is reported as delayed.
    #[must_use]
    pub fn contains(&self, line: &Line) -> bool {
        self.lines.contains(line)
    }

    /// Delayed lines in code order.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    /// Raw codes that matched no registered line.
    pub fn unrecognized(&self) -> impl Iterator<Item = &str> {
        self.unrecognized.iter().map(String::as_str)
    }

    /// Number of delayed lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no line is delayed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl FromIterator<Line> for ObservedDelaySet {
    fn from_iter<T: IntoIterator<Item = Line>>(iter: T) -> Self {
        Self {
            lines: iter.into_iter().collect(),
            unrecognized: BTreeSet::new(),
        }
    }
}
