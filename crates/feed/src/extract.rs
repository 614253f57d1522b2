//! Turning situations into the set of delayed lines.

use std::sync::LazyLock;

use regex::Regex;
use transit_core::{LineRegistry, ObservedDelaySet};

use crate::situation::Situation;

/// Reason the feed gives for an unplanned delay.
pub const DELAYS_REASON: &str = "Delays";

#[expect(clippy::expect_used)]
static LINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\w+)\]").expect("valid line-code regex (verified by tests)"));

/// The first bracketed code in a description, e.g. `A` from `"[A] trains"`.
///
/// `None` means the situation does not name a line.
#[must_use]
pub fn extract_raw_code(description: &str) -> Option<&str> {
    LINE_CODE
        .captures(description)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Lines the situations report as delayed.
///
/// Only `"Delays"` situations count; anything else leaves a line "not delayed".
pub fn observed_delays<'a, I>(registry: &LineRegistry, situations: I) -> ObservedDelaySet
where
    I: IntoIterator<Item = &'a Situation>,
{
    let raw_codes = situations
        .into_iter()
        .filter(|situation| situation.reason_name == DELAYS_REASON)
        .filter_map(|situation| extract_raw_code(&situation.long_description));
    ObservedDelaySet::from_raw_codes(registry, raw_codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use transit_core::Line;

    #[test]
    fn test_extract_first_bracketed_code() {
        assert_eq!(extract_raw_code("Southbound [A] trains"), Some("A"));
        assert_eq!(extract_raw_code("[SIR] and [1]"), Some("SIR"));
        assert_eq!(extract_raw_code("[7]"), Some("7"));
    }

    #[test]
    fn test_extract_without_code() {
        assert_eq!(extract_raw_code("Expect delays systemwide"), None);
        assert_eq!(extract_raw_code("[] empty brackets"), None);
        assert_eq!(extract_raw_code("[A-B] not a word"), None);
    }

    #[test]
    fn test_observed_delays_filters_reason() {
        let registry = LineRegistry::subway();
        let situations = vec![
            Situation::new("Delays", "[A] trains delayed"),
            Situation::new("Planned Work", "[B] trains rerouted"),
            Situation::new("Delays", "No line named here"),
            Situation::new("Delays", "[H] shuttle delayed"),
            Situation::new("Delays", "[FS] shuttle delayed"),
        ];

        let observed = observed_delays(&registry, &situations);
        let codes: Vec<&str> = observed.lines().map(Line::as_str).collect();
        assert_eq!(codes, vec!["A", "SF", "SR"]);
    }

    #[test]
    fn test_observed_delays_accepts_lowercase_aliases() {
        let registry = LineRegistry::subway();
        let situations = vec![
            Situation::new("Delays", "[h] shuttle delayed"),
            Situation::new("Delays", "[fs] shuttle delayed"),
        ];

        let observed = observed_delays(&registry, &situations);
        let codes: Vec<&str> = observed.lines().map(Line::as_str).collect();
        assert_eq!(codes, vec!["SF", "SR"]);
        assert_eq!(observed.unrecognized().count(), 0);
    }

    #[test]
    fn test_observed_delays_collects_unknown_codes() {
        let registry = LineRegistry::subway();
        let situations = vec![Situation::new("Delays", "[K] trains delayed")];

        let observed = observed_delays(&registry, &situations);
        assert!(observed.is_empty());
        assert_eq!(observed.unrecognized().collect::<Vec<_>>(), vec!["K"]);
    }
}
