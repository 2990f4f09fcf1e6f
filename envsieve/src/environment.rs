//! Access to the process environment and helpers for environment mappings.
//!
//! Resolution itself never touches the OS directly: it operates on an
//! already-materialized name-to-value mapping. This module supplies that
//! snapshot, thin get/set/delete wrappers, a scoped-restore guard for tests,
//! and the similar-name search used for typo suggestions.

use std::collections::BTreeMap;
use std::env;

use crate::levenshtein;

/// Snapshot of the current process environment.
///
/// Entries whose name or value is not valid UTF-8 are skipped. The mapping
/// is ordered so that downstream reports are deterministic.
#[must_use]
pub fn get_all() -> BTreeMap<String, String> {
    env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Reads a single environment variable, `None` if unset or not UTF-8.
#[must_use]
pub fn get(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// Sets an environment variable on the current process.
pub fn set(name: &str, value: &str) {
    env::set_var(name, value);
}

/// Removes an environment variable from the current process.
pub fn delete(name: &str) {
    env::remove_var(name);
}

/// RAII guard that sets an environment variable and restores the previous
/// state on drop.
///
/// Intended for tests that need a real OS-level variable; most tests should
/// prefer [`ScopedTestEnvironment`] or an explicit mapping instead.
///
/// # Examples
///
/// ```
/// use envsieve::environment::{self, ScopedVariable};
///
/// {
///     let _guard = ScopedVariable::new("ENVSIEVE_DOCTEST_VAR", "1");
///     assert_eq!(environment::get("ENVSIEVE_DOCTEST_VAR"), Some("1".to_owned()));
/// }
/// assert_eq!(environment::get("ENVSIEVE_DOCTEST_VAR"), None);
/// ```
///
/// [`ScopedTestEnvironment`]: crate::ScopedTestEnvironment
#[derive(Debug)]
pub struct ScopedVariable {
    name: String,
    previous: Option<String>,
}

impl ScopedVariable {
    /// Sets `name` to `value`, remembering the previous value.
    #[must_use]
    pub fn new(name: &str, value: &str) -> Self {
        let previous = get(name);
        set(name, value);
        Self {
            name: name.to_owned(),
            previous,
        }
    }
}

impl Drop for ScopedVariable {
    fn drop(&mut self) {
        match &self.previous {
            Some(value) => set(&self.name, value),
            None => delete(&self.name),
        }
    }
}

/// Merges two environment mappings; entries in `high` win on collision.
pub(crate) fn merge(
    high: BTreeMap<String, String>,
    low: BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = low;
    merged.extend(high);
    merged
}

/// Finds the entry in `environment` closest to `name` by bounded edit
/// distance, accepting it only within `cutoff`.
///
/// The search runs with `cutoff + 1` so a candidate at exactly the cutoff is
/// still measured precisely. Ties resolve to the lexicographically smallest
/// name because the mapping is ordered.
pub(crate) fn find_similar(
    name: &str,
    environment: &BTreeMap<String, String>,
    cutoff: usize,
) -> Option<String> {
    let (distance, candidate) = environment
        .keys()
        .map(|candidate| (levenshtein::distance(name, candidate, cutoff + 1), candidate))
        .min_by_key(|&(distance, _)| distance)?;
    (distance <= cutoff).then(|| candidate.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn mapping(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|&(name, value)| (name.to_owned(), value.to_owned()))
            .collect()
    }

    #[test]
    fn test_merge_high_precedence_wins() {
        let high = mapping(&[("APP_INT", "42")]);
        let low = mapping(&[("APP_INT", "7"), ("APP_FLOAT", "1.5")]);
        let merged = merge(high, low);
        assert_eq!(merged.get("APP_INT").map(String::as_str), Some("42"));
        assert_eq!(merged.get("APP_FLOAT").map(String::as_str), Some("1.5"));
    }

    #[test]
    fn test_find_similar_within_cutoff() {
        let environment = mapping(&[("APP_HINT", "5"), ("UNRELATED", "x")]);
        assert_eq!(
            find_similar("APP_INT", &environment, 2),
            Some("APP_HINT".to_owned())
        );
    }

    #[test]
    fn test_find_similar_rejects_beyond_cutoff() {
        let environment = mapping(&[("COMPLETELY_DIFFERENT", "x")]);
        assert_eq!(find_similar("APP_INT", &environment, 3), None);
    }

    #[test]
    fn test_find_similar_accepts_distance_equal_to_cutoff() {
        // Distance is exactly 2; a search capped at the cutoff itself would
        // not be able to tell 2 from "2 or more".
        let environment = mapping(&[("APP_INTXY", "5")]);
        assert_eq!(
            find_similar("APP_INT", &environment, 2),
            Some("APP_INTXY".to_owned())
        );
    }

    #[test]
    fn test_find_similar_empty_environment() {
        assert_eq!(find_similar("APP_INT", &BTreeMap::new(), 3), None);
    }

    #[test]
    fn test_find_similar_tie_breaks_lexicographically() {
        // Both candidates are at distance 1.
        let environment = mapping(&[("APP_INTB", "1"), ("APP_INTA", "2")]);
        assert_eq!(
            find_similar("APP_INT", &environment, 2),
            Some("APP_INTA".to_owned())
        );
    }

    #[test]
    #[serial]
    fn test_scoped_variable_restores_unset() {
        delete("ENVSIEVE_TEST_SCOPED");
        {
            let _guard = ScopedVariable::new("ENVSIEVE_TEST_SCOPED", "inner");
            assert_eq!(get("ENVSIEVE_TEST_SCOPED"), Some("inner".to_owned()));
        }
        assert_eq!(get("ENVSIEVE_TEST_SCOPED"), None);
    }

    #[test]
    #[serial]
    fn test_scoped_variable_restores_previous_value() {
        set("ENVSIEVE_TEST_SCOPED2", "outer");
        {
            let _guard = ScopedVariable::new("ENVSIEVE_TEST_SCOPED2", "inner");
            assert_eq!(get("ENVSIEVE_TEST_SCOPED2"), Some("inner".to_owned()));
        }
        assert_eq!(get("ENVSIEVE_TEST_SCOPED2"), Some("outer".to_owned()));
        delete("ENVSIEVE_TEST_SCOPED2");
    }

    #[test]
    #[serial]
    fn test_get_all_contains_set_variable() {
        let _guard = ScopedVariable::new("ENVSIEVE_TEST_SNAPSHOT", "present");
        let snapshot = get_all();
        assert_eq!(
            snapshot.get("ENVSIEVE_TEST_SNAPSHOT").map(String::as_str),
            Some("present")
        );
    }
}
