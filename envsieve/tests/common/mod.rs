//! Shared helpers for integration tests.

use std::collections::BTreeMap;

/// Builds an explicit environment mapping from string pairs.
#[must_use]
pub fn env(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|&(name, value)| (name.to_owned(), value.to_owned()))
        .collect()
}
