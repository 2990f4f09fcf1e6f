//! Process-wide testing overlay.
//!
//! A [`ScopedTestEnvironment`] injects name-to-value pairs that take
//! precedence over every other environment source during resolution, letting
//! tests exercise environment-driven code without mutating the real process
//! environment. The overlay is a single process-global map; scopes push
//! entries on construction and remove exactly their own entries on drop,
//! regardless of nesting order.
//!
//! The map is guarded by a mutex so concurrent test runners do not corrupt
//! it, but the scoping discipline still assumes logically serialized tests:
//! two concurrent scopes defining the same variable are a collision, not a
//! race to tolerate. Combine with `serial_test` when that matters.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use crate::error::{Error, Result};

static TESTING_ENVIRONMENT: Mutex<BTreeMap<String, String>> = Mutex::new(BTreeMap::new());

fn lock() -> std::sync::MutexGuard<'static, BTreeMap<String, String>> {
    TESTING_ENVIRONMENT
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Snapshot of the current overlay contents, taken at resolution time.
pub(crate) fn snapshot() -> BTreeMap<String, String> {
    lock().clone()
}

/// A scope of testing-overlay entries, removed again on drop.
///
/// # Examples
///
/// ```
/// use envsieve::{Prefix, ScopedTestEnvironment};
/// use std::collections::BTreeMap;
///
/// let _env = ScopedTestEnvironment::new([("APP_PORT", "8080")]).unwrap();
///
/// let mut prefix = Prefix::new("APP").unwrap();
/// let port = prefix.register_required::<u16>("PORT");
/// let resolved = prefix.resolve_with(BTreeMap::new());
/// assert_eq!(resolved.get(port), 8080);
/// ```
#[derive(Debug)]
#[must_use = "the overlay entries are removed when the scope is dropped"]
pub struct ScopedTestEnvironment {
    names: Vec<String>,
}

impl ScopedTestEnvironment {
    /// Adds `entries` to the global overlay.
    ///
    /// All entries are checked before any is inserted, so a rejected scope
    /// leaves the overlay untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TestEnvironment`] naming the colliding key if any
    /// entry is already defined by a still-active scope, or twice within
    /// `entries` itself.
    pub fn new<I, K, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries: Vec<(String, String)> = entries
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();

        let mut global = lock();
        for (position, (name, value)) in entries.iter().enumerate() {
            let existing = global.get(name).or_else(|| {
                entries[..position]
                    .iter()
                    .find(|(earlier, _)| earlier == name)
                    .map(|(_, earlier_value)| earlier_value)
            });
            if let Some(existing) = existing {
                return Err(Error::TestEnvironment {
                    name: name.clone(),
                    existing: existing.clone(),
                    attempted: value.clone(),
                });
            }
        }

        let names = entries.iter().map(|(name, _)| name.clone()).collect();
        for (name, value) in entries {
            global.insert(name, value);
        }
        Ok(Self { names })
    }
}

impl Drop for ScopedTestEnvironment {
    fn drop(&mut self) {
        let mut global = lock();
        for name in &self.names {
            global.remove(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_scope_adds_and_removes_entries() {
        {
            let _env = ScopedTestEnvironment::new([("ENVSIEVE_OVERLAY_A", "1")]).unwrap();
            assert_eq!(
                snapshot().get("ENVSIEVE_OVERLAY_A").map(String::as_str),
                Some("1")
            );
        }
        assert!(!snapshot().contains_key("ENVSIEVE_OVERLAY_A"));
    }

    #[test]
    #[serial]
    fn test_collision_between_scopes_is_rejected() {
        let _outer = ScopedTestEnvironment::new([("ENVSIEVE_OVERLAY_B", "42")]).unwrap();
        let result = ScopedTestEnvironment::new([("ENVSIEVE_OVERLAY_B", "7")]);
        match result {
            Err(Error::TestEnvironment {
                name,
                existing,
                attempted,
            }) => {
                assert_eq!(name, "ENVSIEVE_OVERLAY_B");
                assert_eq!(existing, "42");
                assert_eq!(attempted, "7");
            }
            other => panic!("expected TestEnvironment error, got {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn test_rejected_scope_leaves_overlay_untouched() {
        let _outer = ScopedTestEnvironment::new([("ENVSIEVE_OVERLAY_C", "keep")]).unwrap();
        let result = ScopedTestEnvironment::new([
            ("ENVSIEVE_OVERLAY_D", "new"),
            ("ENVSIEVE_OVERLAY_C", "clobber"),
        ]);
        assert!(result.is_err());
        let current = snapshot();
        assert!(!current.contains_key("ENVSIEVE_OVERLAY_D"));
        assert_eq!(
            current.get("ENVSIEVE_OVERLAY_C").map(String::as_str),
            Some("keep")
        );
    }

    #[test]
    #[serial]
    fn test_duplicate_within_one_scope_is_rejected() {
        let result =
            ScopedTestEnvironment::new([("ENVSIEVE_OVERLAY_E", "1"), ("ENVSIEVE_OVERLAY_E", "2")]);
        assert!(matches!(result, Err(Error::TestEnvironment { .. })));
        assert!(!snapshot().contains_key("ENVSIEVE_OVERLAY_E"));
    }

    #[test]
    #[serial]
    fn test_nested_scopes_pop_their_own_entries() {
        let outer = ScopedTestEnvironment::new([("ENVSIEVE_OVERLAY_F", "outer")]).unwrap();
        let inner = ScopedTestEnvironment::new([("ENVSIEVE_OVERLAY_G", "inner")]).unwrap();

        // Drop out of nesting order: outer first.
        drop(outer);
        let current = snapshot();
        assert!(!current.contains_key("ENVSIEVE_OVERLAY_F"));
        assert_eq!(
            current.get("ENVSIEVE_OVERLAY_G").map(String::as_str),
            Some("inner")
        );

        drop(inner);
        assert!(!snapshot().contains_key("ENVSIEVE_OVERLAY_G"));
    }
}
