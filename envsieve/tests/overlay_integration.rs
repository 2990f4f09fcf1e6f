//! Testing-overlay precedence and lifecycle, exercised through full
//! resolutions.
//!
//! Every test here touches the process-global overlay and is marked
//! `#[serial]` so scopes from concurrently running tests cannot collide.

mod common;

use common::env;
use envsieve::{environment, Error, Prefix, ScopedTestEnvironment};
use serial_test::serial;
use std::collections::BTreeMap;

#[test]
#[serial]
fn test_overlay_wins_over_explicit_environment() {
    let _env = ScopedTestEnvironment::new([("PREFIX_INT", "42")]).unwrap();

    let mut prefix = Prefix::new("PREFIX").unwrap();
    let int = prefix.register_required::<i32>("INT");

    let resolved = prefix.resolve_with(env(&[("PREFIX_INT", "7")]));

    assert!(resolved.ok());
    assert_eq!(resolved.get(int), 42);
}

#[test]
#[serial]
fn test_overlay_wins_over_os_environment() {
    let _os = environment::ScopedVariable::new("PREFIX_INT", "7");
    let _env = ScopedTestEnvironment::new([("PREFIX_INT", "42")]).unwrap();

    let mut prefix = Prefix::new("PREFIX").unwrap();
    let int = prefix.register_required::<i32>("INT");

    let resolved = prefix.resolve();

    assert_eq!(resolved.get(int), 42);
}

#[test]
#[serial]
fn test_overlay_entry_counts_as_used() {
    let _env = ScopedTestEnvironment::new([("PREFIX_INT", "42")]).unwrap();

    let mut prefix = Prefix::new("PREFIX").unwrap();
    let _int = prefix.register::<i32>("INT");

    let resolved = prefix.resolve_with(BTreeMap::new());

    // The overlay entry matched a declaration; nothing is left to warn
    // about.
    assert!(resolved.ok());
}

#[test]
#[serial]
fn test_unmatched_overlay_entry_is_reported_unused() {
    let _env = ScopedTestEnvironment::new([("PREFIX_STRAY", "x")]).unwrap();

    let prefix = Prefix::new("PREFIX").unwrap();
    let resolved = prefix.resolve_with(BTreeMap::new());

    assert!(!resolved.ok());
    assert_eq!(resolved.warnings().len(), 1);
    assert_eq!(resolved.warnings()[0].name(), "PREFIX_STRAY");
}

#[test]
#[serial]
fn test_duplicate_overlay_scopes_are_rejected() {
    let _outer = ScopedTestEnvironment::new([("PREFIX_INT", "42")]).unwrap();
    let result = ScopedTestEnvironment::new([("PREFIX_INT", "7")]);

    match result {
        Err(Error::TestEnvironment { name, .. }) => assert_eq!(name, "PREFIX_INT"),
        other => panic!("expected TestEnvironment error, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_scope_exit_restores_resolution_behavior() {
    let mut prefix = Prefix::new("PREFIX").unwrap();
    let int = prefix.register::<i32>("INT");
    {
        let _env = ScopedTestEnvironment::new([("PREFIX_INT", "42")]).unwrap();
        // Scope dropped before resolution.
    }
    let resolved = prefix.resolve_with(BTreeMap::new());
    assert_eq!(resolved.get(int), None);
}

#[test]
#[serial]
fn test_disjoint_scopes_combine() {
    let _a = ScopedTestEnvironment::new([("PREFIX_INT", "1")]).unwrap();
    let _b = ScopedTestEnvironment::new([("PREFIX_FLOAT", "2.5")]).unwrap();

    let mut prefix = Prefix::new("PREFIX").unwrap();
    let int = prefix.register_required::<i32>("INT");
    let float = prefix.register_required::<f64>("FLOAT");

    let resolved = prefix.resolve_with(BTreeMap::new());

    assert!(resolved.ok());
    assert_eq!(resolved.get(int), 1);
    assert_eq!(resolved.get(float), 2.5);
}
