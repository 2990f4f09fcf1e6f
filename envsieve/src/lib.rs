#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # envsieve
//!
//! Declare the environment variables a program expects — typed, required or
//! optional, range- or option-constrained — under a common name prefix, then
//! resolve all of them against an environment snapshot in one pass. The
//! result is either fully-typed values or a structured collection of errors
//! and warnings, including "did you mean" suggestions for likely typos,
//! instead of ad-hoc lookups scattered through startup code.
//!
//! ## Core Types
//!
//! - [`Prefix`]: the registry of variable declarations
//! - [`VariableId`] and [`RequiredVariableId`]: typed handles for reading
//!   resolved values
//! - [`Resolved`]: the resolution result with values, errors, and warnings
//! - [`ScopedTestEnvironment`]: overlay for injecting variables in tests
//! - [`Error`] and [`Diagnostic`]: fatal errors and collected diagnostics
//!
//! ## Examples
//!
//! ```
//! use envsieve::Prefix;
//! use std::collections::BTreeMap;
//!
//! let mut prefix = Prefix::new("MYPROG").unwrap();
//! let log_file = prefix.register::<std::path::PathBuf>("LOG_FILE");
//! let threads = prefix.register_required::<u32>("NUM_THREADS");
//!
//! let env = BTreeMap::from([
//!     ("MYPROG_LOG_FILE".to_owned(), "/var/log/myprog.log".to_owned()),
//!     ("MYPROG_NUM_THREADS".to_owned(), "4".to_owned()),
//! ]);
//!
//! let resolved = prefix.resolve_with(env);
//! assert!(resolved.ok());
//! assert_eq!(resolved.get(threads), 4);
//! assert_eq!(
//!     resolved.get_or(log_file, "/default/log"),
//!     std::path::PathBuf::from("/var/log/myprog.log")
//! );
//! ```
//!
//! A misspelled variable is diagnosed rather than silently ignored:
//!
//! ```
//! use envsieve::Prefix;
//! use std::collections::BTreeMap;
//!
//! let mut prefix = Prefix::new("MYPROG").unwrap();
//! let _threads = prefix.register_required::<u32>("NUM_THREADS");
//!
//! let env = BTreeMap::from([("MYPROG_NUM_THREDS".to_owned(), "4".to_owned())]);
//! let resolved = prefix.resolve_with(env);
//!
//! assert!(!resolved.ok());
//! assert!(resolved.error_message().contains("did you mean 'MYPROG_NUM_THREADS'"));
//! ```

pub mod environment;
pub mod error;
mod get;
pub mod levenshtein;
pub mod parse;
pub mod prefix;
pub mod resolved;
pub mod testing;

// Re-export key types at crate root for convenience
pub use error::{Diagnostic, Error, Result};
pub use get::{get, get_or, get_with_cutoff};
pub use levenshtein::Cutoff;
pub use parse::{FromEnvStr, ParseFailure};
pub use prefix::{Handle, Prefix, RequiredVariableId, VariableId};
pub use resolved::Resolved;
pub use testing::ScopedTestEnvironment;
