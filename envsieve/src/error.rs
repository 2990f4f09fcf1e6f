//! Error types for the envsieve library.
//!
//! Two distinct families live here. [`Error`] covers failures that are fatal
//! to the call that raised them: rejected registrations and testing-overlay
//! collisions. [`Diagnostic`] is the record type for resolution errors and
//! warnings, which are collected rather than returned early so that a
//! resolution pass always runs to completion.

use std::fmt;

use thiserror::Error;

/// Result type alias for operations that may fail with an envsieve error.
///
/// # Examples
///
/// ```
/// use envsieve::{Prefix, Result};
///
/// fn build() -> Result<Prefix> {
///     Prefix::new("MYAPP")
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// A fatal registration or testing-overlay error.
///
/// These indicate a mistake in the calling code and are surfaced at the
/// point of the call, never deferred into a resolution report.
#[derive(Debug, Error)]
pub enum Error {
    /// An empty prefix name was supplied.
    #[error("prefix name must not be empty")]
    InvalidPrefix,

    /// A range registration with `min > max`.
    #[error("invalid range [{min}, {max}] for '{name}', min must be less or equal to max")]
    InvalidRange {
        /// The fully-prefixed variable name.
        name: String,
        /// The rendered lower bound.
        min: String,
        /// The rendered upper bound.
        max: String,
    },

    /// An option registration with no options.
    #[error("no options provided for '{name}'")]
    EmptyOptions {
        /// The fully-prefixed variable name.
        name: String,
    },

    /// An option registration containing the same option twice.
    #[error("duplicate option specified for '{name}'")]
    DuplicateOption {
        /// The fully-prefixed variable name.
        name: String,
    },

    /// A testing-overlay scope tried to define a variable that an active
    /// scope already defines.
    #[error(
        "the global test environment already contains the value '{existing}' for \
         variable '{name}', while trying to set it to '{attempted}'"
    )]
    TestEnvironment {
        /// The colliding variable name.
        name: String,
        /// The value already present in the overlay.
        existing: String,
        /// The value the new scope tried to set.
        attempted: String,
    },
}

/// One collected resolution error or warning.
///
/// Carries the index of the originating declaration (`None` for diagnostics
/// not tied to a registered variable, such as unused-variable warnings), the
/// fully-prefixed variable name, and the rendered message.
///
/// # Examples
///
/// ```
/// use envsieve::Prefix;
/// use std::collections::BTreeMap;
///
/// let mut prefix = Prefix::new("APP").unwrap();
/// let _port = prefix.register_required::<u16>("PORT");
/// let resolved = prefix.resolve_with(BTreeMap::new());
///
/// let diagnostic = &resolved.errors()[0];
/// assert_eq!(diagnostic.index(), Some(0));
/// assert_eq!(diagnostic.name(), "APP_PORT");
/// assert!(diagnostic.message().contains("not set"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    index: Option<usize>,
    name: String,
    message: String,
}

impl Diagnostic {
    pub(crate) fn new(index: Option<usize>, name: impl Into<String>, message: String) -> Self {
        Self {
            index,
            name: name.into(),
            message,
        }
    }

    /// Registration index of the originating declaration, or `None` for
    /// diagnostics not scoped to one.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// The fully-prefixed environment variable name this diagnostic is about.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rendered human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
