//! Prefixless single-variable access.
//!
//! For programs that want typed parsing and typo diagnosis for one-off
//! variables without declaring a prefix registry. The testing overlay takes
//! the same precedence over the process environment as it does during
//! prefix resolution.

use crate::environment;
use crate::error::Diagnostic;
use crate::levenshtein::Cutoff;
use crate::parse::FromEnvStr;
use crate::testing;

/// Reads and parses a single environment variable.
///
/// Equivalent to [`get_with_cutoff`] with the adaptive cutoff.
///
/// # Errors
///
/// Returns a [`Diagnostic`] (with no registration index) when the variable
/// is unset, a near-miss name is set instead, or parsing fails.
///
/// # Examples
///
/// ```
/// use envsieve::ScopedTestEnvironment;
///
/// let _env = ScopedTestEnvironment::new([("DOCTEST_GET_THREADS", "8")]).unwrap();
/// let threads: u32 = envsieve::get("DOCTEST_GET_THREADS").unwrap();
/// assert_eq!(threads, 8);
/// ```
pub fn get<T: FromEnvStr>(name: &str) -> Result<T, Diagnostic> {
    get_with_cutoff(name, Cutoff::Adaptive)
}

/// Reads and parses a single environment variable with an explicit
/// typo-detection cutoff.
///
/// # Errors
///
/// Returns a [`Diagnostic`] when the variable is unset, a near-miss name is
/// set instead, or parsing fails.
pub fn get_with_cutoff<T: FromEnvStr>(name: &str, cutoff: Cutoff) -> Result<T, Diagnostic> {
    let mut env = environment::merge(testing::snapshot(), environment::get_all());

    if let Some(raw) = env.remove(name) {
        return T::from_env_str(&raw)
            .map_err(|failure| Diagnostic::new(None, name, failure.render(name)));
    }

    let distance_cutoff = cutoff.for_name_len(name.chars().count());
    if let Some(similar) = environment::find_similar(name, &env, distance_cutoff) {
        let message =
            format!("Unrecognized environment variable '{similar}' set, did you mean '{name}'?");
        return Err(Diagnostic::new(None, name, message));
    }

    Err(Diagnostic::new(
        None,
        name,
        format!("Environment variable '{name}' not set"),
    ))
}

/// Reads and parses a single environment variable, falling back to
/// `default` when it is unset or fails to parse.
///
/// # Examples
///
/// ```
/// let workers: u32 = envsieve::get_or("DOCTEST_GET_OR_UNSET", 4u32);
/// assert_eq!(workers, 4);
/// ```
pub fn get_or<T: FromEnvStr>(name: &str, default: impl Into<T>) -> T {
    let env = environment::merge(testing::snapshot(), environment::get_all());
    env.get(name)
        .and_then(|raw| T::from_env_str(raw).ok())
        .unwrap_or_else(|| default.into())
}
