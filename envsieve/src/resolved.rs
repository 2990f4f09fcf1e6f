//! Resolution of a registry against an environment mapping.
//!
//! [`Resolved`] is produced by [`Prefix::resolve`] and owns everything the
//! pass collected: the consumed declarations, their parsed values, and the
//! error and warning lists. Resolution always runs to completion; bad input
//! data lands in the diagnostics rather than aborting the pass.
//!
//! The pass runs in four phases:
//!
//! 1. **Direct match**: each declaration's prefixed name is looked up in the
//!    mapping, consuming the entry; hits are parsed and validated.
//! 2. **Typo detection**: declarations left unmatched search the remaining
//!    entries for a near-miss by bounded edit distance.
//! 3. **Unused variables**: remaining entries under the prefix are flagged.
//! 4. **Packaging**: diagnostics and values are bundled into [`Resolved`].
//!
//! [`Prefix::resolve`]: crate::Prefix::resolve

use std::collections::BTreeMap;

use crate::environment;
use crate::error::Diagnostic;
use crate::levenshtein::Cutoff;
use crate::prefix::{render_help, Declaration, DeclarationKind, Handle, Prefix, VariableId};
use crate::testing;

/// The outcome of resolving a [`Prefix`] against an environment mapping.
///
/// Values are read out with the handles returned at registration time.
/// Whether the resolution is clean is reported by [`Resolved::ok`]: any
/// error or warning, including a benign unused-variable warning, makes it
/// `false`, though values that did resolve remain readable.
///
/// `Resolved` is a one-shot result: it can be moved but not cloned, and the
/// compiler rejects use after a move.
///
/// [`Prefix`]: crate::Prefix
pub struct Resolved {
    prefix_name: String,
    vars: Vec<Declaration>,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl Resolved {
    pub(crate) fn from_prefix(prefix: Prefix, supplied: BTreeMap<String, String>) -> Self {
        let (prefix_name, cutoff, mut vars) = prefix.into_parts();
        let mut environment = environment::merge(testing::snapshot(), supplied);
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let unmatched = direct_match_phase(&prefix_name, &mut vars, &mut environment, &mut errors);
        log::debug!(
            "direct match left {} of {} declarations unmatched",
            unmatched.len(),
            vars.len()
        );

        typo_detection_phase(
            &prefix_name,
            cutoff,
            &vars,
            &unmatched,
            &mut environment,
            &mut errors,
            &mut warnings,
        );

        unused_variable_phase(&prefix_name, &environment, &mut warnings);
        log::debug!(
            "resolution finished with {} error(s), {} warning(s)",
            errors.len(),
            warnings.len()
        );

        Self {
            prefix_name,
            vars,
            errors,
            warnings,
        }
    }

    /// Returns `true` iff the resolution produced no errors and no
    /// warnings.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// The collected errors, in phase order.
    #[must_use]
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// The collected warnings, in phase order.
    #[must_use]
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Renders all errors, one line per item.
    #[must_use]
    pub fn error_message(&self) -> String {
        render_report("Error", &self.errors, "No errors.\n")
    }

    /// Renders all warnings, one line per item.
    #[must_use]
    pub fn warning_message(&self) -> String {
        render_report("Warning", &self.warnings, "No warnings.\n")
    }

    /// Retrieves the value for a handle.
    ///
    /// For an optional handle this returns `Option<T>`, empty when the
    /// variable was unset or failed to parse. For a required handle it
    /// returns `T` directly.
    ///
    /// # Panics
    ///
    /// Panics for a required handle whose declaration holds no value, which
    /// only happens when the resolution was not checked: consult
    /// [`Resolved::ok`] and [`Resolved::errors`] first.
    #[must_use]
    pub fn get<H: Handle>(&self, id: H) -> H::Output {
        let declaration = &self.vars[id.index()];
        let value = declaration
            .value
            .as_ref()
            .and_then(|boxed| boxed.downcast_ref::<H::Value>())
            .cloned();
        H::output_from_slot(&declaration.name, value)
    }

    /// Retrieves the value for an optional handle, falling back to
    /// `default` when the variable is unset or failed to parse.
    ///
    /// Required handles have no default; this operation only exists for
    /// [`VariableId`].
    #[must_use]
    pub fn get_or<T: Clone + 'static>(&self, id: VariableId<T>, default: impl Into<T>) -> T {
        self.get(id).unwrap_or_else(|| default.into())
    }

    /// Lists the registered variables and their requiredness.
    #[must_use]
    pub fn help_message(&self) -> String {
        render_help(&self.prefix_name, &self.vars)
    }
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolved")
            .field("prefix_name", &self.prefix_name)
            .field("vars", &self.vars.len())
            .field("errors", &self.errors)
            .field("warnings", &self.warnings)
            .finish()
    }
}

/// Phase 1: direct lookups in declaration order, consuming matched entries.
///
/// Returns the indices of declarations that found no entry and should go
/// through typo detection.
fn direct_match_phase(
    prefix_name: &str,
    vars: &mut [Declaration],
    environment: &mut BTreeMap<String, String>,
    errors: &mut Vec<Diagnostic>,
) -> Vec<usize> {
    let mut unmatched = Vec::new();

    for (index, var) in vars.iter_mut().enumerate() {
        let full_name = format!("{prefix_name}{}", var.name);
        let raw = environment.remove(&full_name);

        if var.value.is_some() {
            // Seeded via set_for_testing; the entry still counts as used.
            continue;
        }

        let parsed = match (&var.kind, raw) {
            (DeclarationKind::Deprecated(message), Some(_)) => {
                errors.push(Diagnostic::new(Some(index), full_name, message.clone()));
                None
            }
            (DeclarationKind::Deprecated(_), None) => None,
            (DeclarationKind::Parse(_), None) => {
                unmatched.push(index);
                None
            }
            (DeclarationKind::Parse(parser), Some(raw)) => match parser(&raw) {
                Ok(value) => Some(value),
                Err(failure) => {
                    let message = failure.render(&full_name);
                    errors.push(Diagnostic::new(Some(index), full_name, message));
                    None
                }
            },
        };
        if parsed.is_some() {
            var.value = parsed;
        }
    }

    unmatched
}

/// Phase 2: bounded edit-distance search for declarations with no direct
/// match. A near-miss is an error for required variables and a warning
/// otherwise; a required variable with no near-miss gets a plain "not set"
/// error.
fn typo_detection_phase(
    prefix_name: &str,
    cutoff: Cutoff,
    vars: &[Declaration],
    unmatched: &[usize],
    environment: &mut BTreeMap<String, String>,
    errors: &mut Vec<Diagnostic>,
    warnings: &mut Vec<Diagnostic>,
) {
    for &index in unmatched {
        let var = &vars[index];
        let full_name = format!("{prefix_name}{}", var.name);
        let distance_cutoff = cutoff.for_name_len(full_name.chars().count());

        if let Some(similar) = environment::find_similar(&full_name, environment, distance_cutoff) {
            environment.remove(&similar);
            let message = format!(
                "Unrecognized environment variable '{similar}' set, did you mean '{full_name}'?"
            );
            let diagnostic = Diagnostic::new(Some(index), full_name, message);
            if var.required {
                errors.push(diagnostic);
            } else {
                warnings.push(diagnostic);
            }
        } else if var.required {
            let message = format!("Environment variable '{full_name}' not set");
            errors.push(Diagnostic::new(Some(index), full_name, message));
        }
    }
}

/// Phase 3: every remaining entry under the prefix is reported as unused.
///
/// The check is anchored at position 0 and the delimiter belongs to the
/// prefix, so prefix `FOO` flags `FOO_BAR` but not `FOOBAR`.
fn unused_variable_phase(
    prefix_name: &str,
    environment: &BTreeMap<String, String>,
    warnings: &mut Vec<Diagnostic>,
) {
    for name in environment.keys() {
        if name.starts_with(prefix_name) {
            let message = format!("Prefix environment variable '{name}' specified but unused");
            warnings.push(Diagnostic::new(None, name.clone(), message));
        }
    }
}

fn render_report(kind: &str, diagnostics: &[Diagnostic], empty_message: &str) -> String {
    if diagnostics.is_empty() {
        return empty_message.to_owned();
    }
    let mut report = String::new();
    for diagnostic in diagnostics {
        report.push_str(&format!("{kind:<7}: {}\n", diagnostic.message()));
    }
    report
}
