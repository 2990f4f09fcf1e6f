//! Variable registry: a prefix and the declarations registered under it.
//!
//! A [`Prefix`] collects typed variable declarations, each a name plus a
//! parse-and-validate function, and hands back copyable typed handles.
//! Resolution consumes the prefix by value; afterwards the handles are used
//! against the [`Resolved`] result to read values out.
//!
//! [`Resolved`]: crate::Resolved

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::marker::PhantomData;

use crate::environment;
use crate::error::{Error, Result};
use crate::levenshtein::Cutoff;
use crate::parse::{FromEnvStr, ParseFailure};
use crate::resolved::Resolved;

/// Separator between the prefix and the variable name.
pub(crate) const PREFIX_DELIMITER: char = '_';

pub(crate) type ErasedParser = Box<dyn Fn(&str) -> std::result::Result<Box<dyn Any>, ParseFailure>>;

/// How a declaration turns a raw environment string into a value.
pub(crate) enum DeclarationKind {
    /// Ordinary variable with a type-erased parse-and-validate function.
    Parse(ErasedParser),
    /// Deprecated name: an error with this message when the variable is set.
    Deprecated(String),
}

/// One registered variable.
pub(crate) struct Declaration {
    pub(crate) name: String,
    pub(crate) required: bool,
    pub(crate) kind: DeclarationKind,
    pub(crate) value: Option<Box<dyn Any>>,
}

mod sealed {
    pub trait Sealed {}
    impl<T> Sealed for super::VariableId<T> {}
    impl<T> Sealed for super::RequiredVariableId<T> {}
}

/// Common interface of [`VariableId`] and [`RequiredVariableId`].
///
/// Sealed; the two handle types are the only implementors. The associated
/// `Output` type is what [`Resolved::get`] returns: `Option<T>` for optional
/// handles, `T` for required ones.
///
/// [`Resolved::get`]: crate::Resolved::get
pub trait Handle: sealed::Sealed + Copy {
    /// The value type produced by this handle's parser.
    type Value: Clone + 'static;
    /// What [`Resolved::get`] returns for this handle.
    ///
    /// [`Resolved::get`]: crate::Resolved::get
    type Output;

    /// Registration index of the declaration this handle refers to.
    ///
    /// Matches the index carried by [`Diagnostic`]s originating from the
    /// same declaration.
    ///
    /// [`Diagnostic`]: crate::Diagnostic
    fn index(&self) -> usize;

    #[doc(hidden)]
    fn output_from_slot(name: &str, slot: Option<Self::Value>) -> Self::Output;
}

/// Typed handle to an optional variable declaration.
///
/// Returned by the non-required registration operations; later passed to
/// [`Resolved::get`] or [`Resolved::get_or`] to retrieve the value. Handles
/// are plain copyable indices and carry the declared type statically.
///
/// [`Resolved::get`]: crate::Resolved::get
/// [`Resolved::get_or`]: crate::Resolved::get_or
pub struct VariableId<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

/// Typed handle to a required variable declaration.
///
/// Like [`VariableId`], but [`Resolved::get`] returns the value directly
/// rather than an `Option`, and there is no `get_or`: a required variable
/// has no default.
///
/// [`Resolved::get`]: crate::Resolved::get
pub struct RequiredVariableId<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

macro_rules! impl_handle_common {
    ($id:ident) => {
        impl<T> $id<T> {
            pub(crate) fn at(index: usize) -> Self {
                Self {
                    index,
                    _marker: PhantomData,
                }
            }
        }

        impl<T> Clone for $id<T> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> Copy for $id<T> {}

        impl<T> fmt::Debug for $id<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($id), "({})"), self.index)
            }
        }
    };
}

impl_handle_common!(VariableId);
impl_handle_common!(RequiredVariableId);

impl<T: Clone + 'static> Handle for VariableId<T> {
    type Value = T;
    type Output = Option<T>;

    fn index(&self) -> usize {
        self.index
    }

    fn output_from_slot(_name: &str, slot: Option<T>) -> Option<T> {
        slot
    }
}

impl<T: Clone + 'static> Handle for RequiredVariableId<T> {
    type Value = T;
    type Output = T;

    fn index(&self) -> usize {
        self.index
    }

    fn output_from_slot(name: &str, slot: Option<T>) -> T {
        slot.unwrap_or_else(|| {
            panic!("variable '{name}' does not hold a value; check ok() and errors() before get()")
        })
    }
}

/// An ordered collection of variable declarations under a common name
/// prefix.
///
/// Registered names are joined with the prefix as `PREFIX_NAME` when matched
/// against the environment. The prefix is consumed by [`Prefix::resolve`] or
/// [`Prefix::resolve_with`]; registering against a consumed prefix is a
/// compile error since those take `self` by value.
///
/// # Examples
///
/// ```
/// use envsieve::Prefix;
/// use std::collections::BTreeMap;
///
/// let mut prefix = Prefix::new("MYPROG").unwrap();
/// let threads = prefix.register::<u32>("NUM_THREADS");
///
/// let env = BTreeMap::from([("MYPROG_NUM_THREADS".to_owned(), "4".to_owned())]);
/// let resolved = prefix.resolve_with(env);
/// assert!(resolved.ok());
/// assert_eq!(resolved.get(threads), Some(4));
/// ```
pub struct Prefix {
    /// Prefix string including the trailing delimiter.
    name: String,
    cutoff: Cutoff,
    vars: Vec<Declaration>,
}

impl Prefix {
    /// Creates a registry for variables named `PREFIX_*`, with the adaptive
    /// typo-detection cutoff.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPrefix`] if `name` is empty.
    pub fn new(name: &str) -> Result<Self> {
        Self::with_cutoff(name, Cutoff::Adaptive)
    }

    /// Creates a registry with an explicit typo-detection cutoff.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPrefix`] if `name` is empty.
    pub fn with_cutoff(name: &str, cutoff: Cutoff) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidPrefix);
        }
        Ok(Self {
            name: format!("{name}{PREFIX_DELIMITER}"),
            cutoff,
            vars: Vec::new(),
        })
    }

    /// Registers an optional variable parsed with the default parser for
    /// `T`.
    pub fn register<T: FromEnvStr + 'static>(&mut self, name: &str) -> VariableId<T> {
        VariableId::at(self.push(name, false, T::from_env_str))
    }

    /// Registers a required variable parsed with the default parser for
    /// `T`.
    pub fn register_required<T: FromEnvStr + 'static>(
        &mut self,
        name: &str,
    ) -> RequiredVariableId<T> {
        RequiredVariableId::at(self.push(name, true, T::from_env_str))
    }

    /// Registers an optional variable with a caller-supplied
    /// parse-and-validate function.
    ///
    /// # Examples
    ///
    /// ```
    /// use envsieve::{ParseFailure, Prefix};
    ///
    /// let mut prefix = Prefix::new("APP").unwrap();
    /// let level = prefix.register_with("LEVEL", |raw| match raw {
    ///     "debug" | "info" | "warn" => Ok(raw.to_owned()),
    ///     _ => Err(ParseFailure::Validation(format!("unknown level '{raw}'"))),
    /// });
    /// # let _ = level;
    /// ```
    pub fn register_with<T, F>(&mut self, name: &str, parser: F) -> VariableId<T>
    where
        T: 'static,
        F: Fn(&str) -> std::result::Result<T, ParseFailure> + 'static,
    {
        VariableId::at(self.push(name, false, parser))
    }

    /// Registers a required variable with a caller-supplied
    /// parse-and-validate function.
    pub fn register_required_with<T, F>(&mut self, name: &str, parser: F) -> RequiredVariableId<T>
    where
        T: 'static,
        F: Fn(&str) -> std::result::Result<T, ParseFailure> + 'static,
    {
        RequiredVariableId::at(self.push(name, true, parser))
    }

    /// Registers an optional variable constrained to `min..=max` inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if `min > max`.
    pub fn register_range<T>(&mut self, name: &str, min: T, max: T) -> Result<VariableId<T>>
    where
        T: FromEnvStr + PartialOrd + Display + 'static,
    {
        let parser = range_parser(self.full_name(name), min, max)?;
        Ok(VariableId::at(self.push(name, false, parser)))
    }

    /// Registers a required variable constrained to `min..=max` inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if `min > max`.
    pub fn register_required_range<T>(
        &mut self,
        name: &str,
        min: T,
        max: T,
    ) -> Result<RequiredVariableId<T>>
    where
        T: FromEnvStr + PartialOrd + Display + 'static,
    {
        let parser = range_parser(self.full_name(name), min, max)?;
        Ok(RequiredVariableId::at(self.push(name, true, parser)))
    }

    /// Registers an optional variable restricted to a fixed set of allowed
    /// values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyOptions`] if `options` is empty and
    /// [`Error::DuplicateOption`] if it contains the same value twice.
    pub fn register_option<T>(
        &mut self,
        name: &str,
        options: impl IntoIterator<Item = T> + 'static,
    ) -> Result<VariableId<T>>
    where
        T: FromEnvStr + PartialEq + 'static,
    {
        let parser = option_parser(self.full_name(name), options)?;
        Ok(VariableId::at(self.push(name, false, parser)))
    }

    /// Registers a required variable restricted to a fixed set of allowed
    /// values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyOptions`] if `options` is empty and
    /// [`Error::DuplicateOption`] if it contains the same value twice.
    pub fn register_required_option<T>(
        &mut self,
        name: &str,
        options: impl IntoIterator<Item = T> + 'static,
    ) -> Result<RequiredVariableId<T>>
    where
        T: FromEnvStr + PartialEq + 'static,
    {
        let parser = option_parser(self.full_name(name), options)?;
        Ok(RequiredVariableId::at(self.push(name, true, parser)))
    }

    /// Registers a deprecated variable name.
    ///
    /// Resolution reports `message` as an error only when the variable is
    /// actually set; an unset deprecated variable is silent and never
    /// participates in typo detection.
    pub fn register_deprecated(&mut self, name: &str, message: &str) {
        self.vars.push(Declaration {
            name: name.to_owned(),
            required: false,
            kind: DeclarationKind::Deprecated(message.to_owned()),
            value: None,
        });
    }

    /// Seeds a declaration's resolved value directly, bypassing parsing.
    ///
    /// Resolution treats such variables as already satisfied: a matching
    /// environment entry is still consumed (so unused-variable detection
    /// stays accurate) but its value is not parsed.
    pub fn set_for_testing<H: Handle>(&mut self, id: H, value: H::Value) {
        self.vars[id.index()].value = Some(Box::new(value));
    }

    /// Lists the registered variables and their requiredness.
    #[must_use]
    pub fn help_message(&self) -> String {
        render_help(&self.name, &self.vars)
    }

    /// Resolves the registered variables against the current process
    /// environment (plus the testing overlay), consuming the registry.
    #[must_use]
    pub fn resolve(self) -> Resolved {
        let environment = environment::get_all();
        self.resolve_with(environment)
    }

    /// Resolves the registered variables against an explicit mapping (plus
    /// the testing overlay), consuming the registry.
    #[must_use]
    pub fn resolve_with(self, environment: BTreeMap<String, String>) -> Resolved {
        Resolved::from_prefix(self, environment)
    }

    /// The full environment variable name for an unprefixed `name`.
    pub(crate) fn full_name(&self, name: &str) -> String {
        format!("{}{name}", self.name)
    }

    pub(crate) fn into_parts(self) -> (String, Cutoff, Vec<Declaration>) {
        (self.name, self.cutoff, self.vars)
    }

    fn push<T: 'static>(
        &mut self,
        name: &str,
        required: bool,
        parser: impl Fn(&str) -> std::result::Result<T, ParseFailure> + 'static,
    ) -> usize {
        let erased: ErasedParser =
            Box::new(move |raw| parser(raw).map(|value| Box::new(value) as Box<dyn Any>));
        self.vars.push(Declaration {
            name: name.to_owned(),
            required,
            kind: DeclarationKind::Parse(erased),
            value: None,
        });
        self.vars.len() - 1
    }
}

/// Builds the parse-and-validate function for a range registration.
fn range_parser<T>(
    full_name: String,
    min: T,
    max: T,
) -> Result<impl Fn(&str) -> std::result::Result<T, ParseFailure>>
where
    T: FromEnvStr + PartialOrd + Display,
{
    if min > max {
        return Err(Error::InvalidRange {
            name: full_name,
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(move |raw: &str| {
        let value = T::from_env_str(raw)?;
        if value < min || value > max {
            return Err(ParseFailure::Range(format!(
                "value {value} outside of range [{min}, {max}]"
            )));
        }
        Ok(value)
    })
}

/// Builds the parse-and-validate function for an option registration.
fn option_parser<T>(
    full_name: String,
    options: impl IntoIterator<Item = T>,
) -> Result<impl Fn(&str) -> std::result::Result<T, ParseFailure>>
where
    T: FromEnvStr + PartialEq,
{
    let options: Vec<T> = options.into_iter().collect();
    if options.is_empty() {
        return Err(Error::EmptyOptions { name: full_name });
    }
    if options
        .iter()
        .enumerate()
        .any(|(position, option)| options[..position].contains(option))
    {
        return Err(Error::DuplicateOption { name: full_name });
    }
    Ok(move |raw: &str| {
        let value = T::from_env_str(raw)?;
        if !options.contains(&value) {
            return Err(ParseFailure::Option(format!("unrecognized option '{raw}'")));
        }
        Ok(value)
    })
}

impl fmt::Debug for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prefix")
            .field("name", &self.name)
            .field("cutoff", &self.cutoff)
            .field("vars", &self.vars.len())
            .finish()
    }
}

/// Shared help rendering for [`Prefix`] and [`Resolved`].
///
/// [`Resolved`]: crate::Resolved
pub(crate) fn render_help(prefix_name: &str, vars: &[Declaration]) -> String {
    if vars.is_empty() {
        return format!("There are no supported environment variables for the prefix '{prefix_name}'\n");
    }
    let mut message = format!(
        "Prefix '{prefix_name}' supports the following {} environment variable(s):\n",
        vars.len()
    );
    for var in vars {
        let status = match var.kind {
            DeclarationKind::Deprecated(_) => "deprecated",
            DeclarationKind::Parse(_) if var.required => "required",
            DeclarationKind::Parse(_) => "optional",
        };
        message.push_str(&format!("\t'{prefix_name}{}' {status}\n", var.name));
    }
    message
}
