//! Default value parsing and the parse-failure taxonomy.
//!
//! Every registered variable carries a parse-and-validate function from the
//! raw environment string to a typed value. [`FromEnvStr`] supplies that
//! function for common types; custom parsers return [`ParseFailure`] to
//! classify what went wrong so the resolution report can name the failure
//! kind.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;

/// A classified failure produced by a parse-and-validate function.
///
/// The kind determines how the failure is worded in the resolution report.
/// Custom parsers may return any kind; the default parsers only produce
/// [`ParseFailure::Parser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// The raw string could not be parsed into the target type.
    Parser(String),
    /// The value parsed but failed a validation check.
    Validation(String),
    /// The value parsed but fell outside a registered range.
    Range(String),
    /// The value parsed but is not one of the registered options.
    Option(String),
    /// Any other failure from a caller-supplied parser.
    Other(String),
}

impl ParseFailure {
    /// Renders the failure for the resolution report, naming the variable
    /// and the failure kind.
    pub(crate) fn render(&self, var_name: &str) -> String {
        match self {
            Self::Parser(detail) => {
                format!("Parser error for environment variable '{var_name}': {detail}")
            }
            Self::Validation(detail) => {
                format!("Validation error for environment variable '{var_name}': {detail}")
            }
            Self::Range(detail) => {
                format!("Range error for environment variable '{var_name}': {detail}")
            }
            Self::Option(detail) => {
                format!("Option error for environment variable '{var_name}': {detail}")
            }
            Self::Other(detail) => {
                format!("Failed to parse or validate environment variable '{var_name}': {detail}")
            }
        }
    }
}

/// Conversion from a raw environment string into a typed value.
///
/// This is the default parser used by [`Prefix::register`] and friends.
/// Implementations exist for the primitive numeric types, `bool` (lenient,
/// see below), `char`, `String`, `PathBuf`, and the standard IP/socket
/// address types. Implement it for your own types to register them without
/// a custom parser closure.
///
/// # Examples
///
/// ```
/// use envsieve::{FromEnvStr, ParseFailure};
///
/// assert_eq!(u16::from_env_str("8080"), Ok(8080));
/// assert_eq!(bool::from_env_str("Yes"), Ok(true));
/// assert!(matches!(u16::from_env_str("x"), Err(ParseFailure::Parser(_))));
/// ```
///
/// [`Prefix::register`]: crate::Prefix::register
pub trait FromEnvStr: Sized {
    /// Parses `s` into `Self`, classifying any failure.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseFailure`] describing why the string was rejected.
    fn from_env_str(s: &str) -> Result<Self, ParseFailure>;
}

macro_rules! impl_from_env_str_via_from_str {
    ($($ty:ty),* $(,)?) => {$(
        impl FromEnvStr for $ty {
            fn from_env_str(s: &str) -> Result<Self, ParseFailure> {
                s.trim().parse().map_err(|e| {
                    ParseFailure::Parser(format!(
                        "failed to parse '{s}' as {}: {e}",
                        stringify!($ty)
                    ))
                })
            }
        }
    )*};
}

impl_from_env_str_via_from_str!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char, IpAddr,
    Ipv4Addr, Ipv6Addr, SocketAddr,
);

impl FromEnvStr for String {
    fn from_env_str(s: &str) -> Result<Self, ParseFailure> {
        Ok(s.to_owned())
    }
}

impl FromEnvStr for PathBuf {
    fn from_env_str(s: &str) -> Result<Self, ParseFailure> {
        Ok(Self::from(s))
    }
}

/// Lenient boolean parsing.
///
/// Accepts true/1/yes/on and false/0/no/off, case-insensitive.
impl FromEnvStr for bool {
    fn from_env_str(s: &str) -> Result<Self, ParseFailure> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ParseFailure::Parser(format!(
                "failed to parse '{s}' as boolean (expected true/false/1/0/yes/no/on/off)"
            ))),
        }
    }
}
