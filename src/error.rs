//! Error types for delimited encoding and decoding.
//!
//! Every failure is fatal for the call that raised it: there is no partial
//! result and no retry. A decode that fails midway leaves nothing usable
//! behind.
//!
//! ## Error Categories
//!
//! - **Channel**: reading from or writing to the byte channel failed
//! - **Instantiation**: a destination composite could not be constructed
//! - **Unknown names**: a field or enum constant has no match in the destination
//! - **Format**: scalar text does not parse as its declared subkind
//! - **Malformed encoding**: a token does not have the separator arity its route requires
//! - **Unsupported type**: the value uses a shape the alphabet cannot frame
//!
//! ## Examples
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_delim::{from_str, Error};
//!
//! #[derive(Deserialize, Debug)]
//! struct Point { x: i32 }
//!
//! let result: Result<Point, Error> = from_str("x=twelve");
//! assert!(matches!(result, Err(Error::Format { .. })));
//! ```

use std::fmt;
use thiserror::Error;

use crate::kind::ScalarKind;

/// Represents all possible errors that can occur while encoding or decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Reading from or writing to the byte channel failed
    #[error("Channel error: {0}")]
    Channel(String),

    /// A destination value could not be constructed from the decoded fields
    #[error("Cannot instantiate destination: {reason}")]
    Instantiation { reason: String },

    /// An encoded field name is not declared by the destination composite
    #[error("Unknown field `{field}`, expected one of: {expected}")]
    UnknownField { field: String, expected: String },

    /// An encoded enum constant is not declared by the destination enum
    #[error("Unknown variant `{variant}`, expected one of: {expected}")]
    UnknownVariant { variant: String, expected: String },

    /// Scalar text cannot be parsed as its declared subkind
    #[error("Cannot parse {text:?} as {kind}")]
    Format { kind: ScalarKind, text: String },

    /// A token does not match the separator structure of its route
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    /// The value uses a shape the encoding cannot express
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Nesting went deeper than the configured limit
    #[error("Nesting depth {depth} exceeds the configured limit of {limit}")]
    DepthLimitExceeded { depth: usize, limit: usize },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a channel error for byte-channel reading/writing failures.
    pub fn channel<T: fmt::Display>(cause: T) -> Self {
        Error::Channel(cause.to_string())
    }

    /// Creates an instantiation error.
    pub fn instantiation<T: fmt::Display>(reason: T) -> Self {
        Error::Instantiation {
            reason: reason.to_string(),
        }
    }

    /// Creates an unknown field error listing the fields the destination declares.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_delim::Error;
    ///
    /// let err = Error::unknown_field("colour", &["model", "power"]);
    /// assert!(err.to_string().contains("model, power"));
    /// ```
    pub fn unknown_field(field: &str, expected: &[&str]) -> Self {
        Error::UnknownField {
            field: field.to_string(),
            expected: expected.join(", "),
        }
    }

    /// Creates an unknown variant error listing the declared constants.
    pub fn unknown_variant(variant: &str, expected: &[&str]) -> Self {
        Error::UnknownVariant {
            variant: variant.to_string(),
            expected: expected.join(", "),
        }
    }

    /// Creates a format error for scalar text that does not parse as `kind`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_delim::{Error, ScalarKind};
    ///
    /// let err = Error::format(ScalarKind::I32, "abc");
    /// assert_eq!(err.to_string(), "Cannot parse \"abc\" as i32");
    /// ```
    pub fn format(kind: ScalarKind, text: &str) -> Self {
        Error::Format {
            kind,
            text: text.to_string(),
        }
    }

    /// Creates a malformed encoding error.
    pub fn malformed<T: fmt::Display>(msg: T) -> Self {
        Error::MalformedEncoding(msg.to_string())
    }

    /// Creates an unsupported type error.
    pub fn unsupported_type<T: fmt::Display>(msg: T) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a depth limit error.
    pub fn depth_limit(depth: usize, limit: usize) -> Self {
        Error::DepthLimitExceeded { depth, limit }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    fn unknown_variant(variant: &str, expected: &'static [&'static str]) -> Self {
        Error::unknown_variant(variant, expected)
    }

    fn unknown_field(field: &str, expected: &'static [&'static str]) -> Self {
        Error::unknown_field(field, expected)
    }

    fn missing_field(field: &'static str) -> Self {
        Error::instantiation(format_args!("missing field `{}`", field))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
