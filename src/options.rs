//! Configuration options for the codec.
//!
//! The delimiter alphabet is fixed (see [`format`](crate::format)); options
//! only bound how the engine walks it:
//!
//! - [`CodecOptions::max_depth`]: deepest field-separator level either path may enter
//! - [`CodecOptions::deny_unknown_fields`]: whether unknown field names are fatal
//!
//! ## Examples
//!
//! ```rust
//! use serde_delim::{to_string_with_options, CodecOptions};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Inner { x: i32 }
//!
//! #[derive(Serialize)]
//! struct Outer { inner: Inner }
//!
//! let value = Outer { inner: Inner { x: 1 } };
//!
//! // The nested composite is framed at depth 1
//! let options = CodecOptions::new().with_max_depth(0);
//! assert!(to_string_with_options(&value, options).is_err());
//!
//! let options = CodecOptions::new().with_max_depth(1);
//! assert!(to_string_with_options(&value, options).is_ok());
//! ```

/// Configuration options shared by the encoder and decoder.
///
/// # Examples
///
/// ```rust
/// use serde_delim::CodecOptions;
///
/// // Defaults: unbounded depth, unknown fields rejected
/// let options = CodecOptions::new();
/// assert_eq!(options.max_depth, None);
/// assert!(options.deny_unknown_fields);
///
/// let options = CodecOptions::new()
///     .with_max_depth(8)
///     .allow_unknown_fields();
/// assert_eq!(options.max_depth, Some(8));
/// assert!(!options.deny_unknown_fields);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodecOptions {
    pub max_depth: Option<usize>,
    pub deny_unknown_fields: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            max_depth: None,
            deny_unknown_fields: true,
        }
    }
}

impl CodecOptions {
    /// Creates default options (unbounded nesting, unknown fields rejected).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the nesting depth.
    ///
    /// Depth 0 is the root stream; every composite or mapping boundary adds
    /// one. Entering a level deeper than `max_depth` fails with
    /// [`Error::DepthLimitExceeded`](crate::Error::DepthLimitExceeded).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Lets the destination type decide what to do with field names it does
    /// not declare. Types using serde's defaults silently skip them.
    #[must_use]
    pub fn allow_unknown_fields(mut self) -> Self {
        self.deny_unknown_fields = false;
        self
    }
}
