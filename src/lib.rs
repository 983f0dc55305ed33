//! # serde_delim
//!
//! A schema-free, Serde-compatible structural codec built on a delimiter
//! alphabet whose field separator escalates with nesting depth.
//!
//! ## What is it?
//!
//! Values are written as a flat text stream of `name` / `value` tokens glued by
//! control characters. Nothing about the structure is declared in the stream:
//! the decoder recovers it from the separators and from the shape of the Rust
//! type it decodes into. See [`format`] for the full wire reference.
//!
//! ## Key Features
//!
//! - **Schema-free**: no field lists, lengths or type tags on the wire
//! - **Depth-escalating separators**: each nesting level gets its own field separator
//! - **Serde Compatible**: works with `#[derive(Serialize, Deserialize)]` types
//! - **Shape introspection**: [`describe`] reports how a type will be framed
//! - **No Unsafe Code**: written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! serde_delim = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ### Encoding and Decoding
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_delim::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! enum EngineType { Gasoline, Diesel }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Car {
//!     model: String,
//!     power: Option<i32>,
//!     engine: EngineType,
//!     tags: Vec<String>,
//! }
//!
//! let car = Car {
//!     model: "Volvo XC60".to_string(),
//!     power: Some(190),
//!     engine: EngineType::Diesel,
//!     tags: vec!["awd".to_string(), "tow".to_string()],
//! };
//!
//! let encoded = to_string(&car).unwrap();
//! assert_eq!(
//!     encoded,
//!     "model=Volvo XC60\u{b3}power=190\u{b3}engine=Diesel\u{b3}tags\u{1d}awd\u{1e}tow"
//! );
//!
//! let decoded: Car = from_str(&encoded).unwrap();
//! assert_eq!(car, decoded);
//! ```
//!
//! ### Inspecting Shapes
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_delim::{describe, StructuralKind};
//!
//! #[derive(Deserialize)]
//! struct Point { x: i32, labels: Vec<String> }
//!
//! let shape = describe::<Point>().unwrap();
//! assert_eq!(shape.field("labels").map(|s| s.kind()), Some(StructuralKind::Sequence));
//! ```
//!
//! ## Performance Characteristics
//!
//! - **Encoding**: O(n) in the number of fields and elements
//! - **Decoding**: O(n), borrowing text straight from the input where the
//!   destination allows it
//!
//! ## Limitations
//!
//! Free text is not escaped, only unit enum variants are supported, and a
//! sequence may not directly contain another sequence. The
//! [`format`] module lists every restriction.

pub mod de;
pub mod error;
pub mod format;
pub mod kind;
pub mod options;
pub mod scalar;
mod ser;
pub mod shape;

pub use de::Deserializer;
pub use error::{Error, Result};
pub use kind::{classify, ScalarKind, StructuralKind};
pub use options::CodecOptions;
pub use shape::{describe, FieldShape, Shape};

use log::debug;
use serde::{Deserialize, Serialize};
use std::io;

use crate::format::Nesting;
use crate::ser::Serializer;

/// Encode any `T: Serialize` to a delimited string.
///
/// # Examples
///
/// ```rust
/// use serde_delim::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let point = Point { x: 1, y: 2 };
/// assert_eq!(to_string(&point).unwrap(), "x=1\u{b3}y=2");
/// ```
///
/// # Errors
///
/// Returns an error if the value uses a shape the format cannot frame
/// (e.g., enum variants carrying data).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, CodecOptions::default())
}

/// Encode any `T: Serialize` to a delimited string with custom options.
///
/// # Examples
///
/// ```rust
/// use serde_delim::{to_string_with_options, CodecOptions, Error};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Inner { x: i32 }
///
/// #[derive(Serialize)]
/// struct Outer { inner: Inner }
///
/// let options = CodecOptions::new().with_max_depth(0);
/// let result = to_string_with_options(&Outer { inner: Inner { x: 1 } }, options);
/// assert_eq!(result, Err(Error::depth_limit(1, 0)));
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be encoded or nests deeper than
/// `options.max_depth`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: CodecOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let encoded = value
        .serialize(Serializer::new(Nesting::root(options.max_depth)))?
        .into_text();
    debug!("encoded {} bytes", encoded.len());
    Ok(encoded)
}

/// Encode any `T: Serialize` to a UTF-8 byte vector.
///
/// # Errors
///
/// Returns an error if the value cannot be encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    to_string(value).map(String::into_bytes)
}

/// Encode any `T: Serialize` to a writer.
///
/// # Examples
///
/// ```rust
/// use serde_delim::to_writer;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(buffer, "x=1\u{b3}y=2".as_bytes());
/// ```
///
/// # Errors
///
/// Returns an error if encoding fails, or [`Error::Channel`] if writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, CodecOptions::default())
}

/// Encode any `T: Serialize` to a writer with custom options.
///
/// # Errors
///
/// Returns an error if encoding fails, or [`Error::Channel`] if writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: CodecOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let encoded = to_string_with_options(value, options)?;
    writer
        .write_all(encoded.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(Error::channel)
}

/// Decode an instance of type `T` from a delimited string.
///
/// # Examples
///
/// ```rust
/// use serde_delim::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("y=2\u{b3}x=1").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the stream is malformed, names a field or constant the
/// destination does not declare, or carries text that does not parse as the
/// destination's scalar types.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<'a, T>(s: &'a str) -> Result<T>
where
    T: Deserialize<'a>,
{
    from_str_with_options(s, CodecOptions::default())
}

/// Decode an instance of type `T` from a delimited string with custom options.
///
/// # Examples
///
/// ```rust
/// use serde_delim::{from_str_with_options, CodecOptions};
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32 }
///
/// let options = CodecOptions::new().allow_unknown_fields();
/// let point: Point = from_str_with_options("x=1\u{b3}z=9", options).unwrap();
/// assert_eq!(point, Point { x: 1 });
/// ```
///
/// # Errors
///
/// Same as [`from_str`], plus [`Error::DepthLimitExceeded`] when the stream
/// nests deeper than `options.max_depth`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options<'a, T>(s: &'a str, options: CodecOptions) -> Result<T>
where
    T: Deserialize<'a>,
{
    debug!("decoding {} bytes", s.len());
    T::deserialize(Deserializer::with_options(s, options))
}

/// Decode an instance of type `T` from UTF-8 bytes.
///
/// # Errors
///
/// Returns [`Error::MalformedEncoding`] if the bytes are not valid UTF-8, and
/// otherwise the same errors as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<'a, T>(v: &'a [u8]) -> Result<T>
where
    T: Deserialize<'a>,
{
    let s = std::str::from_utf8(v).map_err(Error::malformed)?;
    from_str(s)
}

/// Decode an instance of type `T` from an I/O stream.
///
/// The stream is read to its end before decoding starts.
///
/// # Examples
///
/// ```rust
/// use serde_delim::from_reader;
/// use serde::Deserialize;
/// use std::io::Cursor;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let cursor = Cursor::new("x=1\u{b3}y=2".as_bytes());
/// let point: Point = from_reader(cursor).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns [`Error::Channel`] if reading fails, and otherwise the same errors
/// as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: io::Read,
    T: for<'de> Deserialize<'de>,
{
    from_reader_with_options(reader, CodecOptions::default())
}

/// Decode an instance of type `T` from an I/O stream with custom options.
///
/// # Errors
///
/// Returns [`Error::Channel`] if reading fails, [`Error::MalformedEncoding`]
/// if the bytes are not valid UTF-8, and otherwise the same errors as
/// [`from_str_with_options`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader_with_options<R, T>(mut reader: R, options: CodecOptions) -> Result<T>
where
    R: io::Read,
    T: for<'de> Deserialize<'de>,
{
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(Error::channel)?;
    let s = std::str::from_utf8(&bytes).map_err(Error::malformed)?;
    from_str_with_options(s, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
        home: Point,
        scores: BTreeMap<String, u8>,
    }

    fn sample_user() -> User {
        User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "user".to_string()],
            home: Point { x: 3, y: -4 },
            scores: BTreeMap::from([("rust".to_string(), 9), ("go".to_string(), 7)]),
        }
    }

    #[test]
    fn test_encode_decode_point() {
        let point = Point { x: 1, y: 2 };
        let encoded = to_string(&point).unwrap();
        let decoded: Point = from_str(&encoded).unwrap();
        assert_eq!(point, decoded);
    }

    #[test]
    fn test_encode_decode_user() {
        let user = sample_user();
        let encoded = to_string(&user).unwrap();
        assert!(encoded.contains("home\u{1e}x=3\u{b4}y=-4"));
        assert!(encoded.contains("scores\u{1e}go=7\u{b4}rust=9"));

        let decoded: User = from_str(&encoded).unwrap();
        assert_eq!(user, decoded);
    }

    #[test]
    fn test_root_sequence() {
        let numbers = vec![1, 2, 3, 4, 5];
        let encoded = to_string(&numbers).unwrap();
        assert_eq!(encoded, "1\u{1e}2\u{1e}3\u{1e}4\u{1e}5");
        let decoded: Vec<i32> = from_str(&encoded).unwrap();
        assert_eq!(numbers, decoded);
    }

    #[test]
    fn test_root_scalar() {
        assert_eq!(to_string(&42_u64).unwrap(), "42");
        assert_eq!(from_str::<u64>("42"), Ok(42));
        assert_eq!(from_str::<Option<u64>>("null"), Ok(None));
    }

    #[test]
    fn test_bytes_and_reader() {
        let user = sample_user();
        let bytes = to_vec(&user).unwrap();
        assert_eq!(from_slice::<User>(&bytes), Ok(sample_user()));
        assert_eq!(from_reader::<_, User>(bytes.as_slice()), Ok(sample_user()));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let result: Result<Point> = from_slice(&[b'x', b'=', 0xff]);
        assert!(matches!(result, Err(Error::MalformedEncoding(_))));
    }

    #[test]
    fn test_options_round_trip() {
        let options = CodecOptions::new().with_max_depth(1);
        let encoded = to_string_with_options(&sample_user(), options).unwrap();
        let decoded: User = from_str_with_options(&encoded, options).unwrap();
        assert_eq!(decoded, sample_user());
    }
}
