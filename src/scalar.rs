//! Scalar codec: textual rendering and parsing of scalar values.
//!
//! Scalars are written with their `Display` form and read back with `FromStr`,
//! both of which are locale-independent in Rust. Floats use the shortest
//! decimal that round-trips exactly.

use std::fmt::Display;
use std::str::FromStr;

use crate::format::NULL;
use crate::kind::ScalarKind;
use crate::{Error, Result};

/// Renders a scalar as text.
///
/// # Examples
///
/// ```rust
/// use serde_delim::scalar;
///
/// assert_eq!(scalar::encode(&true), "true");
/// assert_eq!(scalar::encode(&1200.50_f64), "1200.5");
/// assert_eq!(scalar::encode(&-7_i16), "-7");
/// ```
pub fn encode<T: Display + ?Sized>(value: &T) -> String {
    value.to_string()
}

/// Parses `text` as a scalar of subkind `kind`.
///
/// Integer text that overflows the destination width and non-numeric text
/// both fail with [`Error::Format`]. Booleans are case-sensitive.
///
/// # Examples
///
/// ```rust
/// use serde_delim::{scalar, Error, ScalarKind};
///
/// assert_eq!(scalar::decode::<i32>("190", ScalarKind::I32), Ok(190));
/// assert_eq!(
///     scalar::decode::<i8>("300", ScalarKind::I8),
///     Err(Error::format(ScalarKind::I8, "300"))
/// );
/// ```
pub fn decode<T: FromStr>(text: &str, kind: ScalarKind) -> Result<T> {
    text.parse::<T>().map_err(|_| Error::format(kind, text))
}

/// Parses `text` as exactly one character.
pub fn decode_char(text: &str) -> Result<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(Error::format(ScalarKind::Char, text)),
    }
}

/// Whether `text` is the null sentinel.
#[inline]
#[must_use]
pub fn is_null(text: &str) -> bool {
    text == NULL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_is_case_sensitive() {
        assert_eq!(decode::<bool>("true", ScalarKind::Bool), Ok(true));
        assert_eq!(decode::<bool>("false", ScalarKind::Bool), Ok(false));
        assert_eq!(
            decode::<bool>("True", ScalarKind::Bool),
            Err(Error::format(ScalarKind::Bool, "True"))
        );
    }

    #[test]
    fn test_integer_widths() {
        assert_eq!(decode::<i16>("-32768", ScalarKind::I16), Ok(i16::MIN));
        assert!(decode::<i16>("32768", ScalarKind::I16).is_err());
        assert_eq!(decode::<i64>(&encode(&i64::MAX), ScalarKind::I64), Ok(i64::MAX));
        assert!(decode::<u32>("-1", ScalarKind::U32).is_err());
        assert!(decode::<i32>("12.5", ScalarKind::I32).is_err());
        assert!(decode::<i32>("", ScalarKind::I32).is_err());
    }

    #[test]
    fn test_float_text() {
        for value in [133.5_f64, 4113.5, 727.8, 0.1 + 0.2, -1e-300, f64::MAX] {
            assert_eq!(decode::<f64>(&encode(&value), ScalarKind::F64), Ok(value));
        }
        assert_eq!(decode::<f32>(&encode(&755.25_f32), ScalarKind::F32), Ok(755.25));
        assert!(decode::<f64>("1,5", ScalarKind::F64).is_err());
        assert!(decode::<f64>("abc", ScalarKind::F64).is_err());
    }

    #[test]
    fn test_char() {
        assert_eq!(decode_char("x"), Ok('x'));
        assert_eq!(decode_char("é"), Ok('é'));
        assert_eq!(decode_char("xy"), Err(Error::format(ScalarKind::Char, "xy")));
        assert!(decode_char("").is_err());
    }

    #[test]
    fn test_null_sentinel() {
        assert!(is_null("null"));
        assert!(!is_null("NULL"));
        assert!(!is_null(""));
    }
}
