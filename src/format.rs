//! Wire format reference and the delimiter alphabet.
//!
//! # Overview
//!
//! A value is encoded as a flat text stream of `name` / `value` tokens. No
//! field names, types or lengths are declared up front: the decoder recovers
//! the structure from the separators alone and from the shape of the type it
//! decodes into.
//!
//! # Alphabet
//!
//! | Role | Character | Notes |
//! |------|-----------|-------|
//! | Field separator, depth 0 | `U+00B3` | Code point `179 + depth` at deeper levels |
//! | Collection separator | `U+001D` (GS) | Same at every depth |
//! | Object separator | `U+001E` (RS) | Same at every depth |
//! | Key/value separator | `=` | Same at every depth |
//! | Null sentinel | `null` | Literal text |
//!
//! The alphabet is fixed; it is not configurable.
//!
//! # Tokens
//!
//! A composite at depth `d` is its field tokens joined by the depth-`d` field
//! separator. Each token takes one of three forms, chosen by the field's
//! [structural kind](crate::StructuralKind):
//!
//! ```text
//! name=text                      scalar, enum constant or null
//! name GS elem RS elem RS ...    sequence or set
//! name RS stream                 nested composite or mapping, at depth d + 1
//! ```
//!
//! A mapping's stream is its entries joined by the field separator of its own
//! depth `e`. Every entry is `key=value`; a composite value is written as its
//! own field stream at depth `e + 1`.
//!
//! Composite elements of a sequence are written as field streams at depth
//! `d + 1`.
//!
//! **Example** (field separators shown as `|0`, `|1`, `|2`):
//!
//! ```text
//! model=Volvo XC60 |0 power=190 |0 engineType=DIESEL |0 used=true
//!   |0 options GS option=Navi pack |1 price=1200.5 RS option=Safety pack |1 price=755.25
//!   |0 mileage RS 2017=133.5 |1 2018=4113.5 |1 2019=727.8
//! ```
//!
//! # Decoding Precedence
//!
//! A field token is routed by the first rule that matches:
//!
//! 1. contains GS: sequence, split into name and elements at the first GS
//! 2. contains RS: composite or mapping, split at the first RS
//! 3. otherwise: inline value, split at the first `=`
//!
//! The rules are applied in this order even when a later separator appears
//! first in the token.
//!
//! # Null and Absence
//!
//! `None` is always written as `name=null`. A field missing from the stream
//! decodes as `None` when the destination field is an `Option`, so
//! `#[serde(skip_serializing_if = "Option::is_none")]` omits absent fields
//! without changing what is decoded.
//!
//! # Limitations
//!
//! - **Free text is not escaped**: text containing GS, RS or a field separator
//!   of an enclosing depth is misrouted on decode. `=` is safe.
//! - **Sub-separators do not escalate**: GS and RS are shared by every depth, so
//!   a sequence element or mapping value that itself contains a sequence or a
//!   nested composite is ambiguous. A sequence directly inside a sequence is
//!   rejected at encode time.
//! - **Empty sequences**: a sequence holding a single empty string decodes as
//!   an empty sequence.
//! - **Mapping keys**: must be scalars and must not contain `=`.
//! - **Enums**: only unit variants are supported.
//! - **Cycles**: the value graph must be acyclic; nesting depth is only bounded
//!   when [`CodecOptions::max_depth`](crate::CodecOptions::max_depth) is set.

use crate::{Error, Result};

/// Code point of the field separator at depth 0.
pub const FIELD_SEPARATOR_BASE: u32 = 179;

/// Separates the field name from the elements of a sequence, and nothing else.
pub const COLLECTION_SEPARATOR: char = '\u{1d}';

/// Separates a field name from a nested stream, and sequence elements from each other.
pub const OBJECT_SEPARATOR: char = '\u{1e}';

/// Separates a field name or mapping key from its inline value.
pub const KEY_VALUE_SEPARATOR: char = '=';

/// Text of an absent value.
pub const NULL: &str = "null";

/// Returns the field separator used at `depth`.
///
/// Returns `None` once `179 + depth` leaves the range of valid `char`s.
///
/// # Examples
///
/// ```rust
/// use serde_delim::format::field_separator;
///
/// assert_eq!(field_separator(0), Some('\u{b3}'));
/// assert_eq!(field_separator(2), Some('\u{b5}'));
/// ```
#[must_use]
pub fn field_separator(depth: usize) -> Option<char> {
    u32::try_from(depth)
        .ok()
        .and_then(|depth| FIELD_SEPARATOR_BASE.checked_add(depth))
        .and_then(char::from_u32)
}

/// Returns the depth whose field separator is `ch`, if any.
#[must_use]
pub fn separator_depth(ch: char) -> Option<usize> {
    (ch as u32)
        .checked_sub(FIELD_SEPARATOR_BASE)
        .map(|depth| depth as usize)
}

/// Whether `text` contains a character that the decoder would treat as
/// structure when it appears in a value at `depth`.
#[must_use]
pub fn collides(text: &str, depth: usize) -> bool {
    text.chars().any(|ch| {
        ch == COLLECTION_SEPARATOR
            || ch == OBJECT_SEPARATOR
            || separator_depth(ch).map_or(false, |d| d <= depth)
    })
}

/// The field-separator level a stream is framed at, plus the configured bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Nesting {
    depth: usize,
    max_depth: Option<usize>,
}

impl Nesting {
    pub(crate) fn root(max_depth: Option<usize>) -> Self {
        Nesting {
            depth: 0,
            max_depth,
        }
    }

    pub(crate) fn depth(self) -> usize {
        self.depth
    }

    /// One level deeper. Bounds are only checked once a stream is framed there.
    pub(crate) fn descend(self) -> Self {
        Nesting {
            depth: self.depth + 1,
            ..self
        }
    }

    pub(crate) fn separator(self) -> Result<char> {
        if let Some(limit) = self.max_depth {
            if self.depth > limit {
                return Err(Error::depth_limit(self.depth, limit));
            }
        }
        field_separator(self.depth).ok_or_else(|| {
            Error::unsupported_type(format!("no field separator exists at depth {}", self.depth))
        })
    }
}

/// Joins `parts` with a single separator character.
pub(crate) fn join<S: AsRef<str>>(parts: &[S], separator: char) -> String {
    let mut joined = String::with_capacity(parts.iter().map(|p| p.as_ref().len() + 2).sum());
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            joined.push(separator);
        }
        joined.push_str(part.as_ref());
    }
    joined
}

/// Splits a stream on `separator`, yielding nothing for an empty stream.
pub(crate) fn split(stream: &str, separator: char) -> std::str::Split<'_, char> {
    let mut parts = stream.split(separator);
    if stream.is_empty() {
        parts.next();
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_escalates_by_one_per_depth() {
        assert_eq!(field_separator(0), char::from_u32(179));
        assert_eq!(field_separator(1), char::from_u32(180));
        assert_eq!(field_separator(7), char::from_u32(186));
        assert_eq!(separator_depth('\u{b4}'), Some(1));
        assert_eq!(separator_depth('a'), None);
    }

    #[test]
    fn test_separators_never_collide_with_fixed_alphabet() {
        for depth in 0..64 {
            let sep = field_separator(depth).unwrap();
            assert_ne!(sep, COLLECTION_SEPARATOR);
            assert_ne!(sep, OBJECT_SEPARATOR);
            assert_ne!(sep, KEY_VALUE_SEPARATOR);
            assert!(!sep.is_ascii());
        }
    }

    #[test]
    fn test_separator_leaves_char_range() {
        // 179 + depth lands on the first surrogate
        assert_eq!(field_separator(0xD800 - 179), None);
    }

    #[test]
    fn test_nesting_limit() {
        let root = Nesting::root(Some(1));
        assert_eq!(root.separator(), Ok('\u{b3}'));
        assert_eq!(root.descend().separator(), Ok('\u{b4}'));
        assert_eq!(
            root.descend().descend().separator(),
            Err(Error::depth_limit(2, 1))
        );
        assert_eq!(root.descend().descend().depth(), 2);
    }

    #[test]
    fn test_split_empty_stream() {
        assert_eq!(split("", OBJECT_SEPARATOR).count(), 0);
        assert_eq!(split("a", OBJECT_SEPARATOR).collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(
            split("a\u{1e}\u{1e}b", OBJECT_SEPARATOR).collect::<Vec<_>>(),
            vec!["a", "", "b"]
        );
    }

    #[test]
    fn test_join() {
        assert_eq!(join(&["a", "b", "c"], '\u{b3}'), "a\u{b3}b\u{b3}c");
        assert_eq!(join::<&str>(&[], '\u{b3}'), "");
    }

    #[test]
    fn test_collides() {
        assert!(collides("a\u{1d}b", 0));
        assert!(collides("x\u{b3}", 0));
        assert!(!collides("x\u{b5}", 1));
        assert!(collides("x\u{b5}", 2));
        assert!(!collides("a=b", 0));
    }
}
