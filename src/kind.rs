//! Structural classification of values.
//!
//! Every value the codec touches falls into one [`StructuralKind`], and the
//! kind alone decides which separator frames it on the wire:
//!
//! | Kind | Field token |
//! |------|-------------|
//! | `Scalar`, `Enum` | `name=text` |
//! | `Sequence` | `name` GS `e1` RS `e2` ... |
//! | `Composite`, `Mapping` | `name` RS `stream at depth + 1` |
//!
//! Nullable (`Option`) values classify as their inner kind; absence is carried
//! by the `null` sentinel, not by a separate kind.

use std::fmt;

use crate::shape::Shape;

/// The scalar subkinds the [scalar codec](crate::scalar) knows how to render
/// and parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Null,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    Text,
}

impl ScalarKind {
    /// Returns the name used for this subkind in error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Null => "null",
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Char => "char",
            ScalarKind::Text => "text",
        }
    }

    /// Whether values of this subkind are numbers.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        !matches!(
            self,
            ScalarKind::Null | ScalarKind::Bool | ScalarKind::Char | ScalarKind::Text
        )
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of encoding strategies.
///
/// Ordered and unordered collections share [`StructuralKind::Sequence`]: the
/// wire form is identical and uniqueness is enforced by the destination
/// container (`HashSet`, `BTreeSet`) as it collects the decoded elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StructuralKind {
    Scalar(ScalarKind),
    Enum,
    Composite,
    Sequence,
    Mapping,
}

impl StructuralKind {
    /// Whether this kind is written inline as `name=text`.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(self, StructuralKind::Scalar(_) | StructuralKind::Enum)
    }
}

impl fmt::Display for StructuralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralKind::Scalar(kind) => write!(f, "scalar ({})", kind),
            StructuralKind::Enum => f.write_str("enum"),
            StructuralKind::Composite => f.write_str("composite"),
            StructuralKind::Sequence => f.write_str("sequence"),
            StructuralKind::Mapping => f.write_str("mapping"),
        }
    }
}

/// Classifies a traced [`Shape`].
///
/// Classification is total: every shape [`describe`](crate::describe) can
/// produce maps to exactly one kind.
///
/// # Examples
///
/// ```rust
/// use serde_delim::{classify, describe, ScalarKind, StructuralKind};
///
/// let shape = describe::<Option<Vec<u16>>>().unwrap();
/// assert_eq!(classify(&shape), StructuralKind::Sequence);
///
/// let shape = describe::<Option<i64>>().unwrap();
/// assert_eq!(classify(&shape), StructuralKind::Scalar(ScalarKind::I64));
/// ```
#[must_use]
pub fn classify(shape: &Shape) -> StructuralKind {
    match shape {
        Shape::Scalar(kind) => StructuralKind::Scalar(*kind),
        Shape::Enum { .. } => StructuralKind::Enum,
        Shape::Composite { .. } => StructuralKind::Composite,
        Shape::Sequence(_) | Shape::Tuple(_) => StructuralKind::Sequence,
        Shape::Mapping { .. } => StructuralKind::Mapping,
        Shape::Optional(inner) => classify(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn test_optional_classifies_as_inner() {
        let shape = Shape::Optional(Box::new(Shape::Scalar(ScalarKind::F64)));
        assert_eq!(classify(&shape), StructuralKind::Scalar(ScalarKind::F64));

        let shape = Shape::Optional(Box::new(Shape::Mapping {
            key: Box::new(Shape::Scalar(ScalarKind::Text)),
            value: Box::new(Shape::Scalar(ScalarKind::F64)),
        }));
        assert_eq!(classify(&shape), StructuralKind::Mapping);
    }

    #[test]
    fn test_tuple_is_a_sequence() {
        let shape = Shape::Tuple(vec![
            Shape::Scalar(ScalarKind::I32),
            Shape::Scalar(ScalarKind::Bool),
        ]);
        assert_eq!(classify(&shape), StructuralKind::Sequence);
    }

    #[test]
    fn test_composite_and_enum() {
        let shape = Shape::Composite {
            name: "Empty",
            fields: IndexMap::new(),
        };
        assert_eq!(classify(&shape), StructuralKind::Composite);

        let shape = Shape::Enum {
            name: "EngineType",
            variants: &["GASOLINE", "DIESEL"],
        };
        assert_eq!(classify(&shape), StructuralKind::Enum);
        assert!(StructuralKind::Enum.is_inline());
        assert!(!StructuralKind::Mapping.is_inline());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            StructuralKind::Scalar(ScalarKind::I16).to_string(),
            "scalar (i16)"
        );
        assert_eq!(StructuralKind::Sequence.to_string(), "sequence");
        assert!(ScalarKind::U64.is_numeric());
        assert!(!ScalarKind::Text.is_numeric());
    }
}
