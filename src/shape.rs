//! Field shape descriptors.
//!
//! The codec never consults a schema: a destination type's `Deserialize`
//! implementation already knows its field names and asks for each field's
//! kind as it is decoded. [`describe`] replays that conversation against a
//! recording deserializer and returns the result as a [`Shape`] tree, which is
//! useful for inspecting what the decoder will expect before feeding it data.
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_delim::{describe, ScalarKind, Shape, StructuralKind};
//!
//! #[derive(Deserialize)]
//! struct CarOption {
//!     option: String,
//!     price: f64,
//! }
//!
//! let shape = describe::<CarOption>().unwrap();
//! assert_eq!(shape.kind(), StructuralKind::Composite);
//! assert_eq!(shape.field("price"), Some(&Shape::Scalar(ScalarKind::F64)));
//!
//! let names: Vec<_> = shape.fields().map(|f| f.name).collect();
//! assert_eq!(names, ["option", "price"]);
//! ```

use indexmap::IndexMap;
use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, DeserializeOwned, DeserializeSeed, Visitor};

use crate::kind::{classify, ScalarKind, StructuralKind};
use crate::{Error, Result};

/// The declared shape of a type, as seen by the codec.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Scalar(ScalarKind),
    Enum {
        name: &'static str,
        variants: &'static [&'static str],
    },
    /// Named fields in declaration order.
    Composite {
        name: &'static str,
        fields: IndexMap<&'static str, Shape>,
    },
    Sequence(Box<Shape>),
    Tuple(Vec<Shape>),
    Mapping {
        key: Box<Shape>,
        value: Box<Shape>,
    },
    /// A nullable shape; absence is encoded as `null`.
    Optional(Box<Shape>),
}

/// One field of a composite shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldShape<'a> {
    pub name: &'static str,
    pub shape: &'a Shape,
}

impl FieldShape<'_> {
    #[must_use]
    pub fn kind(&self) -> StructuralKind {
        classify(self.shape)
    }
}

impl Shape {
    /// Classifies this shape. See [`classify`].
    #[must_use]
    pub fn kind(&self) -> StructuralKind {
        classify(self)
    }

    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self, Shape::Optional(_))
    }

    /// The shape with any `Optional` wrappers removed.
    #[must_use]
    pub fn required(&self) -> &Shape {
        match self {
            Shape::Optional(inner) => inner.required(),
            other => other,
        }
    }

    /// Type name of a composite or enum shape.
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        match self.required() {
            Shape::Composite { name, .. } | Shape::Enum { name, .. } => Some(*name),
            _ => None,
        }
    }

    /// Iterates the fields of a composite shape; empty for every other shape.
    pub fn fields(&self) -> impl Iterator<Item = FieldShape<'_>> {
        let fields = match self.required() {
            Shape::Composite { fields, .. } => Some(fields),
            _ => None,
        };
        fields
            .into_iter()
            .flat_map(|fields| fields.iter())
            .map(|(name, shape)| FieldShape { name: *name, shape })
    }

    /// Looks up a field of a composite shape by its encoded name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Shape> {
        match self.required() {
            Shape::Composite { fields, .. } => fields.get(name),
            _ => None,
        }
    }
}

/// Traces the shape of `T` through its `Deserialize` implementation.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for recursive composites, for types that
/// only deserialize through `deserialize_any`, and for enums whose first
/// variant carries data. Errors raised by `T`'s own validation of the sample
/// values fed to it are returned unchanged.
pub fn describe<T>() -> Result<Shape>
where
    T: DeserializeOwned,
{
    let mut shape = None;
    let mut stack = Vec::new();
    T::deserialize(Tracer {
        shape: &mut shape,
        stack: &mut stack,
    })?;
    traced(shape)
}

fn traced(shape: Option<Shape>) -> Result<Shape> {
    shape.ok_or_else(|| Error::unsupported_type("type did not request a value"))
}

/// Records the hint it receives and answers with a neutral sample value.
struct Tracer<'a> {
    shape: &'a mut Option<Shape>,
    stack: &'a mut Vec<&'static str>,
}

impl Tracer<'_> {
    fn record(&mut self, shape: Shape) {
        *self.shape = Some(shape);
    }
}

macro_rules! trace_scalar {
    ($method:ident => $visit:ident(), $kind:ident) => {
        fn $method<V>(mut self, visitor: V) -> Result<V::Value>
        where
            V: Visitor<'de>,
        {
            self.record(Shape::Scalar(ScalarKind::$kind));
            visitor.$visit()
        }
    };
    ($method:ident => $visit:ident($sample:expr), $kind:ident) => {
        fn $method<V>(mut self, visitor: V) -> Result<V::Value>
        where
            V: Visitor<'de>,
        {
            self.record(Shape::Scalar(ScalarKind::$kind));
            visitor.$visit($sample)
        }
    };
}

impl<'de, 'a> de::Deserializer<'de> for Tracer<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(Error::unsupported_type(
            "self-describing types have no static shape",
        ))
    }

    trace_scalar!(deserialize_bool => visit_bool(false), Bool);
    trace_scalar!(deserialize_i8 => visit_i8(0), I8);
    trace_scalar!(deserialize_i16 => visit_i16(0), I16);
    trace_scalar!(deserialize_i32 => visit_i32(0), I32);
    trace_scalar!(deserialize_i64 => visit_i64(0), I64);
    trace_scalar!(deserialize_u8 => visit_u8(0), U8);
    trace_scalar!(deserialize_u16 => visit_u16(0), U16);
    trace_scalar!(deserialize_u32 => visit_u32(0), U32);
    trace_scalar!(deserialize_u64 => visit_u64(0), U64);
    trace_scalar!(deserialize_f32 => visit_f32(0.0), F32);
    trace_scalar!(deserialize_f64 => visit_f64(0.0), F64);
    trace_scalar!(deserialize_char => visit_char('a'), Char);
    trace_scalar!(deserialize_str => visit_str(""), Text);
    trace_scalar!(deserialize_string => visit_string(String::new()), Text);
    trace_scalar!(deserialize_unit => visit_unit(), Null);

    fn deserialize_bytes<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.record(Shape::Sequence(Box::new(Shape::Scalar(ScalarKind::U8))));
        visitor.visit_bytes(&[])
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let mut inner = None;
        let value = visitor.visit_some(Tracer {
            shape: &mut inner,
            stack: &mut *self.stack,
        })?;
        self.record(Shape::Optional(Box::new(traced(inner)?)));
        Ok(value)
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let mut access = ElementTracer {
            stack: &mut *self.stack,
            element: None,
            done: false,
        };
        let value = visitor.visit_seq(&mut access)?;
        let element = traced(access.element)?;
        self.record(Shape::Sequence(Box::new(element)));
        Ok(value)
    }

    fn deserialize_tuple<V>(mut self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let mut access = TupleTracer {
            stack: &mut *self.stack,
            remaining: len,
            elements: Vec::with_capacity(len),
        };
        let value = visitor.visit_seq(&mut access)?;
        let elements = access.elements;
        self.record(Shape::Tuple(elements));
        Ok(value)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let mut access = EntryTracer {
            stack: &mut *self.stack,
            key: None,
            value: None,
            done: false,
        };
        let value = visitor.visit_map(&mut access)?;
        let EntryTracer {
            key: key_shape,
            value: value_shape,
            ..
        } = access;
        self.record(Shape::Mapping {
            key: Box::new(traced(key_shape)?),
            value: Box::new(traced(value_shape)?),
        });
        Ok(value)
    }

    fn deserialize_struct<V>(
        mut self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        if self.stack.contains(&name) {
            return Err(Error::unsupported_type(format!(
                "recursive type `{}` has no finite shape",
                name
            )));
        }

        self.stack.push(name);
        let mut access = FieldTracer {
            stack: &mut *self.stack,
            names: fields.iter(),
            current: None,
            fields: IndexMap::with_capacity(fields.len()),
        };
        let value = visitor.visit_map(&mut access);
        let FieldTracer { fields, .. } = access;
        self.stack.pop();

        let value = value?;
        self.record(Shape::Composite { name, fields });
        Ok(value)
    }

    fn deserialize_enum<V>(
        mut self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let first = *variants.first().ok_or_else(|| {
            Error::unsupported_type(format!("enum `{}` declares no variants", name))
        })?;
        self.record(Shape::Enum { name, variants });
        visitor.visit_enum(BorrowedStrDeserializer::<Error>::new(first))
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_any(visitor)
    }
}

/// Feeds exactly one traced element.
struct ElementTracer<'a> {
    stack: &'a mut Vec<&'static str>,
    element: Option<Shape>,
    done: bool,
}

impl<'de> de::SeqAccess<'de> for ElementTracer<'_> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        if self.done {
            return Ok(None);
        }
        self.done = true;
        seed.deserialize(Tracer {
            shape: &mut self.element,
            stack: &mut *self.stack,
        })
        .map(Some)
    }
}

struct TupleTracer<'a> {
    stack: &'a mut Vec<&'static str>,
    remaining: usize,
    elements: Vec<Shape>,
}

impl<'de> de::SeqAccess<'de> for TupleTracer<'_> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        let mut shape = None;
        let value = seed.deserialize(Tracer {
            shape: &mut shape,
            stack: &mut *self.stack,
        })?;
        self.elements.push(traced(shape)?);
        Ok(Some(value))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

/// Feeds exactly one traced entry.
struct EntryTracer<'a> {
    stack: &'a mut Vec<&'static str>,
    key: Option<Shape>,
    value: Option<Shape>,
    done: bool,
}

impl<'de> de::MapAccess<'de> for EntryTracer<'_> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        if self.done {
            return Ok(None);
        }
        self.done = true;
        seed.deserialize(Tracer {
            shape: &mut self.key,
            stack: &mut *self.stack,
        })
        .map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        seed.deserialize(Tracer {
            shape: &mut self.value,
            stack: &mut *self.stack,
        })
    }
}

/// Walks a composite's declared field names, tracing each value.
struct FieldTracer<'a> {
    stack: &'a mut Vec<&'static str>,
    names: std::slice::Iter<'static, &'static str>,
    current: Option<&'static str>,
    fields: IndexMap<&'static str, Shape>,
}

impl<'de> de::MapAccess<'de> for FieldTracer<'_> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        match self.names.next() {
            Some(&name) => {
                self.current = Some(name);
                seed.deserialize(BorrowedStrDeserializer::<Error>::new(name))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        let name = self
            .current
            .take()
            .ok_or_else(|| Error::custom("field value requested before its name"))?;

        let mut shape = None;
        let value = seed.deserialize(Tracer {
            shape: &mut shape,
            stack: &mut *self.stack,
        })?;
        self.fields.insert(name, traced(shape)?);
        Ok(value)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.names.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::{BTreeSet, HashMap};

    #[derive(Deserialize)]
    #[allow(dead_code)]
    enum Fuel {
        Diesel,
        Electric,
    }

    #[derive(Deserialize)]
    #[allow(dead_code)]
    #[serde(rename_all = "camelCase")]
    struct Engine {
        fuel_type: Option<Fuel>,
        cylinders: u8,
    }

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Vehicle {
        engine: Engine,
        tags: BTreeSet<String>,
        readings: HashMap<String, Option<f32>>,
        position: (i32, i32),
    }

    #[test]
    fn test_describe_scalars() {
        assert_eq!(describe::<bool>(), Ok(Shape::Scalar(ScalarKind::Bool)));
        assert_eq!(describe::<String>(), Ok(Shape::Scalar(ScalarKind::Text)));
        assert_eq!(describe::<()>(), Ok(Shape::Scalar(ScalarKind::Null)));
        assert_eq!(
            describe::<Option<u64>>(),
            Ok(Shape::Optional(Box::new(Shape::Scalar(ScalarKind::U64))))
        );
    }

    #[test]
    fn test_describe_nested_composite() {
        let shape = describe::<Vehicle>().unwrap();
        assert_eq!(shape.name(), Some("Vehicle"));

        let kinds: Vec<_> = shape.fields().map(|f| (f.name, f.kind())).collect();
        assert_eq!(
            kinds,
            vec![
                ("engine", StructuralKind::Composite),
                ("tags", StructuralKind::Sequence),
                ("readings", StructuralKind::Mapping),
                ("position", StructuralKind::Sequence),
            ]
        );

        let engine = shape.field("engine").unwrap();
        assert_eq!(
            engine.field("fuelType"),
            Some(&Shape::Optional(Box::new(Shape::Enum {
                name: "Fuel",
                variants: &["Diesel", "Electric"],
            })))
        );
        assert_eq!(engine.field("fuel_type"), None);

        assert_eq!(
            shape.field("readings"),
            Some(&Shape::Mapping {
                key: Box::new(Shape::Scalar(ScalarKind::Text)),
                value: Box::new(Shape::Optional(Box::new(Shape::Scalar(ScalarKind::F32)))),
            })
        );
        assert_eq!(
            shape.field("position"),
            Some(&Shape::Tuple(vec![
                Shape::Scalar(ScalarKind::I32),
                Shape::Scalar(ScalarKind::I32),
            ]))
        );
    }

    #[test]
    fn test_describe_rejects_recursion() {
        #[derive(Deserialize)]
        #[allow(dead_code)]
        struct Node {
            value: i32,
            next: Option<Box<Node>>,
        }

        assert!(matches!(
            describe::<Node>(),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_scalar_shape_has_no_fields() {
        let shape = Shape::Scalar(ScalarKind::I32);
        assert_eq!(shape.fields().count(), 0);
        assert_eq!(shape.field("x"), None);
        assert_eq!(shape.name(), None);
        assert!(!shape.is_optional());
    }
}
