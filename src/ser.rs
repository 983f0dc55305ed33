//! Delimited serialization.
//!
//! This module provides the `Serializer` that walks a value through serde's
//! data model and renders it as a depth-tagged token stream.
//!
//! ## Overview
//!
//! Every value is first rendered into a `Fragment` that remembers how it
//! must be framed, and the enclosing composite, sequence or mapping decides
//! which separator glues it to its name:
//!
//! - **Inline values** (scalars, enum constants, `null`): `name=text`
//! - **Sequences**: `name` GS elements joined by RS
//! - **Composites and mappings**: `name` RS their own stream, one level deeper
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde_delim::to_string;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Data { x: i32, y: i32 }
//!
//! let encoded = to_string(&Data { x: 1, y: 2 }).unwrap();
//! assert_eq!(encoded, "x=1\u{b3}y=2");
//! ```

use log::{trace, warn};
use serde::{ser, Serialize};

use crate::format::{
    self, Nesting, COLLECTION_SEPARATOR, KEY_VALUE_SEPARATOR, NULL, OBJECT_SEPARATOR,
};
use crate::kind::{ScalarKind, StructuralKind};
use crate::{scalar, Error, Result};

/// A rendered value, waiting to be attached to a name or an element slot.
#[derive(Debug, PartialEq)]
pub(crate) enum Fragment {
    /// Scalar, enum constant or `null`.
    Inline(StructuralKind, String),
    /// Rendered elements of a sequence.
    Elements(Vec<String>),
    /// A composite's fields or a mapping's entries, already joined.
    Stream(StructuralKind, String),
}

impl Fragment {
    fn kind(&self) -> StructuralKind {
        match self {
            Fragment::Inline(kind, _) | Fragment::Stream(kind, _) => *kind,
            Fragment::Elements(_) => StructuralKind::Sequence,
        }
    }

    /// Text used where no field name precedes the value: the root, sequence
    /// elements and mapping values.
    pub(crate) fn into_text(self) -> String {
        match self {
            Fragment::Inline(_, text) | Fragment::Stream(_, text) => text,
            Fragment::Elements(elements) => format::join(&elements, OBJECT_SEPARATOR),
        }
    }

    /// Field token `name` + separator + value.
    fn into_token(self, name: &str) -> String {
        let (separator, body) = match self {
            Fragment::Inline(_, text) => (KEY_VALUE_SEPARATOR, text),
            Fragment::Elements(elements) => (
                COLLECTION_SEPARATOR,
                format::join(&elements, OBJECT_SEPARATOR),
            ),
            Fragment::Stream(_, stream) => (OBJECT_SEPARATOR, stream),
        };

        let mut token = String::with_capacity(name.len() + 1 + body.len());
        token.push_str(name);
        token.push(separator);
        token.push_str(&body);
        token
    }
}

/// The delimited serializer.
///
/// `nesting` is the level a composite or mapping rendered by this serializer
/// is framed at. Field values are rendered one level below their composite.
#[derive(Clone, Copy)]
pub(crate) struct Serializer {
    nesting: Nesting,
}

impl Serializer {
    pub(crate) fn new(nesting: Nesting) -> Self {
        Serializer { nesting }
    }

    fn inline(kind: ScalarKind, text: String) -> Fragment {
        Fragment::Inline(StructuralKind::Scalar(kind), text)
    }
}

macro_rules! serialize_scalar {
    ($method:ident($ty:ty) => $kind:ident) => {
        fn $method(self, v: $ty) -> Result<Fragment> {
            Ok(Self::inline(ScalarKind::$kind, scalar::encode(&v)))
        }
    };
}

impl ser::Serializer for Serializer {
    type Ok = Fragment;
    type Error = Error;

    type SerializeSeq = ElementSerializer;
    type SerializeTuple = ElementSerializer;
    type SerializeTupleStruct = ElementSerializer;
    type SerializeTupleVariant = ser::Impossible<Fragment, Error>;
    type SerializeMap = EntrySerializer;
    type SerializeStruct = FieldSerializer;
    type SerializeStructVariant = ser::Impossible<Fragment, Error>;

    serialize_scalar!(serialize_bool(bool) => Bool);
    serialize_scalar!(serialize_i8(i8) => I8);
    serialize_scalar!(serialize_i16(i16) => I16);
    serialize_scalar!(serialize_i32(i32) => I32);
    serialize_scalar!(serialize_i64(i64) => I64);
    serialize_scalar!(serialize_u8(u8) => U8);
    serialize_scalar!(serialize_u16(u16) => U16);
    serialize_scalar!(serialize_u32(u32) => U32);
    serialize_scalar!(serialize_u64(u64) => U64);
    serialize_scalar!(serialize_f32(f32) => F32);
    serialize_scalar!(serialize_f64(f64) => F64);
    serialize_scalar!(serialize_char(char) => Char);

    fn serialize_str(self, v: &str) -> Result<Fragment> {
        if format::collides(v, self.nesting.depth()) {
            warn!(
                "text {:?} contains a reserved separator and will not decode faithfully",
                v
            );
        }
        Ok(Self::inline(ScalarKind::Text, v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Fragment> {
        Ok(Fragment::Elements(v.iter().map(scalar::encode).collect()))
    }

    fn serialize_none(self) -> Result<Fragment> {
        self.serialize_unit()
    }

    fn serialize_some<T>(self, value: &T) -> Result<Fragment>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Fragment> {
        Ok(Self::inline(ScalarKind::Null, NULL.to_owned()))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Fragment> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Fragment> {
        Ok(Fragment::Inline(StructuralKind::Enum, variant.to_owned()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Fragment>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<Fragment>
    where
        T: ?Sized + Serialize,
    {
        Err(data_variant(name, variant))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<ElementSerializer> {
        Ok(ElementSerializer {
            nesting: self.nesting,
            elements: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<ElementSerializer> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<ElementSerializer> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(data_variant(name, variant))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<EntrySerializer> {
        Ok(EntrySerializer {
            nesting: self.nesting,
            entries: Vec::with_capacity(len.unwrap_or(0)),
            key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<FieldSerializer> {
        Ok(FieldSerializer {
            nesting: self.nesting,
            name,
            tokens: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(data_variant(name, variant))
    }
}

fn data_variant(name: &str, variant: &str) -> Error {
    Error::unsupported_type(format!(
        "variant `{}::{}` carries data; only unit variants are supported",
        name, variant
    ))
}

/// Collects sequence, set and tuple elements.
pub(crate) struct ElementSerializer {
    nesting: Nesting,
    elements: Vec<String>,
}

impl ElementSerializer {
    fn push<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        // Composite elements are framed at the same level as the sequence's own
        // field stream would be.
        match value.serialize(Serializer::new(self.nesting))? {
            Fragment::Elements(_) => Err(Error::unsupported_type(
                "a sequence cannot be an element of another sequence",
            )),
            fragment => {
                self.elements.push(fragment.into_text());
                Ok(())
            }
        }
    }
}

impl ser::SerializeSeq for ElementSerializer {
    type Ok = Fragment;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Fragment> {
        Ok(Fragment::Elements(self.elements))
    }
}

impl ser::SerializeTuple for ElementSerializer {
    type Ok = Fragment;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Fragment> {
        Ok(Fragment::Elements(self.elements))
    }
}

impl ser::SerializeTupleStruct for ElementSerializer {
    type Ok = Fragment;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Fragment> {
        Ok(Fragment::Elements(self.elements))
    }
}

/// Collects `key=value` mapping entries.
pub(crate) struct EntrySerializer {
    nesting: Nesting,
    entries: Vec<String>,
    key: Option<String>,
}

impl ser::SerializeMap for EntrySerializer {
    type Ok = Fragment;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match key.serialize(Serializer::new(self.nesting.descend()))? {
            Fragment::Inline(_, text) if text.contains(KEY_VALUE_SEPARATOR) => {
                Err(Error::unsupported_type(format!(
                    "mapping key {:?} contains the key/value separator",
                    text
                )))
            }
            Fragment::Inline(_, text) => {
                self.key = Some(text);
                Ok(())
            }
            other => Err(Error::unsupported_type(format!(
                "mapping keys must be scalars, found {}",
                other.kind()
            ))),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called before serialize_key"))?;
        let value = value
            .serialize(Serializer::new(self.nesting.descend()))?
            .into_text();

        let mut entry = key;
        entry.push(KEY_VALUE_SEPARATOR);
        entry.push_str(&value);
        self.entries.push(entry);
        Ok(())
    }

    fn end(self) -> Result<Fragment> {
        let separator = self.nesting.separator()?;
        Ok(Fragment::Stream(
            StructuralKind::Mapping,
            format::join(&self.entries, separator),
        ))
    }
}

/// Collects the field tokens of one composite.
pub(crate) struct FieldSerializer {
    nesting: Nesting,
    name: &'static str,
    tokens: Vec<String>,
}

impl ser::SerializeStruct for FieldSerializer {
    type Ok = Fragment;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let fragment = value.serialize(Serializer::new(self.nesting.descend()))?;
        trace!(
            "{}.{} encoded as {} at depth {}",
            self.name,
            key,
            fragment.kind(),
            self.nesting.depth()
        );
        self.tokens.push(fragment.into_token(key));
        Ok(())
    }

    fn end(self) -> Result<Fragment> {
        let separator = self.nesting.separator()?;
        Ok(Fragment::Stream(
            StructuralKind::Composite,
            format::join(&self.tokens, separator),
        ))
    }
}
