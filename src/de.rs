//! Delimited deserialization.
//!
//! This module provides the [`Deserializer`] that rebuilds Rust values from a
//! delimited token stream.
//!
//! ## Overview
//!
//! The stream carries no type information, so decoding is driven by the
//! destination type: its `Deserialize` implementation names the fields it
//! declares and asks for each one as a scalar, enum, sequence, mapping or
//! composite. The deserializer answers by splitting the current segment with
//! the separator that kind is framed by:
//!
//! - **Composites**: split on the field separator of the current depth, then
//!   route every field token by the separators it contains
//! - **Sequences**: split the elements on RS
//! - **Mappings**: split the entries on the field separator of the mapping's
//!   depth, then every entry on its first `=`
//!
//! ## Usage
//!
//! ```rust
//! use serde_delim::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Data { x: i32, tags: Vec<String> }
//!
//! let data: Data = from_str("x=1\u{b3}tags\u{1d}a\u{1e}b").unwrap();
//! assert_eq!(data, Data { x: 1, tags: vec!["a".into(), "b".into()] });
//! ```

use log::{debug, trace};
use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, DeserializeSeed, Visitor};

use crate::format::{self, Nesting, COLLECTION_SEPARATOR, KEY_VALUE_SEPARATOR, OBJECT_SEPARATOR};
use crate::kind::{ScalarKind, StructuralKind};
use crate::{scalar, CodecOptions, Error, Result};

/// A slice of the input together with the route that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Token<'de> {
    /// Inline text. Also a whole stream where no field name precedes it: the
    /// root, sequence elements and mapping values.
    Text(&'de str),
    /// Joined elements following a GS.
    Collection(&'de str),
    /// A nested stream following an RS.
    Object(&'de str),
}

impl Token<'_> {
    fn describe(&self) -> &'static str {
        match self {
            Token::Text(_) => "an inline value",
            Token::Collection(_) => "a collection",
            Token::Object(_) => "a nested stream",
        }
    }
}

/// Splits a field token into its name and value.
///
/// A GS anywhere in the token makes it a collection, otherwise an RS makes it
/// a nested stream, otherwise it must be `name=text`.
fn route(token: &str) -> Result<(&str, Token<'_>)> {
    let (name, value) = if let Some((name, elements)) = token.split_once(COLLECTION_SEPARATOR) {
        (name, Token::Collection(elements))
    } else if let Some((name, stream)) = token.split_once(OBJECT_SEPARATOR) {
        (name, Token::Object(stream))
    } else if let Some((name, text)) = token.split_once(KEY_VALUE_SEPARATOR) {
        (name, Token::Text(text))
    } else {
        return Err(Error::malformed(format!(
            "field token {:?} has no separator",
            token
        )));
    };

    if name.is_empty() {
        return Err(Error::malformed(format!(
            "field token {:?} has an empty name",
            token
        )));
    }
    Ok((name, value))
}

/// The delimited deserializer.
///
/// Created for a whole input via [`Deserializer::from_str`] or
/// [`Deserializer::with_options`]; the same type decodes every nested segment.
pub struct Deserializer<'de> {
    token: Token<'de>,
    nesting: Nesting,
    deny_unknown_fields: bool,
}

impl<'de> Deserializer<'de> {
    /// Creates a deserializer over a complete encoded stream with default options.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'de str) -> Self {
        Self::with_options(input, CodecOptions::default())
    }

    /// Creates a deserializer over a complete encoded stream.
    pub fn with_options(input: &'de str, options: CodecOptions) -> Self {
        Deserializer {
            token: Token::Text(input),
            nesting: Nesting::root(options.max_depth),
            deny_unknown_fields: options.deny_unknown_fields,
        }
    }

    fn nested(&self, token: Token<'de>, nesting: Nesting) -> Self {
        Deserializer {
            token,
            nesting,
            deny_unknown_fields: self.deny_unknown_fields,
        }
    }

    fn mismatch(&self, wanted: StructuralKind) -> Error {
        Error::malformed(format!(
            "expected {}, found {}",
            wanted,
            self.token.describe()
        ))
    }

    fn inline(&self, wanted: StructuralKind) -> Result<&'de str> {
        match self.token {
            Token::Text(text) => Ok(text),
            _ => Err(self.mismatch(wanted)),
        }
    }

    fn elements(&self) -> Result<&'de str> {
        match self.token {
            Token::Collection(elements) | Token::Text(elements) => Ok(elements),
            Token::Object(_) => Err(self.mismatch(StructuralKind::Sequence)),
        }
    }

    fn stream(&self, wanted: StructuralKind) -> Result<&'de str> {
        match self.token {
            Token::Object(stream) | Token::Text(stream) => Ok(stream),
            Token::Collection(_) => Err(self.mismatch(wanted)),
        }
    }
}

macro_rules! deserialize_scalar {
    ($method:ident => $visit:ident, $kind:ident) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: Visitor<'de>,
        {
            let text = self.inline(StructuralKind::Scalar(ScalarKind::$kind))?;
            visitor.$visit(scalar::decode(text, ScalarKind::$kind)?)
        }
    };
}

impl<'de> de::Deserializer<'de> for Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.token {
            Token::Text(text) if scalar::is_null(text) => visitor.visit_unit(),
            Token::Text(text) => visitor.visit_borrowed_str(text),
            Token::Collection(_) => self.deserialize_seq(visitor),
            Token::Object(_) => self.deserialize_map(visitor),
        }
    }

    deserialize_scalar!(deserialize_bool => visit_bool, Bool);
    deserialize_scalar!(deserialize_i8 => visit_i8, I8);
    deserialize_scalar!(deserialize_i16 => visit_i16, I16);
    deserialize_scalar!(deserialize_i32 => visit_i32, I32);
    deserialize_scalar!(deserialize_i64 => visit_i64, I64);
    deserialize_scalar!(deserialize_u8 => visit_u8, U8);
    deserialize_scalar!(deserialize_u16 => visit_u16, U16);
    deserialize_scalar!(deserialize_u32 => visit_u32, U32);
    deserialize_scalar!(deserialize_u64 => visit_u64, U64);
    deserialize_scalar!(deserialize_f32 => visit_f32, F32);
    deserialize_scalar!(deserialize_f64 => visit_f64, F64);

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let text = self.inline(StructuralKind::Scalar(ScalarKind::Char))?;
        visitor.visit_char(scalar::decode_char(text)?)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let text = self.inline(StructuralKind::Scalar(ScalarKind::Text))?;
        visitor.visit_borrowed_str(text)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let bytes = format::split(self.elements()?, OBJECT_SEPARATOR)
            .map(|byte| scalar::decode::<u8>(byte, ScalarKind::U8))
            .collect::<Result<Vec<_>>>()?;
        visitor.visit_byte_buf(bytes)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.token {
            Token::Text(text) if scalar::is_null(text) => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let text = self.inline(StructuralKind::Scalar(ScalarKind::Null))?;
        if scalar::is_null(text) {
            visitor.visit_unit()
        } else {
            Err(Error::format(ScalarKind::Null, text))
        }
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

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let elements = self.elements()?;
        visitor.visit_seq(ElementAccess {
            elements: format::split(elements, OBJECT_SEPARATOR),
            parent: &self,
        })
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let stream = self.stream(StructuralKind::Mapping)?;
        let separator = self.nesting.separator()?;
        debug!("decoding mapping at depth {}", self.nesting.depth());

        visitor.visit_map(EntryAccess {
            entries: format::split(stream, separator),
            parent: &self,
            value: None,
        })
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let stream = self.stream(StructuralKind::Composite)?;
        let separator = self.nesting.separator()?;
        debug!("decoding `{}` at depth {}", name, self.nesting.depth());

        visitor.visit_map(FieldAccess {
            tokens: format::split(stream, separator),
            composite: name,
            fields,
            parent: &self,
            value: None,
        })
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let text = self.inline(StructuralKind::Enum)?;
        visitor.visit_enum(BorrowedStrDeserializer::<Error>::new(text))
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
        visitor.visit_unit()
    }
}

/// Sequence elements, framed at the same level as the sequence itself.
struct ElementAccess<'a, 'de> {
    elements: std::str::Split<'de, char>,
    parent: &'a Deserializer<'de>,
}

impl<'de> de::SeqAccess<'de> for ElementAccess<'_, 'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        match self.elements.next() {
            Some(element) => seed
                .deserialize(
                    self.parent
                        .nested(Token::Text(element), self.parent.nesting),
                )
                .map(Some),
            None => Ok(None),
        }
    }
}

/// `key=value` entries of a mapping.
struct EntryAccess<'a, 'de> {
    entries: std::str::Split<'de, char>,
    parent: &'a Deserializer<'de>,
    value: Option<&'de str>,
}

impl<'de> de::MapAccess<'de> for EntryAccess<'_, 'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        let entry = match self.entries.next() {
            Some(entry) => entry,
            None => return Ok(None),
        };
        let (key, value) = entry.split_once(KEY_VALUE_SEPARATOR).ok_or_else(|| {
            Error::malformed(format!("mapping entry {:?} has no key/value separator", entry))
        })?;

        self.value = Some(value);
        seed.deserialize(
            self.parent
                .nested(Token::Text(key), self.parent.nesting.descend()),
        )
        .map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        let value = self
            .value
            .take()
            .ok_or_else(|| Error::custom("next_value_seed called before next_key_seed"))?;
        seed.deserialize(
            self.parent
                .nested(Token::Text(value), self.parent.nesting.descend()),
        )
    }
}

/// Field tokens of a composite.
struct FieldAccess<'a, 'de> {
    tokens: std::str::Split<'de, char>,
    composite: &'static str,
    fields: &'static [&'static str],
    parent: &'a Deserializer<'de>,
    value: Option<Token<'de>>,
}

impl<'de> de::MapAccess<'de> for FieldAccess<'_, 'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        let token = match self.tokens.next() {
            Some(token) => token,
            None => return Ok(None),
        };
        let (name, value) = route(token)?;

        if self.parent.deny_unknown_fields && !self.fields.contains(&name) {
            return Err(Error::unknown_field(name, self.fields));
        }
        trace!(
            "{}.{} routed as {}",
            self.composite,
            name,
            value.describe()
        );

        self.value = Some(value);
        seed.deserialize(BorrowedStrDeserializer::<Error>::new(name))
            .map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        let value = self
            .value
            .take()
            .ok_or_else(|| Error::custom("next_value_seed called before next_key_seed"))?;
        seed.deserialize(self.parent.nested(value, self.parent.nesting.descend()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Pack {
        option: String,
        price: f64,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Holder {
        packs: Vec<Pack>,
        pack: Option<Pack>,
        prices: HashMap<String, f64>,
    }

    #[test]
    fn test_route_precedence() {
        assert_eq!(
            route("tags\u{1d}a\u{1e}b"),
            Ok(("tags", Token::Collection("a\u{1e}b")))
        );
        assert_eq!(
            route("inner\u{1e}x=1"),
            Ok(("inner", Token::Object("x=1")))
        );
        assert_eq!(route("x=a=b"), Ok(("x", Token::Text("a=b"))));

        // GS wins even when RS comes first
        assert_eq!(
            route("m\u{1e}k\u{1d}v"),
            Ok(("m\u{1e}k", Token::Collection("v")))
        );
    }

    #[test]
    fn test_route_rejects_bare_tokens() {
        assert!(matches!(route("justaname"), Err(Error::MalformedEncoding(_))));
        assert!(matches!(route("=1"), Err(Error::MalformedEncoding(_))));
    }

    #[test]
    fn test_nested_levels() {
        let input = "packs\u{1d}option=a\u{b4}price=1\u{1e}option=b\u{b4}price=2\
                     \u{b3}pack\u{1e}option=c\u{b4}price=3\
                     \u{b3}prices\u{1e}x=1.5\u{b4}y=2.5";
        let holder: Holder = de::Deserialize::deserialize(Deserializer::from_str(input)).unwrap();

        assert_eq!(holder.packs.len(), 2);
        assert_eq!(holder.packs[1].option, "b");
        assert_eq!(
            holder.pack,
            Some(Pack {
                option: "c".to_string(),
                price: 3.0
            })
        );
        assert_eq!(holder.prices.get("y"), Some(&2.5));
    }

    #[test]
    fn test_kind_mismatch_is_malformed() {
        let result: Result<Holder> =
            de::Deserialize::deserialize(Deserializer::from_str("packs\u{1e}option=a"));
        assert!(matches!(result, Err(Error::MalformedEncoding(_))));
    }

    #[test]
    fn test_entry_without_separator() {
        let result: Result<HashMap<String, i32>> =
            de::Deserialize::deserialize(Deserializer::from_str("a=1\u{b3}b"));
        assert!(matches!(result, Err(Error::MalformedEncoding(_))));
    }

    #[test]
    fn test_depth_limit() {
        let options = CodecOptions::new().with_max_depth(0);
        let input = "packs\u{1d}option=a\u{b4}price=1\u{b3}pack=null\u{b3}prices\u{1e}";
        let result: Result<Holder> =
            de::Deserialize::deserialize(Deserializer::with_options(input, options));
        assert_eq!(result, Err(Error::depth_limit(1, 0)));
    }
}
