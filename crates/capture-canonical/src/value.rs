//! The canonical value tree and conversions into it.
//!
//! [`CanonicalValue`] is a closed sum type over the six JSON shapes, so the
//! encoder in [`crate::canonicalizer`] matches every case exhaustively.
//! Objects are `BTreeMap`s: key order is fixed by construction at every
//! nesting level, independent of the order fields were inserted or
//! serialized.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{self, Impossible, Serialize};
use serde_json::{Number, Value};

use crate::canonicalizer::CanonicalizationError;

/// Struct name `serde_json::Number` serializes under when it carries its
/// literal text (the `arbitrary_precision` feature).
const NUMBER_TOKEN: &str = "$serde_json::private::Number";

/// A structured value ready for canonical encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalValue {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// Finite JSON number.
    Number(Number),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence; element order is significant.
    Array(Vec<CanonicalValue>),
    /// Mapping with keys ordered byte-wise.
    Object(BTreeMap<String, CanonicalValue>),
}

impl From<&Value> for CanonicalValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => CanonicalValue::Null,
            Value::Bool(b) => CanonicalValue::Bool(*b),
            Value::Number(n) => CanonicalValue::Number(n.clone()),
            Value::String(s) => CanonicalValue::String(s.clone()),
            Value::Array(items) => {
                CanonicalValue::Array(items.iter().map(CanonicalValue::from).collect())
            }
            Value::Object(map) => CanonicalValue::Object(
                map.iter()
                    .map(|(key, child)| (key.clone(), CanonicalValue::from(child)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for CanonicalValue {
    fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CanonicalValue::Null => serializer.serialize_unit(),
            CanonicalValue::Bool(b) => serializer.serialize_bool(*b),
            CanonicalValue::Number(n) => n.serialize(serializer),
            CanonicalValue::String(s) => serializer.serialize_str(s),
            CanonicalValue::Array(items) => items.serialize(serializer),
            CanonicalValue::Object(map) => map.serialize(serializer),
        }
    }
}

impl From<Value> for CanonicalValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => CanonicalValue::Null,
            Value::Bool(b) => CanonicalValue::Bool(b),
            Value::Number(n) => CanonicalValue::Number(n),
            Value::String(s) => CanonicalValue::String(s),
            Value::Array(items) => {
                CanonicalValue::Array(items.into_iter().map(CanonicalValue::from).collect())
            }
            Value::Object(map) => CanonicalValue::Object(
                map.into_iter()
                    .map(|(key, child)| (key, CanonicalValue::from(child)))
                    .collect(),
            ),
        }
    }
}

/// Builds a [`CanonicalValue`] from any serializable type.
///
/// Unlike `serde_json::to_value`, this refuses inputs that have no single
/// canonical JSON form instead of coercing them: byte blobs, NaN and
/// infinities, non-string map keys and duplicate keys all fail with a
/// [`CanonicalizationError`] naming the offending path. Integers stay exact
/// up to 128 bits.
pub fn to_canonical_value<T>(value: &T) -> Result<CanonicalValue, CanonicalizationError>
where
    T: Serialize + ?Sized,
{
    value.serialize(ValueSerializer { path: Path::root() })
}

/// Helper for building paths in error messages.
#[derive(Debug, Clone)]
struct Path {
    segments: Vec<String>,
}

impl Path {
    fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    fn push_field(&self, field: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(field.to_string());
        Self { segments }
    }

    fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(format!("[{}]", index));
        Self { segments }
    }

    fn unsupported(&self, reason: &'static str) -> CanonicalizationError {
        CanonicalizationError::UnsupportedValue {
            path: self.to_string(),
            reason,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "root")
        } else {
            write!(f, "{}", self.segments.join("."))
        }
    }
}

struct ValueSerializer {
    path: Path,
}

impl ser::Serializer for ValueSerializer {
    type Ok = CanonicalValue;
    type Error = CanonicalizationError;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = VariantSeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = VariantMapBuilder;

    fn serialize_bool(self, v: bool) -> Result<CanonicalValue, Self::Error> {
        Ok(CanonicalValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<CanonicalValue, Self::Error> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<CanonicalValue, Self::Error> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<CanonicalValue, Self::Error> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<CanonicalValue, Self::Error> {
        Ok(CanonicalValue::Number(v.into()))
    }

    fn serialize_i128(self, v: i128) -> Result<CanonicalValue, Self::Error> {
        Number::from_i128(v)
            .map(CanonicalValue::Number)
            .ok_or_else(|| self.path.unsupported("integer too wide"))
    }

    fn serialize_u8(self, v: u8) -> Result<CanonicalValue, Self::Error> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<CanonicalValue, Self::Error> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<CanonicalValue, Self::Error> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<CanonicalValue, Self::Error> {
        Ok(CanonicalValue::Number(v.into()))
    }

    fn serialize_u128(self, v: u128) -> Result<CanonicalValue, Self::Error> {
        Number::from_u128(v)
            .map(CanonicalValue::Number)
            .ok_or_else(|| self.path.unsupported("integer too wide"))
    }

    fn serialize_f32(self, v: f32) -> Result<CanonicalValue, Self::Error> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<CanonicalValue, Self::Error> {
        Number::from_f64(v)
            .map(CanonicalValue::Number)
            .ok_or_else(|| self.path.unsupported("non-finite number"))
    }

    fn serialize_char(self, v: char) -> Result<CanonicalValue, Self::Error> {
        Ok(CanonicalValue::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<CanonicalValue, Self::Error> {
        Ok(CanonicalValue::String(v.to_string()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<CanonicalValue, Self::Error> {
        Err(self
            .path
            .unsupported("binary data must be encoded as a string first"))
    }

    fn serialize_none(self) -> Result<CanonicalValue, Self::Error> {
        Ok(CanonicalValue::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(
        self,
        value: &T,
    ) -> Result<CanonicalValue, Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<CanonicalValue, Self::Error> {
        Ok(CanonicalValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<CanonicalValue, Self::Error> {
        Ok(CanonicalValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<CanonicalValue, Self::Error> {
        Ok(CanonicalValue::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<CanonicalValue, Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<CanonicalValue, Self::Error> {
        let inner = value.serialize(ValueSerializer {
            path: self.path.push_field(variant),
        })?;
        let mut map = BTreeMap::new();
        map.insert(variant.to_string(), inner);
        Ok(CanonicalValue::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, Self::Error> {
        Ok(SeqBuilder {
            path: self.path,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantSeqBuilder, Self::Error> {
        Ok(VariantSeqBuilder {
            variant,
            seq: SeqBuilder {
                path: self.path.push_field(variant),
                items: Vec::with_capacity(len),
            },
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapBuilder, Self::Error> {
        Ok(MapBuilder {
            path: self.path,
            entries: BTreeMap::new(),
            pending_key: None,
            number_literal: false,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<MapBuilder, Self::Error> {
        let mut builder = self.serialize_map(Some(len))?;
        builder.number_literal = name == NUMBER_TOKEN;
        Ok(builder)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<VariantMapBuilder, Self::Error> {
        Ok(VariantMapBuilder {
            variant,
            map: MapBuilder {
                path: self.path.push_field(variant),
                entries: BTreeMap::new(),
                pending_key: None,
                number_literal: false,
            },
        })
    }
}

struct SeqBuilder {
    path: Path,
    items: Vec<CanonicalValue>,
}

impl SeqBuilder {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CanonicalizationError> {
        let path = self.path.push_index(self.items.len());
        self.items.push(value.serialize(ValueSerializer { path })?);
        Ok(())
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = CanonicalValue;
    type Error = CanonicalizationError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<CanonicalValue, Self::Error> {
        Ok(CanonicalValue::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = CanonicalValue;
    type Error = CanonicalizationError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<CanonicalValue, Self::Error> {
        Ok(CanonicalValue::Array(self.items))
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = CanonicalValue;
    type Error = CanonicalizationError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<CanonicalValue, Self::Error> {
        Ok(CanonicalValue::Array(self.items))
    }
}

struct VariantSeqBuilder {
    variant: &'static str,
    seq: SeqBuilder,
}

impl ser::SerializeTupleVariant for VariantSeqBuilder {
    type Ok = CanonicalValue;
    type Error = CanonicalizationError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.seq.push(value)
    }

    fn end(self) -> Result<CanonicalValue, Self::Error> {
        let mut map = BTreeMap::new();
        map.insert(
            self.variant.to_string(),
            CanonicalValue::Array(self.seq.items),
        );
        Ok(CanonicalValue::Object(map))
    }
}

struct MapBuilder {
    path: Path,
    entries: BTreeMap<String, CanonicalValue>,
    pending_key: Option<String>,
    number_literal: bool,
}

impl MapBuilder {
    /// Rebuilds a `serde_json::Number` from the literal it serialized.
    fn into_number(mut self) -> Result<CanonicalValue, CanonicalizationError> {
        match self.entries.remove(NUMBER_TOKEN) {
            Some(CanonicalValue::String(literal)) => literal
                .parse::<Number>()
                .map(CanonicalValue::Number)
                .map_err(|_| CanonicalizationError::InvalidNumber(literal)),
            _ => Err(CanonicalizationError::InvalidStructure(format!(
                "{}: number without a literal",
                self.path
            ))),
        }
    }

    fn insert<T: ?Sized + Serialize>(
        &mut self,
        key: String,
        value: &T,
    ) -> Result<(), CanonicalizationError> {
        let path = self.path.push_field(&key);
        if self.entries.contains_key(&key) {
            return Err(CanonicalizationError::DuplicateKey(path.to_string()));
        }
        let child = value.serialize(ValueSerializer { path })?;
        self.entries.insert(key, child);
        Ok(())
    }
}

impl ser::SerializeMap for MapBuilder {
    type Ok = CanonicalValue;
    type Error = CanonicalizationError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Self::Error> {
        let key = key.serialize(KeySerializer { path: &self.path })?;
        self.pending_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        let key = self.pending_key.take().ok_or_else(|| {
            CanonicalizationError::InvalidStructure(format!(
                "{}: map value serialized before its key",
                self.path
            ))
        })?;
        self.insert(key, value)
    }

    fn end(self) -> Result<CanonicalValue, Self::Error> {
        Ok(CanonicalValue::Object(self.entries))
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = CanonicalValue;
    type Error = CanonicalizationError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<CanonicalValue, Self::Error> {
        if self.number_literal {
            return self.into_number();
        }
        Ok(CanonicalValue::Object(self.entries))
    }
}

struct VariantMapBuilder {
    variant: &'static str,
    map: MapBuilder,
}

impl ser::SerializeStructVariant for VariantMapBuilder {
    type Ok = CanonicalValue;
    type Error = CanonicalizationError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.map.insert(key.to_string(), value)
    }

    fn end(self) -> Result<CanonicalValue, Self::Error> {
        let mut outer = BTreeMap::new();
        outer.insert(
            self.variant.to_string(),
            CanonicalValue::Object(self.map.entries),
        );
        Ok(CanonicalValue::Object(outer))
    }
}

/// Accepts only string-like map keys.
struct KeySerializer<'a> {
    path: &'a Path,
}

impl KeySerializer<'_> {
    fn reject(&self) -> CanonicalizationError {
        self.path.unsupported("map keys must be strings")
    }
}

macro_rules! reject_scalar_keys {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method(self, _v: $ty) -> Result<String, CanonicalizationError> {
                Err(self.reject())
            }
        )*
    };
}

impl ser::Serializer for KeySerializer<'_> {
    type Ok = String;
    type Error = CanonicalizationError;

    type SerializeSeq = Impossible<String, CanonicalizationError>;
    type SerializeTuple = Impossible<String, CanonicalizationError>;
    type SerializeTupleStruct = Impossible<String, CanonicalizationError>;
    type SerializeTupleVariant = Impossible<String, CanonicalizationError>;
    type SerializeMap = Impossible<String, CanonicalizationError>;
    type SerializeStruct = Impossible<String, CanonicalizationError>;
    type SerializeStructVariant = Impossible<String, CanonicalizationError>;

    fn serialize_str(self, v: &str) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<String, Self::Error> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String, Self::Error> {
        value.serialize(self)
    }

    reject_scalar_keys! {
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_i128: i128,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_u128: u128,
        serialize_f32: f32,
        serialize_f64: f64,
        serialize_bytes: &[u8],
    }

    fn serialize_none(self) -> Result<String, Self::Error> {
        Err(self.reject())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<String, Self::Error> {
        Err(self.reject())
    }

    fn serialize_unit(self) -> Result<String, Self::Error> {
        Err(self.reject())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String, Self::Error> {
        Err(self.reject())
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, Self::Error> {
        Err(self.reject())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(self.reject())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(self.reject())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(self.reject())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(self.reject())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(self.reject())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Err(self.reject())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(self.reject())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn json_conversion_keeps_array_order() {
        let value = CanonicalValue::from(&json!([3, 1, 2]));
        let CanonicalValue::Array(items) = value else {
            panic!("expected array");
        };
        let numbers: Vec<_> = items
            .iter()
            .map(|item| match item {
                CanonicalValue::Number(n) => n.as_i64().unwrap(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(numbers, vec![3, 1, 2]);
    }

    #[test]
    fn serializer_matches_json_conversion() {
        #[derive(serde::Serialize)]
        struct Capture {
            event_id: &'static str,
            count: u32,
            tags: Vec<&'static str>,
            note: Option<String>,
        }

        let capture = Capture {
            event_id: "event-001",
            count: 2,
            tags: vec!["b", "a"],
            note: None,
        };
        let from_serde = to_canonical_value(&capture).unwrap();
        let from_json = CanonicalValue::from(serde_json::to_value(&capture).unwrap());
        assert_eq!(from_serde, from_json);
    }

    #[test]
    fn embedded_json_numbers_keep_their_literal() {
        let payload: Value =
            serde_json::from_str(r#"{"big":18446744073709551616,"small":-3,"f":2.5}"#).unwrap();
        let from_serde = to_canonical_value(&json_like(payload.clone())).unwrap();
        assert_eq!(
            from_serde,
            CanonicalValue::from(json!({ "payload": payload }))
        );
    }

    #[test]
    fn rejects_non_string_keys_with_path() {
        let mut inner = HashMap::new();
        inner.insert(7u32, "seven");
        let err = to_canonical_value(&json_like(inner)).unwrap_err();
        match err {
            CanonicalizationError::UnsupportedValue { path, .. } => assert_eq!(path, "payload"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn rejects_nan_inside_array() {
        let err = to_canonical_value(&vec![1.0, f64::NAN]).unwrap_err();
        match err {
            CanonicalizationError::UnsupportedValue { path, reason } => {
                assert_eq!(path, "[1]");
                assert_eq!(reason, "non-finite number");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn wide_integers_stay_exact() {
        let value = to_canonical_value(&(u128::MAX, i128::MIN)).unwrap();
        let CanonicalValue::Array(items) = value else {
            panic!("expected array");
        };
        let rendered: Vec<String> = items
            .iter()
            .map(|item| match item {
                CanonicalValue::Number(n) => n.to_string(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(rendered, vec![u128::MAX.to_string(), i128::MIN.to_string()]);
    }

    #[derive(serde::Serialize)]
    struct Wrapper<T> {
        payload: T,
    }

    fn json_like<T>(payload: T) -> Wrapper<T> {
        Wrapper { payload }
    }
}
