//! # Canonical Serialization: JCS-Compatible Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! used in digest computation across cstamp.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only ways to
//! construct it are [`CanonicalBytes::new()`] (all keys, sorted) and
//! [`CanonicalBytes::with_field_order()`] (a fixed allow-list, in order).
//! Any function requiring canonical bytes for digest computation accepts
//! `&CanonicalBytes`, so the "wrong serialization path" defect class is
//! structurally impossible.
//!
//! ## Rules
//!
//! 1. **Objects**: keys sorted by UTF-16 code units (RFC 8785), recursively.
//! 2. **Arrays**: element order preserved, elements canonicalized.
//! 3. **Numbers**: ECMAScript shortest round-trip form. NaN and infinities
//!    are rejected before lowering to `serde_json::Value`, which would
//!    otherwise turn them into `null`.
//! 4. **Timestamps**: serialized through [`Timestamp`](crate::Timestamp),
//!    which always renders UTC with millisecond precision and `Z` suffix.
//! 5. **Absent fields**: omitted entirely. Types that model optional fields
//!    use `skip_serializing_if = "Option::is_none"`; an explicit `null` in a
//!    payload stays `null`.
//!
//! Unordered collections (`HashSet`) serialize in iteration order and must
//! not be used in payloads; `BTreeSet` and `Vec` are deterministic.

use std::fmt;

use serde::{ser, Serialize};
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS-compatible canonicalization.
///
/// # Invariants
///
/// - Constructed only by [`CanonicalBytes::new()`] or
///   [`CanonicalBytes::with_field_order()`].
/// - Length never exceeds `u32::MAX`, so the digest length prefix is exact.
/// - Serialization uses sorted keys with compact separators (RFC 8785),
///   except for the top level of a field-ordered record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// All object keys are emitted, sorted, at every nesting level.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::NonFinite` for NaN or infinite floats,
    /// `CanonicalizationError::SerializationFailed` if the value cannot
    /// be lowered to JSON (e.g. a map with non-string keys), and
    /// `CanonicalizationError::TooLarge` if the result exceeds `u32::MAX` bytes.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = to_json_value(obj)?;
        let bytes = serialize_canonical(&value)?;
        Self::checked(bytes)
    }

    /// Construct canonical bytes for a record with a pinned field set.
    ///
    /// Only the fields named in `fields` are emitted, in exactly that order;
    /// each field value is canonicalized recursively with sorted keys. Fields
    /// the record does not carry are skipped, so adding an optional field to a
    /// later record type does not change the bytes of records without it.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::NotAnObject` if `obj` does not
    /// serialize to a JSON object, plus the errors of [`CanonicalBytes::new()`].
    pub fn with_field_order(
        obj: &impl Serialize,
        fields: &[&str],
    ) -> Result<Self, CanonicalizationError> {
        let map = match to_json_value(obj)? {
            Value::Object(map) => map,
            other => return Err(CanonicalizationError::NotAnObject(json_kind(&other))),
        };

        let mut out = Vec::with_capacity(128);
        out.push(b'{');
        let mut first = true;
        for field in fields {
            let Some(value) = map.get(*field) else {
                continue;
            };
            if !first {
                out.push(b',');
            }
            first = false;
            out.extend_from_slice(&serialize_canonical(&Value::from(*field))?);
            out.push(b':');
            out.extend_from_slice(&serialize_canonical(value)?);
        }
        out.push(b'}');
        Self::checked(out)
    }

    fn checked(bytes: Vec<u8>) -> Result<Self, CanonicalizationError> {
        if u32::try_from(bytes.len()).is_err() {
            return Err(CanonicalizationError::TooLarge(bytes.len()));
        }
        Ok(Self(bytes))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The 4-byte big-endian length marker hashed ahead of the bytes.
    pub fn length_prefix(&self) -> [u8; 4] {
        // Length is bounded by `checked()`.
        (self.0.len() as u32).to_be_bytes()
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Lower a serializable value to `serde_json::Value`, rejecting NaN and
/// infinities instead of letting them collapse into `null`.
pub fn to_json_value(obj: &impl Serialize) -> Result<Value, CanonicalizationError> {
    if let Err(ScanError::NonFinite(f)) = obj.serialize(FiniteScan) {
        return Err(CanonicalizationError::NonFinite(f));
    }
    Ok(serde_json::to_value(obj)?)
}

/// Serializer that visits every value and fails at the first non-finite float.
/// Other failures are left for `serde_json` to report.
#[derive(Clone, Copy)]
struct FiniteScan;

#[derive(Debug)]
enum ScanError {
    NonFinite(f64),
    Custom(String),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite(v) => write!(f, "non-finite number {v}"),
            Self::Custom(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ScanError {}

impl ser::Error for ScanError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}

macro_rules! accept_scalars {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(self, _: $ty) -> Result<(), ScanError> {
                Ok(())
            }
        )*
    };
}

impl ser::Serializer for FiniteScan {
    type Ok = ();
    type Error = ScanError;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    accept_scalars!(
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
        serialize_unit_struct(&'static str),
    );

    fn serialize_f32(self, v: f32) -> Result<(), ScanError> {
        <Self as ser::Serializer>::serialize_f64(self, f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), ScanError> {
        if v.is_finite() {
            Ok(())
        } else {
            Err(ScanError::NonFinite(v))
        }
    }

    fn serialize_none(self) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), ScanError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<(), ScanError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<(), ScanError> {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self, ScanError> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> Result<Self, ScanError> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, ScanError> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, ScanError> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self, ScanError> {
        Ok(self)
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, ScanError> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, ScanError> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteScan {
    type Ok = ();
    type Error = ScanError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ScanError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanError> {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteScan {
    type Ok = ();
    type Error = ScanError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ScanError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanError> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteScan {
    type Ok = ();
    type Error = ScanError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ScanError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanError> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteScan {
    type Ok = ();
    type Error = ScanError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ScanError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanError> {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteScan {
    type Ok = ();
    type Error = ScanError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), ScanError> {
        key.serialize(*self)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ScanError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanError> {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteScan {
    type Ok = ();
    type Error = ScanError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), ScanError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanError> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteScan {
    type Ok = ();
    type Error = ScanError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), ScanError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanError> {
        Ok(())
    }
}

/// Serialize a JSON value in JCS-canonical form (RFC 8785).
fn serialize_canonical(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    let s = serde_jcs::to_string(value)?;
    Ok(s.into_bytes())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};

    fn canonical_str(cb: &CanonicalBytes) -> &str {
        std::str::from_utf8(cb.as_bytes()).unwrap()
    }

    #[test]
    fn test_canonical_bytes_simple_dict() {
        let data = serde_json::json!({"b": 2, "a": 1, "c": "hello"});
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        assert_eq!(canonical_str(&cb), r#"{"a":1,"b":2,"c":"hello"}"#);
    }

    #[test]
    fn test_canonical_bytes_nested() {
        let data = serde_json::json!({
            "outer": {"b": 2, "a": 1},
            "list": [3, 2, 1]
        });
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        // Nested objects are sorted, arrays keep their order.
        assert_eq!(canonical_str(&cb), r#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn test_objects_inside_arrays_are_sorted() {
        let data = serde_json::json!([{"z": 1, "a": 2}, {"y": [{"d": 0, "c": 0}]}]);
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(canonical_str(&cb), r#"[{"a":2,"z":1},{"y":[{"c":0,"d":0}]}]"#);
    }

    #[test]
    fn test_insertion_order_is_irrelevant() {
        let mut forward = serde_json::Map::new();
        forward.insert("alpha".into(), serde_json::json!(1));
        forward.insert("beta".into(), serde_json::json!({"x": 1, "y": 2}));
        let mut reverse = serde_json::Map::new();
        reverse.insert("beta".into(), serde_json::json!({"y": 2, "x": 1}));
        reverse.insert("alpha".into(), serde_json::json!(1));

        let a = CanonicalBytes::new(&Value::Object(forward)).unwrap();
        let b = CanonicalBytes::new(&Value::Object(reverse)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_hashmap_and_btreemap_agree() {
        let mut hashed = HashMap::new();
        let mut ordered = BTreeMap::new();
        for (k, v) in [("q", 1), ("b", 2), ("m", 3), ("a", 4)] {
            hashed.insert(k, v);
            ordered.insert(k, v);
        }
        assert_eq!(
            CanonicalBytes::new(&hashed).unwrap(),
            CanonicalBytes::new(&ordered).unwrap()
        );
    }

    #[test]
    fn test_finite_floats_use_shortest_form() {
        let data = serde_json::json!({"ratio": 1.5, "whole": 2.0, "tiny": 1e-7});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(canonical_str(&cb), r#"{"ratio":1.5,"tiny":1e-7,"whole":2}"#);
    }

    #[test]
    fn test_null_passthrough() {
        let data = serde_json::json!({"key": null});
        let cb = CanonicalBytes::new(&data).expect("null should pass through");
        assert_eq!(canonical_str(&cb), r#"{"key":null}"#);
    }

    #[test]
    fn test_absent_option_is_omitted() {
        #[derive(Serialize)]
        struct Record {
            kind: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            note: Option<String>,
        }
        let cb = CanonicalBytes::new(&Record { kind: "x", note: None }).unwrap();
        assert_eq!(canonical_str(&cb), r#"{"kind":"x"}"#);
    }

    #[test]
    fn test_non_string_keys_rejected() {
        let mut map = BTreeMap::new();
        map.insert((1u8, 2u8), "pair");
        let result = CanonicalBytes::new(&map);
        assert!(matches!(
            result,
            Err(CanonicalizationError::SerializationFailed(_))
        ));
    }

    #[test]
    fn test_nan_field_rejected() {
        #[derive(Serialize)]
        struct Reading {
            x: f64,
        }
        let err = CanonicalBytes::new(&Reading { x: f64::NAN }).unwrap_err();
        assert!(matches!(err, CanonicalizationError::NonFinite(f) if f.is_nan()));
    }

    #[test]
    fn test_top_level_infinity_rejected() {
        let err = CanonicalBytes::new(&f64::INFINITY).unwrap_err();
        assert!(matches!(err, CanonicalizationError::NonFinite(f) if f == f64::INFINITY));
        assert!(CanonicalBytes::new(&f32::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_nested_non_finite_rejected() {
        let mut inner = BTreeMap::new();
        inner.insert("readings", vec![Some(1.0), None, Some(f64::NAN)]);
        let err = CanonicalBytes::new(&inner).unwrap_err();
        assert!(matches!(err, CanonicalizationError::NonFinite(_)));
    }

    #[test]
    fn test_nan_does_not_collide_with_null() {
        let null = CanonicalBytes::new(&serde_json::json!({"x": null})).unwrap();
        assert_eq!(canonical_str(&null), r#"{"x":null}"#);
        let nan: Option<f64> = Some(f64::NAN);
        assert!(CanonicalBytes::new(&BTreeMap::from([("x", nan)])).is_err());
    }

    #[test]
    fn test_field_order_rejects_non_finite() {
        let record = BTreeMap::from([("a", f64::NEG_INFINITY)]);
        let err = CanonicalBytes::with_field_order(&record, &["a"]).unwrap_err();
        assert!(matches!(err, CanonicalizationError::NonFinite(_)));
    }

    #[test]
    fn test_to_json_value_keeps_finite_floats() {
        let value = to_json_value(&BTreeMap::from([("x", 0.25f64)])).unwrap();
        assert_eq!(value, serde_json::json!({"x": 0.25}));
    }

    #[test]
    fn test_empty_object() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        assert_eq!(cb.length_prefix(), [0, 0, 0, 2]);
    }

    #[test]
    fn test_string_value() {
        let cb = CanonicalBytes::new(&"hello world").expect("string should work");
        assert_eq!(cb.as_bytes(), b"\"hello world\"");
    }

    #[test]
    fn test_unicode_passthrough() {
        let data = serde_json::json!({"name": "\u{00e9}\u{00e8}"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert!(canonical_str(&cb).contains('\u{00e9}'));
    }

    // ---- field-ordered records ----

    #[test]
    fn test_field_order_is_pinned() {
        let data = serde_json::json!({"a": 1, "b": 2, "c": 3});
        let cb = CanonicalBytes::with_field_order(&data, &["c", "a", "b"]).unwrap();
        assert_eq!(canonical_str(&cb), r#"{"c":3,"a":1,"b":2}"#);
    }

    #[test]
    fn test_field_order_drops_unlisted_fields() {
        let data = serde_json::json!({"a": 1, "extra": true});
        let cb = CanonicalBytes::with_field_order(&data, &["a"]).unwrap();
        assert_eq!(canonical_str(&cb), r#"{"a":1}"#);
    }

    #[test]
    fn test_field_order_skips_missing_fields() {
        let data = serde_json::json!({"type": "auth"});
        let cb = CanonicalBytes::with_field_order(&data, &["type", "holders"]).unwrap();
        assert_eq!(canonical_str(&cb), r#"{"type":"auth"}"#);
    }

    #[test]
    fn test_field_order_canonicalizes_nested_values() {
        let data = serde_json::json!({"meta": {"z": 0, "a": 0}});
        let cb = CanonicalBytes::with_field_order(&data, &["meta"]).unwrap();
        assert_eq!(canonical_str(&cb), r#"{"meta":{"a":0,"z":0}}"#);
    }

    #[test]
    fn test_field_order_explicit_null_is_kept() {
        let data = serde_json::json!({"a": null});
        let cb = CanonicalBytes::with_field_order(&data, &["a"]).unwrap();
        assert_eq!(canonical_str(&cb), r#"{"a":null}"#);
    }

    #[test]
    fn test_field_order_rejects_non_object() {
        let err = CanonicalBytes::with_field_order(&vec![1, 2], &["a"]).unwrap_err();
        assert!(matches!(err, CanonicalizationError::NotAnObject("array")));
    }
}
