//! Record Flattening - turns a `Serialize` record into a [`QueryDictionary`]
//!
//! A record's `Serialize` implementation (usually `#[derive(Serialize)]`) is the
//! contract that visits its named fields. Each field is captured as one scalar
//! parameter under its field name. Only one flat level is supported: a field that
//! serializes as a sequence, map, struct or data-carrying enum variant is rejected
//! with [`QueryParameterError::UnsupportedShape`] instead of being dropped.
//!
//! Field states map onto the dictionary as follows:
//! - `None` / unit: present, renders `field = NULL`
//! - [`Omittable::Omitted`](crate::Omittable) or `#[serde(skip_serializing_if)]`: absent
//! - [`datetime`](crate::datetime) fields: date/time parameter (aware values in the session zone)
//! - unit structs other than the omission marker (`PhantomData`, ...): rejected

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::ser::{self, Impossible, Serialize};

use crate::composite::QueryDictionary;
use crate::error::{QueryParameterError, QueryResult};
use crate::option::QueryParameterOption;
use crate::parameter::{BoxedQueryParameter, QueryParameter, QueryText};
use crate::scalar::QueryBytes;

/// Unit struct name marking an omitted field
pub(crate) const OMITTED_TOKEN: &str = "$__elif_query_params_omitted";

/// Newtype struct name marking an RFC 3339 date/time field
pub(crate) const DATETIME_TOKEN: &str = "$__elif_query_params_datetime";

/// Newtype struct name marking a `NaiveDateTime` field
pub(crate) const NAIVE_DATETIME_TOKEN: &str = "$__elif_query_params_naive_datetime";

/// Newtype struct name marking a `NaiveDate` field
pub(crate) const DATE_TOKEN: &str = "$__elif_query_params_date";

/// Newtype struct name marking a `NaiveTime` field
pub(crate) const TIME_TOKEN: &str = "$__elif_query_params_time";

/// Flatten a record into a dictionary keyed by field name
///
/// # Examples
/// ```
/// use elif_query_params::{to_query_dictionary, Omittable};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct UserUpdate {
///     id: u64,
///     label: &'static str,
///     note: Omittable<String>,
/// }
///
/// let update = UserUpdate { id: 7, label: "x", note: Omittable::Omitted };
/// let dict = to_query_dictionary(&update).unwrap();
/// assert_eq!(dict.len(), 2);
/// assert!(!dict.contains_key("note"));
/// ```
pub fn to_query_dictionary<T: Serialize + ?Sized>(value: &T) -> QueryResult<QueryDictionary> {
    value.serialize(RecordSerializer)
}

/// Renders a `Serialize` record as `key = value, ...`
///
/// ```
/// use elif_query_params::{render, Record};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Visit {
///     page: &'static str,
/// }
///
/// assert_eq!(render(&Record(Visit { page: "home" })).unwrap().as_str(), "`page` = 'home'");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Record<T>(pub T);

impl<T: Serialize> QueryParameter for Record<T> {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        to_query_dictionary(&self.0)?.query_parameter(option)
    }
}

fn unsupported(shape: &str, field: Option<&str>) -> QueryParameterError {
    tracing::debug!(
        "Rejecting {} while flattening record{}",
        shape,
        field.map(|f| format!(" field '{}'", f)).unwrap_or_default()
    );
    QueryParameterError::unsupported_shape(shape, field)
}

/// Top-level serializer: accepts structs and string-keyed maps
struct RecordSerializer;

impl ser::Serializer for RecordSerializer {
    type Ok = QueryDictionary;
    type Error = QueryParameterError;

    type SerializeSeq = Impossible<QueryDictionary, QueryParameterError>;
    type SerializeTuple = Impossible<QueryDictionary, QueryParameterError>;
    type SerializeTupleStruct = Impossible<QueryDictionary, QueryParameterError>;
    type SerializeTupleVariant = Impossible<QueryDictionary, QueryParameterError>;
    type SerializeMap = RecordMap;
    type SerializeStruct = RecordFields;
    type SerializeStructVariant = Impossible<QueryDictionary, QueryParameterError>;

    fn serialize_bool(self, _v: bool) -> QueryResult<QueryDictionary> {
        Err(unsupported("bool record", None))
    }

    fn serialize_i8(self, _v: i8) -> QueryResult<QueryDictionary> {
        Err(unsupported("integer record", None))
    }

    fn serialize_i16(self, _v: i16) -> QueryResult<QueryDictionary> {
        Err(unsupported("integer record", None))
    }

    fn serialize_i32(self, _v: i32) -> QueryResult<QueryDictionary> {
        Err(unsupported("integer record", None))
    }

    fn serialize_i64(self, _v: i64) -> QueryResult<QueryDictionary> {
        Err(unsupported("integer record", None))
    }

    fn serialize_i128(self, _v: i128) -> QueryResult<QueryDictionary> {
        Err(unsupported("integer record", None))
    }

    fn serialize_u8(self, _v: u8) -> QueryResult<QueryDictionary> {
        Err(unsupported("integer record", None))
    }

    fn serialize_u16(self, _v: u16) -> QueryResult<QueryDictionary> {
        Err(unsupported("integer record", None))
    }

    fn serialize_u32(self, _v: u32) -> QueryResult<QueryDictionary> {
        Err(unsupported("integer record", None))
    }

    fn serialize_u64(self, _v: u64) -> QueryResult<QueryDictionary> {
        Err(unsupported("integer record", None))
    }

    fn serialize_u128(self, _v: u128) -> QueryResult<QueryDictionary> {
        Err(unsupported("integer record", None))
    }

    fn serialize_f32(self, _v: f32) -> QueryResult<QueryDictionary> {
        Err(unsupported("float record", None))
    }

    fn serialize_f64(self, _v: f64) -> QueryResult<QueryDictionary> {
        Err(unsupported("float record", None))
    }

    fn serialize_char(self, _v: char) -> QueryResult<QueryDictionary> {
        Err(unsupported("char record", None))
    }

    fn serialize_str(self, _v: &str) -> QueryResult<QueryDictionary> {
        Err(unsupported("string record", None))
    }

    fn serialize_bytes(self, _v: &[u8]) -> QueryResult<QueryDictionary> {
        Err(unsupported("bytes record", None))
    }

    fn serialize_none(self) -> QueryResult<QueryDictionary> {
        Err(unsupported("null record", None))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> QueryResult<QueryDictionary> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> QueryResult<QueryDictionary> {
        Err(unsupported("unit record", None))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> QueryResult<QueryDictionary> {
        Err(unsupported("unit record", None))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> QueryResult<QueryDictionary> {
        Err(unsupported("enum record", None))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> QueryResult<QueryDictionary> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> QueryResult<QueryDictionary> {
        Err(unsupported("enum record", None))
    }

    fn serialize_seq(self, _len: Option<usize>) -> QueryResult<Self::SerializeSeq> {
        Err(unsupported("sequence", None))
    }

    fn serialize_tuple(self, _len: usize) -> QueryResult<Self::SerializeTuple> {
        Err(unsupported("tuple", None))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> QueryResult<Self::SerializeTupleStruct> {
        Err(unsupported("tuple struct", None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> QueryResult<Self::SerializeTupleVariant> {
        Err(unsupported("tuple variant", None))
    }

    fn serialize_map(self, _len: Option<usize>) -> QueryResult<Self::SerializeMap> {
        Ok(RecordMap {
            dict: QueryDictionary::new(),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> QueryResult<Self::SerializeStruct> {
        Ok(RecordFields {
            dict: QueryDictionary::new(),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> QueryResult<Self::SerializeStructVariant> {
        Err(unsupported("struct variant", None))
    }
}

/// Scratch space for one record's fields
struct RecordFields {
    dict: QueryDictionary,
}

impl ser::SerializeStruct for RecordFields {
    type Ok = QueryDictionary;
    type Error = QueryParameterError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> QueryResult<()> {
        capture_field(&mut self.dict, key, value)
    }

    fn end(self) -> QueryResult<QueryDictionary> {
        Ok(self.dict)
    }
}

/// Scratch space for a string-keyed map record
struct RecordMap {
    dict: QueryDictionary,
    pending_key: Option<String>,
}

impl ser::SerializeMap for RecordMap {
    type Ok = QueryDictionary;
    type Error = QueryParameterError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> QueryResult<()> {
        self.pending_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> QueryResult<()> {
        let key = self.pending_key.take().ok_or_else(|| {
            QueryParameterError::Serialization("map value serialized before its key".to_string())
        })?;
        capture_field(&mut self.dict, &key, value)
    }

    fn end(self) -> QueryResult<QueryDictionary> {
        Ok(self.dict)
    }
}

fn capture_field<T: Serialize + ?Sized>(
    dict: &mut QueryDictionary,
    key: &str,
    value: &T,
) -> QueryResult<()> {
    match value.serialize(FieldSerializer { field: key })? {
        FieldValue::Value(parameter) => {
            dict.insert_boxed(key, Some(parameter));
        }
        FieldValue::Null => {
            dict.insert_null(key);
        }
        FieldValue::Omitted => {
            tracing::trace!("Omitting record field '{}'", key);
        }
    }
    Ok(())
}

/// One captured field
enum FieldValue {
    Value(BoxedQueryParameter),
    Null,
    Omitted,
}

impl FieldValue {
    fn of<V: QueryParameter + Send + Sync + 'static>(value: V) -> QueryResult<Self> {
        Ok(FieldValue::Value(Box::new(value)))
    }
}

/// Single-value serializer for one field
struct FieldSerializer<'a> {
    field: &'a str,
}

impl FieldSerializer<'_> {
    fn reject(&self, shape: &str) -> QueryParameterError {
        unsupported(shape, Some(self.field))
    }
}

impl ser::Serializer for FieldSerializer<'_> {
    type Ok = FieldValue;
    type Error = QueryParameterError;

    type SerializeSeq = Impossible<FieldValue, QueryParameterError>;
    type SerializeTuple = Impossible<FieldValue, QueryParameterError>;
    type SerializeTupleStruct = Impossible<FieldValue, QueryParameterError>;
    type SerializeTupleVariant = Impossible<FieldValue, QueryParameterError>;
    type SerializeMap = Impossible<FieldValue, QueryParameterError>;
    type SerializeStruct = Impossible<FieldValue, QueryParameterError>;
    type SerializeStructVariant = Impossible<FieldValue, QueryParameterError>;

    fn serialize_bool(self, v: bool) -> QueryResult<FieldValue> {
        FieldValue::of(v)
    }

    fn serialize_i8(self, v: i8) -> QueryResult<FieldValue> {
        FieldValue::of(v)
    }

    fn serialize_i16(self, v: i16) -> QueryResult<FieldValue> {
        FieldValue::of(v)
    }

    fn serialize_i32(self, v: i32) -> QueryResult<FieldValue> {
        FieldValue::of(v)
    }

    fn serialize_i64(self, v: i64) -> QueryResult<FieldValue> {
        FieldValue::of(v)
    }

    fn serialize_i128(self, v: i128) -> QueryResult<FieldValue> {
        FieldValue::of(v)
    }

    fn serialize_u8(self, v: u8) -> QueryResult<FieldValue> {
        FieldValue::of(v)
    }

    fn serialize_u16(self, v: u16) -> QueryResult<FieldValue> {
        FieldValue::of(v)
    }

    fn serialize_u32(self, v: u32) -> QueryResult<FieldValue> {
        FieldValue::of(v)
    }

    fn serialize_u64(self, v: u64) -> QueryResult<FieldValue> {
        FieldValue::of(v)
    }

    fn serialize_u128(self, v: u128) -> QueryResult<FieldValue> {
        FieldValue::of(v)
    }

    fn serialize_f32(self, v: f32) -> QueryResult<FieldValue> {
        FieldValue::of(v)
    }

    fn serialize_f64(self, v: f64) -> QueryResult<FieldValue> {
        FieldValue::of(v)
    }

    fn serialize_char(self, v: char) -> QueryResult<FieldValue> {
        FieldValue::of(v)
    }

    fn serialize_str(self, v: &str) -> QueryResult<FieldValue> {
        FieldValue::of(v.to_string())
    }

    fn serialize_bytes(self, v: &[u8]) -> QueryResult<FieldValue> {
        FieldValue::of(QueryBytes::from(v))
    }

    fn serialize_none(self) -> QueryResult<FieldValue> {
        Ok(FieldValue::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> QueryResult<FieldValue> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> QueryResult<FieldValue> {
        Ok(FieldValue::Null)
    }

    fn serialize_unit_struct(self, name: &'static str) -> QueryResult<FieldValue> {
        // Marker types such as `PhantomData` have no column behind them
        if name == OMITTED_TOKEN {
            Ok(FieldValue::Omitted)
        } else {
            Err(self.reject("unit struct"))
        }
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> QueryResult<FieldValue> {
        FieldValue::of(variant.to_string())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> QueryResult<FieldValue> {
        match name {
            DATETIME_TOKEN | NAIVE_DATETIME_TOKEN | DATE_TOKEN | TIME_TOKEN => {
                capture_temporal(self.field, name, value)
            }
            _ => value.serialize(self),
        }
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> QueryResult<FieldValue> {
        Err(self.reject("newtype variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> QueryResult<Self::SerializeSeq> {
        Err(self.reject("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> QueryResult<Self::SerializeTuple> {
        Err(self.reject("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> QueryResult<Self::SerializeTupleStruct> {
        Err(self.reject("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> QueryResult<Self::SerializeTupleVariant> {
        Err(self.reject("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> QueryResult<Self::SerializeMap> {
        Err(self.reject("nested map"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> QueryResult<Self::SerializeStruct> {
        Err(self.reject("nested struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> QueryResult<Self::SerializeStructVariant> {
        Err(self.reject("struct variant"))
    }
}

fn capture_temporal<T: Serialize + ?Sized>(
    field: &str,
    token: &str,
    value: &T,
) -> QueryResult<FieldValue> {
    let text = match serde_json::to_value(value) {
        Ok(serde_json::Value::String(text)) => text,
        Ok(other) => {
            return Err(QueryParameterError::Serialization(format!(
                "date/time field '{}' must serialize as text, got {}",
                field, other
            )))
        }
        Err(err) => return Err(QueryParameterError::Serialization(err.to_string())),
    };

    let invalid = |err: chrono::ParseError| {
        QueryParameterError::Serialization(format!(
            "date/time field '{}' has malformed value '{}': {}",
            field, text, err
        ))
    };

    match token {
        DATETIME_TOKEN => {
            let parsed = DateTime::parse_from_rfc3339(&text).map_err(invalid)?;
            FieldValue::of(parsed.with_timezone(&Utc))
        }
        NAIVE_DATETIME_TOKEN => FieldValue::of(text.parse::<NaiveDateTime>().map_err(invalid)?),
        DATE_TOKEN => FieldValue::of(text.parse::<NaiveDate>().map_err(invalid)?),
        _ => FieldValue::of(text.parse::<NaiveTime>().map_err(invalid)?),
    }
}

/// Map keys must serialize as text
struct KeySerializer;

impl KeySerializer {
    fn reject(shape: &str) -> QueryParameterError {
        unsupported(&format!("{} map key", shape), None)
    }
}

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = QueryParameterError;

    type SerializeSeq = Impossible<String, QueryParameterError>;
    type SerializeTuple = Impossible<String, QueryParameterError>;
    type SerializeTupleStruct = Impossible<String, QueryParameterError>;
    type SerializeTupleVariant = Impossible<String, QueryParameterError>;
    type SerializeMap = Impossible<String, QueryParameterError>;
    type SerializeStruct = Impossible<String, QueryParameterError>;
    type SerializeStructVariant = Impossible<String, QueryParameterError>;

    fn serialize_bool(self, _v: bool) -> QueryResult<String> {
        Err(Self::reject("bool"))
    }

    fn serialize_i8(self, v: i8) -> QueryResult<String> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> QueryResult<String> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> QueryResult<String> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> QueryResult<String> {
        Ok(v.to_string())
    }

    fn serialize_i128(self, v: i128) -> QueryResult<String> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> QueryResult<String> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> QueryResult<String> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> QueryResult<String> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> QueryResult<String> {
        Ok(v.to_string())
    }

    fn serialize_u128(self, v: u128) -> QueryResult<String> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, _v: f32) -> QueryResult<String> {
        Err(Self::reject("float"))
    }

    fn serialize_f64(self, _v: f64) -> QueryResult<String> {
        Err(Self::reject("float"))
    }

    fn serialize_char(self, v: char) -> QueryResult<String> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> QueryResult<String> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> QueryResult<String> {
        Err(Self::reject("bytes"))
    }

    fn serialize_none(self) -> QueryResult<String> {
        Err(Self::reject("null"))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> QueryResult<String> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> QueryResult<String> {
        Err(Self::reject("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> QueryResult<String> {
        Err(Self::reject("unit"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> QueryResult<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> QueryResult<String> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> QueryResult<String> {
        Err(Self::reject("enum"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> QueryResult<Self::SerializeSeq> {
        Err(Self::reject("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> QueryResult<Self::SerializeTuple> {
        Err(Self::reject("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> QueryResult<Self::SerializeTupleStruct> {
        Err(Self::reject("tuple"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> QueryResult<Self::SerializeTupleVariant> {
        Err(Self::reject("enum"))
    }

    fn serialize_map(self, _len: Option<usize>) -> QueryResult<Self::SerializeMap> {
        Err(Self::reject("map"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> QueryResult<Self::SerializeStruct> {
        Err(Self::reject("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> QueryResult<Self::SerializeStructVariant> {
        Err(Self::reject("enum"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::Omittable;
    use crate::parameter::render;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Item {
        id: u32,
        label: String,
        note: Omittable<String>,
        archived_at: Option<i64>,
    }

    #[derive(Serialize)]
    struct Nested {
        id: u32,
        tags: Vec<String>,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "snake_case")]
    enum Status {
        Active,
        Suspended,
    }

    #[derive(Serialize)]
    struct Account {
        status: Status,
        #[serde(skip_serializing_if = "Option::is_none")]
        referrer: Option<String>,
    }

    fn sorted_pairs(text: &QueryText) -> Vec<String> {
        let mut pairs: Vec<String> = text.as_str().split(", ").map(str::to_string).collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn test_flatten_struct_fields() {
        let item = Item {
            id: 7,
            label: "x".to_string(),
            note: Omittable::Omitted,
            archived_at: None,
        };

        let dict = to_query_dictionary(&item).unwrap();
        assert_eq!(dict.len(), 3);
        assert!(dict.contains_key("id"));
        assert!(dict.contains_key("label"));
        assert!(!dict.contains_key("note"));
        assert!(matches!(dict.get("archived_at"), Some(None)));

        let rendered = render(&dict).unwrap();
        assert_eq!(
            sorted_pairs(&rendered),
            vec!["`archived_at` = NULL", "`id` = 7", "`label` = 'x'"]
        );
    }

    #[test]
    fn test_unit_variants_and_skipped_fields() {
        let account = Account {
            status: Status::Suspended,
            referrer: None,
        };
        let rendered = render(&Record(&account)).unwrap();
        assert_eq!(rendered.as_str(), "`status` = 'suspended'");

        let account = Account {
            status: Status::Active,
            referrer: Some("ads".to_string()),
        };
        let rendered = render(&Record(account)).unwrap();
        assert_eq!(
            sorted_pairs(&rendered),
            vec!["`referrer` = 'ads'", "`status` = 'active'"]
        );
    }

    #[test]
    fn test_nested_sequence_is_rejected() {
        let nested = Nested {
            id: 1,
            tags: vec!["a".to_string()],
        };

        let err = to_query_dictionary(&nested).unwrap_err();
        assert_eq!(
            err,
            QueryParameterError::UnsupportedShape {
                field: Some("tags".to_string()),
                shape: "sequence".to_string(),
            }
        );
    }

    #[test]
    fn test_nested_struct_is_rejected() {
        #[derive(Serialize)]
        struct Outer {
            inner: Account,
        }

        let outer = Outer {
            inner: Account {
                status: Status::Active,
                referrer: None,
            },
        };
        let err = to_query_dictionary(&outer).unwrap_err();
        assert!(err.is_unsupported_shape());
        assert!(err.to_string().contains("nested struct"));
    }

    #[test]
    fn test_top_level_shapes() {
        assert!(to_query_dictionary(&vec![1, 2]).unwrap_err().is_unsupported_shape());
        assert!(to_query_dictionary(&5).unwrap_err().is_unsupported_shape());
        assert!(to_query_dictionary("text").unwrap_err().is_unsupported_shape());

        let mut map = BTreeMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        let dict = to_query_dictionary(&map).unwrap();
        assert_eq!(sorted_pairs(&render(&dict).unwrap()), vec!["`a` = 1", "`b` = 2"]);

        let mut nested = BTreeMap::new();
        nested.insert("a", vec![1]);
        assert!(to_query_dictionary(&nested).unwrap_err().is_unsupported_shape());
    }

    #[test]
    fn test_wide_integers() {
        #[derive(Serialize)]
        struct Ledger {
            total: i128,
        }

        let dict = to_query_dictionary(&Ledger { total: -7 }).unwrap();
        assert_eq!(render(&dict).unwrap().as_str(), "`total` = -7");

        let err = to_query_dictionary(&5i128).unwrap_err();
        assert_eq!(
            err,
            QueryParameterError::UnsupportedShape {
                field: None,
                shape: "integer record".to_string(),
            }
        );
        assert!(to_query_dictionary(&5u128).unwrap_err().is_unsupported_shape());

        let mut map = BTreeMap::new();
        map.insert(10i128, "a");
        map.insert(20i128, "b");
        let dict = to_query_dictionary(&map).unwrap();
        assert_eq!(sorted_pairs(&render(&dict).unwrap()), vec!["`10` = 'a'", "`20` = 'b'"]);

        let mut map = BTreeMap::new();
        map.insert(u128::MAX, 1);
        assert!(to_query_dictionary(&map).unwrap().contains_key(&u128::MAX.to_string()));
    }

    #[test]
    fn test_unit_records_are_rejected() {
        #[derive(Serialize)]
        struct Marker;

        let err = render(&Record(Marker)).unwrap_err();
        assert_eq!(
            err,
            QueryParameterError::UnsupportedShape {
                field: None,
                shape: "unit record".to_string(),
            }
        );

        let omitted: Omittable<Item> = Omittable::Omitted;
        assert!(to_query_dictionary(&omitted).unwrap_err().is_unsupported_shape());
    }

    #[test]
    fn test_marker_fields_are_rejected() {
        #[derive(Serialize)]
        struct Tagged {
            id: u32,
            kind: std::marker::PhantomData<String>,
        }

        let err = to_query_dictionary(&Tagged {
            id: 1,
            kind: std::marker::PhantomData,
        })
        .unwrap_err();
        assert_eq!(
            err,
            QueryParameterError::UnsupportedShape {
                field: Some("kind".to_string()),
                shape: "unit struct".to_string(),
            }
        );
    }

    #[test]
    fn test_bytes_field() {
        #[derive(Serialize)]
        struct Blob {
            data: QueryBytes,
        }

        let blob = Blob {
            data: QueryBytes(vec![0xca, 0xfe]),
        };
        assert_eq!(render(&Record(blob)).unwrap().as_str(), "`data` = X'CAFE'");
    }

    #[test]
    fn test_custom_serialize_error_propagates() {
        struct Broken;

        impl Serialize for Broken {
            fn serialize<S: ser::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
                Err(ser::Error::custom("broken field"))
            }
        }

        #[derive(Serialize)]
        struct Holder {
            value: Broken,
        }

        let err = to_query_dictionary(&Holder { value: Broken }).unwrap_err();
        assert_eq!(err, QueryParameterError::Serialization("broken field".to_string()));
    }
}
