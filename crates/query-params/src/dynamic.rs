//! Dynamic boundary for untyped JSON parameters
//!
//! Request payloads arrive as `serde_json::Value`. Scalars and arrays map onto the
//! static adapters; an object has no single SQL rendering and fails with
//! [`QueryParameterError::Cast`].

use serde_json::{Map, Value};

use crate::composite::{render_sequence, QueryDictionary, QueryParameterNull};
use crate::error::{QueryParameterError, QueryResult};
use crate::option::QueryParameterOption;
use crate::parameter::{QueryParameter, QueryText};

const EXPECTED: &str = "QueryParameter";

/// JSON type name used in cast errors
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn cast_error(value: &Value, key: Option<&str>) -> QueryParameterError {
    tracing::debug!(
        "JSON {} cannot be used as a query parameter (key {:?})",
        json_kind(value),
        key
    );
    QueryParameterError::cast(json_kind(value), EXPECTED, key)
}

impl QueryParameter for Value {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        match self {
            Value::Null => QueryParameterNull.query_parameter(option),
            Value::Bool(b) => b.query_parameter(option),
            Value::Number(n) => Ok(QueryText::trusted(n.to_string())),
            Value::String(s) => s.query_parameter(option),
            Value::Array(items) => render_sequence(items.iter().map(Some), option),
            Value::Object(_) => Err(cast_error(self, None)),
        }
    }

    fn is_query_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }
}

impl QueryDictionary {
    /// Build a dictionary from a JSON object
    ///
    /// JSON `null` becomes an explicit NULL entry. Nested objects are rejected
    /// here rather than at render time.
    pub fn from_json_object(object: Map<String, Value>) -> QueryResult<Self> {
        let mut dict = QueryDictionary::new();
        for (key, value) in object {
            match value {
                Value::Null => {
                    dict.insert_null(key);
                }
                Value::Object(_) => return Err(cast_error(&value, Some(key.as_str()))),
                value => {
                    dict.insert(key, value);
                }
            }
        }
        Ok(dict)
    }
}

impl TryFrom<Value> for QueryDictionary {
    type Error = QueryParameterError;

    fn try_from(value: Value) -> QueryResult<Self> {
        match value {
            Value::Object(object) => QueryDictionary::from_json_object(object),
            other => Err(QueryParameterError::cast(json_kind(&other), "object", None)),
        }
    }
}
