//! Scalar adapters for built-in value types
//!
//! Numbers and booleans render through their canonical text form. Text, UUIDs,
//! binary values and dates go through the escaper of the render option.
//! No scalar is ever omitted.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::error::{QueryParameterError, QueryResult};
use crate::option::QueryParameterOption;
use crate::parameter::{QueryParameter, QueryText};

/// `DATETIME` literal layout, always with microseconds
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// `DATE` literal layout
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `TIME` literal layout, always with microseconds
pub const TIME_FORMAT: &str = "%H:%M:%S%.6f";

macro_rules! integer_query_parameter {
    ($($ty:ty),* $(,)?) => {
        $(
            impl QueryParameter for $ty {
                fn query_parameter(&self, _option: &QueryParameterOption) -> QueryResult<QueryText> {
                    Ok(QueryText::trusted(self.to_string()))
                }
            }
        )*
    };
}

integer_query_parameter!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! float_query_parameter {
    ($($ty:ty),*) => {
        $(
            impl QueryParameter for $ty {
                fn query_parameter(&self, _option: &QueryParameterOption) -> QueryResult<QueryText> {
                    if !self.is_finite() {
                        return Err(QueryParameterError::EscapeFailure(format!(
                            "{} has no SQL literal",
                            self
                        )));
                    }
                    Ok(QueryText::trusted(self.to_string()))
                }
            }
        )*
    };
}

float_query_parameter!(f32, f64);

impl QueryParameter for bool {
    fn query_parameter(&self, _option: &QueryParameterOption) -> QueryResult<QueryText> {
        Ok(QueryText::trusted(if *self { "true" } else { "false" }))
    }
}

impl QueryParameter for str {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        Ok(QueryText::new(option.escape(self)))
    }
}

impl QueryParameter for String {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        self.as_str().query_parameter(option)
    }
}

impl QueryParameter for char {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        let mut buf = [0u8; 4];
        self.encode_utf8(&mut buf).query_parameter(option)
    }
}

impl QueryParameter for Decimal {
    fn query_parameter(&self, _option: &QueryParameterOption) -> QueryResult<QueryText> {
        Ok(QueryText::trusted(self.to_string()))
    }
}

impl QueryParameter for Uuid {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        self.hyphenated().to_string().query_parameter(option)
    }
}

/// Binary value rendered through the escaper's byte encoding
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryBytes(pub Vec<u8>);

impl QueryBytes {
    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for QueryBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for QueryBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl Serialize for QueryBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl QueryParameter for QueryBytes {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        Ok(QueryText::new(option.escaper().escape_bytes(&self.0)))
    }
}

// Converted to the session time zone of the option
impl<Tz: TimeZone> QueryParameter for DateTime<Tz> {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        self.with_timezone(&option.time_zone())
            .naive_local()
            .query_parameter(option)
    }
}

impl QueryParameter for NaiveDateTime {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        self.format(DATETIME_FORMAT).to_string().query_parameter(option)
    }
}

impl QueryParameter for NaiveDate {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        self.format(DATE_FORMAT).to_string().query_parameter(option)
    }
}

impl QueryParameter for NaiveTime {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        self.format(TIME_FORMAT).to_string().query_parameter(option)
    }
}
