//! Decoding scalars from the text form a SQL server returns

use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{QueryParameterError, QueryResult};

/// A scalar that can be parsed from SQL result text
pub trait FromSqlString: Sized {
    /// Parse the value from its SQL text form
    fn from_sql_string(value: &str) -> QueryResult<Self>;
}

fn parse<T: FromStr>(value: &str, expected: &str) -> QueryResult<T> {
    value
        .parse()
        .map_err(|_| QueryParameterError::decode(value, expected))
}

macro_rules! from_sql_string {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromSqlString for $ty {
                fn from_sql_string(value: &str) -> QueryResult<Self> {
                    parse(value, stringify!($ty))
                }
            }
        )*
    };
}

from_sql_string!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl FromSqlString for bool {
    fn from_sql_string(value: &str) -> QueryResult<Self> {
        match value {
            "1" | "true" | "TRUE" => Ok(true),
            "0" | "false" | "FALSE" => Ok(false),
            _ => Err(QueryParameterError::decode(value, "bool")),
        }
    }
}

impl FromSqlString for String {
    fn from_sql_string(value: &str) -> QueryResult<Self> {
        Ok(value.to_string())
    }
}

impl FromSqlString for Decimal {
    fn from_sql_string(value: &str) -> QueryResult<Self> {
        Decimal::from_str_exact(value).map_err(|_| QueryParameterError::decode(value, "decimal"))
    }
}

impl FromSqlString for Uuid {
    fn from_sql_string(value: &str) -> QueryResult<Self> {
        parse(value, "uuid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_integers() {
        assert_eq!(i64::from_sql_string("-42").unwrap(), -42);
        assert_eq!(u8::from_sql_string("255").unwrap(), 255);
        assert_eq!(
            u8::from_sql_string("256").unwrap_err(),
            QueryParameterError::Decode {
                value: "256".to_string(),
                expected: "u8".to_string(),
            }
        );
        assert!(u32::from_sql_string("12abc").is_err());
    }

    #[test]
    fn test_decode_other_scalars() {
        assert!(bool::from_sql_string("1").unwrap());
        assert!(!bool::from_sql_string("false").unwrap());
        assert!(bool::from_sql_string("yes").is_err());

        assert_eq!(f64::from_sql_string("2.5").unwrap(), 2.5);
        assert_eq!(String::from_sql_string("x").unwrap(), "x");
        assert_eq!(Decimal::from_sql_string("10.50").unwrap(), Decimal::new(1050, 2));
        assert!(Decimal::from_sql_string("ten").is_err());
        assert!(Uuid::from_sql_string("550e8400-e29b-41d4-a716-446655440000").is_ok());
    }
}
