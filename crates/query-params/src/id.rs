//! Strongly-typed identifiers
//!
//! An identifier wraps a scalar key (usually an integer) in its own nominal type
//! so a `UserId` cannot be passed where an `OrderId` is expected. Rendering,
//! decoding, equality, hashing and serde all delegate to the wrapped scalar.
//!
//! ```
//! use elif_query_params::{query_id, render, IdType};
//!
//! query_id! {
//!     /// Primary key of the `users` table
//!     pub struct UserId(u64);
//! }
//!
//! let id = UserId::new(7);
//! assert_eq!(render(&id).unwrap(), render(&7u64).unwrap());
//! assert_eq!(*id.id(), 7);
//! ```

use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::decode::FromSqlString;
use crate::parameter::QueryParameter;

/// Interface shared by every identifier declared with [`query_id!`](crate::query_id)
pub trait IdType:
    QueryParameter + FromSqlString + Serialize + DeserializeOwned + Eq + Hash + Copy
{
    /// The wrapped scalar
    type Inner: QueryParameter + FromSqlString + Serialize + DeserializeOwned + Eq + Hash + Copy;

    /// Wrap a raw scalar
    fn new(id: Self::Inner) -> Self;

    /// Get the wrapped scalar
    fn id(&self) -> &Self::Inner;
}

/// Declare an identifier type wrapping a scalar
///
/// The generated tuple struct derives `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`,
/// `PartialOrd`, `Ord` and `Hash`, and implements [`IdType`], `QueryParameter`,
/// `FromSqlString`, `Display`, `From<Inner>` and transparent serde.
#[macro_export]
macro_rules! query_id {
    ($(#[$meta:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis struct $name(pub $inner);

        impl $crate::IdType for $name {
            type Inner = $inner;

            fn new(id: $inner) -> Self {
                $name(id)
            }

            fn id(&self) -> &$inner {
                &self.0
            }
        }

        impl $crate::QueryParameter for $name {
            fn query_parameter(
                &self,
                option: &$crate::QueryParameterOption,
            ) -> $crate::QueryResult<$crate::QueryText> {
                $crate::QueryParameter::query_parameter(&self.0, option)
            }

            fn omit_on_query_parameter(&self) -> bool {
                $crate::QueryParameter::omit_on_query_parameter(&self.0)
            }
        }

        impl $crate::FromSqlString for $name {
            fn from_sql_string(value: &str) -> $crate::QueryResult<Self> {
                <$inner as $crate::FromSqlString>::from_sql_string(value).map($name)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::std::convert::From<$inner> for $name {
            fn from(id: $inner) -> Self {
                $name(id)
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                $crate::__private::serde::Serialize::serialize(&self.0, serializer)
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                <$inner as $crate::__private::serde::Deserialize<'de>>::deserialize(deserializer)
                    .map($name)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::QueryDictionary;
    use crate::parameter::render;
    use crate::record::to_query_dictionary;
    use std::collections::HashSet;

    crate::query_id! {
        pub struct UserId(u64);
    }

    crate::query_id! {
        pub struct OrderId(i64);
    }

    #[derive(serde::Serialize, serde::Deserialize)]
    struct Order {
        id: OrderId,
        user_id: UserId,
    }

    #[test]
    fn test_identifier_equality_and_hash() {
        let a = UserId::new(5);
        let b = UserId::from(5);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&UserId(6)));
    }

    #[test]
    fn test_identifier_renders_like_inner_scalar() {
        let id = OrderId::new(-3);
        assert_eq!(render(&id).unwrap(), render(&-3i64).unwrap());
        assert!(!id.omit_on_query_parameter());
        assert_eq!(id.to_string(), "-3");
    }

    #[test]
    fn test_identifier_decodes_like_inner_scalar() {
        assert_eq!(UserId::from_sql_string("42").unwrap(), UserId(42));
        assert!(UserId::from_sql_string("-1").is_err());
    }

    #[test]
    fn test_identifier_serde_is_transparent() {
        let order = Order {
            id: OrderId(10),
            user_id: UserId(20),
        };
        let json = serde_json::to_string(&order).unwrap();
        assert_eq!(json, r#"{"id":10,"user_id":20}"#);

        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, OrderId(10));
        assert_eq!(*back.user_id.id(), 20);
    }

    #[test]
    fn test_identifier_flattens_as_scalar() {
        let order = Order {
            id: OrderId(1),
            user_id: UserId(2),
        };
        let dict: QueryDictionary = to_query_dictionary(&order).unwrap();
        let mut pairs: Vec<String> = render(&dict)
            .unwrap()
            .into_string()
            .split(", ")
            .map(str::to_string)
            .collect();
        pairs.sort();
        assert_eq!(pairs, vec!["`id` = 1", "`user_id` = 2"]);
    }
}
