//! Query Parameter Protocol - the capability every renderable value implements
//!
//! A value renders itself as already-escaped SQL text under a render option and
//! declares whether it should be dropped from a parameter set.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::QueryResult;
use crate::option::QueryParameterOption;

/// Already-escaped SQL text
///
/// Produced only by [`QueryParameter`] implementations. It is safe for direct
/// concatenation into a statement and must never be escaped again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryText(String);

impl QueryText {
    /// Wrap text that is already safe SQL
    pub(crate) fn new(escaped: impl Into<String>) -> Self {
        Self(escaped.into())
    }

    /// Wrap a SQL keyword or literal produced by a trusted adapter
    ///
    /// Use this only for text that cannot carry user input (numbers, keywords).
    pub fn trusted(escaped: impl Into<String>) -> Self {
        Self(escaped.into())
    }

    /// Get the escaped text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the escaped string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for QueryText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QueryText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<QueryText> for String {
    fn from(text: QueryText) -> Self {
        text.0
    }
}

/// A value that can render itself as escaped SQL text
pub trait QueryParameter {
    /// Render as escaped SQL text
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText>;

    /// Whether this value is dropped from dictionaries and arrays
    ///
    /// Distinct from SQL NULL: an omitted column is left out of the statement.
    fn omit_on_query_parameter(&self) -> bool {
        false
    }

    /// Whether this value is an array composite (parenthesized when nested)
    fn is_query_array(&self) -> bool {
        false
    }
}

/// Boxed parameter stored by composites
pub type BoxedQueryParameter = Box<dyn QueryParameter + Send + Sync>;

macro_rules! forward_query_parameter {
    ($($handle:ident),*) => {
        $(
            impl<T: QueryParameter + ?Sized> QueryParameter for $handle<T> {
                fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
                    (**self).query_parameter(option)
                }

                fn omit_on_query_parameter(&self) -> bool {
                    (**self).omit_on_query_parameter()
                }

                fn is_query_array(&self) -> bool {
                    (**self).is_query_array()
                }
            }
        )*
    };
}

forward_query_parameter!(Box, Arc, Rc);

impl<T: QueryParameter + ?Sized> QueryParameter for &T {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        (**self).query_parameter(option)
    }

    fn omit_on_query_parameter(&self) -> bool {
        (**self).omit_on_query_parameter()
    }

    fn is_query_array(&self) -> bool {
        (**self).is_query_array()
    }
}

impl<T: QueryParameter + ToOwned + ?Sized> QueryParameter for Cow<'_, T> {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        (**self).query_parameter(option)
    }

    fn omit_on_query_parameter(&self) -> bool {
        (**self).omit_on_query_parameter()
    }

    fn is_query_array(&self) -> bool {
        (**self).is_query_array()
    }
}

/// Render any parameter with the default option
///
/// # Examples
/// ```
/// use elif_query_params::render;
///
/// assert_eq!(render(&42).unwrap().as_str(), "42");
/// assert_eq!(render("it's").unwrap().as_str(), "'it\\'s'");
/// ```
pub fn render<T: QueryParameter + ?Sized>(value: &T) -> QueryResult<QueryText> {
    value.query_parameter(&QueryParameterOption::default())
}
