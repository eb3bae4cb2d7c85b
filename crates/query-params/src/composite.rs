//! Composite Parameters - NULL, optional, omittable, dictionary and array values
//!
//! Composites build escaped text out of nested parameters and forward the render
//! option unchanged. One rule drives omission everywhere: an entry whose value
//! reports `omit_on_query_parameter()` is dropped, an absent value renders `NULL`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::QueryResult;
use crate::option::QueryParameterOption;
use crate::parameter::{BoxedQueryParameter, QueryParameter, QueryText};
use crate::record::OMITTED_TOKEN;

const NULL: &str = "NULL";

/// SQL NULL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct QueryParameterNull;

impl QueryParameter for QueryParameterNull {
    fn query_parameter(&self, _option: &QueryParameterOption) -> QueryResult<QueryText> {
        Ok(QueryText::trusted(NULL))
    }
}

impl<T: QueryParameter> QueryParameter for Option<T> {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        match self {
            Some(value) => value.query_parameter(option),
            None => QueryParameterNull.query_parameter(option),
        }
    }

    fn omit_on_query_parameter(&self) -> bool {
        self.as_ref().map_or(false, |value| value.omit_on_query_parameter())
    }

    fn is_query_array(&self) -> bool {
        self.as_ref().map_or(false, |value| value.is_query_array())
    }
}

/// A column value that can be left out of a statement entirely
///
/// `Omitted` is dropped from dictionaries, arrays and flattened records, which is
/// how partial updates leave a column untouched. It is not NULL: to write NULL use
/// `Omittable::Value(None)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Omittable<T> {
    Value(T),
    Omitted,
}

impl<T> Omittable<T> {
    /// Check if this value is omitted
    pub fn is_omitted(&self) -> bool {
        matches!(self, Omittable::Omitted)
    }

    /// Borrow the inner value
    pub fn as_ref(&self) -> Omittable<&T> {
        match self {
            Omittable::Value(value) => Omittable::Value(value),
            Omittable::Omitted => Omittable::Omitted,
        }
    }

    /// Convert into an option, `None` when omitted
    pub fn into_option(self) -> Option<T> {
        match self {
            Omittable::Value(value) => Some(value),
            Omittable::Omitted => None,
        }
    }
}

impl<T> Default for Omittable<T> {
    fn default() -> Self {
        Omittable::Omitted
    }
}

impl<T> From<T> for Omittable<T> {
    fn from(value: T) -> Self {
        Omittable::Value(value)
    }
}

impl<T: QueryParameter> QueryParameter for Omittable<T> {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        match self {
            Omittable::Value(value) => value.query_parameter(option),
            // Only reachable when rendered outside a composite
            Omittable::Omitted => Ok(QueryText::trusted("DEFAULT")),
        }
    }

    fn omit_on_query_parameter(&self) -> bool {
        match self {
            Omittable::Value(value) => value.omit_on_query_parameter(),
            Omittable::Omitted => true,
        }
    }

    fn is_query_array(&self) -> bool {
        match self {
            Omittable::Value(value) => value.is_query_array(),
            Omittable::Omitted => false,
        }
    }
}

impl<T: Serialize> Serialize for Omittable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Omittable::Value(value) => value.serialize(serializer),
            Omittable::Omitted => serializer.serialize_unit_struct(OMITTED_TOKEN),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Omittable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Omittable::Value)
    }
}

/// Key/value parameters rendered as `key = value, ...`
///
/// Used for `UPDATE t SET ?` and `INSERT INTO t SET ?`. A `None` entry renders
/// `key = NULL`; an entry whose value is omitted is left out. Entry order in the
/// output is unspecified.
#[derive(Default)]
pub struct QueryDictionary {
    entries: HashMap<String, Option<BoxedQueryParameter>>,
}

impl QueryDictionary {
    /// Create an empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous entry for the key
    pub fn insert<V>(&mut self, key: impl Into<String>, value: V) -> &mut Self
    where
        V: QueryParameter + Send + Sync + 'static,
    {
        self.entries.insert(key.into(), Some(Box::new(value)));
        self
    }

    /// Insert an already boxed value, or `None` for an explicit NULL
    pub fn insert_boxed(
        &mut self,
        key: impl Into<String>,
        value: Option<BoxedQueryParameter>,
    ) -> &mut Self {
        self.entries.insert(key.into(), value);
        self
    }

    /// Insert an explicit NULL
    pub fn insert_null(&mut self, key: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), None);
        self
    }

    /// Builder-style insert
    pub fn with<V>(mut self, key: impl Into<String>, value: V) -> Self
    where
        V: QueryParameter + Send + Sync + 'static,
    {
        self.insert(key, value);
        self
    }

    /// Remove an entry
    pub fn remove(&mut self, key: &str) -> Option<Option<BoxedQueryParameter>> {
        self.entries.remove(key)
    }

    /// Get an entry; `Some(None)` is an explicit NULL
    pub fn get(&self, key: &str) -> Option<Option<&(dyn QueryParameter + Send + Sync)>> {
        self.entries.get(key).map(|value| value.as_deref())
    }

    /// Check if the dictionary has an entry for the key
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over the keys
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries, including omitted ones
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the dictionary has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl QueryParameter for QueryDictionary {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        render_pairs(
            self.entries.iter().map(|(key, value)| (key.as_str(), value.as_deref())),
            option,
        )
    }
}

impl fmt::Debug for QueryDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("QueryDictionary").field("keys", &keys).finish()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<BoxedQueryParameter>)> for QueryDictionary {
    fn from_iter<I: IntoIterator<Item = (K, Option<BoxedQueryParameter>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(key, value)| (key.into(), value)).collect(),
        }
    }
}

/// Ordered parameters rendered as `a, b, c`
///
/// Nested arrays are parenthesized, so one rule covers `IN (1, 2)` and
/// `IN ((1, 2), (3, 4))`.
#[derive(Default)]
pub struct QueryArray {
    entries: Vec<Option<BoxedQueryParameter>>,
}

impl QueryArray {
    /// Create an empty array
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value
    pub fn push<V>(&mut self, value: V) -> &mut Self
    where
        V: QueryParameter + Send + Sync + 'static,
    {
        self.entries.push(Some(Box::new(value)));
        self
    }

    /// Append an explicit NULL
    pub fn push_null(&mut self) -> &mut Self {
        self.entries.push(None);
        self
    }

    /// Builder-style push
    pub fn with<V>(mut self, value: V) -> Self
    where
        V: QueryParameter + Send + Sync + 'static,
    {
        self.push(value);
        self
    }

    /// Number of entries, including omitted ones
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the array has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl QueryParameter for QueryArray {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        render_sequence(self.entries.iter().map(|value| value.as_deref()), option)
    }

    fn is_query_array(&self) -> bool {
        true
    }
}

impl fmt::Debug for QueryArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryArray").field("len", &self.entries.len()).finish()
    }
}

impl FromIterator<Option<BoxedQueryParameter>> for QueryArray {
    fn from_iter<I: IntoIterator<Item = Option<BoxedQueryParameter>>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<T: QueryParameter> QueryParameter for [T] {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        render_sequence(self.iter().map(Some), option)
    }

    fn is_query_array(&self) -> bool {
        true
    }
}

impl<T: QueryParameter, const N: usize> QueryParameter for [T; N] {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        self.as_slice().query_parameter(option)
    }

    fn is_query_array(&self) -> bool {
        true
    }
}

impl<T: QueryParameter> QueryParameter for Vec<T> {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        self.as_slice().query_parameter(option)
    }

    fn is_query_array(&self) -> bool {
        true
    }
}

impl<K: AsRef<str>, V: QueryParameter> QueryParameter for HashMap<K, V> {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        render_pairs(self.iter().map(|(key, value)| (key.as_ref(), Some(value))), option)
    }
}

impl<K: AsRef<str>, V: QueryParameter> QueryParameter for BTreeMap<K, V> {
    fn query_parameter(&self, option: &QueryParameterOption) -> QueryResult<QueryText> {
        render_pairs(self.iter().map(|(key, value)| (key.as_ref(), Some(value))), option)
    }
}

/// Render `value, value, ...`, dropping omitted entries and parenthesizing arrays
pub(crate) fn render_sequence<'a, T, I>(
    entries: I,
    option: &QueryParameterOption,
) -> QueryResult<QueryText>
where
    T: QueryParameter + ?Sized + 'a,
    I: IntoIterator<Item = Option<&'a T>>,
{
    let mut rendered = Vec::new();
    for entry in entries {
        match entry {
            Some(value) if value.omit_on_query_parameter() => {
                tracing::trace!("Omitting array entry at position {}", rendered.len());
            }
            Some(value) if value.is_query_array() => {
                rendered.push(format!("({})", value.query_parameter(option)?));
            }
            Some(value) => rendered.push(value.query_parameter(option)?.into_string()),
            None => rendered.push(NULL.to_string()),
        }
    }
    Ok(QueryText::new(rendered.join(", ")))
}

/// Render `key = value, ...`, dropping omitted entries
pub(crate) fn render_pairs<'a, T, I>(
    entries: I,
    option: &QueryParameterOption,
) -> QueryResult<QueryText>
where
    T: QueryParameter + ?Sized + 'a,
    I: IntoIterator<Item = (&'a str, Option<&'a T>)>,
{
    let mut pairs = Vec::new();
    for (key, value) in entries {
        let rendered = match value {
            Some(value) if value.omit_on_query_parameter() => {
                tracing::trace!("Omitting dictionary entry '{}'", key);
                continue;
            }
            Some(value) => value
                .query_parameter(option)
                .map_err(|err| err.with_key(key))?
                .into_string(),
            None => NULL.to_string(),
        };
        pairs.push(format!("{} = {}", option.escape_identifier(key), rendered));
    }
    Ok(QueryText::new(pairs.join(", ")))
}
