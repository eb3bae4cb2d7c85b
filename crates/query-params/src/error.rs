//! Error types for query parameter rendering
//!
//! Every failure is reported to the immediate caller of `query_parameter` or
//! `to_query_dictionary`. Composites never return partially rendered text.

use std::fmt;

/// Result type alias for rendering and flattening operations
pub type QueryResult<T> = Result<T, QueryParameterError>;

/// Error types for query parameter operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryParameterError {
    /// A dynamically typed value could not be used as a query parameter
    #[error("Cast error: '{actual}' is not a {expected}{}", KeyContext(.key))]
    Cast {
        actual: String,
        expected: String,
        key: Option<String>,
    },

    /// A record field tried to serialize a shape the flattening engine does not support
    #[error("Unsupported shape: {shape} is not supported{}", KeyContext(.field))]
    UnsupportedShape {
        field: Option<String>,
        shape: String,
    },

    /// The escaping primitive or a scalar adapter could not produce SQL text
    #[error("Escape failure: {0}")]
    EscapeFailure(String),

    /// Raised by a record's own `Serialize` implementation
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQL text could not be decoded into the requested scalar
    #[error("Decode error: '{value}' is not a valid {expected}")]
    Decode { value: String, expected: String },
}

impl QueryParameterError {
    /// Create a cast error for a value arriving at a dynamic boundary
    pub fn cast(actual: impl Into<String>, expected: impl Into<String>, key: Option<&str>) -> Self {
        Self::Cast {
            actual: actual.into(),
            expected: expected.into(),
            key: key.map(str::to_string),
        }
    }

    /// Create an unsupported shape error
    pub fn unsupported_shape(shape: impl Into<String>, field: Option<&str>) -> Self {
        Self::UnsupportedShape {
            field: field.map(str::to_string),
            shape: shape.into(),
        }
    }

    /// Create a decode error
    pub fn decode(value: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::Decode {
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Attach a key to errors that carry one and don't have it yet
    pub(crate) fn with_key(self, key: &str) -> Self {
        match self {
            Self::Cast { actual, expected, key: None } => Self::Cast {
                actual,
                expected,
                key: Some(key.to_string()),
            },
            Self::UnsupportedShape { field: None, shape } => Self::UnsupportedShape {
                field: Some(key.to_string()),
                shape,
            },
            other => other,
        }
    }

    /// Check if this error came from the flattening engine rejecting a shape
    pub fn is_unsupported_shape(&self) -> bool {
        matches!(self, Self::UnsupportedShape { .. })
    }
}

impl serde::ser::Error for QueryParameterError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::Serialization(msg.to_string())
    }
}

/// Formats the optional key suffix of an error message
struct KeyContext<'a>(&'a Option<String>);

impl fmt::Display for KeyContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(key) => write!(f, " (key '{}')", key),
            None => Ok(()),
        }
    }
}

/// Error types for loading a render option from configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Environment variable error: {message}")]
    EnvironmentError { message: String },
}

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_key_context() {
        let err = QueryParameterError::cast("object", "QueryParameter", Some("profile"));
        assert_eq!(
            err.to_string(),
            "Cast error: 'object' is not a QueryParameter (key 'profile')"
        );

        let err = QueryParameterError::unsupported_shape("sequence", None);
        assert_eq!(err.to_string(), "Unsupported shape: sequence is not supported");
    }

    #[test]
    fn test_with_key_keeps_existing_context() {
        let err = QueryParameterError::unsupported_shape("map", Some("inner")).with_key("outer");
        assert_eq!(
            err,
            QueryParameterError::UnsupportedShape {
                field: Some("inner".to_string()),
                shape: "map".to_string(),
            }
        );

        let err = QueryParameterError::EscapeFailure("NaN".to_string()).with_key("score");
        assert_eq!(err, QueryParameterError::EscapeFailure("NaN".to_string()));
    }
}
