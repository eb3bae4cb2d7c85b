//! Escaping primitives for SQL literals and identifiers
//!
//! The engine never escapes text itself; it asks the [`SqlEscaper`] carried by the
//! render option. Two dialects ship with the crate:
//! - [`MySqlEscaper`]: backslash escaping, backtick identifiers
//! - [`PostgresEscaper`]: quote doubling, double-quoted identifiers
//!
//! Every escaper must be total and must fully neutralize quote, backslash and
//! control characters for its dialect. There is no error channel, so a character
//! the dialect cannot store at all is dropped rather than reported:
//! [`PostgresEscaper`] removes NUL (`\0`), which PostgreSQL text cannot hold.
//! Reject such input before rendering if the loss matters.

use std::fmt::Debug;

/// Escaping capability injected into rendering through the render option
pub trait SqlEscaper: Debug + Send + Sync {
    /// Escape a text literal, including the surrounding quotes
    ///
    /// Must never fail. Characters the dialect cannot represent may be dropped,
    /// so the stored value can differ from `value`.
    fn escape(&self, value: &str) -> String;

    /// Escape an identifier (column name, dictionary key), including the quoting
    fn escape_identifier(&self, identifier: &str) -> String;

    /// Escape a binary value
    fn escape_bytes(&self, bytes: &[u8]) -> String {
        format!("X'{}'", hex::encode_upper(bytes))
    }
}

/// MySQL escaping
///
/// # Examples
/// ```
/// use elif_query_params::escape::{MySqlEscaper, SqlEscaper};
///
/// assert_eq!(MySqlEscaper.escape("O'Brien"), "'O\\'Brien'");
/// assert_eq!(MySqlEscaper.escape_identifier("users.name"), "`users`.`name`");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MySqlEscaper;

impl SqlEscaper for MySqlEscaper {
    fn escape(&self, value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 2);
        escaped.push('\'');
        for c in value.chars() {
            match c {
                '\0' => escaped.push_str("\\0"),
                '\u{8}' => escaped.push_str("\\b"),
                '\t' => escaped.push_str("\\t"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\u{1a}' => escaped.push_str("\\Z"),
                '"' => escaped.push_str("\\\""),
                '\'' => escaped.push_str("\\'"),
                '\\' => escaped.push_str("\\\\"),
                _ => escaped.push(c),
            }
        }
        escaped.push('\'');
        escaped
    }

    fn escape_identifier(&self, identifier: &str) -> String {
        // Dots separate qualified names: `table`.`column`
        let escaped = identifier.replace('`', "``").replace('.', "`.`");
        format!("`{}`", escaped)
    }
}

/// PostgreSQL escaping (standard conforming strings)
///
/// NUL characters are removed from text literals.
///
/// # Examples
/// ```
/// use elif_query_params::escape::{PostgresEscaper, SqlEscaper};
///
/// assert_eq!(PostgresEscaper.escape("O'Brien"), "'O''Brien'");
/// assert_eq!(PostgresEscaper.escape_identifier("table\"name"), "\"table\"\"name\"");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostgresEscaper;

impl SqlEscaper for PostgresEscaper {
    fn escape(&self, value: &str) -> String {
        let has_backslash = value.contains('\\');
        let mut escaped = String::with_capacity(value.len() + 3);
        if has_backslash {
            escaped.push('E');
        }
        escaped.push('\'');
        for c in value.chars() {
            match c {
                // NUL cannot be stored in text columns; drop it rather than truncate
                '\0' => {}
                '\'' => escaped.push_str("''"),
                '\\' => escaped.push_str("\\\\"),
                _ => escaped.push(c),
            }
        }
        escaped.push('\'');
        escaped
    }

    fn escape_identifier(&self, identifier: &str) -> String {
        let escaped = identifier.replace('\"', "\"\"");
        format!("\"{}\"", escaped)
    }

    fn escape_bytes(&self, bytes: &[u8]) -> String {
        format!("'\\x{}'::bytea", hex::encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_escape_special_characters() {
        let escaper = MySqlEscaper;
        assert_eq!(escaper.escape("plain"), "'plain'");
        assert_eq!(escaper.escape("O'Brien"), "'O\\'Brien'");
        assert_eq!(escaper.escape("say \"hi\""), "'say \\\"hi\\\"'");
        assert_eq!(escaper.escape("back\\slash"), "'back\\\\slash'");
        assert_eq!(escaper.escape("a\nb\rc\td"), "'a\\nb\\rc\\td'");
        assert_eq!(escaper.escape("nul\0"), "'nul\\0'");
        assert_eq!(escaper.escape("sub\u{1a}"), "'sub\\Z'");
        assert_eq!(escaper.escape(""), "''");
    }

    #[test]
    fn test_mysql_escape_neutralizes_injection() {
        let escaped = MySqlEscaper.escape("'; DROP TABLE users; --");
        assert_eq!(escaped, "'\\'; DROP TABLE users; --'");
    }

    #[test]
    fn test_mysql_escape_identifier() {
        let escaper = MySqlEscaper;
        assert_eq!(escaper.escape_identifier("name"), "`name`");
        assert_eq!(escaper.escape_identifier("we`ird"), "`we``ird`");
        assert_eq!(escaper.escape_identifier("users.id"), "`users`.`id`");
    }

    #[test]
    fn test_postgres_escape() {
        let escaper = PostgresEscaper;
        assert_eq!(escaper.escape("O'Brien"), "'O''Brien'");
        assert_eq!(escaper.escape("back\\slash"), "E'back\\\\slash'");
        assert_eq!(escaper.escape("nul\0byte"), "'nulbyte'");
        assert_eq!(escaper.escape_identifier("user_table"), "\"user_table\"");
        assert_eq!(
            escaper.escape_identifier("users\"; DROP TABLE secrets; --"),
            "\"users\"\"; DROP TABLE secrets; --\""
        );
    }

    #[test]
    fn test_postgres_drops_nul_through_rendering() {
        use crate::option::QueryParameterOption;
        use crate::parameter::QueryParameter;

        let option = QueryParameterOption::postgres();
        let rendered = "a\0b\0".query_parameter(&option).unwrap();
        assert_eq!(rendered.as_str(), "'ab'");
        assert_eq!(PostgresEscaper.escape("\0"), "''");

        let rendered = "a\0b".query_parameter(&QueryParameterOption::mysql()).unwrap();
        assert_eq!(rendered.as_str(), "'a\\0b'");
    }

    #[test]
    fn test_escape_bytes() {
        assert_eq!(MySqlEscaper.escape_bytes(&[0xde, 0xad, 0x01]), "X'DEAD01'");
        assert_eq!(MySqlEscaper.escape_bytes(&[]), "X''");
        assert_eq!(PostgresEscaper.escape_bytes(&[0xbe, 0xef]), "'\\xbeef'::bytea");
    }
}
