//! Render option threaded through every `query_parameter` call
//!
//! The option selects the escaping dialect and the session time zone used by
//! date/time adapters. Composites forward it unchanged to their entries.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};

use crate::error::ConfigError;
use crate::escape::{MySqlEscaper, PostgresEscaper, SqlEscaper};

/// Environment variable selecting the escaping dialect
pub const DIALECT_ENV: &str = "QUERY_PARAM_DIALECT";

/// Environment variable selecting the session time zone
pub const TIME_ZONE_ENV: &str = "QUERY_PARAM_TIME_ZONE";

/// SQL dialects with a built-in escaper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlDialect {
    #[default]
    MySql,
    Postgres,
}

impl SqlDialect {
    /// Get the escaper for this dialect
    pub fn escaper(&self) -> Arc<dyn SqlEscaper> {
        match self {
            SqlDialect::MySql => Arc::new(MySqlEscaper),
            SqlDialect::Postgres => Arc::new(PostgresEscaper),
        }
    }
}

impl FromStr for SqlDialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(SqlDialect::MySql),
            "postgres" | "postgresql" | "pg" => Ok(SqlDialect::Postgres),
            _ => Err(ConfigError::invalid_value(
                "dialect",
                s,
                "mysql or postgres",
            )),
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlDialect::MySql => write!(f, "mysql"),
            SqlDialect::Postgres => write!(f, "postgres"),
        }
    }
}

/// Options passed to every rendering call
#[derive(Debug, Clone)]
pub struct QueryParameterOption {
    escaper: Arc<dyn SqlEscaper>,
    time_zone: FixedOffset,
}

impl QueryParameterOption {
    /// Create an option with MySQL escaping in UTC
    pub fn new() -> Self {
        Self::for_dialect(SqlDialect::MySql)
    }

    /// Create an option with MySQL escaping in UTC
    pub fn mysql() -> Self {
        Self::for_dialect(SqlDialect::MySql)
    }

    /// Create an option with PostgreSQL escaping in UTC
    pub fn postgres() -> Self {
        Self::for_dialect(SqlDialect::Postgres)
    }

    /// Create an option for a built-in dialect in UTC
    pub fn for_dialect(dialect: SqlDialect) -> Self {
        Self {
            escaper: dialect.escaper(),
            time_zone: utc(),
        }
    }

    /// Load the option from `QUERY_PARAM_DIALECT` and `QUERY_PARAM_TIME_ZONE`
    ///
    /// Unset variables keep their defaults (MySQL, UTC).
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut option = Self::new();

        if let Some(dialect) = read_env(DIALECT_ENV)? {
            let dialect: SqlDialect = dialect.parse()?;
            option.escaper = dialect.escaper();
        }

        if let Some(zone) = read_env(TIME_ZONE_ENV)? {
            option.time_zone = parse_time_zone(&zone)?;
        }

        tracing::debug!(
            "Loaded query parameter option from environment: {:?}, time zone {}",
            option.escaper,
            option.time_zone
        );
        Ok(option)
    }

    /// Replace the escaper
    pub fn with_escaper(mut self, escaper: Arc<dyn SqlEscaper>) -> Self {
        self.escaper = escaper;
        self
    }

    /// Replace the session time zone
    pub fn with_time_zone(mut self, time_zone: FixedOffset) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Get the escaper
    pub fn escaper(&self) -> &dyn SqlEscaper {
        self.escaper.as_ref()
    }

    /// Get the session time zone
    pub fn time_zone(&self) -> FixedOffset {
        self.time_zone
    }

    /// Escape a text literal with the configured escaper
    pub fn escape(&self, value: &str) -> String {
        self.escaper.escape(value)
    }

    /// Escape an identifier with the configured escaper
    pub fn escape_identifier(&self, identifier: &str) -> String {
        self.escaper.escape_identifier(identifier)
    }
}

impl Default for QueryParameterOption {
    fn default() -> Self {
        Self::new()
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn read_env(name: &str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::EnvironmentError {
            message: format!("{} is not valid unicode", name),
        }),
    }
}

/// Parse `UTC`, `Z`, `+HH:MM`, `-HH:MM` or `+HHMM` into a fixed offset
pub fn parse_time_zone(value: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = || ConfigError::invalid_value("time_zone", value, "UTC, Z, +HH:MM or -HH:MM");
    let trimmed = value.trim();

    if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
        return Ok(utc());
    }

    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'+') => (1, &trimmed[1..]),
        Some(b'-') => (-1, &trimmed[1..]),
        _ => return Err(invalid()),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
