//! Serde helpers for date/time record fields
//!
//! `chrono` serializes timestamps as RFC 3339 text, which a flattened record would
//! escape as an ordinary string. Annotating the field keeps it a date/time
//! parameter, rendered as `'YYYY-MM-DD HH:MM:SS.ffffff'` in the session time zone:
//!
//! ```
//! use chrono::{DateTime, TimeZone, Utc};
//! use elif_query_params::{render, Record};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Login {
//!     #[serde(with = "elif_query_params::datetime")]
//!     at: DateTime<Utc>,
//! }
//!
//! let login = Login { at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap() };
//! assert_eq!(
//!     render(&Record(login)).unwrap().as_str(),
//!     "`at` = '2024-05-01 08:00:00.000000'"
//! );
//! ```
//!
//! Other serializers (JSON, for instance) still see plain RFC 3339 text.
//!
//! Naive values have their own modules: [`naive_datetime`], [`date`] and [`time`].
//! They render as written, without time zone conversion. Every module has an
//! `option` submodule for `Option<_>` fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::record::{DATETIME_TOKEN, DATE_TOKEN, NAIVE_DATETIME_TOKEN, TIME_TOKEN};

pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_newtype_struct(
        DATETIME_TOKEN,
        &value.to_rfc3339_opts(SecondsFormat::Micros, true),
    )
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    DateTime::<Utc>::deserialize(deserializer)
}

/// Same as the parent module for `Option<DateTime<Utc>>` fields
pub mod option {
    use super::*;

    struct Marked<'a>(&'a DateTime<Utc>);

    impl Serialize for Marked<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            super::serialize(self.0, serializer)
        }
    }

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_some(&Marked(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<DateTime<Utc>>::deserialize(deserializer)
    }
}

macro_rules! naive_with_module {
    ($(#[$meta:meta])* $module:ident, $ty:ty, $token:expr, $format:expr) => {
        $(#[$meta])*
        pub mod $module {
            use super::*;

            pub fn serialize<S: Serializer>(value: &$ty, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_newtype_struct($token, &value.format($format).to_string())
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<$ty, D::Error> {
                <$ty>::deserialize(deserializer)
            }

            /// `Option<_>` variant
            pub mod option {
                use super::*;

                struct Marked<'a>(&'a $ty);

                impl Serialize for Marked<'_> {
                    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                        super::serialize(self.0, serializer)
                    }
                }

                pub fn serialize<S: Serializer>(
                    value: &Option<$ty>,
                    serializer: S,
                ) -> Result<S::Ok, S::Error> {
                    match value {
                        Some(value) => serializer.serialize_some(&Marked(value)),
                        None => serializer.serialize_none(),
                    }
                }

                pub fn deserialize<'de, D: Deserializer<'de>>(
                    deserializer: D,
                ) -> Result<Option<$ty>, D::Error> {
                    Option::<$ty>::deserialize(deserializer)
                }
            }
        }
    };
}

naive_with_module!(
    /// `NaiveDateTime` fields, rendered as `'YYYY-MM-DD HH:MM:SS.ffffff'`
    naive_datetime,
    NaiveDateTime,
    NAIVE_DATETIME_TOKEN,
    "%Y-%m-%dT%H:%M:%S%.f"
);

naive_with_module!(
    /// `NaiveDate` fields, rendered as `'YYYY-MM-DD'`
    date,
    NaiveDate,
    DATE_TOKEN,
    "%Y-%m-%d"
);

naive_with_module!(
    /// `NaiveTime` fields, rendered as `'HH:MM:SS.ffffff'`
    time,
    NaiveTime,
    TIME_TOKEN,
    "%H:%M:%S%.f"
);

#[cfg(test)]
mod tests {
    use crate::option::QueryParameterOption;
    use crate::parameter::QueryParameter;
    use crate::record::{to_query_dictionary, Record};
    use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Session {
        #[serde(with = "crate::datetime")]
        started_at: DateTime<Utc>,
        #[serde(with = "crate::datetime::option")]
        ended_at: Option<DateTime<Utc>>,
    }

    fn session() -> Session {
        Session {
            started_at: Utc.with_ymd_and_hms(2024, 3, 10, 22, 30, 0).unwrap(),
            ended_at: None,
        }
    }

    #[test]
    fn test_datetime_field_renders_in_session_zone() {
        let option = QueryParameterOption::new()
            .with_time_zone(FixedOffset::east_opt(2 * 3600).unwrap());
        let dict = to_query_dictionary(&session()).unwrap();
        let mut pairs: Vec<String> = dict
            .query_parameter(&option)
            .unwrap()
            .into_string()
            .split(", ")
            .map(str::to_string)
            .collect();
        pairs.sort();

        assert_eq!(
            pairs,
            vec![
                "`ended_at` = NULL",
                "`started_at` = '2024-03-11 00:30:00.000000'",
            ]
        );
    }

    #[test]
    fn test_optional_datetime_present() {
        let mut session = session();
        session.ended_at = Some(Utc.with_ymd_and_hms(2024, 3, 11, 1, 0, 0).unwrap());

        let rendered = Record(&session)
            .query_parameter(&QueryParameterOption::default())
            .unwrap();
        assert!(rendered.as_str().contains("`ended_at` = '2024-03-11 01:00:00.000000'"));
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Shift {
        #[serde(with = "crate::datetime::naive_datetime")]
        clocked_in: NaiveDateTime,
        #[serde(with = "crate::datetime::date")]
        day: NaiveDate,
        #[serde(with = "crate::datetime::time")]
        starts: NaiveTime,
        #[serde(with = "crate::datetime::date::option")]
        paid_on: Option<NaiveDate>,
    }

    fn shift() -> Shift {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        Shift {
            clocked_in: day.and_hms_micro_opt(8, 15, 0, 500).unwrap(),
            day,
            starts: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            paid_on: None,
        }
    }

    #[test]
    fn test_naive_fields_render_without_conversion() {
        let option = QueryParameterOption::new()
            .with_time_zone(FixedOffset::east_opt(9 * 3600).unwrap());
        let dict = to_query_dictionary(&shift()).unwrap();
        let mut pairs: Vec<String> = dict
            .query_parameter(&option)
            .unwrap()
            .into_string()
            .split(", ")
            .map(str::to_string)
            .collect();
        pairs.sort();

        assert_eq!(
            pairs,
            vec![
                "`clocked_in` = '2024-02-29 08:15:00.000500'",
                "`day` = '2024-02-29'",
                "`paid_on` = NULL",
                "`starts` = '08:00:00.000000'",
            ]
        );
    }

    #[test]
    fn test_optional_naive_date_present() {
        let mut shift = shift();
        shift.paid_on = NaiveDate::from_ymd_opt(2024, 3, 1);

        let rendered = Record(&shift)
            .query_parameter(&QueryParameterOption::default())
            .unwrap();
        assert!(rendered.as_str().contains("`paid_on` = '2024-03-01'"));
    }

    #[test]
    fn test_naive_fields_round_trip_through_json() {
        let json = serde_json::to_value(shift()).unwrap();
        assert_eq!(json["clocked_in"], "2024-02-29T08:15:00.000500");
        assert_eq!(json["day"], "2024-02-29");
        assert_eq!(json["starts"], "08:00:00");

        let back: Shift = serde_json::from_value(json).unwrap();
        assert_eq!(back, shift());
    }

    #[test]
    fn test_json_still_sees_rfc3339() {
        let json = serde_json::to_value(session()).unwrap();
        assert_eq!(json["started_at"], "2024-03-10T22:30:00.000000Z");
        assert!(json["ended_at"].is_null());

        let back: Session = serde_json::from_value(json).unwrap();
        assert_eq!(back, session());
    }
}
