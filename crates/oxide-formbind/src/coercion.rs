//! Conversion of submitted text into typed values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use tracing::trace;

use crate::error::CoercionError;
use crate::value::{Kind, Value};

/// How checkbox-style boolean fields read submitted text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolPolicy {
    /// Any non-empty value is `true`; an empty value is `false`.
    #[default]
    Presence,
    /// Only `true`/`false`, `on`/`off`, `yes`/`no` and `1`/`0` are accepted.
    Strict,
}

/// Per-form coercion settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoercionConfig {
    /// Boolean parsing policy.
    pub bool_policy: BoolPolicy,
    /// Trim surrounding whitespace before parsing non-string values.
    pub trim_input: bool,
    /// Accepted date formats, tried in order.
    pub date_formats: Vec<String>,
    /// Accepted time formats, tried in order.
    pub time_formats: Vec<String>,
    /// Accepted formats for date and time without an offset, read as UTC.
    ///
    /// RFC 3339 is always tried first.
    pub datetime_formats: Vec<String>,
    /// Message reported instead of the error text when a value cannot be
    /// converted.
    pub invalid_value_message: Option<String>,
}

impl Default for CoercionConfig {
    fn default() -> Self {
        Self {
            bool_policy: BoolPolicy::Presence,
            trim_input: true,
            date_formats: vec!["%Y-%m-%d".to_string()],
            time_formats: vec!["%H:%M:%S".to_string(), "%H:%M".to_string()],
            datetime_formats: vec![
                "%Y-%m-%dT%H:%M:%S".to_string(),
                "%Y-%m-%dT%H:%M".to_string(),
                "%Y-%m-%d %H:%M:%S".to_string(),
            ],
            invalid_value_message: None,
        }
    }
}

impl CoercionConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the boolean policy.
    #[must_use]
    pub fn bool_policy(mut self, policy: BoolPolicy) -> Self {
        self.bool_policy = policy;
        self
    }

    /// Enables or disables trimming of non-string input.
    #[must_use]
    pub fn trim_input(mut self, trim: bool) -> Self {
        self.trim_input = trim;
        self
    }

    /// Replaces the accepted date formats.
    #[must_use]
    pub fn date_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the accepted time formats.
    #[must_use]
    pub fn time_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.time_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the accepted date and time formats.
    #[must_use]
    pub fn datetime_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.datetime_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    /// Sets a fixed message for values that cannot be converted.
    #[must_use]
    pub fn invalid_value_message(mut self, message: impl Into<String>) -> Self {
        self.invalid_value_message = Some(message.into());
        self
    }
}

/// Converts submitted strings into values of a slot's [`Kind`].
#[derive(Debug, Clone, Default)]
pub struct Coercer {
    config: CoercionConfig,
}

impl Coercer {
    /// Creates a coercer with the given configuration.
    pub fn new(config: CoercionConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CoercionConfig {
        &self.config
    }

    /// Returns the message a submitter sees for a coercion failure.
    pub fn message_for(&self, error: &CoercionError) -> String {
        self.config
            .invalid_value_message
            .clone()
            .unwrap_or_else(|| error.to_string())
    }

    /// Converts `source` into a value of `kind`.
    ///
    /// # Errors
    ///
    /// Returns a [`CoercionError`] if the text does not parse or the kind
    /// cannot be filled from text.
    pub fn coerce(&self, source: &str, kind: &Kind) -> Result<Value, CoercionError> {
        trace!(source, kind = kind.name(), "Coercing submitted value");
        let trimmed = if self.config.trim_input {
            source.trim()
        } else {
            source
        };

        match kind {
            Kind::Parsed(parse) => parse(source).map_err(|message| CoercionError::Invalid {
                input: source.to_string(),
                message,
            }),
            Kind::Optional(inner) => match **inner {
                Kind::String | Kind::Bool => self.coerce(source, inner),
                _ if trimmed.is_empty() => Ok(Value::Null),
                _ => self.coerce(source, inner),
            },
            Kind::String => Ok(Value::String(source.to_string())),
            Kind::Int => parse_int(trimmed)
                .map(Value::Int)
                .ok_or_else(|| CoercionError::InvalidInt(source.to_string())),
            Kind::Float => trimmed
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| CoercionError::InvalidFloat(source.to_string())),
            Kind::Bool => self.parse_bool(source, trimmed).map(Value::Bool),
            Kind::Date => self.parse_date(trimmed).map(Value::Date),
            Kind::Time => self.parse_time(trimmed).map(Value::Time),
            Kind::DateTime => self.parse_datetime(trimmed).map(Value::DateTime),
            Kind::List(_) | Kind::Map | Kind::Record => Err(CoercionError::Unsupported(kind.name())),
        }
    }

    fn parse_bool(&self, source: &str, trimmed: &str) -> Result<bool, CoercionError> {
        match self.config.bool_policy {
            BoolPolicy::Presence => Ok(!source.is_empty()),
            BoolPolicy::Strict => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Ok(true),
                "false" | "off" | "no" | "0" | "" => Ok(false),
                _ => Err(CoercionError::InvalidBool(source.to_string())),
            },
        }
    }

    fn parse_date(&self, source: &str) -> Result<NaiveDate, CoercionError> {
        self.config
            .date_formats
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(source, format).ok())
            .or_else(|| DateTime::parse_from_rfc3339(source).ok().map(|dt| dt.date_naive()))
            .ok_or_else(|| CoercionError::InvalidDate(source.to_string()))
    }

    fn parse_time(&self, source: &str) -> Result<NaiveTime, CoercionError> {
        self.config
            .time_formats
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(source, format).ok())
            .ok_or_else(|| CoercionError::InvalidTime(source.to_string()))
    }

    fn parse_datetime(
        &self,
        source: &str,
    ) -> Result<DateTime<chrono::FixedOffset>, CoercionError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(source) {
            return Ok(dt);
        }
        let naive = self
            .config
            .datetime_formats
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(source, format).ok())
            .or_else(|| {
                let date = self
                    .config
                    .date_formats
                    .iter()
                    .find_map(|format| NaiveDate::parse_from_str(source, format).ok())?;
                date.and_hms_opt(0, 0, 0)
            })
            .or_else(|| {
                // A bare time of day lands on the first day of year zero.
                let time = self
                    .config
                    .time_formats
                    .iter()
                    .find_map(|format| NaiveTime::parse_from_str(source, format).ok())?;
                NaiveDate::from_ymd_opt(0, 1, 1).map(|day| day.and_time(time))
            });
        naive
            .map(|naive| naive.and_utc().fixed_offset())
            .ok_or_else(|| CoercionError::InvalidDateTime(source.to_string()))
    }
}

/// Parses a signed integer with an optional `0x`, `0o` or `0b` prefix.
fn parse_int(source: &str) -> Option<i64> {
    let (negative, unsigned) = match source.as_bytes().first()? {
        b'-' => (true, &source[1..]),
        b'+' => (false, &source[1..]),
        _ => (false, source),
    };

    let (radix, digits) = match unsigned.get(..2) {
        Some("0x" | "0X") => (16, &unsigned[2..]),
        Some("0o" | "0O") => (8, &unsigned[2..]),
        Some("0b" | "0B") => (2, &unsigned[2..]),
        _ => (10, unsigned),
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).ok()
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    fn coerce(source: &str, kind: &Kind) -> Result<Value, CoercionError> {
        Coercer::default().coerce(source, kind)
    }

    #[test]
    fn test_string_passthrough() {
        assert_eq!(coerce("  padded ", &Kind::String).unwrap(), Value::from("  padded "));
        assert_eq!(coerce("", &Kind::String).unwrap(), Value::from(""));
    }

    #[test]
    fn test_int() {
        assert_eq!(coerce("14", &Kind::Int).unwrap(), Value::Int(14));
        assert_eq!(coerce(" -7 ", &Kind::Int).unwrap(), Value::Int(-7));
        assert_eq!(coerce("0x1f", &Kind::Int).unwrap(), Value::Int(31));
        assert_eq!(coerce("0b101", &Kind::Int).unwrap(), Value::Int(5));
        assert_eq!(coerce("014", &Kind::Int).unwrap(), Value::Int(14));
        assert_eq!(
            coerce("-9223372036854775808", &Kind::Int).unwrap(),
            Value::Int(i64::MIN)
        );
    }

    #[test]
    fn test_int_failure_is_an_error_not_zero() {
        assert_eq!(
            coerce("not-a-number", &Kind::Int).unwrap_err(),
            CoercionError::InvalidInt("not-a-number".to_string())
        );
        assert!(coerce("", &Kind::Int).is_err());
        assert!(coerce("0x", &Kind::Int).is_err());
        assert!(coerce("--1", &Kind::Int).is_err());
        assert!(coerce("9223372036854775808", &Kind::Int).is_err());
    }

    #[test]
    fn test_bool_presence() {
        assert_eq!(coerce("on", &Kind::Bool).unwrap(), Value::Bool(true));
        assert_eq!(coerce("false", &Kind::Bool).unwrap(), Value::Bool(true));
        assert_eq!(coerce("", &Kind::Bool).unwrap(), Value::Bool(false));
        assert_eq!(coerce(" ", &Kind::Bool).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_bool_strict() {
        let coercer = Coercer::new(CoercionConfig::new().bool_policy(BoolPolicy::Strict));
        assert_eq!(coercer.coerce("Yes", &Kind::Bool).unwrap(), Value::Bool(true));
        assert_eq!(coercer.coerce("0", &Kind::Bool).unwrap(), Value::Bool(false));
        assert!(coercer.coerce("maybe", &Kind::Bool).is_err());
    }

    #[test]
    fn test_float() {
        assert_eq!(coerce("2.5", &Kind::Float).unwrap(), Value::Float(2.5));
        assert!(coerce("two", &Kind::Float).is_err());
    }

    #[test]
    fn test_optional_empty_is_null() {
        let kind = Kind::Optional(Box::new(Kind::Int));
        assert_eq!(coerce("", &kind).unwrap(), Value::Null);
        assert_eq!(coerce("3", &kind).unwrap(), Value::Int(3));
        assert!(coerce("x", &kind).is_err());

        let kind = Kind::Optional(Box::new(Kind::Date));
        assert_eq!(coerce("  ", &kind).unwrap(), Value::Null);
    }

    #[test]
    fn test_optional_text_and_bool_keep_input() {
        let text = Kind::Optional(Box::new(Kind::String));
        assert_eq!(coerce("   ", &text).unwrap(), Value::from("   "));
        assert_eq!(coerce("", &text).unwrap(), Value::from(""));

        let flag = Kind::Optional(Box::new(Kind::Bool));
        assert_eq!(coerce("", &flag).unwrap(), Value::Bool(false));
        assert_eq!(coerce("on", &flag).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_datetime_date_and_time_fallbacks() {
        let Value::DateTime(midnight) = coerce("2024-01-15", &Kind::DateTime).unwrap() else {
            panic!("expected a datetime");
        };
        assert_eq!(midnight.to_rfc3339(), "2024-01-15T00:00:00+00:00");

        let Value::DateTime(clock) = coerce("15:04:05", &Kind::DateTime).unwrap() else {
            panic!("expected a datetime");
        };
        assert_eq!((clock.year(), clock.hour(), clock.minute()), (0, 15, 4));

        assert!(coerce("soon", &Kind::DateTime).is_err());
    }

    #[test]
    fn test_dates_and_times() {
        let Value::Date(date) = coerce("2024-01-15", &Kind::Date).unwrap() else {
            panic!("expected a date");
        };
        assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 15));

        let Value::Time(time) = coerce("09:30", &Kind::Time).unwrap() else {
            panic!("expected a time");
        };
        assert_eq!((time.hour(), time.minute()), (9, 30));

        let Value::DateTime(dt) = coerce("2024-01-15T09:30:00+02:00", &Kind::DateTime).unwrap()
        else {
            panic!("expected a datetime");
        };
        assert_eq!(dt.offset().local_minus_utc(), 7200);

        let Value::DateTime(local) = coerce("2024-01-15T09:30", &Kind::DateTime).unwrap() else {
            panic!("expected a datetime");
        };
        assert_eq!(local.offset().local_minus_utc(), 0);
        assert_eq!(local.hour(), 9);

        assert!(coerce("15.01.2024", &Kind::Date).is_err());
    }

    #[test]
    fn test_custom_date_format() {
        let coercer = Coercer::new(CoercionConfig::new().date_formats(["%d.%m.%Y"]));
        assert!(matches!(
            coercer.coerce("15.01.2024", &Kind::Date),
            Ok(Value::Date(_))
        ));
    }

    #[test]
    fn test_parsed_kind() {
        fn upper(source: &str) -> Result<Value, String> {
            if source.is_empty() {
                Err("must not be empty".to_string())
            } else {
                Ok(Value::String(source.to_uppercase()))
            }
        }
        assert_eq!(coerce("ab", &Kind::Parsed(upper)).unwrap(), Value::from("AB"));
        assert_eq!(
            coerce("", &Kind::Parsed(upper)).unwrap_err().to_string(),
            "\"\" is not valid: must not be empty"
        );
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(
            coerce("x", &Kind::Record).unwrap_err(),
            CoercionError::Unsupported("record")
        );
    }

    #[test]
    fn test_config_from_json() {
        let config: CoercionConfig =
            serde_json::from_str(r#"{"bool_policy": "strict", "trim_input": false}"#).unwrap();
        assert_eq!(config.bool_policy, BoolPolicy::Strict);
        assert!(!config.trim_input);
        assert_eq!(config.date_formats, vec!["%Y-%m-%d".to_string()]);
    }

    #[test]
    fn test_invalid_value_message_override() {
        let coercer = Coercer::new(CoercionConfig::new().invalid_value_message("Invalid."));
        let err = CoercionError::InvalidInt("x".to_string());
        assert_eq!(coercer.message_for(&err), "Invalid.");
        assert_eq!(Coercer::default().message_for(&err), err.to_string());
    }
}
