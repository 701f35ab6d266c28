//! Date and time widgets.

use chrono::Utc;

use super::{input_tag, Widget};
use crate::value::{Value, DATE_FORMAT, TIME_FORMAT};

const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A date input (`YYYY-MM-DD`).
#[derive(Debug, Clone, Default)]
pub struct DateInput;

impl Widget for DateInput {
    fn render(&self, name: &str, value: &Value) -> String {
        let text = match value {
            Value::Date(d) => d.format(DATE_FORMAT).to_string(),
            Value::DateTime(dt) => dt.format(DATE_FORMAT).to_string(),
            other => other.to_string(),
        };
        input_tag("date", name, Some(&Value::String(text)))
    }

    fn input_type(&self) -> &str {
        "date"
    }
}

/// A time of day input (`HH:MM:SS`).
#[derive(Debug, Clone, Default)]
pub struct TimeInput;

impl Widget for TimeInput {
    fn render(&self, name: &str, value: &Value) -> String {
        let text = match value {
            Value::Time(t) => t.format(TIME_FORMAT).to_string(),
            Value::DateTime(dt) => dt.format(TIME_FORMAT).to_string(),
            other => other.to_string(),
        };
        input_tag("time", name, Some(&Value::String(text)))
    }

    fn input_type(&self) -> &str {
        "time"
    }
}

/// A local date and time input.
///
/// `datetime-local` inputs carry no offset, so the value is shown in UTC,
/// which is how offset-free submissions are read back.
#[derive(Debug, Clone, Default)]
pub struct DateTimeInput;

impl Widget for DateTimeInput {
    fn render(&self, name: &str, value: &Value) -> String {
        let text = match value {
            Value::DateTime(dt) => dt
                .with_timezone(&Utc)
                .format(DATETIME_LOCAL_FORMAT)
                .to_string(),
            other => other.to_string(),
        };
        input_tag("datetime-local", name, Some(&Value::String(text)))
    }

    fn input_type(&self) -> &str {
        "datetime-local"
    }
}
