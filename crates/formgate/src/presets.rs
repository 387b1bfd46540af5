//! Ready-made option sets for common field types.
//!
//! Each preset is a plain `fn(FieldBuilder) -> FieldBuilder`, applied with
//! [`FieldBuilder::preset`]:
//!
//! ```ignore
//! FieldBuilder::new("age").preset(presets::integer).min(0.0).max(150.0)
//! ```
//!
//! Typed presets keep input they cannot convert as text, so validation
//! reports it as a value of the wrong type and the original input can still
//! be shown back to the user.

use crate::defaults::is_filter_space;
use crate::field::{FieldBuilder, FieldType};
use crate::value::{parse_integer, Value, ValueType};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, ParseError, Timelike};
use regex::Regex;
use std::sync::LazyLock;

/// Names written in the latin alphabet.
pub static LATIN_NAMES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{Latin}\-. ]+$").unwrap());

/// Common email addresses. Not everything RFC 5322 allows.
pub static SIMPLE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[-_.=+%a-z0-9]+@(?:[-_a-z0-9]+\.)+[a-z]{2,4}$").unwrap()
});

/// Generic ZIP code; the real format differs per country.
pub static ZIP_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z\d]+(?:[- ]?[a-z\d]+)*$").unwrap());

/// Generic phone number, after [`phone_filter`].
pub static PHONE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\+?\d+(?:[- ]?(?:\d+|\(\d+\)))*(?:[- ]?[a-z\d]+)*$").unwrap()
});

static PHONE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[-/.]\s*").unwrap());

static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const TIME_FORMAT_EXAMPLE: &str = "YYYY-MM-DD HH:MM:SS";
pub const US_DATE_FORMAT: &str = "%m/%d/%Y";
pub const US_DATE_FORMAT_EXAMPLE: &str = "MM/DD/YYYY";
pub const UK_DATE_FORMAT: &str = "%d/%m/%Y";
pub const UK_DATE_FORMAT_EXAMPLE: &str = "DD/MM/YYYY";
pub const EU_DATE_FORMAT: &str = "%-d.%-m.%Y";
pub const EU_DATE_FORMAT_EXAMPLE: &str = "D.M.YYYY";
pub const HOURS_FORMAT: &str = "%H:%M";
pub const HOURS_FORMAT_EXAMPLE: &str = "HH:MM";

const SECONDS_PER_DAY: i128 = 86_400;

/// Normalize phone number separators: `-`, `/` and `.` become `-`, other
/// whitespace runs a single space.
pub fn phone_filter(input: &str) -> String {
    let dashed = PHONE_SEPARATOR.replace_all(input, "-");
    SPACES.replace_all(&dashed, " ").trim().to_string()
}

/// Parse `input` with a strftime-like `format`, rejecting trailing input.
///
/// The `-`, `_` and `^` flags are ignored so one format serves for both
/// parsing and formatting. Formats without a date part yield a time on
/// 1970-01-01, formats without a time part midnight.
pub fn parse_time(input: &str, format: &str) -> Result<NaiveDateTime, ParseError> {
    let format = strip_flags(format);
    NaiveDateTime::parse_from_str(input, &format)
        .or_else(|err| {
            NaiveDate::parse_from_str(input, &format)
                .map(|date| date.and_time(NaiveTime::MIN))
                .map_err(|_| err)
        })
        .or_else(|err| {
            NaiveTime::parse_from_str(input, &format)
                .map(|time| NaiveDate::default().and_time(time))
                .map_err(|_| err)
        })
}

fn strip_flags(format: &str) -> String {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();
    while let Some(ch) = chars.next() {
        out.push(ch);
        if ch == '%' {
            if chars.next_if(|c| matches!(c, '-' | '_' | '^')).is_some() {
                continue;
            }
            if let Some(next) = chars.next() {
                out.push(next);
            }
        }
    }
    out
}

/// Lenient fallback for free-form time input.
fn parse_any_time(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if let Ok(time) = chrono::DateTime::parse_from_rfc3339(input) {
        return Some(time.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%d"]
        .iter()
        .find_map(|format| parse_time(input, format).ok())
}

/// Input with surrounding whitespace removed, for the converting presets.
fn padless(input: &str) -> &str {
    input.trim_matches(is_filter_space)
}

fn time_filter(format: &'static str) -> impl Fn(&str) -> Option<Value> + Send + Sync {
    move |input: &str| {
        if input.is_empty() {
            return None;
        }
        Some(
            parse_time(padless(input), format)
                .ok()
                .or_else(|| parse_any_time(input))
                .map_or_else(|| Value::from(input), Value::Time),
        )
    }
}

fn time_format(format: &'static str) -> impl Fn(&Value) -> String + Send + Sync {
    move |value: &Value| match value {
        Value::Time(time) => time.format(format).to_string(),
        other => other.to_string(),
    }
}

fn time_preset(builder: FieldBuilder, format: &'static str, example: &str) -> FieldBuilder {
    builder
        .placeholder(example)
        .filter(time_filter(format))
        .format(time_format(format))
        .accepts([ValueType::Time])
}

/// Integer number.
pub fn integer(builder: FieldBuilder) -> FieldBuilder {
    builder
        .filter(|input| {
            if input.is_empty() {
                return None;
            }
            Some(parse_integer(padless(input)).map_or_else(|| Value::from(input), Value::Int))
        })
        .accepts([ValueType::Int])
}

/// Floating point number.
pub fn float(builder: FieldBuilder) -> FieldBuilder {
    builder
        .filter(|input| {
            if input.is_empty() {
                return None;
            }
            Some(parse_float(input).map_or_else(|| Value::from(input), Value::Float))
        })
        .accepts([ValueType::Float])
}

fn parse_float(input: &str) -> Option<f64> {
    let text = input.trim();
    let numeric = !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E' | b'_'))
        && text.bytes().any(|b| b.is_ascii_digit())
        && !text.contains("__")
        && !text.starts_with('_')
        && !text.ends_with('_');
    if !numeric {
        return None;
    }
    text.replace('_', "").parse().ok()
}

/// Boolean shown as a yes/no select menu.
pub fn boolean(builder: FieldBuilder) -> FieldBuilder {
    builder
        .field_type(FieldType::Select)
        .data(vec![
            (Value::Bool(true), "Yes".to_string()),
            (Value::Bool(false), "No".to_string()),
        ])
        .filter(|input| (!input.is_empty()).then(|| Value::Bool(input == "true")))
        .accepts([ValueType::Bool])
}

/// Boolean shown as a checkbox: any non-empty input is `true`.
pub fn checkbox(builder: FieldBuilder) -> FieldBuilder {
    builder
        .field_type(FieldType::Checkbox)
        .filter(|input| Some(Value::Bool(!input.is_empty())))
        .format(|value| match value {
            Value::Bool(true) => "true".to_string(),
            _ => String::new(),
        })
        .accepts([ValueType::Bool])
}

pub fn email(builder: FieldBuilder) -> FieldBuilder {
    builder
        .field_type(FieldType::Email)
        .matches(SIMPLE_EMAIL.clone())
}

pub fn zip(builder: FieldBuilder) -> FieldBuilder {
    builder.matches(ZIP_CODE.clone())
}

pub fn phone(builder: FieldBuilder) -> FieldBuilder {
    builder
        .filter(|input| Some(Value::Str(phone_filter(input))))
        .matches(PHONE_NUMBER.clone())
}

/// Full date and time, `YYYY-MM-DD HH:MM:SS`.
pub fn time(builder: FieldBuilder) -> FieldBuilder {
    time_preset(builder, TIME_FORMAT, TIME_FORMAT_EXAMPLE)
}

pub fn us_date(builder: FieldBuilder) -> FieldBuilder {
    time_preset(builder, US_DATE_FORMAT, US_DATE_FORMAT_EXAMPLE)
}

pub fn uk_date(builder: FieldBuilder) -> FieldBuilder {
    time_preset(builder, UK_DATE_FORMAT, UK_DATE_FORMAT_EXAMPLE)
}

pub fn eu_date(builder: FieldBuilder) -> FieldBuilder {
    time_preset(builder, EU_DATE_FORMAT, EU_DATE_FORMAT_EXAMPLE)
}

/// Seconds since midnight, entered as `HH:MM`.
pub fn hours(builder: FieldBuilder) -> FieldBuilder {
    builder
        .placeholder(HOURS_FORMAT_EXAMPLE)
        .filter(|input| {
            if input.is_empty() {
                return None;
            }
            Some(match parse_time(padless(input), HOURS_FORMAT) {
                Ok(time) => Value::Int(i128::from(time.num_seconds_from_midnight())),
                Err(_) => Value::from(input),
            })
        })
        .format(|value| match value {
            Value::Int(seconds) => {
                let seconds = seconds.rem_euclid(SECONDS_PER_DAY);
                format!("{:02}:{:02}", seconds / 3600, seconds % 3600 / 60)
            }
            other => other.to_string(),
        })
        .accepts([ValueType::Int])
}

/// Drop empty entries from arrays and hashes, and turn empty text into nil.
pub fn pruned(builder: FieldBuilder) -> FieldBuilder {
    builder.transform(|value| match value {
        Value::Array(items) => Some(Value::Array(
            items.into_iter().filter(|v| !v.is_empty()).collect(),
        )),
        Value::Hash(entries) => Some(Value::Hash(
            entries.into_iter().filter(|(_, v)| !v.is_empty()).collect(),
        )),
        Value::Str(s) if s.is_empty() => None,
        other => Some(other),
    })
}
