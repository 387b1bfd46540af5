//! Internal (decoded) field values.

use crate::defaults::is_filter_space;
use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// A decoded field value as stored on a form.
///
/// Unset fields are `None` in the form's value store; `Null` only appears
/// inside containers or as the result of a filter that discards its input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Str(String),
    /// Raw bytes of input that failed UTF-8 decoding, kept so validation can
    /// report it and callers can still echo it back.
    Bytes(Vec<u8>),
    Int(i128),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveDateTime),
    Array(Vec<Value>),
    Hash(IndexMap<Key, Value>),
}

/// Hash field key. Keys that look like base-10 integers are stored as `Int`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i128),
    Str(String),
}

/// Native value types a field may accept instead of plain strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Str,
    Int,
    Float,
    Bool,
    Date,
    Time,
}

impl Value {
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(items.into_iter().collect())
    }

    pub fn hash<K: Into<Key>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Hash(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Native type of a scalar value, `None` for containers, null and raw bytes.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Str(_) => Some(ValueType::Str),
            Value::Int(_) => Some(ValueType::Int),
            Value::Float(_) => Some(ValueType::Float),
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Date(_) => Some(ValueType::Date),
            Value::Time(_) => Some(ValueType::Time),
            Value::Null | Value::Bytes(_) | Value::Array(_) | Value::Hash(_) => None,
        }
    }

    /// Text-like values: decoded strings and preserved raw bytes.
    pub fn is_text(&self) -> bool {
        matches!(self, Value::Str(_) | Value::Bytes(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Str(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Hash(h) => h.is_empty(),
            _ => false,
        }
    }

    /// Empty, or text consisting of whitespace only.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Str(s) => s.chars().all(is_filter_space),
            Value::Bytes(b) => b.iter().all(|&c| is_filter_space(c as char)),
            other => other.is_empty(),
        }
    }

    /// Numeric view used by the `min`/`max`/`inf`/`sup` bounds.
    ///
    /// Text is read like a lenient float parser: the longest numeric prefix wins
    /// and text without one is zero.
    pub fn to_f64(&self) -> f64 {
        match self {
            Value::Str(s) => leading_float(s),
            Value::Bytes(b) => leading_float(&String::from_utf8_lossy(b)),
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            Value::Time(t) => t.and_utc().timestamp() as f64,
            _ => 0.0,
        }
    }

    /// Plain string conversion used for wire output.
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Str(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => f.write_str(&format_float(*v)),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Hash(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}=>{}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Floats keep a fractional digit when integral ("0.0", "1.5").
pub(crate) fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

/// Parse the longest float-looking prefix of `s`, ignoring leading whitespace.
fn leading_float(s: &str) -> f64 {
    let bytes = s.trim_start().as_bytes();
    let mut end = 0;
    let mut digits = String::new();

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        digits.push(bytes[end] as char);
        end += 1;
    }
    let int_start = digits.len();
    while end < bytes.len() && (bytes[end].is_ascii_digit() || (bytes[end] == b'_' && end > 0)) {
        if bytes[end] != b'_' {
            digits.push(bytes[end] as char);
        }
        end += 1;
    }
    let mut has_digits = digits.len() > int_start;

    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        digits.push('.');
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            digits.push(bytes[end] as char);
            end += 1;
        }
        has_digits = true;
    }
    if !has_digits {
        return 0.0;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = String::from("e");
        let mut pos = end + 1;
        if pos < bytes.len() && (bytes[pos] == b'+' || bytes[pos] == b'-') {
            exp.push(bytes[pos] as char);
            pos += 1;
        }
        let exp_digits = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            exp.push(bytes[pos] as char);
            pos += 1;
        }
        if pos > exp_digits {
            digits.push_str(&exp);
        }
    }

    digits.parse().unwrap_or(0.0)
}

impl Key {
    /// Parse a key the way request keys are coerced: base-10 integers become
    /// `Int`. Integers past the `i128` range are clamped to its bounds, so they
    /// still compare as out of range.
    pub fn parse(raw: &str) -> Self {
        let Some(digits) = integer_digits(raw) else {
            return Key::Str(raw.to_string());
        };
        let clamped = if digits.starts_with('-') {
            i128::MIN
        } else {
            i128::MAX
        };
        Key::Int(digits.parse().unwrap_or(clamped))
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            Key::Int(i) => Some(*i),
            Key::Str(_) => None,
        }
    }
}

/// Strict base-10 integer: optional sign, digits, single underscores between
/// digits. `None` also when the number does not fit.
pub(crate) fn parse_integer(raw: &str) -> Option<i128> {
    integer_digits(raw)?.parse().ok()
}

/// The sign and digits of a strict base-10 integer, underscores removed.
fn integer_digits(raw: &str) -> Option<String> {
    let body = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    if body.is_empty()
        || body.starts_with('_')
        || body.ends_with('_')
        || body.contains("__")
        || !body.bytes().all(|b| b.is_ascii_digit() || b == b'_')
    {
        return None;
    }
    Some(raw.chars().filter(|&c| c != '_').collect())
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{}", i),
            Key::Str(s) => f.write_str(s),
        }
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<i128> for Key {
    fn from(i: i128) -> Self {
        Key::Int(i)
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i as i128)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i as i128)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i128> for Value {
    fn from(i: i128) -> Self {
        Value::Int(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i as i128)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i128)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(t: NaiveDateTime) -> Self {
        Value::Time(t)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_blank() {
        assert!(Value::Null.is_empty());
        assert!(Value::from("").is_empty());
        assert!(!Value::from(" ").is_empty());
        assert!(Value::from(" \t\r\n").is_blank());
        assert!(Value::array([]).is_empty());
        assert!(!Value::Int(0).is_empty());
        assert!(!Value::Bool(false).is_blank());
    }

    #[test]
    fn test_leading_float() {
        assert_eq!(Value::from("0.3").to_f64(), 0.3);
        assert_eq!(Value::from("0.9e10").to_f64(), 9e9);
        assert_eq!(Value::from("12abc").to_f64(), 12.0);
        assert_eq!(Value::from("abc").to_f64(), 0.0);
        assert_eq!(Value::from("-1_000").to_f64(), -1000.0);
        assert_eq!(Value::from("1.").to_f64(), 1.0);
        assert_eq!(Value::Int(7).to_f64(), 7.0);
    }

    #[test]
    fn test_key_parse() {
        assert_eq!(Key::parse("12"), Key::Int(12));
        assert_eq!(Key::parse("-1"), Key::Int(-1));
        assert_eq!(Key::parse("1_000"), Key::Int(1000));
        assert_eq!(Key::parse("18446744073709551616"), Key::Int(1 << 64));
        let huge = format!("1{}", "0".repeat(40));
        assert_eq!(Key::parse(&huge), Key::Int(i128::MAX));
        assert_eq!(Key::parse(&format!("-{}", huge)), Key::Int(i128::MIN));
        assert_eq!(Key::parse("+1_7"), Key::Int(17));
        assert_eq!(parse_integer(&huge), None);
        assert_eq!(Key::parse("0x0"), Key::Str("0x0".into()));
        assert_eq!(Key::parse("0b0"), Key::Str("0b0".into()));
        assert_eq!(Key::parse("_1"), Key::Str("_1".into()));
        assert_eq!(Key::parse(""), Key::Str(String::new()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(0.0).to_string(), "0.0");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "");
        let date = NaiveDate::from_ymd_opt(2011, 12, 31).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2011-12-31");
    }

    #[test]
    fn test_serialize_hash_keys_as_strings() {
        let v = Value::hash([(1, Value::from("a")), (2, Value::Int(3))]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"1":"a","2":3}"#);
    }
}
