//! Error message lookup and formatting.
//!
//! The engine reports stable [`ErrorKind`]s; turning them into text goes through
//! a [`MessageCatalog`]. Hosts plug in their own catalog for localization, and
//! anything it does not know falls back to [`DefaultMessages`].

use crate::error::ErrorKind;
use crate::field::Field;

/// Source of human readable error message templates.
///
/// Templates may contain `%p`, replaced with the field's error title.
pub trait MessageCatalog: Send + Sync {
    /// Template for the given kind, or `None` to use the built-in default.
    fn message(&self, kind: ErrorKind, field: &Field<'_>) -> Option<String>;

    /// Unit word for counted messages ("1 character", "5 elements").
    fn unit(&self, singular: &str, count: f64) -> String {
        if count == 1.0 {
            singular.to_string()
        } else {
            format!("{}s", singular)
        }
    }
}

/// Built-in English messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessages;

impl DefaultMessages {
    pub fn template(kind: ErrorKind) -> &'static str {
        match kind {
            ErrorKind::RequiredScalar => "%p is required",
            ErrorKind::RequiredArray => "%p are required",
            ErrorKind::NotArray => "%p are not an array",
            ErrorKind::NotHash => "%p are not a hash",
            ErrorKind::NotString => "%p is not a string",
            ErrorKind::MatchKey => "%p contain invalid key",
            ErrorKind::InvalidKey => "%p contain invalid key",
            ErrorKind::MinKey => "%p contain too small key",
            ErrorKind::MaxKey => "%p contain too large key",
            ErrorKind::MinCount => "%p must have at least",
            ErrorKind::MaxCount => "%p may have at most",
            ErrorKind::ValueType => "%p like this is not valid",
            ErrorKind::ElementType => "%p contain invalid value",
            ErrorKind::MinLimit => "%p must be at least",
            ErrorKind::MaxLimit => "%p may be at most",
            ErrorKind::InfLimit => "%p must be greater than",
            ErrorKind::SupLimit => "%p must be less than",
            ErrorKind::InvalidEncoding => "%p must use valid encoding",
            ErrorKind::InvalidCharacters => "%p may not contain invalid characters",
            ErrorKind::MinSize => "%p must have at least",
            ErrorKind::MaxSize => "%p may have at most",
            ErrorKind::MinBytesize => "%p must have at least",
            ErrorKind::MaxBytesize => "%p may have at most",
            ErrorKind::RejectMsg => "%p like this is not allowed",
            ErrorKind::MatchMsg => "%p like this is not valid",
            ErrorKind::Custom => "%p is not valid",
        }
    }
}

impl MessageCatalog for DefaultMessages {
    fn message(&self, kind: ErrorKind, _field: &Field<'_>) -> Option<String> {
        Some(Self::template(kind).to_string())
    }
}

/// Numeric detail appended to a message: the bound and an optional unit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Count<'a> {
    pub value: f64,
    pub unit: Option<&'a str>,
}

/// Render a bound for display: integral values without a fractional part.
pub(crate) fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Expand a template into the final message.
pub(crate) fn render(
    catalog: &dyn MessageCatalog,
    template: &str,
    count: Option<Count<'_>>,
    title: &str,
) -> String {
    let mut msg = template.to_string();
    if let Some(count) = count {
        msg.push(' ');
        msg.push_str(&format_bound(count.value));
        if let Some(unit) = count.unit {
            msg.push(' ');
            msg.push_str(&catalog.unit(unit, count.value));
        }
    }
    msg.replace("%p", title)
}
