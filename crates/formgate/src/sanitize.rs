//! Normalization of untrusted input into [`Value`]s.

use crate::field::{FieldSpec, Filter};
use crate::request::Input;
use crate::value::{Key, Value};
use tracing::{trace, warn};

/// Sanitize a raw input value.
///
/// Text that decodes as UTF-8 is run through `filter`; anything else is kept
/// as [`Value::Bytes`] so validation can report the bad encoding while the
/// caller still has the original input. Lists are sanitized element-wise, map
/// keys that read as base-10 integers become [`Key::Int`]. Nested containers
/// are passed through for validation to reject.
///
/// Returns `None` when the filter discarded a top-level value.
pub fn sanitize(input: Input, filter: Option<&Filter>) -> Option<Value> {
    match input {
        Input::Text(bytes) => sanitize_text(bytes, filter),
        Input::List(items) => Some(Value::Array(
            items
                .into_iter()
                .map(|item| sanitize(item, filter).unwrap_or(Value::Null))
                .collect(),
        )),
        Input::Map(entries) => Some(Value::Hash(
            entries
                .into_iter()
                .map(|(k, v)| (Key::parse(&k), sanitize(v, filter).unwrap_or(Value::Null)))
                .collect(),
        )),
    }
}

fn sanitize_text(bytes: Vec<u8>, filter: Option<&Filter>) -> Option<Value> {
    match String::from_utf8(bytes) {
        Ok(text) => match filter {
            Some(filter) => filter(&text),
            None => Some(Value::Str(text)),
        },
        Err(err) => {
            warn!(
                bytes = err.as_bytes().len(),
                valid_up_to = err.utf8_error().valid_up_to(),
                "input is not valid UTF-8, keeping raw bytes"
            );
            Some(Value::Bytes(err.into_bytes()))
        }
    }
}

/// Full import pipeline for one field: sanitize with the field's filter, then
/// apply its transform to the whole result.
pub(crate) fn import_value(spec: &FieldSpec, input: Input) -> Option<Value> {
    let value = sanitize(input, spec.filter())?;
    match spec.transform() {
        Some(transform) => {
            trace!(field = spec.name(), "applying transform");
            transform(value)
        }
        None => Some(value),
    }
}
