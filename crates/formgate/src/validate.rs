//! The validation pipeline.
//!
//! A pass walks all fields in declaration order and fills one error slot per
//! field. Per field the checks run in a fixed order and stop at the first
//! failure:
//!
//! 1. presence: required fields must not be empty; empty optional fields of
//!    the right shape are done
//! 2. container shape and element count
//! 3. hash keys
//! 4. per value: type or text checks (encoding, characters, sizes, patterns),
//!    numeric bounds, then the `test` callback
//! 5. the `check` callback
//!
//! Fields which already have errors when the pass reaches them (reported by an
//! earlier sibling's `check`, or before a non-forced pass) are skipped.
//!
//! While a pass runs, the form's error accessors show the errors recorded so
//! far, so callbacks may ask whether fields validated earlier are valid.

use crate::error::{ErrorKind, FieldError, Result};
use crate::field::{Field, FieldSpec, Kind, Setting};
use crate::form::Form;
use crate::messages::{render, Count, DefaultMessages};
use crate::value::{Key, Value};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

/// Error lists indexed by field position.
pub(crate) type Slots = Vec<Vec<FieldError>>;

/// Printable characters plus the usual whitespace used in text input.
static ALLOWED_CHARACTERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^\p{White_Space}\p{Cc}\p{Cn}]|[ \t\r\n])*$").unwrap()
});

/// Context handed to `test` and `check` callbacks.
///
/// It reads the form being validated and records errors into the pass in
/// progress. Fields later in declaration order have not been validated yet
/// and read as valid.
pub struct FieldCheck<'a> {
    field: Field<'a>,
}

impl<'a> FieldCheck<'a> {
    fn new(field: Field<'a>) -> Self {
        Self { field }
    }

    /// The field being validated.
    pub fn field(&self) -> Field<'a> {
        self.field
    }

    pub fn form(&self) -> &'a Form {
        self.field.form()
    }

    pub fn value(&self) -> Option<&'a Value> {
        self.field.value()
    }

    /// Value of a sibling field.
    pub fn value_of(&self, name: &str) -> Result<Option<&'a Value>> {
        self.form().value(name)
    }

    /// Whether no error has been recorded for this field so far in the pass.
    pub fn valid(&self) -> bool {
        self.field.valid()
    }

    /// Errors recorded for this field so far in the pass.
    pub fn errors(&self) -> Vec<FieldError> {
        self.field.errors()
    }

    /// Whether a sibling field has no errors so far in the pass.
    pub fn valid_of(&self, name: &str) -> Result<bool> {
        self.form().fields_valid(&[name])
    }

    /// Errors recorded for a sibling field so far in the pass.
    pub fn errors_of(&self, name: &str) -> Result<Vec<FieldError>> {
        self.form().errors_for(name)
    }

    /// Report a custom error; `%p` is replaced with the field's error title.
    pub fn report(&mut self, msg: &str) -> &mut Self {
        let error = FieldError::custom(msg.replace("%p", self.field.error_title()));
        self.form().record(self.field.index(), |slot| slot.push(error));
        self
    }

    /// Like [`FieldCheck::report`], but puts the error first.
    pub fn report_first(&mut self, msg: &str) -> &mut Self {
        let error = FieldError::custom(msg.replace("%p", self.field.error_title()));
        self.form().record(self.field.index(), |slot| slot.insert(0, error));
        self
    }

    /// Report an error of a built-in kind using the form's message catalog.
    pub fn report_kind(&mut self, kind: ErrorKind) -> &mut Self {
        self.fail(kind, None, None);
        self
    }

    /// Report a custom error against a sibling field, as is.
    pub fn report_for(&mut self, name: &str, msg: &str) -> Result<&mut Self> {
        let index = self.form().schema().require(name)?;
        let error = FieldError::custom(msg);
        self.form().record(index, |slot| slot.push(error));
        Ok(self)
    }

    fn spec(&self) -> &'a FieldSpec {
        self.field.spec()
    }

    fn resolve<T: Clone>(&self, setting: &Option<Setting<T>>) -> Option<T> {
        setting.as_ref().map(|s| s.resolve(&self.field))
    }

    fn fail(&mut self, kind: ErrorKind, custom: Option<&str>, count: Option<Count<'_>>) {
        let catalog = self.form().catalog();
        let template = custom
            .map(str::to_string)
            .or_else(|| catalog.message(kind, &self.field))
            .unwrap_or_else(|| DefaultMessages::template(kind).to_string());
        let message = render(catalog, &template, count, self.field.error_title());
        trace!(field = self.field.name(), kind = %kind, "validation failed");
        let error = FieldError::new(kind, message);
        self.form().record(self.field.index(), |slot| slot.push(error));
    }

    fn fail_count(&mut self, kind: ErrorKind, limit: f64, unit: Option<&str>) {
        self.fail(kind, None, Some(Count { value: limit, unit }));
    }
}

/// Run one validation pass on top of `slots`, which must hold one entry per
/// field, and return the results.
pub(crate) fn run(form: &Form, slots: Slots) -> Slots {
    form.begin_pass(slots);
    for (index, spec) in form.schema().fields().iter().enumerate() {
        let field = Field::new(form, spec, index);
        validate_field(&mut FieldCheck::new(field));
    }
    let slots = form.end_pass();
    debug!(
        schema = form.schema().name(),
        invalid = slots.iter().filter(|s| !s.is_empty()).count(),
        "validation pass done"
    );
    slots
}

fn validate_field(c: &mut FieldCheck<'_>) {
    if !c.valid() {
        return;
    }
    let field = c.field();
    let spec = c.spec();

    if field.empty() {
        if field.required() {
            let kind = if field.scalar() {
                ErrorKind::RequiredScalar
            } else {
                ErrorKind::RequiredArray
            };
            c.fail(kind, spec.required_msg.as_deref(), None);
            return;
        }
        if field.correct() {
            return;
        }
    }

    let Some(value) = field.value() else {
        return;
    };
    let passed = match spec.kind() {
        Kind::Array => validate_array(c, value),
        Kind::Hash => validate_hash(c, value),
        Kind::Scalar => validate_value(c, value),
    };

    if passed {
        if let Some(check) = &spec.check {
            check(c);
        }
    }
}

fn validate_array(c: &mut FieldCheck<'_>, value: &Value) -> bool {
    let Value::Array(items) = value else {
        c.fail(ErrorKind::NotArray, None, None);
        return false;
    };
    validate_count(c, items.len()) && items.iter().all(|item| validate_value(c, item))
}

fn validate_hash(c: &mut FieldCheck<'_>, value: &Value) -> bool {
    let Value::Hash(entries) = value else {
        c.fail(ErrorKind::NotHash, None, None);
        return false;
    };
    validate_count(c, entries.len())
        && entries
            .iter()
            .all(|(k, v)| validate_key(c, k) && validate_value(c, v))
}

fn validate_count(c: &mut FieldCheck<'_>, count: usize) -> bool {
    let spec = c.spec();
    if let Some(limit) = c.resolve(&spec.min_count) {
        if count < limit {
            c.fail_count(ErrorKind::MinCount, limit as f64, Some("element"));
            return false;
        }
    }
    if let Some(limit) = c.resolve(&spec.max_count) {
        if count > limit {
            c.fail_count(ErrorKind::MaxCount, limit as f64, Some("element"));
            return false;
        }
    }
    true
}

fn validate_key(c: &mut FieldCheck<'_>, key: &Key) -> bool {
    let spec = c.spec();
    if !spec.match_key.is_empty() {
        let text = key.to_string();
        if !spec.match_key.iter().all(|re| re.is_match(&text)) {
            c.fail(ErrorKind::MatchKey, None, None);
            return false;
        }
        return true;
    }

    let Some(key) = key.as_int() else {
        c.fail(ErrorKind::InvalidKey, None, None);
        return false;
    };
    if let Some(limit) = c.resolve(&spec.min_key) {
        if key < limit {
            c.fail(ErrorKind::MinKey, None, None);
            return false;
        }
    }
    if let Some(limit) = c.resolve(&spec.max_key) {
        if key > limit {
            c.fail(ErrorKind::MaxKey, None, None);
            return false;
        }
    }
    true
}

fn validate_value(c: &mut FieldCheck<'_>, value: &Value) -> bool {
    let spec = c.spec();
    let scalar = spec.kind() == Kind::Scalar;

    if spec.typed() {
        let accepted = value
            .value_type()
            .is_some_and(|t| spec.accepts.contains(&t));
        if !accepted {
            let kind = if scalar {
                ErrorKind::ValueType
            } else {
                ErrorKind::ElementType
            };
            c.fail(kind, None, None);
            return false;
        }
    } else if !validate_string(c, value, scalar) {
        return false;
    }

    let number = value.to_f64();
    let bounds = [
        (&spec.min, ErrorKind::MinLimit),
        (&spec.max, ErrorKind::MaxLimit),
        (&spec.inf, ErrorKind::InfLimit),
        (&spec.sup, ErrorKind::SupLimit),
    ];
    for (setting, kind) in bounds {
        let Some(limit) = c.resolve(setting) else {
            continue;
        };
        let outside = match kind {
            ErrorKind::MinLimit => number < limit,
            ErrorKind::MaxLimit => number > limit,
            ErrorKind::InfLimit => number <= limit,
            _ => number >= limit,
        };
        if outside {
            c.fail_count(kind, limit, None);
            return false;
        }
    }

    if let Some(test) = &spec.test {
        test(c, value);
        if !c.valid() {
            return false;
        }
    }
    true
}

fn validate_string(c: &mut FieldCheck<'_>, value: &Value, scalar: bool) -> bool {
    let text = match value {
        Value::Str(s) => s.as_str(),
        Value::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(s) if bytes.is_ascii() => s,
            _ => {
                c.fail(ErrorKind::InvalidEncoding, None, None);
                return false;
            }
        },
        _ => {
            let kind = if scalar {
                ErrorKind::NotString
            } else {
                ErrorKind::ElementType
            };
            c.fail(kind, None, None);
            return false;
        }
    };

    if !ALLOWED_CHARACTERS.is_match(text) {
        c.fail(ErrorKind::InvalidCharacters, None, None);
        return false;
    }

    let spec = c.spec();
    let chars = text.chars().count();
    let bytes = text.len();
    let sizes = [
        (&spec.min_size, ErrorKind::MinSize, chars, "character"),
        (&spec.min_bytesize, ErrorKind::MinBytesize, bytes, "byte"),
        (&spec.max_size, ErrorKind::MaxSize, chars, "character"),
        (&spec.max_bytesize, ErrorKind::MaxBytesize, bytes, "byte"),
    ];
    for (setting, kind, size, unit) in sizes {
        let Some(limit) = c.resolve(setting) else {
            continue;
        };
        let outside = match kind {
            ErrorKind::MinSize | ErrorKind::MinBytesize => size < limit,
            _ => size > limit,
        };
        if outside {
            c.fail_count(kind, limit as f64, Some(unit));
            return false;
        }
    }

    if spec.reject.iter().any(|re| re.is_match(text)) {
        let msg = spec.reject_msg.as_deref().or(spec.msg.as_deref());
        c.fail(ErrorKind::RejectMsg, msg, None);
        return false;
    }
    if !spec.matches.iter().all(|re| re.is_match(text)) {
        let msg = spec.match_msg.as_deref().or(spec.msg.as_deref());
        c.fail(ErrorKind::MatchMsg, msg, None);
        return false;
    }
    true
}

/// Run a pass from scratch.
pub(crate) fn fresh_slots(form: &Form) -> Slots {
    run(form, vec![Vec::new(); form.schema().len()])
}
