//! Field definitions and the bound field view.
//!
//! A [`FieldSpec`] is the immutable description of one field, shared by every
//! form built from its schema. A [`Field`] is that spec bound to one [`Form`]:
//! it reads the live value and the form's validation results.

use crate::error::{FieldError, FormError, Result};
use crate::form::Form;
use crate::output::WireValue;
use crate::validate::FieldCheck;
use crate::value::{Value, ValueType};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Per-value input filter, run on decoded text during import. `None` stores nil.
pub type Filter = Arc<dyn Fn(&str) -> Option<Value> + Send + Sync>;
/// Whole-container input transform, run after filtering.
pub type Transform = Arc<dyn Fn(Value) -> Option<Value> + Send + Sync>;
/// Output formatter for the wire representation.
pub type Format = Arc<dyn Fn(&Value) -> String + Send + Sync>;
/// Per-value validation callback; reporting an error stops the pipeline.
pub type Test = Arc<dyn Fn(&mut FieldCheck<'_>, &Value) + Send + Sync>;
/// Whole-field validation callback, run after every other check passed.
pub type Check = Arc<dyn Fn(&mut FieldCheck<'_>) + Send + Sync>;

/// An option which is either fixed at definition time or computed per form.
///
/// Computed settings receive the bound field. When they run during validation,
/// validity queries see the results recorded so far in the pass.
pub enum Setting<T> {
    Fixed(T),
    Computed(Arc<dyn Fn(&Field<'_>) -> T + Send + Sync>),
}

impl<T: Clone> Setting<T> {
    pub fn computed(f: impl Fn(&Field<'_>) -> T + Send + Sync + 'static) -> Self {
        Setting::Computed(Arc::new(f))
    }

    pub fn resolve(&self, field: &Field<'_>) -> T {
        match self {
            Setting::Fixed(v) => v.clone(),
            Setting::Computed(f) => f(field),
        }
    }

    /// The fixed value, if this setting does not depend on the form.
    pub fn fixed(&self) -> Option<&T> {
        match self {
            Setting::Fixed(v) => Some(v),
            Setting::Computed(_) => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Setting::Computed(_))
    }
}

impl<T: Clone> Clone for Setting<T> {
    fn clone(&self) -> Self {
        match self {
            Setting::Fixed(v) => Setting::Fixed(v.clone()),
            Setting::Computed(f) => Setting::Computed(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Fixed(v) => write!(f, "Fixed({:?})", v),
            Setting::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl<T> From<T> for Setting<T> {
    fn from(v: T) -> Self {
        Setting::Fixed(v)
    }
}

/// Container shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Scalar,
    Array,
    Hash,
}

/// Presentation type of a field. Drives the hidden/ignored/visible predicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    /// Carried through forms and URLs but not shown.
    Hidden,
    /// Neither shown nor carried on output.
    Ignore,
    Password,
    Email,
    Textarea,
    Select,
    Checkbox,
    Custom(String),
}

/// Immutable description of one field.
#[derive(Clone)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) code: String,
    pub(crate) title: Option<String>,
    pub(crate) form_title: Option<String>,
    pub(crate) error_title: Option<String>,
    pub(crate) kind: Kind,
    pub(crate) field_type: FieldType,
    pub(crate) required: Setting<bool>,
    pub(crate) disabled: Setting<bool>,
    pub(crate) tags: Vec<Setting<Vec<String>>>,
    pub(crate) accepts: Vec<ValueType>,
    pub(crate) min_size: Option<Setting<usize>>,
    pub(crate) max_size: Option<Setting<usize>>,
    pub(crate) min_bytesize: Option<Setting<usize>>,
    pub(crate) max_bytesize: Option<Setting<usize>>,
    pub(crate) min_count: Option<Setting<usize>>,
    pub(crate) max_count: Option<Setting<usize>>,
    pub(crate) min_key: Option<Setting<i128>>,
    pub(crate) max_key: Option<Setting<i128>>,
    pub(crate) match_key: Vec<Regex>,
    pub(crate) min: Option<Setting<f64>>,
    pub(crate) max: Option<Setting<f64>>,
    pub(crate) inf: Option<Setting<f64>>,
    pub(crate) sup: Option<Setting<f64>>,
    pub(crate) matches: Vec<Regex>,
    pub(crate) reject: Vec<Regex>,
    pub(crate) msg: Option<String>,
    pub(crate) match_msg: Option<String>,
    pub(crate) reject_msg: Option<String>,
    pub(crate) required_msg: Option<String>,
    pub(crate) filter: Option<Filter>,
    pub(crate) transform: Option<Transform>,
    pub(crate) format: Option<Format>,
    pub(crate) test: Option<Test>,
    pub(crate) check: Option<Check>,
    pub(crate) data: Vec<(Value, String)>,
    pub(crate) row: Option<String>,
    pub(crate) placeholder: Option<String>,
    pub(crate) options: IndexMap<String, serde_json::Value>,
}

impl FieldSpec {
    fn new(name: String) -> Self {
        Self {
            code: name.clone(),
            name,
            title: None,
            form_title: None,
            error_title: None,
            kind: Kind::Scalar,
            field_type: FieldType::Text,
            required: Setting::Fixed(false),
            disabled: Setting::Fixed(false),
            tags: Vec::new(),
            accepts: Vec::new(),
            min_size: None,
            max_size: None,
            min_bytesize: None,
            max_bytesize: None,
            min_count: None,
            max_count: None,
            min_key: None,
            max_key: None,
            match_key: Vec::new(),
            min: None,
            max: None,
            inf: None,
            sup: None,
            matches: Vec::new(),
            reject: Vec::new(),
            msg: None,
            match_msg: None,
            reject_msg: None,
            required_msg: None,
            filter: None,
            transform: None,
            format: None,
            test: None,
            check: None,
            data: Vec::new(),
            row: None,
            placeholder: None,
            options: IndexMap::new(),
        }
    }

    /// Internal name, unique within the schema.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// External name used in requests and URLs.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    pub fn format(&self) -> Option<&Format> {
        self.format.as_ref()
    }

    /// Whether values of this field are natively typed rather than strings.
    pub(crate) fn typed(&self) -> bool {
        !self.accepts.is_empty() && self.accepts != [ValueType::Str]
    }

    /// Arbitrary named option.
    pub fn option(&self, key: &str) -> Option<&serde_json::Value> {
        self.options.get(key)
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("code", &self.code)
            .field("kind", &self.kind)
            .field("field_type", &self.field_type)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`FieldSpec`], consumed by [`crate::SchemaBuilder`].
///
/// Omitted size, filter and key options get their defaults when the field is
/// added to a schema.
#[derive(Clone, Debug)]
pub struct FieldBuilder {
    pub(crate) spec: FieldSpec,
    pub(crate) filter_explicit: bool,
}

impl FieldBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            spec: FieldSpec::new(name.into()),
            filter_explicit: false,
        }
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.spec.code = code.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.spec.title = Some(title.into());
        self
    }

    pub fn form_title(mut self, title: impl Into<String>) -> Self {
        self.spec.form_title = Some(title.into());
        self
    }

    pub fn error_title(mut self, title: impl Into<String>) -> Self {
        self.spec.error_title = Some(title.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.spec.required = Setting::Fixed(true);
        self
    }

    pub fn required_when(mut self, required: impl Into<Setting<bool>>) -> Self {
        self.spec.required = required.into();
        self
    }

    pub fn array(mut self) -> Self {
        self.spec.kind = Kind::Array;
        self
    }

    pub fn hash(mut self) -> Self {
        self.spec.kind = Kind::Hash;
        self
    }

    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.spec.field_type = field_type;
        self
    }

    pub fn hidden(self) -> Self {
        self.field_type(FieldType::Hidden)
    }

    pub fn ignored(self) -> Self {
        self.field_type(FieldType::Ignore)
    }

    pub fn disabled(mut self, disabled: impl Into<Setting<bool>>) -> Self {
        self.spec.disabled = disabled.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.spec.tags.push(Setting::Fixed(vec![tag.into()]));
        self
    }

    pub fn tags(mut self, tags: impl Into<Setting<Vec<String>>>) -> Self {
        self.spec.tags.push(tags.into());
        self
    }

    /// Accept natively typed values of the given types instead of strings.
    pub fn accepts(mut self, types: impl IntoIterator<Item = ValueType>) -> Self {
        self.spec.accepts = types.into_iter().collect();
        self
    }

    pub fn min_size(mut self, limit: impl Into<Setting<usize>>) -> Self {
        self.spec.min_size = Some(limit.into());
        self
    }

    pub fn max_size(mut self, limit: impl Into<Setting<usize>>) -> Self {
        self.spec.max_size = Some(limit.into());
        self
    }

    pub fn min_bytesize(mut self, limit: impl Into<Setting<usize>>) -> Self {
        self.spec.min_bytesize = Some(limit.into());
        self
    }

    pub fn max_bytesize(mut self, limit: impl Into<Setting<usize>>) -> Self {
        self.spec.max_bytesize = Some(limit.into());
        self
    }

    pub fn min_count(mut self, limit: impl Into<Setting<usize>>) -> Self {
        self.spec.min_count = Some(limit.into());
        self
    }

    pub fn max_count(mut self, limit: impl Into<Setting<usize>>) -> Self {
        self.spec.max_count = Some(limit.into());
        self
    }

    pub fn min_key(mut self, limit: impl Into<Setting<i128>>) -> Self {
        self.spec.min_key = Some(limit.into());
        self
    }

    pub fn max_key(mut self, limit: impl Into<Setting<i128>>) -> Self {
        self.spec.max_key = Some(limit.into());
        self
    }

    /// Hash keys must match this pattern (all given patterns) instead of being integers.
    pub fn match_key(mut self, pattern: Regex) -> Self {
        self.spec.match_key.push(pattern);
        self
    }

    /// Inclusive lower numeric bound.
    pub fn min(mut self, limit: impl Into<Setting<f64>>) -> Self {
        self.spec.min = Some(limit.into());
        self
    }

    /// Inclusive upper numeric bound.
    pub fn max(mut self, limit: impl Into<Setting<f64>>) -> Self {
        self.spec.max = Some(limit.into());
        self
    }

    /// Exclusive lower numeric bound.
    pub fn inf(mut self, limit: impl Into<Setting<f64>>) -> Self {
        self.spec.inf = Some(limit.into());
        self
    }

    /// Exclusive upper numeric bound.
    pub fn sup(mut self, limit: impl Into<Setting<f64>>) -> Self {
        self.spec.sup = Some(limit.into());
        self
    }

    /// Values must match every pattern added this way.
    pub fn matches(mut self, pattern: Regex) -> Self {
        self.spec.matches.push(pattern);
        self
    }

    /// Values must match none of the patterns added this way.
    pub fn reject(mut self, pattern: Regex) -> Self {
        self.spec.reject.push(pattern);
        self
    }

    /// Drop the patterns added with [`FieldBuilder::matches`] so far.
    pub fn clear_matches(mut self) -> Self {
        self.spec.matches.clear();
        self
    }

    /// Drop the patterns added with [`FieldBuilder::reject`] so far.
    pub fn clear_rejects(mut self) -> Self {
        self.spec.reject.clear();
        self
    }

    /// Message used for both pattern failures unless a specific one is set.
    pub fn msg(mut self, msg: impl Into<String>) -> Self {
        self.spec.msg = Some(msg.into());
        self
    }

    pub fn match_msg(mut self, msg: impl Into<String>) -> Self {
        self.spec.match_msg = Some(msg.into());
        self
    }

    pub fn reject_msg(mut self, msg: impl Into<String>) -> Self {
        self.spec.reject_msg = Some(msg.into());
        self
    }

    pub fn required_msg(mut self, msg: impl Into<String>) -> Self {
        self.spec.required_msg = Some(msg.into());
        self
    }

    pub fn filter(mut self, f: impl Fn(&str) -> Option<Value> + Send + Sync + 'static) -> Self {
        self.spec.filter = Some(Arc::new(f));
        self.filter_explicit = true;
        self
    }

    /// Store input text as is, without the default whitespace filter.
    pub fn no_filter(mut self) -> Self {
        self.spec.filter = None;
        self.filter_explicit = true;
        self
    }

    pub fn transform(mut self, f: impl Fn(Value) -> Option<Value> + Send + Sync + 'static) -> Self {
        self.spec.transform = Some(Arc::new(f));
        self
    }

    pub fn format(mut self, f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.spec.format = Some(Arc::new(f));
        self
    }

    pub fn test(
        mut self,
        f: impl Fn(&mut FieldCheck<'_>, &Value) + Send + Sync + 'static,
    ) -> Self {
        self.spec.test = Some(Arc::new(f));
        self
    }

    pub fn check(mut self, f: impl Fn(&mut FieldCheck<'_>) + Send + Sync + 'static) -> Self {
        self.spec.check = Some(Arc::new(f));
        self
    }

    /// Choices for select-like fields, as (value, label) pairs.
    pub fn data(mut self, data: Vec<(Value, String)>) -> Self {
        self.spec.data = data;
        self
    }

    /// Layout row; consecutive fields sharing a row are chunked together.
    pub fn row(mut self, row: impl Into<String>) -> Self {
        self.spec.row = Some(row.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.spec.placeholder = Some(placeholder.into());
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.spec.options.insert(key.into(), value.into());
        self
    }

    /// Apply a ready-made option set, see [`crate::presets`].
    pub fn preset(self, preset: fn(FieldBuilder) -> FieldBuilder) -> Self {
        preset(self)
    }
}

/// Further builder options for a copied field.
pub type Adjust = Arc<dyn Fn(FieldBuilder) -> FieldBuilder + Send + Sync>;

/// Option overrides applied when copying a field into another schema.
///
/// The common options have their own setters. Anything else a
/// [`FieldBuilder`] can set is changed with [`FieldOverrides::with`]:
///
/// ```ignore
/// FieldOverrides::new()
///     .name("nickname")
///     .with(|b| b.max_size(20).clear_matches().matches(nick_pattern()))
/// ```
#[derive(Clone, Default)]
pub struct FieldOverrides {
    pub(crate) name: Option<String>,
    pub(crate) code: Option<String>,
    pub(crate) title: Option<Option<String>>,
    pub(crate) required: Option<Setting<bool>>,
    pub(crate) disabled: Option<Setting<bool>>,
    pub(crate) field_type: Option<FieldType>,
    pub(crate) tags: Option<Vec<Setting<Vec<String>>>>,
    pub(crate) adjust: Vec<Adjust>,
}

impl fmt::Debug for FieldOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOverrides")
            .field("name", &self.name)
            .field("code", &self.code)
            .field("title", &self.title)
            .field("required", &self.required)
            .field("disabled", &self.disabled)
            .field("field_type", &self.field_type)
            .field("tags", &self.tags)
            .field("adjust", &self.adjust.len())
            .finish()
    }
}

impl FieldOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename the copy. The code follows the new name unless set explicitly.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Replace the title; `None` removes it.
    pub fn title(mut self, title: Option<String>) -> Self {
        self.title = Some(title);
        self
    }

    pub fn required(mut self, required: impl Into<Setting<bool>>) -> Self {
        self.required = Some(required.into());
        self
    }

    pub fn disabled(mut self, disabled: impl Into<Setting<bool>>) -> Self {
        self.disabled = Some(disabled.into());
        self
    }

    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Replace all tags of the copy.
    pub fn tags(mut self, tags: impl Into<Setting<Vec<String>>>) -> Self {
        self.tags = Some(vec![tags.into()]);
        self
    }

    /// Change any other option of the copy. The builder starts from the
    /// source field with the setters above already applied; options which
    /// accumulate, like patterns, add to the source's.
    pub fn with(mut self, adjust: impl Fn(FieldBuilder) -> FieldBuilder + Send + Sync + 'static) -> Self {
        self.adjust.push(Arc::new(adjust));
        self
    }

    pub(crate) fn apply(&self, source: &FieldSpec) -> FieldSpec {
        let mut spec = source.clone();
        if let Some(name) = &self.name {
            spec.name = name.clone();
        }
        spec.code = self
            .code
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| source.code.clone());
        if let Some(title) = &self.title {
            spec.title = title.clone();
        }
        if let Some(required) = &self.required {
            spec.required = required.clone();
        }
        if let Some(disabled) = &self.disabled {
            spec.disabled = disabled.clone();
        }
        if let Some(field_type) = &self.field_type {
            spec.field_type = field_type.clone();
        }
        if let Some(tags) = &self.tags {
            spec.tags = tags.clone();
        }
        let builder = FieldBuilder {
            spec,
            filter_explicit: true,
        };
        self.adjust
            .iter()
            .fold(builder, |builder, adjust| adjust(builder))
            .spec
    }
}

/// A field bound to one form.
#[derive(Clone, Copy)]
pub struct Field<'a> {
    form: &'a Form,
    spec: &'a FieldSpec,
    index: usize,
}

impl<'a> Field<'a> {
    pub(crate) fn new(form: &'a Form, spec: &'a FieldSpec, index: usize) -> Self {
        Self { form, spec, index }
    }

    pub fn form(&self) -> &'a Form {
        self.form
    }

    pub fn spec(&self) -> &'a FieldSpec {
        self.spec
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &'a str {
        &self.spec.name
    }

    pub fn code(&self) -> &'a str {
        &self.spec.code
    }

    pub fn value(&self) -> Option<&'a Value> {
        self.form.value_at(self.index)
    }

    /// Format a value for form/URL output, applying the field's formatter.
    ///
    /// Text left in a typed field (input its filter could not convert) is
    /// passed through unformatted.
    pub fn format_value(&self, value: Option<&Value>) -> String {
        match (value, &self.spec.format) {
            (None, _) | (_, None) => value.map(Value::to_display_string).unwrap_or_default(),
            (Some(v), Some(_)) if v.is_text() && self.spec.typed() => v.to_display_string(),
            (Some(v), Some(format)) => format(v),
        }
    }

    /// Value for use in forms and URLs, with every scalar converted to a string.
    pub fn form_value(&self) -> WireValue {
        let value = self.value();
        match self.spec.kind {
            Kind::Array => WireValue::List(match value {
                Some(Value::Array(items)) => {
                    items.iter().map(|v| self.format_value(Some(v))).collect()
                }
                Some(Value::Null) | None => Vec::new(),
                Some(other) => vec![self.format_value(Some(other))],
            }),
            Kind::Hash => WireValue::Map(match value {
                Some(Value::Hash(entries)) => entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), self.format_value(Some(v))))
                    .collect(),
                _ => IndexMap::new(),
            }),
            Kind::Scalar => WireValue::Single(self.format_value(value)),
        }
    }

    /// Whether the value has the right shape (and type) for this field.
    ///
    /// Non-text scalars count as correct when listed in `accepts`, without any
    /// deeper validation.
    pub fn correct(&self) -> bool {
        match self.value() {
            None | Some(Value::Null) => true,
            Some(Value::Str(_)) | Some(Value::Bytes(_)) => self.scalar(),
            Some(Value::Array(_)) => self.array(),
            Some(Value::Hash(_)) => self.hash(),
            Some(other) => {
                self.scalar()
                    && other
                        .value_type()
                        .is_some_and(|t| self.spec.accepts.contains(&t))
            }
        }
    }

    pub fn incorrect(&self) -> bool {
        !self.correct()
    }

    pub fn blank(&self) -> bool {
        self.value().map_or(true, Value::is_blank)
    }

    pub fn empty(&self) -> bool {
        self.value().map_or(true, Value::is_empty)
    }

    pub fn filled(&self) -> bool {
        !self.empty()
    }

    /// Name for use in HTML forms: `code[]` for arrays, `code[key]` for hashes.
    pub fn form_name(&self, key: Option<&str>) -> Result<String> {
        match self.spec.kind {
            Kind::Array => Ok(format!("{}[]", self.spec.code)),
            Kind::Hash => key
                .map(|key| format!("{}[{}]", self.spec.code, key))
                .ok_or_else(|| FormError::MissingHashKey(self.spec.name.clone())),
            Kind::Scalar => Ok(self.spec.code.clone()),
        }
    }

    /// Whether `value` is the selected value, for select menus.
    pub fn selected(&self, value: &Value) -> bool {
        if self.empty() {
            return false;
        }
        match (self.spec.kind, self.value()) {
            (Kind::Array, Some(Value::Array(items))) => items.contains(value),
            (Kind::Hash, _) => false,
            (_, Some(current)) => current == value,
            _ => false,
        }
    }

    pub fn title(&self) -> Option<&'a str> {
        self.spec.title.as_deref()
    }

    pub fn form_title(&self) -> &'a str {
        self.spec
            .form_title
            .as_deref()
            .or(self.spec.title.as_deref())
            .unwrap_or(&self.spec.code)
    }

    pub fn error_title(&self) -> &'a str {
        self.spec
            .error_title
            .as_deref()
            .or(self.spec.title.as_deref())
            .unwrap_or(&self.spec.code)
    }

    pub fn errors(&self) -> Vec<FieldError> {
        self.form.errors_at(self.index)
    }

    pub fn error(&self) -> Option<FieldError> {
        self.errors().into_iter().next()
    }

    pub fn valid(&self) -> bool {
        self.form.valid_at(self.index)
    }

    pub fn invalid(&self) -> bool {
        !self.valid()
    }

    pub fn required(&self) -> bool {
        self.spec.required.resolve(self)
    }

    pub fn optional(&self) -> bool {
        !self.required()
    }

    pub fn disabled(&self) -> bool {
        self.spec.disabled.resolve(self)
    }

    pub fn enabled(&self) -> bool {
        !self.disabled()
    }

    pub fn field_type(&self) -> &'a FieldType {
        &self.spec.field_type
    }

    pub fn hidden(&self) -> bool {
        self.spec.field_type == FieldType::Hidden
    }

    pub fn ignored(&self) -> bool {
        self.spec.field_type == FieldType::Ignore
    }

    pub fn visible(&self) -> bool {
        !(self.hidden() || self.ignored())
    }

    pub fn kind(&self) -> Kind {
        self.spec.kind
    }

    pub fn array(&self) -> bool {
        self.spec.kind == Kind::Array
    }

    pub fn hash(&self) -> bool {
        self.spec.kind == Kind::Hash
    }

    pub fn scalar(&self) -> bool {
        self.spec.kind == Kind::Scalar
    }

    pub fn tags(&self) -> Vec<String> {
        self.spec
            .tags
            .iter()
            .flat_map(|tags| tags.resolve(self))
            .collect()
    }

    /// Tagged with any of `tags`, or with anything at all when `tags` is empty.
    pub fn tagged(&self, tags: &[&str]) -> bool {
        let own = self.tags();
        if tags.is_empty() {
            !own.is_empty()
        } else {
            tags.iter().any(|t| own.iter().any(|o| o == t))
        }
    }

    pub fn untagged(&self, tags: &[&str]) -> bool {
        !self.tagged(tags)
    }

    pub fn data(&self) -> &'a [(Value, String)] {
        &self.spec.data
    }

    pub fn row(&self) -> Option<&'a str> {
        self.spec.row.as_deref()
    }

    pub fn placeholder(&self) -> Option<&'a str> {
        self.spec.placeholder.as_deref()
    }

    pub fn option(&self, key: &str) -> Option<&'a serde_json::Value> {
        self.spec.options.get(key)
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.spec.name)
            .field("value", &self.value())
            .finish()
    }
}
