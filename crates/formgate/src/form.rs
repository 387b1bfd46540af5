//! Form instances.
//!
//! A [`Form`] holds the values of one input transaction for a shared
//! [`Schema`], plus the memoized result of validating them. Validation runs
//! lazily on the first error query and is remembered until the next write;
//! any write drops the whole memo since `check` callbacks may look at sibling
//! fields.
//!
//! Three copy operations exist:
//!
//! - `clone()` copies values and the current validation results as they are;
//! - [`Form::duplicate`] copies values only, and is never frozen;
//! - [`Form::freeze`] validates one last time and then rejects all writes.

use crate::error::{FieldError, FormError, Result};
use crate::field::Field;
use crate::messages::{DefaultMessages, MessageCatalog};
use crate::output::{append_query, encode_query, WireValue};
use crate::request::Request;
use crate::sanitize::import_value;
use crate::schema::Schema;
use crate::validate::{self, Slots};
use crate::value::Value;
use indexmap::IndexMap;
use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct Form {
    schema: Arc<Schema>,
    values: Vec<Option<Value>>,
    errors: OnceCell<Slots>,
    pass: Pass,
    frozen: bool,
    catalog: Arc<dyn MessageCatalog>,
}

/// Error slots of the validation pass in progress, if any. Copies of a form
/// start without one.
#[derive(Default)]
struct Pass(RefCell<Option<Slots>>);

impl Clone for Pass {
    fn clone(&self) -> Self {
        Self::default()
    }
}

/// A layout row: a lone field, or consecutive fields sharing a `row` option.
#[derive(Debug, Clone)]
pub enum Row<'a> {
    Single(Field<'a>),
    Group(Vec<Field<'a>>),
}

impl Form {
    pub fn new(schema: Arc<Schema>) -> Self {
        let values = vec![None; schema.len()];
        Self {
            schema,
            values,
            errors: OnceCell::new(),
            pass: Pass::default(),
            frozen: false,
            catalog: Arc::new(DefaultMessages),
        }
    }

    /// Create a form from untrusted external input.
    pub fn from_request(schema: Arc<Schema>, request: &impl Request) -> Self {
        let mut form = Self::new(schema);
        form.import_values(request);
        form
    }

    /// Create a form from trusted internal values, keyed by field name.
    pub fn from_record<K: AsRef<str>>(
        schema: Arc<Schema>,
        record: impl IntoIterator<Item = (K, Value)>,
    ) -> Result<Self> {
        let mut form = Self::new(schema);
        form.set_all(record)?;
        Ok(form)
    }

    /// Use `catalog` for error messages from now on.
    pub fn with_catalog(mut self, catalog: Arc<dyn MessageCatalog>) -> Self {
        self.catalog = catalog;
        self.errors = OnceCell::new();
        self
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn catalog(&self) -> &dyn MessageCatalog {
        self.catalog.as_ref()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    // Values.

    pub fn value(&self, name: &str) -> Result<Option<&Value>> {
        let index = self.schema.require(name)?;
        Ok(self.values[index].as_ref())
    }

    pub(crate) fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Set a trusted internal value. `Null` unsets the field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let index = self.writable(name)?;
        self.store(index, Some(value.into()));
        Ok(self)
    }

    pub fn unset(&mut self, name: &str) -> Result<&mut Self> {
        let index = self.writable(name)?;
        self.store(index, None);
        Ok(self)
    }

    /// Set several trusted values. Stops at the first unknown name.
    pub fn set_all<K: AsRef<str>>(
        &mut self,
        values: impl IntoIterator<Item = (K, Value)>,
    ) -> Result<&mut Self> {
        for (name, value) in values {
            self.set(name.as_ref(), value)?;
        }
        Ok(self)
    }

    /// Import untrusted values for every field whose code is present in
    /// `request`. Fields missing from the request keep their values.
    pub fn import(&mut self, request: &impl Request) -> Result<&mut Self> {
        if self.frozen {
            return Err(FormError::Frozen);
        }
        self.import_values(request);
        Ok(self)
    }

    /// Unset all fields.
    pub fn clear(&mut self) -> Result<&mut Self> {
        if self.frozen {
            return Err(FormError::Frozen);
        }
        self.values.iter_mut().for_each(|v| *v = None);
        self.errors = OnceCell::new();
        Ok(self)
    }

    /// Unset the named fields.
    pub fn clear_fields(&mut self, names: &[&str]) -> Result<&mut Self> {
        let indices = self.indices(names)?;
        if self.frozen {
            return Err(FormError::Frozen);
        }
        for index in indices {
            self.store(index, None);
        }
        Ok(self)
    }

    fn import_values(&mut self, request: &impl Request) {
        let mut imported = 0;
        for (index, spec) in self.schema.fields().iter().enumerate() {
            if let Some(input) = request.param(spec.code()) {
                self.values[index] = import_value(spec, input);
                imported += 1;
            }
        }
        self.errors = OnceCell::new();
        debug!(schema = self.schema.name(), imported, "imported request values");
    }

    fn writable(&self, name: &str) -> Result<usize> {
        let index = self.schema.require(name)?;
        if self.frozen {
            return Err(FormError::Frozen);
        }
        Ok(index)
    }

    fn store(&mut self, index: usize, value: Option<Value>) {
        self.values[index] = value.filter(|v| *v != Value::Null);
        self.errors = OnceCell::new();
    }

    fn indices(&self, names: &[&str]) -> Result<Vec<usize>> {
        names.iter().map(|name| self.schema.require(name)).collect()
    }

    // Copies.

    /// Copy with the same values but no validation results, never frozen.
    pub fn duplicate(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            values: self.values.clone(),
            errors: OnceCell::new(),
            pass: Pass::default(),
            frozen: false,
            catalog: Arc::clone(&self.catalog),
        }
    }

    /// Validate, then reject any further writes. There is no way back.
    pub fn freeze(&mut self) -> &mut Self {
        self.ensure_validated();
        self.frozen = true;
        self
    }

    /// Copy with the named fields unset.
    pub fn except(&self, names: &[&str]) -> Result<Self> {
        let indices = self.indices(names)?;
        let mut result = self.duplicate();
        for index in indices {
            result.store(index, None);
        }
        Ok(result)
    }

    /// Copy with only the named fields set.
    pub fn only(&self, names: &[&str]) -> Result<Self> {
        let keep = self.indices(names)?;
        let mut result = self.duplicate();
        for index in 0..result.values.len() {
            if !keep.contains(&index) {
                result.store(index, None);
            }
        }
        Ok(result)
    }

    // Fields.

    pub fn field(&self, name: &str) -> Result<Field<'_>> {
        let index = self.schema.require(name)?;
        Ok(Field::new(self, &self.schema.fields()[index], index))
    }

    pub fn fields(&self) -> Vec<Field<'_>> {
        self.schema
            .fields()
            .iter()
            .enumerate()
            .map(|(index, spec)| Field::new(self, spec, index))
            .collect()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.schema.field_names()
    }

    /// Fields for the given names; `None` for unknown ones.
    pub fn named_fields(&self, names: &[&str]) -> Vec<Option<Field<'_>>> {
        names.iter().map(|name| self.field(name).ok()).collect()
    }

    fn select<'a>(&'a self, pred: impl Fn(&Field<'a>) -> bool) -> Vec<Field<'a>> {
        self.fields().into_iter().filter(|f| pred(f)).collect()
    }

    pub fn correct_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::correct)
    }

    pub fn incorrect_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::incorrect)
    }

    pub fn blank_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::blank)
    }

    pub fn empty_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::empty)
    }

    pub fn filled_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::filled)
    }

    pub fn required_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::required)
    }

    pub fn optional_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::optional)
    }

    pub fn disabled_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::disabled)
    }

    pub fn enabled_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::enabled)
    }

    pub fn hidden_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::hidden)
    }

    pub fn ignored_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::ignored)
    }

    pub fn visible_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::visible)
    }

    pub fn array_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::array)
    }

    pub fn hash_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::hash)
    }

    pub fn scalar_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::scalar)
    }

    /// Fields tagged with any of `tags`, or with any tag at all if empty.
    pub fn tagged_fields(&self, tags: &[&str]) -> Vec<Field<'_>> {
        self.select(|f| f.tagged(tags))
    }

    pub fn untagged_fields(&self, tags: &[&str]) -> Vec<Field<'_>> {
        self.select(|f| f.untagged(tags))
    }

    pub fn valid_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::valid)
    }

    pub fn invalid_fields(&self) -> Vec<Field<'_>> {
        self.select(Field::invalid)
    }

    /// All fields grouped into layout rows.
    pub fn chunked_fields(&self) -> Vec<Row<'_>> {
        Self::chunk(self.fields())
    }

    /// Group consecutive fields sharing a `row`; fields without one stand alone.
    pub fn chunk(fields: Vec<Field<'_>>) -> Vec<Row<'_>> {
        let mut rows: Vec<Row<'_>> = Vec::new();
        let mut current: Vec<Field<'_>> = Vec::new();
        for field in fields {
            let joins = match (field.row(), current.last().and_then(Field::row)) {
                (Some(row), Some(prev)) => row == prev,
                _ => false,
            };
            if !joins && !current.is_empty() {
                rows.push(Self::close_row(std::mem::take(&mut current)));
            }
            current.push(field);
        }
        if !current.is_empty() {
            rows.push(Self::close_row(current));
        }
        rows
    }

    fn close_row(mut fields: Vec<Field<'_>>) -> Row<'_> {
        if fields.len() == 1 {
            Row::Single(fields.remove(0))
        } else {
            Row::Group(fields)
        }
    }

    // Output.

    /// True if no field has a value.
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(Field::empty)
    }

    /// Internal values of all filled fields, keyed by name.
    pub fn to_record(&self) -> IndexMap<String, Value> {
        self.fields()
            .into_iter()
            .filter(Field::filled)
            .filter_map(|f| f.value().map(|v| (f.name().to_string(), v.clone())))
            .collect()
    }

    /// Formatted values of all filled fields, keyed by code.
    pub fn wire_params(&self) -> IndexMap<String, WireValue> {
        self.fields()
            .into_iter()
            .filter(Field::filled)
            .map(|f| (f.code().to_string(), f.form_value()))
            .collect()
    }

    pub fn query_string(&self) -> String {
        encode_query(&self.wire_params())
    }

    /// Append the current parameters to `url`.
    pub fn extend_url(&self, url: &str) -> String {
        append_query(url, &self.query_string())
    }

    /// Like [`Form::extend_url`], with some values replaced first.
    pub fn build_url<K: AsRef<str>>(
        &self,
        url: &str,
        overrides: impl IntoIterator<Item = (K, Value)>,
    ) -> Result<String> {
        let mut copy = self.duplicate();
        copy.set_all(overrides)?;
        Ok(copy.extend_url(url))
    }

    // Validation.

    fn slots(&self) -> &Slots {
        self.errors.get_or_init(|| validate::fresh_slots(self))
    }

    /// Read the current results. While a pass is running this sees the
    /// errors recorded so far instead of starting another pass.
    fn read_slots<R>(&self, read: impl FnOnce(&Slots) -> R) -> R {
        if let Some(slots) = self.errors.get() {
            return read(slots);
        }
        if let Some(slots) = self.pass.0.borrow().as_ref() {
            return read(slots);
        }
        read(self.slots())
    }

    pub(crate) fn begin_pass(&self, slots: Slots) {
        *self.pass.0.borrow_mut() = Some(slots);
    }

    pub(crate) fn end_pass(&self) -> Slots {
        self.pass
            .0
            .borrow_mut()
            .take()
            .unwrap_or_else(|| vec![Vec::new(); self.schema.len()])
    }

    /// Change the errors of one field in the pass in progress.
    pub(crate) fn record(&self, index: usize, update: impl FnOnce(&mut Vec<FieldError>)) {
        if let Some(slots) = self.pass.0.borrow_mut().as_mut() {
            if let Some(slot) = slots.get_mut(index) {
                update(slot);
            }
        }
    }

    pub(crate) fn errors_at(&self, index: usize) -> Vec<FieldError> {
        self.read_slots(|slots| slots.get(index).cloned().unwrap_or_default())
    }

    pub(crate) fn valid_at(&self, index: usize) -> bool {
        self.read_slots(|slots| slots.get(index).map_or(true, Vec::is_empty))
    }

    /// Validate unless results are already known.
    pub fn ensure_validated(&self) -> &Self {
        self.read_slots(|_| ());
        self
    }

    /// Run a validation pass on top of the current results. Fields that
    /// already have errors are left alone. Does nothing on frozen forms.
    pub fn validate(&mut self) -> &mut Self {
        if self.frozen {
            return self;
        }
        let slots = self
            .errors
            .take()
            .unwrap_or_else(|| vec![Vec::new(); self.schema.len()]);
        let slots = validate::run(self, slots);
        self.errors = OnceCell::from(slots);
        self
    }

    /// Drop all results, including reported ones, and validate again.
    pub fn revalidate(&mut self) -> Result<&mut Self> {
        if self.frozen {
            return Err(FormError::Frozen);
        }
        self.errors = OnceCell::new();
        self.ensure_validated();
        Ok(self)
    }

    pub fn is_valid(&self) -> bool {
        self.read_slots(|slots| slots.iter().all(Vec::is_empty))
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// Whether all the named fields are valid.
    pub fn fields_valid(&self, names: &[&str]) -> Result<bool> {
        let indices = self.indices(names)?;
        Ok(indices.into_iter().all(|i| self.valid_at(i)))
    }

    /// Values of the named fields, if they are all valid.
    pub fn valid_values(&self, names: &[&str]) -> Result<Option<Vec<Option<&Value>>>> {
        if !self.fields_valid(names)? {
            return Ok(None);
        }
        names.iter().map(|name| self.value(name)).collect::<Result<Vec<_>>>().map(Some)
    }

    /// Errors of all invalid fields, in declaration order.
    pub fn errors(&self) -> IndexMap<String, Vec<FieldError>> {
        self.read_slots(|slots| {
            self.schema
                .fields()
                .iter()
                .zip(slots)
                .filter(|(_, errors)| !errors.is_empty())
                .map(|(spec, errors)| (spec.name().to_string(), errors.clone()))
                .collect()
        })
    }

    /// Error report as JSON: field name to a list of `{kind, message}` objects.
    pub fn errors_json(&self) -> serde_json::Value {
        let report: serde_json::Map<String, serde_json::Value> = self
            .errors()
            .into_iter()
            .map(|(name, errors)| {
                let list = errors
                    .iter()
                    .map(|e| serde_json::json!({ "kind": e.kind.as_str(), "message": e.message }))
                    .collect();
                (name, serde_json::Value::Array(list))
            })
            .collect();
        serde_json::Value::Object(report)
    }

    /// The first error message of every invalid field, in declaration order.
    pub fn error_messages(&self) -> Vec<String> {
        self.read_slots(|slots| {
            slots
                .iter()
                .filter_map(|errors| errors.first())
                .map(|e| e.message.clone())
                .collect()
        })
    }

    pub fn errors_for(&self, name: &str) -> Result<Vec<FieldError>> {
        let index = self.schema.require(name)?;
        Ok(self.errors_at(index))
    }

    pub fn error_for(&self, name: &str) -> Result<Option<FieldError>> {
        Ok(self.errors_for(name)?.into_iter().next())
    }

    pub fn messages_for(&self, name: &str) -> Result<Vec<String>> {
        Ok(self
            .errors_for(name)?
            .into_iter()
            .map(|e| e.message)
            .collect())
    }

    /// Append a custom error for the named field, validating first if needed.
    pub fn report(&mut self, name: &str, message: impl Into<String>) -> Result<&mut Self> {
        let index = self.writable(name)?;
        let error = FieldError::custom(message);
        self.update_slots(|slots| slots[index].push(error));
        Ok(self)
    }

    /// Like [`Form::report`], but puts the error first.
    pub fn report_first(&mut self, name: &str, message: impl Into<String>) -> Result<&mut Self> {
        let index = self.writable(name)?;
        let error = FieldError::custom(message);
        self.update_slots(|slots| slots[index].insert(0, error));
        Ok(self)
    }

    fn update_slots(&mut self, update: impl FnOnce(&mut Slots)) {
        let mut slots = self
            .errors
            .take()
            .unwrap_or_else(|| validate::fresh_slots(self));
        update(&mut slots);
        self.errors = OnceCell::from(slots);
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: IndexMap<&str, &Value> = self
            .schema
            .fields()
            .iter()
            .zip(&self.values)
            .filter_map(|(spec, v)| v.as_ref().map(|v| (spec.name(), v)))
            .collect();
        f.debug_struct("Form")
            .field("schema", &self.schema.name())
            .field("values", &values)
            .field("validated", &self.errors.get().is_some())
            .field("frozen", &self.frozen)
            .finish()
    }
}
