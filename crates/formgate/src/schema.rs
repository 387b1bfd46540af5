//! Schema definition.
//!
//! A [`Schema`] is the ordered, immutable field table of one form type. It is
//! put together with a [`SchemaBuilder`] once and then shared by every form
//! created from it:
//!
//! ```ignore
//! let schema = SchemaBuilder::new("search")
//!     .required(FieldBuilder::new("q").title("Query"))
//!     .array(FieldBuilder::new("tags").max_count(5))
//!     .build()?;
//! ```
//!
//! Composition replaces inheritance: [`SchemaBuilder::extend`] starts from a
//! snapshot of another schema, and the `copy*` methods pull individual fields
//! from anywhere, optionally with [`FieldOverrides`].

use crate::defaults::{squeeze_whitespace, FormConfig, RESERVED_NAMES};
use crate::error::{FormError, Result};
use crate::field::{FieldBuilder, FieldOverrides, FieldSpec, FieldType, Kind, Setting};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Names of the synthetic fields carrying step state, in declaration order.
pub const STEP_FIELDS: [&str; 4] = ["step", "next", "last", "seen"];

/// Ordered table of field definitions, plus optional step metadata.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: Vec<Arc<FieldSpec>>,
    index: HashMap<String, usize>,
    steps: Option<Vec<(String, Option<String>)>>,
}

impl Schema {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Arc<FieldSpec>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.position(name).map(|i| self.fields[i].as_ref())
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name()).collect()
    }

    /// Declaration index of the named field.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Declaration index of the named field, or `UnknownField`.
    pub(crate) fn require(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Step keys with their display names; `None` names mark extra steps.
    pub fn steps(&self) -> Option<&[(String, Option<String>)]> {
        self.steps.as_deref()
    }

    pub fn has_steps(&self) -> bool {
        self.steps.is_some()
    }
}

/// Builder for [`Schema`].
///
/// Definition errors are remembered and returned from [`SchemaBuilder::build`],
/// so definitions can be chained without intermediate `?`.
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    config: FormConfig,
    fields: Vec<Arc<FieldSpec>>,
    index: HashMap<String, usize>,
    steps: Option<Vec<(String, Option<String>)>>,
    error: Option<FormError>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: FormConfig::default(),
            fields: Vec::new(),
            index: HashMap::new(),
            steps: None,
            error: None,
        }
    }

    /// Start a new schema with a snapshot of `parent`'s fields and steps.
    pub fn extend(name: impl Into<String>, parent: &Schema) -> Self {
        Self {
            name: name.into(),
            config: FormConfig::default(),
            fields: parent.fields.clone(),
            index: parent.index.clone(),
            steps: parent.steps.clone(),
            error: None,
        }
    }

    /// Use host defaults for fields defined from now on.
    pub fn with_config(mut self, config: FormConfig) -> Self {
        self.config = config;
        self
    }

    /// Define a field, applying defaults for omitted size, filter and key options.
    pub fn field(self, builder: FieldBuilder) -> Self {
        let spec = self.apply_defaults(builder);
        self.add(spec, true)
    }

    pub fn required(self, builder: FieldBuilder) -> Self {
        self.field(builder.required())
    }

    pub fn array(self, builder: FieldBuilder) -> Self {
        self.field(builder.array())
    }

    pub fn array_required(self, builder: FieldBuilder) -> Self {
        self.field(builder.array().required())
    }

    pub fn hash(self, builder: FieldBuilder) -> Self {
        self.field(builder.hash())
    }

    pub fn hash_required(self, builder: FieldBuilder) -> Self {
        self.field(builder.hash().required())
    }

    /// Copy a single field definition, merging `overrides` onto it.
    ///
    /// Copies may take the step state names while the schema has no steps;
    /// such a schema can then no longer get steps of its own.
    pub fn copy(self, source: &FieldSpec, overrides: FieldOverrides) -> Self {
        let spec = overrides.apply(source);
        let check_reserved = self.steps.is_some() || !STEP_FIELDS.contains(&spec.name());
        self.add(spec, check_reserved)
    }

    /// Copy all fields of `source` in declaration order.
    pub fn copy_schema(mut self, source: &Schema, overrides: FieldOverrides) -> Self {
        for spec in &source.fields {
            self = self.copy(spec, overrides.clone());
        }
        self
    }

    /// Copy the named fields of `source`, in the given order.
    pub fn copy_fields(mut self, source: &Schema, names: &[&str], overrides: FieldOverrides) -> Self {
        for name in names {
            match source.field(name) {
                Some(spec) => self = self.copy(spec, overrides.clone()),
                None => {
                    return self.fail(FormError::InvalidCopySource(format!(
                        "{} has no field {}",
                        source.name, name
                    )))
                }
            }
        }
        self
    }

    /// Turn the schema into a multi-step one.
    ///
    /// Steps are given in order as (key, display name) pairs; steps without a
    /// display name are extra steps, left out of the step names list. The
    /// `step`, `next`, `last` and `seen` fields are added at this point of the
    /// declaration order. Fields join a step by being tagged with its key.
    pub fn steps(mut self, table: &[(&str, Option<&str>)]) -> Self {
        if self.steps.is_some() {
            let err = FormError::StepsRedefined(self.name.clone());
            return self.fail(err);
        }
        if table.is_empty() {
            let err = FormError::NoSteps(self.name.clone());
            return self.fail(err);
        }
        let steps: Vec<(String, Option<String>)> = table
            .iter()
            .map(|(key, name)| (key.to_string(), name.map(str::to_string)))
            .collect();
        let keys: Arc<Vec<String>> = Arc::new(steps.iter().map(|(k, _)| k.clone()).collect());
        self.steps = Some(steps);

        for name in STEP_FIELDS {
            let keys = Arc::clone(&keys);
            let builder = FieldBuilder::new(name)
                .filter(move |s| {
                    keys.iter()
                        .any(|k| k == s)
                        .then(|| Value::from(s))
                })
                .field_type(if name == "next" {
                    FieldType::Ignore
                } else {
                    FieldType::Hidden
                });
            let spec = self.apply_defaults(builder);
            self = self.add(spec, false);
        }
        self
    }

    pub fn build(self) -> Result<Schema> {
        if let Some(err) = self.error {
            return Err(err);
        }
        debug!(
            schema = %self.name,
            fields = self.fields.len(),
            steps = self.steps.as_ref().map_or(0, Vec::len),
            "schema built"
        );
        Ok(Schema {
            name: self.name,
            fields: self.fields,
            index: self.index,
            steps: self.steps,
        })
    }

    fn apply_defaults(&self, builder: FieldBuilder) -> FieldSpec {
        let FieldBuilder {
            mut spec,
            filter_explicit,
        } = builder;
        let limit = self.config.size_limit;

        if !filter_explicit && self.config.default_filter {
            spec.filter = Some(Arc::new(|s: &str| Some(Value::Str(squeeze_whitespace(s)))));
        }

        let max_size = spec.max_size.get_or_insert(Setting::Fixed(limit));
        let cap_bytes = match max_size {
            Setting::Fixed(n) => *n <= limit,
            Setting::Computed(_) => true,
        };
        if spec.max_bytesize.is_none() && cap_bytes {
            spec.max_bytesize = Some(Setting::Fixed(limit));
        }

        if spec.kind == Kind::Hash {
            spec.min_key.get_or_insert(Setting::Fixed(self.config.min_key));
            spec.max_key.get_or_insert(Setting::Fixed(self.config.max_key));
        }
        spec
    }

    fn add(mut self, spec: FieldSpec, check_reserved: bool) -> Self {
        if self.error.is_some() {
            return self;
        }
        let name = spec.name().to_string();
        if self.index.contains_key(&name) {
            return self.fail(FormError::DuplicateField(name));
        }
        if check_reserved && RESERVED_NAMES.contains(&name.as_str()) {
            return self.fail(FormError::ReservedName(name));
        }
        self.index.insert(name, self.fields.len());
        self.fields.push(Arc::new(spec));
        self
    }

    fn fail(mut self, err: FormError) -> Self {
        self.error.get_or_insert(err);
        self
    }
}
