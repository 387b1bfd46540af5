//! formgate: declarative validation of untrusted key/value input
//!
//! A [`Schema`] declares the fields a form accepts: names, shapes (scalar,
//! array, hash), value constraints, presentation hints, and callbacks. A
//! [`Form`] binds one schema to values imported from a [`Request`] (or set
//! programmatically), validates them lazily, and renders them back as URL
//! parameters or a plain record.
//!
//! [`StepForm`] layers a multi-step workflow on top: the schema declares an
//! ordered list of steps, fields are tagged with the step they belong to, and
//! the form tracks the current, furthest seen and furthest reached step
//! through hidden fields.
//!
//! ```text
//! request --sanitize/filter/transform--> values --validate--> errors
//!                                        values --format--> query / record
//! ```
//!
//! Two kinds of failure are kept apart:
//! - [`FormError`] is returned for programming mistakes such as unknown field
//!   names or writes to a frozen form.
//! - [`FieldError`] values are collected per field for bad user input and are
//!   never returned as `Err`.

pub mod defaults;
pub mod error;
pub mod field;
pub mod form;
pub mod messages;
pub mod output;
pub mod presets;
pub mod request;
pub mod sanitize;
pub mod schema;
pub mod steps;
pub mod validate;
pub mod value;

pub use defaults::{
    squeeze_whitespace, FormConfig, DEFAULT_MAX_KEY, DEFAULT_MIN_KEY, DEFAULT_SIZE_LIMIT,
    RESERVED_NAMES,
};
pub use error::{ErrorCategory, ErrorKind, FieldError, FormError, Result};
pub use field::{
    Adjust, Check, Field, FieldBuilder, FieldOverrides, FieldSpec, FieldType, Filter, Format, Kind,
    Setting, Test, Transform,
};
pub use form::{Form, Row};
pub use messages::{DefaultMessages, MessageCatalog};
pub use output::WireValue;
pub use request::{Input, QueryRequest, Request, MAX_NESTING};
pub use sanitize::sanitize;
pub use schema::{Schema, SchemaBuilder, STEP_FIELDS};
pub use steps::StepForm;
pub use validate::FieldCheck;
pub use value::{Key, Value, ValueType};
