//! Error types.
//!
//! Two very different things live here:
//!
//! - [`FormError`] is returned for programming mistakes: unknown field names,
//!   duplicate definitions, writes to a frozen form, bogus step names. These
//!   never depend on user input.
//! - [`ErrorKind`] / [`FieldError`] describe problems with user input. They are
//!   accumulated per field by the validation pass and never returned as `Err`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Programming errors raised by schema definition and form access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("duplicate field {0}")]
    DuplicateField(String),

    #[error("invalid field name {0}")]
    ReservedName(String),

    #[error("unknown field {0}")]
    UnknownField(String),

    #[error("invalid copy source: {0}")]
    InvalidCopySource(String),

    #[error("form is frozen")]
    Frozen,

    #[error("schema {0} defines no steps")]
    NoSteps(String),

    #[error("steps already defined for schema {0}")]
    StepsRedefined(String),

    #[error("invalid step name {0}")]
    InvalidStep(String),

    #[error("missing hash key for field {0}")]
    MissingHashKey(String),
}

pub type Result<T> = std::result::Result<T, FormError>;

/// Stable symbolic kinds of validation failures.
///
/// The snake_case names double as keys of the message catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RequiredScalar,
    RequiredArray,
    NotArray,
    NotHash,
    NotString,
    MatchKey,
    InvalidKey,
    MinKey,
    MaxKey,
    MinCount,
    MaxCount,
    ValueType,
    ElementType,
    MinLimit,
    MaxLimit,
    InfLimit,
    SupLimit,
    InvalidEncoding,
    InvalidCharacters,
    MinSize,
    MaxSize,
    MinBytesize,
    MaxBytesize,
    RejectMsg,
    MatchMsg,
    /// Reported by a `test` or `check` callback.
    Custom,
}

/// Coarse error categories, for callers that do not care about the exact bound hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    Required,
    WrongContainerShape,
    InvalidKey,
    KeyOutOfRange,
    CountOutOfRange,
    WrongValueType,
    InvalidEncoding,
    InvalidCharacters,
    SizeOutOfRange,
    PatternRejected,
    PatternNotMatched,
    NumericOutOfRange,
    CustomCheckFailed,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 26] = [
        ErrorKind::RequiredScalar,
        ErrorKind::RequiredArray,
        ErrorKind::NotArray,
        ErrorKind::NotHash,
        ErrorKind::NotString,
        ErrorKind::MatchKey,
        ErrorKind::InvalidKey,
        ErrorKind::MinKey,
        ErrorKind::MaxKey,
        ErrorKind::MinCount,
        ErrorKind::MaxCount,
        ErrorKind::ValueType,
        ErrorKind::ElementType,
        ErrorKind::MinLimit,
        ErrorKind::MaxLimit,
        ErrorKind::InfLimit,
        ErrorKind::SupLimit,
        ErrorKind::InvalidEncoding,
        ErrorKind::InvalidCharacters,
        ErrorKind::MinSize,
        ErrorKind::MaxSize,
        ErrorKind::MinBytesize,
        ErrorKind::MaxBytesize,
        ErrorKind::RejectMsg,
        ErrorKind::MatchMsg,
        ErrorKind::Custom,
    ];

    /// Get the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::RequiredScalar => "required_scalar",
            ErrorKind::RequiredArray => "required_array",
            ErrorKind::NotArray => "not_array",
            ErrorKind::NotHash => "not_hash",
            ErrorKind::NotString => "not_string",
            ErrorKind::MatchKey => "match_key",
            ErrorKind::InvalidKey => "invalid_key",
            ErrorKind::MinKey => "min_key",
            ErrorKind::MaxKey => "max_key",
            ErrorKind::MinCount => "min_count",
            ErrorKind::MaxCount => "max_count",
            ErrorKind::ValueType => "value_type",
            ErrorKind::ElementType => "element_type",
            ErrorKind::MinLimit => "min_limit",
            ErrorKind::MaxLimit => "max_limit",
            ErrorKind::InfLimit => "inf_limit",
            ErrorKind::SupLimit => "sup_limit",
            ErrorKind::InvalidEncoding => "invalid_encoding",
            ErrorKind::InvalidCharacters => "invalid_characters",
            ErrorKind::MinSize => "min_size",
            ErrorKind::MaxSize => "max_size",
            ErrorKind::MinBytesize => "min_bytesize",
            ErrorKind::MaxBytesize => "max_bytesize",
            ErrorKind::RejectMsg => "reject_msg",
            ErrorKind::MatchMsg => "match_msg",
            ErrorKind::Custom => "custom",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::RequiredScalar | ErrorKind::RequiredArray => ErrorCategory::Required,
            ErrorKind::NotArray | ErrorKind::NotHash => ErrorCategory::WrongContainerShape,
            ErrorKind::MatchKey | ErrorKind::InvalidKey => ErrorCategory::InvalidKey,
            ErrorKind::MinKey | ErrorKind::MaxKey => ErrorCategory::KeyOutOfRange,
            ErrorKind::MinCount | ErrorKind::MaxCount => ErrorCategory::CountOutOfRange,
            ErrorKind::NotString | ErrorKind::ValueType | ErrorKind::ElementType => {
                ErrorCategory::WrongValueType
            }
            ErrorKind::InvalidEncoding => ErrorCategory::InvalidEncoding,
            ErrorKind::InvalidCharacters => ErrorCategory::InvalidCharacters,
            ErrorKind::MinSize
            | ErrorKind::MaxSize
            | ErrorKind::MinBytesize
            | ErrorKind::MaxBytesize => ErrorCategory::SizeOutOfRange,
            ErrorKind::RejectMsg => ErrorCategory::PatternRejected,
            ErrorKind::MatchMsg => ErrorCategory::PatternNotMatched,
            ErrorKind::MinLimit
            | ErrorKind::MaxLimit
            | ErrorKind::InfLimit
            | ErrorKind::SupLimit => ErrorCategory::NumericOutOfRange,
            ErrorKind::Custom => ErrorCategory::CustomCheckFailed,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation failure reported for a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Custom, message)
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
