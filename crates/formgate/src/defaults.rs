//! Canonical default values applied when a field definition omits them.

use serde::Deserialize;

/// Default character limit applied to all input.
pub const DEFAULT_SIZE_LIMIT: usize = 255;

/// Minimum hash key accepted by default.
pub const DEFAULT_MIN_KEY: i128 = 0;

/// Maximum hash key accepted by default (2^64 - 1).
pub const DEFAULT_MAX_KEY: i128 = u64::MAX as i128;

/// Names which may not be used for regular fields.
///
/// The step names are claimed by the step machine even for schemas without steps,
/// so a schema can always be turned into a multi-step one later. Only copied
/// fields may use them, see [`crate::SchemaBuilder::copy`].
pub const RESERVED_NAMES: &[&str] = &[
    "errors", "fields", "params", "schema", "valid", "invalid", "validate", "report", "set",
    "clear", "import", "freeze", "step", "next", "last", "seen",
];

/// Whitespace as understood by the default filter.
pub(crate) fn is_filter_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// Default input filter: squeeze whitespace runs into single spaces, then strip
/// surrounding whitespace and NULs.
pub fn squeeze_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_space = false;
    for ch in input.chars() {
        if is_filter_space(ch) {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out.trim_matches(|c: char| c == '\0' || is_filter_space(c))
        .to_string()
}

/// Host-level overrides for the schema defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Character limit applied when a field declares no `max_size`.
    pub size_limit: usize,
    /// Whether fields without an explicit filter get [`squeeze_whitespace`].
    pub default_filter: bool,
    /// Lower bound for integer hash keys.
    pub min_key: i128,
    /// Upper bound for integer hash keys.
    pub max_key: i128,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            size_limit: DEFAULT_SIZE_LIMIT,
            default_filter: true,
            min_key: DEFAULT_MIN_KEY,
            max_key: DEFAULT_MAX_KEY,
        }
    }
}
