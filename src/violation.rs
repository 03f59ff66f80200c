//! Per-field guard violations
//!
//! Human-readable messages shown in a field's error region. These are user
//! input errors: recoverable and local to the field.

use thiserror::Error;

/// One failed check on one field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("This parameter must have a value.")]
    Missing,

    #[error("Filename must match {label}.")]
    PatternMismatch { label: String },

    #[error("This parameter must be an integer.")]
    NotInteger,

    #[error("This parameter must be a number.")]
    NotNumber,

    #[error("This parameter must have a value when {control}={value}.")]
    RequiredWhen { control: String, value: String },

    #[error("This parameter must be empty if {control}={value}.")]
    ForbiddenWhen { control: String, value: String },
}

impl Violation {
    /// Short machine-readable kind (for JSON output)
    pub fn kind(&self) -> &'static str {
        match self {
            Violation::Missing => "mandatory",
            Violation::PatternMismatch { .. } => "file_pattern",
            Violation::NotInteger => "integer",
            Violation::NotNumber => "double",
            Violation::RequiredWhen { .. } => "included",
            Violation::ForbiddenWhen { .. } => "excluded",
        }
    }
}

/// Render violations into the message list an error region displays
pub fn messages(violations: &[Violation]) -> Vec<String> {
    violations.iter().map(ToString::to_string).collect()
}
