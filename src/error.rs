//! Configuration error types with fix suggestions
//!
//! User input problems are not errors here: they are [`Violation`]s shown
//! next to the field. `GuardError` covers malformed guard configuration and
//! loading failures.
//!
//! [`Violation`]: crate::violation::Violation

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

pub type Result<T> = std::result::Result<T, GuardError>;

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("GUARD-001: JSON parse error: {0}")]
    SpecParse(#[from] serde_json::Error),

    #[error("GUARD-002: YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("GUARD-003: IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GUARD-004: Config error: {reason}")]
    Config { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Rule configuration (GUARD-010 to GUARD-012)
    // ─────────────────────────────────────────────────────────────

    #[error("GUARD-010: Invalid filePattern '{pattern}' on field '{field}': {details}")]
    InvalidPattern {
        field: String,
        pattern: String,
        details: String,
    },

    #[error("GUARD-011: Field '{field}' cascades into unknown field '{dependent}'")]
    UnknownDependent { field: String, dependent: String },

    #[error("GUARD-012: Field '{field}' depends on unknown control field '{control}'")]
    UnknownControl { field: String, control: String },
}

impl GuardError {
    /// Whether this error comes from a rule rather than from loading
    pub fn is_rule_error(&self) -> bool {
        matches!(
            self,
            GuardError::InvalidPattern { .. }
                | GuardError::UnknownDependent { .. }
                | GuardError::UnknownControl { .. }
        )
    }
}

impl FixSuggestion for GuardError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            GuardError::SpecParse(_) => Some("Check the guard JSON emitted by the page template"),
            GuardError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            GuardError::Io(_) => Some("Check file path and permissions"),
            GuardError::Config { .. } => {
                Some("Fix the TOML config or remove it to fall back to defaults")
            }
            GuardError::InvalidPattern { .. } => {
                Some("Fix the regex syntax; the pattern check is skipped until then")
            }
            GuardError::UnknownDependent { .. } => {
                Some("List only fields that exist on the form in inclusions/exclusions")
            }
            GuardError::UnknownControl { .. } => {
                Some("Name an existing field in included/excluded, otherwise it reads as empty")
            }
        }
    }
}
