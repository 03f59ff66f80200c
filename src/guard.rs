//! Guard rule schema
//!
//! One `GuardSpec` per guarded field, delivered as JSON by the page template
//! when the form is rendered. Specs are immutable for the session.
//!
//! Wire format (camelCase keys, every key optional):
//!
//! ```json
//! {
//!   "mandatory": true,
//!   "type": "integer",
//!   "filePattern": { "regex": "\\.cub$", "label": "*.cub" },
//!   "inclusions": { "mode1": ["from"] },
//!   "exclusions": { "none": ["to"] },
//!   "included": { "mode": { "mode1": true } },
//!   "excluded": { "mode": { "none": true } }
//! }
//! ```

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};

/// triggerValue -> dependent field names
pub type Cascade = BTreeMap<String, Vec<String>>;

/// controlFieldName -> (controlValue -> flag)
pub type Conditions = BTreeMap<String, BTreeMap<String, bool>>;

/// Numeric coercion check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// No numeric check (default)
    #[default]
    #[serde(alias = "")]
    None,

    /// Base-10 integer literal
    Integer,

    /// Finite floating-point literal
    Double,
}

/// Filename pattern with a human-readable label for the message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FilePatternWire")]
pub struct FilePattern {
    pub regex: String,
    pub label: String,
}

/// Accepted JSON shapes for `filePattern`
///
/// Order matters for serde untagged:
/// 1. Bare regex string (label = regex)
/// 2. `[regex, label]` pair
/// 3. `{ regex, label? }` object
#[derive(Deserialize)]
#[serde(untagged)]
enum FilePatternWire {
    Bare(String),
    Pair(String, String),
    Full {
        regex: String,
        #[serde(default)]
        label: Option<String>,
    },
}

impl From<FilePatternWire> for FilePattern {
    fn from(wire: FilePatternWire) -> Self {
        match wire {
            FilePatternWire::Bare(regex) => FilePattern::new(regex.clone(), regex),
            FilePatternWire::Pair(regex, label) => FilePattern::new(regex, label),
            FilePatternWire::Full { regex, label } => {
                let label = label.unwrap_or_else(|| regex.clone());
                FilePattern::new(regex, label)
            }
        }
    }
}

impl FilePattern {
    pub fn new(regex: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            regex: regex.into(),
            label: label.into(),
        }
    }

    /// Compile as a case-insensitive regex
    ///
    /// `field` only feeds the error for reporting.
    pub fn compile(&self, field: &str) -> Result<Regex> {
        RegexBuilder::new(&self.regex)
            .case_insensitive(true)
            .build()
            .map_err(|e| GuardError::InvalidPattern {
                field: field.to_string(),
                pattern: self.regex.clone(),
                details: e.to_string(),
            })
    }
}

/// Declarative rule set for one field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardSpec {
    /// Value must be non-empty
    #[serde(default)]
    pub mandatory: bool,

    #[serde(default, rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub file_pattern: Option<FilePattern>,

    /// Value equal to a key re-evaluates the listed fields
    #[serde(default)]
    pub inclusions: Cascade,

    /// Same trigger shape as `inclusions`, used for mutually exclusive options
    #[serde(default)]
    pub exclusions: Cascade,

    /// Mandatory while a control field holds a flagged value
    #[serde(default)]
    pub included: Conditions,

    /// Must be empty while a control field holds a flagged value
    #[serde(default)]
    pub excluded: Conditions,
}

impl GuardSpec {
    /// Parse a single guard from its JSON wire form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Fields to re-evaluate when this field holds `value`
    ///
    /// Inclusions come before exclusions; a name listed in both is yielded twice
    /// and the cycle guard absorbs the repeat.
    pub fn dependents<'a>(&'a self, value: &str) -> impl Iterator<Item = &'a str> + 'a {
        let included = self.inclusions.get(value).into_iter().flatten();
        let excluded = self.exclusions.get(value).into_iter().flatten();
        included.chain(excluded).map(String::as_str)
    }

    /// Every field named by `inclusions`/`exclusions`
    pub fn cascade_targets(&self) -> impl Iterator<Item = &str> {
        self.inclusions
            .values()
            .chain(self.exclusions.values())
            .flatten()
            .map(String::as_str)
    }

    /// Every control field named by `included`/`excluded`
    pub fn control_fields(&self) -> impl Iterator<Item = &str> {
        self.included
            .keys()
            .chain(self.excluded.keys())
            .map(String::as_str)
    }
}

/// Look up the flag for `value` in a control mapping
pub(crate) fn is_flagged(mapping: &BTreeMap<String, bool>, value: &str) -> bool {
    mapping.get(value).copied().unwrap_or(false)
}
