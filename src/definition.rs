//! Whole-form documents
//!
//! A `FormDefinition` gathers the guards of every field together with the
//! values present when the form is rendered. It is what the page template
//! would emit field by field, collected into one JSON or YAML file.
//!
//! ```yaml
//! guards:
//!   mode:
//!     inclusions: { mode1: [from] }
//!   from:
//!     mandatory: true
//!     filePattern: ["\\.cub$", "*.cub"]
//! values:
//!   mode: mode1
//!   from_alt: 12/image.cub
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::FormConfig;
use crate::error::{GuardError, Result};
use crate::form::Form;
use crate::guard::GuardSpec;

/// Initial field value; numbers and booleans are kept as their literal text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitialValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl fmt::Display for InitialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitialValue::Text(s) => f.write_str(s),
            InitialValue::Number(n) => write!(f, "{}", n),
            InitialValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    #[serde(default)]
    pub guards: BTreeMap<String, GuardSpec>,

    #[serde(default)]
    pub values: BTreeMap<String, InitialValue>,
}

impl FormDefinition {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load by extension: `.yaml`/`.yml` as YAML, anything else as JSON
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }

    /// Override a value (e.g. from `--set name=value`)
    pub fn set_value(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(field.into(), InitialValue::Text(value.into()));
    }

    /// Bind every guard and seed values without evaluating anything
    pub fn to_form(&self, config: &FormConfig) -> Form {
        let mut form = Form::new(config);
        for (field, spec) in &self.guards {
            form.bind(field, spec.clone());
        }
        for (field, value) in &self.values {
            form.seed_value(field, value.to_string());
        }
        form
    }

    /// Configuration problems found without evaluating any value
    ///
    /// A field is known if it has a guard or a value.
    pub fn lint(&self) -> Vec<GuardError> {
        let known: BTreeSet<&str> = self
            .guards
            .keys()
            .chain(self.values.keys())
            .map(String::as_str)
            .collect();
        let mut problems = Vec::new();

        for (field, spec) in &self.guards {
            if let Some(pattern) = &spec.file_pattern {
                if let Err(e) = pattern.compile(field) {
                    problems.push(e);
                }
            }

            let targets: BTreeSet<&str> = spec.cascade_targets().collect();
            for dependent in targets.into_iter().filter(|d| !known.contains(d)) {
                problems.push(GuardError::UnknownDependent {
                    field: field.clone(),
                    dependent: dependent.to_string(),
                });
            }

            for control in spec.control_fields().filter(|c| !known.contains(c)) {
                problems.push(GuardError::UnknownControl {
                    field: field.clone(),
                    control: control.to_string(),
                });
            }
        }

        problems
    }
}
