//! Typed per-field state
//!
//! Every form input is a `FieldBinding` held in a `FieldTable`, an ordered
//! map indexed by field name. The table is the only place field values,
//! alternate values, bound guards and current errors live.

use std::sync::Arc;

use regex::Regex;
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::error::GuardError;
use crate::guard::GuardSpec;
use crate::violation::Violation;

/// Visual state of a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldState {
    #[default]
    Clean,
    Errored,
}

/// Pattern compiled at bind time
#[derive(Debug)]
pub enum PatternCheck {
    /// No `filePattern` on the spec
    Absent,
    Ready(Regex),
    /// Malformed regex: the check is skipped (fail-open)
    Broken(GuardError),
}

/// A guard attached to a field, with its pattern precompiled
#[derive(Debug)]
pub struct BoundGuard {
    spec: Arc<GuardSpec>,
    pattern: PatternCheck,
}

impl BoundGuard {
    pub fn new(field: &str, spec: Arc<GuardSpec>) -> Self {
        let pattern = match &spec.file_pattern {
            None => PatternCheck::Absent,
            Some(fp) => match fp.compile(field) {
                Ok(re) => PatternCheck::Ready(re),
                Err(e) => {
                    warn!(field, error = %e, "filePattern does not compile; check disabled");
                    PatternCheck::Broken(e)
                }
            },
        };
        Self { spec, pattern }
    }

    pub fn spec(&self) -> &GuardSpec {
        &self.spec
    }

    pub fn pattern(&self) -> &PatternCheck {
        &self.pattern
    }

    /// Configuration error retained from binding, if any
    pub fn config_error(&self) -> Option<&GuardError> {
        match &self.pattern {
            PatternCheck::Broken(e) => Some(e),
            _ => None,
        }
    }
}

/// One form input
#[derive(Debug)]
pub struct FieldBinding {
    name: Arc<str>,
    /// Raw value typed into the input
    pub value: String,
    /// Value supplied by a collaborator (file picker), wins when non-empty
    pub alternate: Option<String>,
    guard: Option<BoundGuard>,
    errors: Vec<Violation>,
}

impl FieldBinding {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            alternate: None,
            guard: None,
            errors: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternate value if non-empty, else the raw value
    pub fn effective_value(&self) -> &str {
        match self.alternate.as_deref() {
            Some(alt) if !alt.is_empty() => alt,
            _ => &self.value,
        }
    }

    pub fn guard(&self) -> Option<&BoundGuard> {
        self.guard.as_ref()
    }

    /// Replace the bound guard (last bind wins)
    pub(crate) fn set_guard(&mut self, guard: BoundGuard) -> Option<BoundGuard> {
        self.guard.replace(guard)
    }

    pub fn errors(&self) -> &[Violation] {
        &self.errors
    }

    /// Overwrite the error list with the latest evaluation
    pub(crate) fn set_errors(&mut self, errors: Vec<Violation>) {
        self.errors = errors;
    }

    pub fn state(&self) -> FieldState {
        if self.errors.is_empty() {
            FieldState::Clean
        } else {
            FieldState::Errored
        }
    }
}

/// Ordered, name-indexed collection of field bindings
#[derive(Debug, Default)]
pub struct FieldTable {
    index: FxHashMap<Arc<str>, usize>,
    fields: Vec<FieldBinding>,
}

impl FieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldBinding> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldBinding> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.fields[i]),
            None => None,
        }
    }

    /// Get the binding for `name`, creating an empty one if needed
    pub fn get_or_insert(&mut self, name: &str) -> &mut FieldBinding {
        let i = match self.index.get(name) {
            Some(&i) => i,
            None => {
                let key: Arc<str> = Arc::from(name);
                let i = self.fields.len();
                self.fields.push(FieldBinding::new(Arc::clone(&key)));
                self.index.insert(key, i);
                i
            }
        };
        &mut self.fields[i]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Effective value of `name`; unknown fields read as empty
    pub fn effective_value(&self, name: &str) -> &str {
        self.get(name).map(FieldBinding::effective_value).unwrap_or("")
    }

    /// Fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &FieldBinding> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
