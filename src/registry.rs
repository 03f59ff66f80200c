//! Guard registry
//!
//! Binds a `GuardSpec` to a named field and records which UI events
//! re-trigger its evaluation. Binding never evaluates: a freshly bound
//! field stays clean until the first change, blur or submit.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::field::{BoundGuard, FieldBinding, FieldTable};
use crate::guard::GuardSpec;

/// UI events that re-enter evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldEvent {
    /// Value changed
    Change,
    /// Loss of focus
    Blur,
}

impl FieldEvent {
    pub const ALL: [FieldEvent; 2] = [FieldEvent::Change, FieldEvent::Blur];
}

/// Result handed over by the file/job browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    pub job_id: String,
    pub filename: String,
    pub is_output: bool,
}

impl FileSelection {
    pub fn new(job_id: impl Into<String>, filename: impl Into<String>, is_output: bool) -> Self {
        Self {
            job_id: job_id.into(),
            filename: filename.into(),
            is_output,
        }
    }

    /// Value written into the field's alternate slot: `<job_id>/<filename>`
    pub fn alternate_value(&self) -> String {
        format!("{}/{}", self.job_id, self.filename)
    }
}

/// Owner of the field table and of event subscriptions
#[derive(Debug)]
pub struct GuardRegistry {
    fields: FieldTable,
    subscriptions: FxHashMap<Arc<str>, Vec<FieldEvent>>,
    alternate_suffix: String,
}

impl GuardRegistry {
    pub fn new(alternate_suffix: impl Into<String>) -> Self {
        Self {
            fields: FieldTable::new(),
            subscriptions: FxHashMap::default(),
            alternate_suffix: alternate_suffix.into(),
        }
    }

    /// Attach `spec` to `field` and subscribe it to change and blur
    ///
    /// Binding again replaces the previous spec. Current errors are left
    /// untouched until the next evaluation.
    pub fn bind(&mut self, field: &str, spec: impl Into<Arc<GuardSpec>>) {
        let guard = BoundGuard::new(field, spec.into());
        let replaced = self.fields.get_or_insert(field).set_guard(guard).is_some();

        let events = self.subscriptions.entry(Arc::from(field)).or_default();
        for event in FieldEvent::ALL {
            if !events.contains(&event) {
                events.push(event);
            }
        }

        debug!(field, replaced, "bound guard");
    }

    /// Whether `event` on `field` should re-run evaluation
    pub fn is_subscribed(&self, field: &str, event: FieldEvent) -> bool {
        self.subscriptions
            .get(field)
            .is_some_and(|events| events.contains(&event))
    }

    /// Write a raw value
    ///
    /// A shadow input (`<name><suffix>`) also feeds `<name>`'s alternate slot.
    pub fn set_value(&mut self, field: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(base) = self.shadow_target(field) {
            self.set_alternate(base, Some(value.clone()));
        }
        self.fields.get_or_insert(field).value = value;
    }

    /// Write (or clear) a field's alternate value
    pub fn set_alternate(&mut self, field: &str, value: Option<String>) {
        self.fields.get_or_insert(field).alternate = value;
    }

    /// Collaborator contract for the file/job browser
    pub fn select_file(&mut self, field: &str, selection: &FileSelection) {
        debug!(
            field,
            job_id = %selection.job_id,
            filename = %selection.filename,
            is_output = selection.is_output,
            "file selected"
        );
        self.set_alternate(field, Some(selection.alternate_value()));
    }

    /// Whether `field` names a shadow input
    pub fn is_shadow(&self, field: &str) -> bool {
        self.shadow_target(field).is_some()
    }

    /// Field whose alternate slot a shadow input feeds
    pub fn shadow_target<'a>(&self, field: &'a str) -> Option<&'a str> {
        if self.alternate_suffix.is_empty() {
            return None;
        }
        field
            .strip_suffix(self.alternate_suffix.as_str())
            .filter(|base| !base.is_empty())
    }

    pub fn alternate_suffix(&self) -> &str {
        &self.alternate_suffix
    }

    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut FieldTable {
        &mut self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldBinding> {
        self.fields.get(name)
    }

    /// Names `validate_all` visits: every field except shadow inputs
    pub fn validated_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(FieldBinding::name)
            .filter(|name| !self.is_shadow(name))
            .map(String::from)
            .collect()
    }
}
