//! Guard evaluation
//!
//! `check` computes one field's violations from the field table without
//! touching anything. `GuardEvaluator::evaluate` wraps it with the cycle
//! guard and the inclusion/exclusion cascade: every dependent field is
//! re-evaluated depth-first and its own error region refreshed right away.
//! Cascaded results are never merged into the triggering field's list.
//!
//! Evaluation is total. A malformed `filePattern` was compiled (and logged)
//! at bind time; here the pattern check is simply skipped (fail-open).

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;
use tracing::{debug, instrument};

use crate::field::{BoundGuard, FieldBinding, FieldTable, PatternCheck};
use crate::guard::{is_flagged, FieldType};
use crate::presenter::ErrorPresenter;
use crate::violation::{messages, Violation};

/// Fields already evaluated in the current top-level pass
pub type Visited = FxHashSet<String>;

/// Leading optional sign and base-10 digits
static INTEGER_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+").unwrap());

/// Whether `value` reads as a base-10 integer (`"12"`, `"-3"`, `"12.0"`; not `"12.5"`)
///
/// The value must parse as a finite float equal to its leading digit run, so
/// `"12.0"` passes and `"1e3"` does not.
pub fn is_integer(value: &str) -> bool {
    let value = value.trim();
    let Some(float) = value.parse::<f64>().ok().filter(|f| f.is_finite()) else {
        return false;
    };
    INTEGER_PREFIX
        .find(value)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .is_some_and(|prefix| prefix == float)
}

/// Whether `value` is a finite floating-point literal (`"12.5"`, `"-0.3"`; not `"abc"`)
pub fn is_double(value: &str) -> bool {
    value.trim().parse::<f64>().is_ok_and(f64::is_finite)
}

/// Violations of `field`'s own guard, in check order
///
/// Empty values are exempt from the type checks only. A `filePattern` applies
/// to every value, so a blank guarded file field fails unless the pattern
/// accepts the empty string.
pub fn check(field: &FieldBinding, guard: &BoundGuard, fields: &FieldTable) -> Vec<Violation> {
    let spec = guard.spec();
    let value = field.effective_value();
    let empty = value.is_empty();
    let mut violations = Vec::new();

    if spec.mandatory && empty {
        violations.push(Violation::Missing);
    }

    match guard.pattern() {
        PatternCheck::Ready(re) if !re.is_match(value) => {
            let label = spec
                .file_pattern
                .as_ref()
                .map_or_else(|| re.as_str().to_string(), |fp| fp.label.clone());
            violations.push(Violation::PatternMismatch { label });
        }
        PatternCheck::Broken(e) => {
            debug!(field = field.name(), error = %e, "skipping broken filePattern");
        }
        _ => {}
    }

    if !empty {
        match spec.field_type {
            FieldType::Integer if !is_integer(value) => violations.push(Violation::NotInteger),
            FieldType::Double if !is_double(value) => violations.push(Violation::NotNumber),
            _ => {}
        }
    }

    for (control, flags) in &spec.included {
        let current = fields.effective_value(control);
        if empty && is_flagged(flags, current) {
            violations.push(Violation::RequiredWhen {
                control: control.clone(),
                value: current.to_string(),
            });
        }
    }

    for (control, flags) in &spec.excluded {
        let current = fields.effective_value(control);
        if !empty && is_flagged(flags, current) {
            violations.push(Violation::ForbiddenWhen {
                control: control.clone(),
                value: current.to_string(),
            });
        }
    }

    violations
}

/// Evaluates guards against a field table and pushes results to a presenter
pub struct GuardEvaluator<'a, P: ErrorPresenter + ?Sized> {
    fields: &'a mut FieldTable,
    presenter: &'a mut P,
}

impl<'a, P: ErrorPresenter + ?Sized> GuardEvaluator<'a, P> {
    pub fn new(fields: &'a mut FieldTable, presenter: &'a mut P) -> Self {
        Self { fields, presenter }
    }

    /// Compute `field`'s violations, cascading into dependent fields
    ///
    /// Returns nothing for a field already in `visited`, an unknown field or
    /// a field with no guard. Dependents are evaluated only if not yet
    /// visited, and their regions are refreshed before this call returns.
    #[instrument(level = "debug", skip(self, visited))]
    pub fn evaluate(&mut self, field: &str, visited: &mut Visited) -> Vec<Violation> {
        if !visited.insert(field.to_string()) {
            debug!("already evaluated in this pass");
            return Vec::new();
        }

        let table: &FieldTable = &*self.fields;
        let Some(binding) = table.get(field) else {
            return Vec::new();
        };
        let Some(guard) = binding.guard() else {
            return Vec::new();
        };

        let violations = check(binding, guard, table);
        let dependents: Vec<String> = guard
            .spec()
            .dependents(binding.effective_value())
            .map(String::from)
            .collect();

        for dependent in dependents {
            if visited.contains(&dependent) {
                continue;
            }
            debug!(dependent = %dependent, "cascading");
            let cascaded = self.evaluate(&dependent, visited);
            self.apply(&dependent, cascaded);
        }

        debug!(errors = violations.len(), "evaluated");
        violations
    }

    /// Store `violations` on the field and refresh its error region
    ///
    /// Unknown fields are ignored.
    pub fn apply(&mut self, field: &str, violations: Vec<Violation>) {
        let Some(binding) = self.fields.get_mut(field) else {
            return;
        };

        if violations.is_empty() {
            self.presenter.hide(field);
        } else {
            self.presenter.show(field, &messages(&violations));
        }
        binding.set_errors(violations);
    }

    /// Evaluate `field` as a top-level trigger and apply the result
    ///
    /// Returns whether the field came out clean.
    pub fn refresh(&mut self, field: &str) -> bool {
        let mut visited = Visited::default();
        let violations = self.evaluate(field, &mut visited);
        let clean = violations.is_empty();
        self.apply(field, violations);
        clean
    }
}
