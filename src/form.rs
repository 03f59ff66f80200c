//! Form validation controller
//!
//! `Form` owns the guard registry (and with it the field table) plus the
//! error presenter. It turns UI events into evaluations and gates submission
//! on `validate_all`.
//!
//! Per-field state machine: `Clean -> Errored` when an evaluation yields at
//! least one violation, `Errored -> Clean` when it yields none. Every change
//! or blur on a bound field re-enters evaluation whatever the current state.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::FormConfig;
use crate::error::GuardError;
use crate::evaluator::{GuardEvaluator, Visited};
use crate::field::{FieldBinding, FieldState};
use crate::guard::GuardSpec;
use crate::presenter::{ErrorPresenter, RegionPresenter};
use crate::registry::{FieldEvent, FileSelection, GuardRegistry};
use crate::violation::Violation;

/// Whether a submit may go ahead
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Proceed,
    /// Submission cancelled; errors stay visible on these fields
    Cancelled { errored: Vec<String> },
}

impl SubmitOutcome {
    pub fn is_proceed(&self) -> bool {
        matches!(self, SubmitOutcome::Proceed)
    }
}

pub struct Form<P: ErrorPresenter = RegionPresenter> {
    registry: GuardRegistry,
    presenter: P,
}

impl Form<RegionPresenter> {
    /// Form rendering into in-memory error regions
    pub fn new(config: &FormConfig) -> Self {
        let presenter = RegionPresenter::new(&config.error_prefix, &config.highlight_class);
        Self::with_presenter(config, presenter)
    }
}

impl Default for Form<RegionPresenter> {
    fn default() -> Self {
        Self::new(&FormConfig::default())
    }
}

impl<P: ErrorPresenter> Form<P> {
    pub fn with_presenter(config: &FormConfig, presenter: P) -> Self {
        Self {
            registry: GuardRegistry::new(&config.alternate_suffix),
            presenter,
        }
    }

    /// Attach a guard to `field` (see [`GuardRegistry::bind`])
    pub fn bind(&mut self, field: &str, spec: impl Into<Arc<GuardSpec>>) {
        self.registry.bind(field, spec);
    }

    pub fn registry(&self) -> &GuardRegistry {
        &self.registry
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Route a UI event to the evaluator
    ///
    /// Events on a shadow input are routed to the field it feeds. Returns
    /// `None` when nothing is subscribed, else whether the field is clean.
    pub fn dispatch(&mut self, field: &str, event: FieldEvent) -> Option<bool> {
        let target = self.registry.shadow_target(field).unwrap_or(field);
        if !self.registry.is_subscribed(target, event) {
            debug!(field = target, ?event, "no subscription, ignoring event");
            return None;
        }

        let mut evaluator = GuardEvaluator::new(self.registry.fields_mut(), &mut self.presenter);
        Some(evaluator.refresh(target))
    }

    /// Write a raw value without firing any event (initial render)
    pub fn seed_value(&mut self, field: &str, value: impl Into<String>) {
        self.registry.set_value(field, value);
    }

    /// Write a raw value and fire a change event
    pub fn set_value(&mut self, field: &str, value: impl Into<String>) -> Option<bool> {
        self.registry.set_value(field, value);
        self.dispatch(field, FieldEvent::Change)
    }

    /// Fire a loss-of-focus event
    pub fn blur(&mut self, field: &str) -> Option<bool> {
        self.dispatch(field, FieldEvent::Blur)
    }

    /// Accept a file/job browser selection into `field`'s alternate slot
    pub fn select_file(&mut self, field: &str, selection: &FileSelection) -> Option<bool> {
        self.registry.select_file(field, selection);
        self.dispatch(field, FieldEvent::Change)
    }

    /// Drop a previous selection so the raw value applies again
    pub fn clear_selection(&mut self, field: &str) -> Option<bool> {
        self.registry.set_alternate(field, None);
        self.dispatch(field, FieldEvent::Change)
    }

    /// Evaluate every field except shadow inputs
    ///
    /// Each field starts a fresh pass with an empty visited set. Returns
    /// true iff every evaluated field produced no violation.
    pub fn validate_all(&mut self) -> bool {
        let mut valid = true;
        let fields = self.registry.validated_fields();
        let mut evaluator = GuardEvaluator::new(self.registry.fields_mut(), &mut self.presenter);

        for field in fields {
            let mut visited = Visited::default();
            let violations = evaluator.evaluate(&field, &mut visited);
            valid &= violations.is_empty();
            evaluator.apply(&field, violations);
        }

        info!(valid, "validated form");
        valid
    }

    /// Gate a submit on `validate_all`
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.validate_all() {
            return SubmitOutcome::Proceed;
        }

        let errored: Vec<String> = self.errored_fields().into_iter().map(String::from).collect();
        info!(errored = errored.len(), "submission cancelled");
        SubmitOutcome::Cancelled { errored }
    }

    pub fn state(&self, field: &str) -> FieldState {
        self.registry
            .field(field)
            .map(FieldBinding::state)
            .unwrap_or_default()
    }

    pub fn errors(&self, field: &str) -> &[Violation] {
        self.registry
            .field(field)
            .map(FieldBinding::errors)
            .unwrap_or(&[])
    }

    /// Errored non-shadow fields, in form order
    pub fn errored_fields(&self) -> Vec<&str> {
        self.registry
            .fields()
            .iter()
            .filter(|f| f.state() == FieldState::Errored && !self.registry.is_shadow(f.name()))
            .map(FieldBinding::name)
            .collect()
    }

    /// Guards whose configuration could not be honoured
    pub fn config_errors(&self) -> Vec<&GuardError> {
        self.registry
            .fields()
            .iter()
            .filter_map(|f| f.guard().and_then(|g| g.config_error()))
            .collect()
    }
}
