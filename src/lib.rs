//! Osiris guards - declarative field validation for the job submission form

pub mod config;
pub mod definition;
pub mod error;
pub mod evaluator;
pub mod field;
pub mod form;
pub mod guard;
pub mod presenter;
pub mod registry;
pub mod violation;

pub use config::FormConfig;
pub use definition::{FormDefinition, InitialValue};
pub use error::{FixSuggestion, GuardError};
pub use evaluator::{check, is_double, is_integer, GuardEvaluator, Visited};
pub use field::{BoundGuard, FieldBinding, FieldState, FieldTable, PatternCheck};
pub use form::{Form, SubmitOutcome};
pub use guard::{FieldType, FilePattern, GuardSpec};
pub use presenter::{ErrorPresenter, Region, RegionPresenter};
pub use registry::{FieldEvent, FileSelection, GuardRegistry};
pub use violation::Violation;
