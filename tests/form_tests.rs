//! # Form Validation Tests
//!
//! End-to-end behaviour of a bound form:
//! - mandatory / type / filePattern checks
//! - inclusion and exclusion cascades, including cyclic ones
//! - conditional mandatory (`included`) and forbidden (`excluded`)
//! - validate_all idempotence and its relation to per-field errors

use osiris_guards::{
    FieldEvent, FieldState, FileSelection, Form, FormConfig, FormDefinition, GuardSpec, Violation,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// TEST HELPERS
// ============================================================================

fn new_form() -> Form {
    Form::new(&FormConfig::default())
}

fn spec(value: serde_json::Value) -> GuardSpec {
    serde_json::from_value(value).unwrap()
}

fn snapshot(form: &Form) -> Vec<(String, Vec<Violation>)> {
    form.registry()
        .fields()
        .iter()
        .map(|f| (f.name().to_string(), f.errors().to_vec()))
        .collect()
}

/// Job submission form modelled on a map-projection program
fn job_form() -> Form {
    let definition = FormDefinition::from_json(
        &json!({
            "guards": {
                "from": {
                    "mandatory": true,
                    "filePattern": { "regex": "\\.cub$", "label": "ISIS cube (*.cub)" }
                },
                "to": { "mandatory": true },
                "defaultrange": {
                    "inclusions": { "MAP": ["minlat", "maxlat"] },
                    "exclusions": { "CAMERA": ["minlat", "maxlat"] }
                },
                "minlat": {
                    "type": "double",
                    "included": { "defaultrange": { "MAP": true } },
                    "excluded": { "defaultrange": { "CAMERA": true } }
                },
                "maxlat": {
                    "type": "double",
                    "included": { "defaultrange": { "MAP": true } },
                    "excluded": { "defaultrange": { "CAMERA": true } }
                },
                "lines": { "type": "integer" }
            },
            "values": {
                "defaultrange": "MINIMIZE"
            }
        })
        .to_string(),
    )
    .unwrap();
    definition.to_form(&FormConfig::default())
}

// ============================================================================
// SINGLE-FIELD PROPERTIES
// ============================================================================

#[test]
fn mandatory_empty_always_reports_missing() {
    let mut form = new_form();
    form.bind("a", spec(json!({ "mandatory": true, "type": "integer" })));
    form.bind("b", spec(json!({ "mandatory": true, "type": "double" })));

    assert!(!form.validate_all());
    for field in ["a", "b"] {
        assert_eq!(form.errors(field), &[Violation::Missing], "field {field}");
    }
}

#[test]
fn mandatory_empty_file_field_reports_missing_and_pattern() {
    let mut form = new_form();
    form.bind("f", spec(json!({ "mandatory": true, "filePattern": "x$" })));

    assert_eq!(form.blur("f"), Some(false));
    assert_eq!(
        form.errors("f"),
        &[
            Violation::Missing,
            Violation::PatternMismatch { label: "x$".into() }
        ]
    );
}

#[test]
fn integer_examples() {
    let mut form = new_form();
    form.bind("n", spec(json!({ "type": "integer" })));

    for (value, ok) in [
        ("12", true),
        ("12.5", false),
        ("-7", true),
        ("", true),
        ("12.0", true),
        ("12.", true),
        ("1e3", false),
        (" ", false),
    ] {
        assert_eq!(form.set_value("n", value), Some(ok), "value {value:?}");
    }
}

#[test]
fn whitespace_only_integer_is_not_exempt() {
    let mut form = new_form();
    form.bind("n", spec(json!({ "type": "integer" })));
    assert_eq!(form.set_value("n", " "), Some(false));
    assert_eq!(form.errors("n"), &[Violation::NotInteger]);
}

#[test]
fn integer_empty_not_exempt_when_mandatory() {
    let mut form = new_form();
    form.bind("n", spec(json!({ "type": "integer", "mandatory": true })));
    assert_eq!(form.set_value("n", ""), Some(false));
    assert_eq!(form.errors("n"), &[Violation::Missing]);
}

#[test]
fn double_examples() {
    let mut form = new_form();
    form.bind("x", spec(json!({ "type": "double" })));
    assert_eq!(form.set_value("x", "12.5"), Some(true));
    assert_eq!(form.set_value("x", "abc"), Some(false));
    assert_eq!(form.errors("x"), &[Violation::NotNumber]);
}

#[test]
fn file_pattern_examples() {
    let mut form = new_form();
    form.bind("f", spec(json!({ "filePattern": ["\\.cub$", "cube files"] })));

    assert_eq!(form.set_value("f", "x.cub"), Some(true));
    assert_eq!(form.set_value("f", "x.txt"), Some(false));
    assert!(form.errors("f")[0].to_string().contains("cube files"));
}

#[test]
fn blank_optional_file_field_must_match_pattern() {
    let mut form = new_form();
    form.bind("f", spec(json!({ "filePattern": ["\\.cub$", "*.cub"] })));

    assert_eq!(form.blur("f"), Some(false));
    assert_eq!(form.state("f"), FieldState::Errored);
    assert_eq!(
        form.errors("f"),
        &[Violation::PatternMismatch {
            label: "*.cub".into()
        }]
    );
}

// ============================================================================
// CASCADES
// ============================================================================

#[test]
fn inclusion_triggers_dependent_even_if_unchanged() {
    let mut form = job_form();
    assert_eq!(form.state("minlat"), FieldState::Clean);

    form.set_value("defaultrange", "MAP");

    assert_eq!(form.state("defaultrange"), FieldState::Clean);
    assert_eq!(form.state("minlat"), FieldState::Errored);
    assert_eq!(form.state("maxlat"), FieldState::Errored);
    assert!(form.presenter().is_highlighted("minlat"));
}

#[test]
fn exclusion_cascade_flags_forbidden_values() {
    let mut form = job_form();
    form.seed_value("minlat", "-10");
    form.seed_value("maxlat", "10");

    form.set_value("defaultrange", "CAMERA");
    assert_eq!(
        form.errors("minlat"),
        &[Violation::ForbiddenWhen {
            control: "defaultrange".into(),
            value: "CAMERA".into()
        }]
    );

    form.set_value("defaultrange", "MAP");
    assert_eq!(form.state("minlat"), FieldState::Clean);
    assert_eq!(form.state("maxlat"), FieldState::Clean);
}

#[test]
fn mutual_exclusion_settles() {
    let mut form = new_form();
    form.bind(
        "a",
        spec(json!({ "exclusions": { "on": ["b"] }, "excluded": { "b": { "on": true } } })),
    );
    form.bind(
        "b",
        spec(json!({ "exclusions": { "on": ["a"] }, "excluded": { "a": { "on": true } } })),
    );
    form.seed_value("b", "on");

    assert_eq!(form.set_value("a", "on"), Some(false));
    assert_eq!(form.state("a"), FieldState::Errored);
    assert_eq!(form.state("b"), FieldState::Errored);

    // "" is not a trigger value, so clearing `a` does not cascade: `b` keeps
    // its stale message until its own next event.
    assert_eq!(form.set_value("a", ""), Some(true));
    assert_eq!(form.state("b"), FieldState::Errored);
    assert_eq!(form.blur("b"), Some(true));
    assert_eq!(form.state("a"), FieldState::Clean);
}

#[test]
fn included_depends_on_control_value() {
    let mut form = new_form();
    form.bind("a", spec(json!({ "included": { "b": { "yes": true } } })));

    form.seed_value("b", "yes");
    assert_eq!(form.blur("a"), Some(false));

    form.seed_value("b", "no");
    assert_eq!(form.blur("a"), Some(true));
}

// ============================================================================
// ALTERNATE VALUES
// ============================================================================

#[test]
fn picked_file_overrides_typed_value() {
    let mut form = job_form();
    form.set_value("from", "notes.txt");
    assert_eq!(form.state("from"), FieldState::Errored);

    form.select_file("from", &FileSelection::new("17", "mars.cub", true));
    assert_eq!(form.state("from"), FieldState::Clean);
    assert_eq!(form.registry().fields().effective_value("from"), "17/mars.cub");
}

#[test]
fn shadow_input_event_reaches_base_field() {
    let mut form = job_form();
    form.blur("from");
    assert_eq!(form.state("from"), FieldState::Errored);

    assert_eq!(form.dispatch("from_alt", FieldEvent::Change), Some(false));
    form.seed_value("from_alt", "3/in.cub");
    assert_eq!(form.dispatch("from_alt", FieldEvent::Change), Some(true));
}

// ============================================================================
// validate_all
// ============================================================================

#[test]
fn validate_all_is_idempotent() {
    let mut form = job_form();
    form.seed_value("defaultrange", "MAP");
    form.seed_value("lines", "1.5");

    let first = form.validate_all();
    let before = snapshot(&form);
    let second = form.validate_all();

    assert_eq!(first, second);
    assert_eq!(before, snapshot(&form));
}

#[test]
fn validate_all_false_iff_some_field_errored() {
    let mut form = job_form();
    assert!(!form.validate_all());
    assert!(!form.errored_fields().is_empty());

    form.set_value("from", "in.cub");
    form.set_value("to", "out.cub");
    assert!(form.validate_all());
    assert!(form.errored_fields().is_empty());
    assert!(form.submit().is_proceed());
}

#[test]
fn errors_remain_visible_after_cancelled_submit() {
    let mut form = job_form();
    let outcome = form.submit();

    assert!(!outcome.is_proceed());
    assert_eq!(form.presenter().visible_fields(), vec!["from", "to"]);
    assert_eq!(
        form.presenter().region("from").unwrap().spans,
        vec![
            "This parameter must have a value.".to_string(),
            "Filename must match ISIS cube (*.cub).".to_string()
        ]
    );
}

// ============================================================================
// CYCLE SAFETY (PROPERTY)
// ============================================================================

proptest! {
    /// Any cascade graph over a handful of fields terminates and settles
    #[test]
    fn random_cascade_graphs_terminate(
        edges in prop::collection::vec((0usize..5, 0usize..5, any::<bool>()), 0..20),
        values in prop::collection::vec(prop::sample::select(vec!["on", "off", ""]), 5),
    ) {
        let names = ["f0", "f1", "f2", "f3", "f4"];
        let mut specs: Vec<serde_json::Value> = names
            .iter()
            .map(|_| json!({ "inclusions": {}, "exclusions": {}, "excluded": {} }))
            .collect();

        for (from, to, inclusion) in &edges {
            let key = if *inclusion { "inclusions" } else { "exclusions" };
            let list = specs[*from][key]
                .as_object_mut()
                .unwrap()
                .entry("on")
                .or_insert_with(|| json!([]));
            list.as_array_mut().unwrap().push(json!(names[*to]));
            specs[*to]["excluded"][names[*from]] = json!({ "on": true });
        }

        let mut form = new_form();
        for (name, spec_json) in names.iter().zip(specs) {
            form.bind(name, spec(spec_json));
        }
        for (name, value) in names.iter().zip(&values) {
            form.seed_value(name, *value);
        }

        for name in names {
            form.set_value(name, "on");
        }
        let first = form.validate_all();
        let before = snapshot(&form);
        prop_assert_eq!(first, form.validate_all());
        prop_assert_eq!(before, snapshot(&form));
    }
}
