use schemaform::prelude::*;
use serde_json::{Map, Value, json};

use crate::fixtures::timestepper_schema;

fn open(schema: FormSchema, values: Value) -> Form {
    Form::open(schema, &values, FormOptions::default()).expect("form opens")
}

fn rejected(outcome: SaveOutcome) -> ValidationFailure {
    match outcome {
        SaveOutcome::Rejected(failure) => failure,
        SaveOutcome::Saved(output) => panic!("expected a rejection, saved {output:?}"),
    }
}

fn saved(outcome: SaveOutcome) -> Map<String, Value> {
    outcome.into_result().expect("form saves")
}

#[test]
fn timestepper_needs_days_or_timesteps() {
    let mut form = open(timestepper_schema(), json!({}));
    let failure = rejected(form.save().expect("save runs"));
    assert_eq!(failure.message, "You must provide one of days or timesteps");
    assert_eq!(failure.field.as_deref(), Some("days"));
    assert_eq!(failure.scope, schemaform::form::FailureScope::Section("timestepper".into()));
    assert_eq!(form.phase(), FormPhase::Rendered);
    assert_eq!(form.last_failure(), Some(&failure));

    form.set_value("days", json!(7)).expect("edit");
    let output = saved(form.save().expect("save runs"));
    assert_eq!(output, json!({"days": 7}).as_object().cloned().expect("object"));
    assert_eq!(form.phase(), FormPhase::Saved);

    form.set_value("time_delta", json!(3)).expect("edit");
    assert_eq!(form.phase(), FormPhase::Rendered);
    let failure = rejected(form.save().expect("save runs"));
    assert!(failure.message.contains("divisible"), "{}", failure.message);
    assert!(failure.message.contains("'days' (7)"), "{}", failure.message);
    assert_eq!(form.output(), Some(&output), "previous output is kept");
}

#[test]
fn first_invalid_field_wins_and_nothing_changes() {
    let schema = FormSchema::new().section(
        SectionSchema::new("general")
            .field(
                FieldSpec::new("name", "text")
                    .with_validator(Validator::Required)
                    .with_label("Name"),
            )
            .field(FieldSpec::new("scale", "float").with_range(Some(0.0), Some(1.0)))
            .field(FieldSpec::new("comment", "text").with_default(json!("none"))),
    );
    let mut form = open(schema, json!({"scale": 4, "comment": "draft"}));
    let before: Vec<Value> = form.fields().map(|field| field.get_value()).collect();

    let failure = rejected(form.save().expect("save runs"));
    assert_eq!(failure.field.as_deref(), Some("name"));
    assert_eq!(failure.label.as_deref(), Some("Name"));
    assert_eq!(failure.to_string(), format!("Name: {}", failure.message));

    let after: Vec<Value> = form.fields().map(|field| field.get_value()).collect();
    assert_eq!(before, after);
    assert!(form.output().is_none());

    form.set_value("name", json!("reservoir")).expect("edit");
    let failure = rejected(form.save().expect("save runs"));
    assert_eq!(failure.field.as_deref(), Some("scale"));
}

#[test]
fn defaults_are_suppressed_and_survive_a_round_trip() {
    let schema = || {
        FormSchema::new().section(
            SectionSchema::new("curve")
                .field(FieldSpec::new("name", "text"))
                .field(FieldSpec::new("factor", "float").with_default(json!(1.0)))
                .field(FieldSpec::new("tags", "text_list").with_default(json!([])))
                .field(FieldSpec::new("points", "points").with_value_keys(["x", "y"]))
                .filter(Filter::split_points("points", "x", "y")),
        )
    };
    let mut form = open(schema(), json!({"name": "curve", "factor": 2.5}));
    form.set_value("points", json!([[0, 10], [5, 20]])).expect("edit");
    form.set_value("factor", json!("")).expect("clear factor");
    let output = saved(form.save().expect("save runs"));
    assert_eq!(
        Value::Object(output.clone()),
        json!({"name": "curve", "x": [0, 5], "y": [10, 20]})
    );

    let mut reopened = open(schema(), Value::Object(output.clone()));
    assert_eq!(reopened.value("factor"), Some(json!(1.0)));
    assert_eq!(reopened.value("tags"), Some(json!([])));
    assert_eq!(reopened.value("points"), Some(json!([[0, 10], [5, 20]])));
    assert!(reopened.field("factor").is_some_and(|field| field.is_default()));
    assert!(reopened.warnings().is_empty());
    assert_eq!(saved(reopened.save().expect("save runs")), output);
}

#[test]
fn defaults_are_kept_when_suppression_is_off() {
    let mut form = Form::open(
        timestepper_schema(),
        &json!({"timesteps": 10}),
        FormOptions::default().with_suppress_defaults(false),
    )
    .expect("form opens");
    let output = saved(form.save().expect("save runs"));
    assert_eq!(
        Value::Object(output),
        json!({"days": 0, "timesteps": 10, "time_delta": 1})
    );
}

#[test]
fn form_rules_see_values_of_every_section() {
    let schema = FormSchema::new()
        .section(
            SectionSchema::new("inputs")
                .field(FieldSpec::new("values", "number_list"))
                .field(FieldSpec::new("weights", "number_list")),
        )
        .section(SectionSchema::new("meta").field(FieldSpec::new("name", "text")))
        .rule(Rule::LengthMatches {
            field: "weights".into(),
            other: "values".into(),
        });
    let mut form = open(schema, json!({"values": [1, 2, 3], "weights": [1, 1]}));
    let failure = rejected(form.save().expect("save runs"));
    assert_eq!(failure.scope, schemaform::form::FailureScope::Form);
    assert_eq!(failure.field.as_deref(), Some("weights"));

    form.set_value("weights", json!("1, 1, 2")).expect("edit");
    assert!(form.save().expect("save runs").is_saved());
}

#[test]
fn hidden_fields_are_not_validated() {
    let schema = FormSchema::new().section(
        SectionSchema::new("general")
            .field(FieldSpec::new("advanced", "boolean").with_default(json!(false)))
            .field(
                FieldSpec::new("tolerance", "float")
                    .with_validator(Validator::Required)
                    .hidden(),
            )
            .edge(EdgeSpec::new(
                "advanced",
                "tolerance",
                CascadeAction::ToggleVisibility {
                    when: Condition::Truthy,
                },
            )),
    );
    let mut form = open(schema, json!({}));
    assert!(form.save().expect("save runs").is_saved());

    form.set_value("advanced", json!(true)).expect("edit");
    let failure = rejected(form.save().expect("save runs"));
    assert_eq!(failure.field.as_deref(), Some("tolerance"));
}
