use schemaform::prelude::*;
use serde_json::{Value, json};

use crate::fixtures::{flows, options, table_schema};

fn open_table_form(values: Value) -> Form {
    Form::open(table_schema(), &values, options()).expect("form opens")
}

fn snapshot(form: &Form) -> Vec<(String, Value, bool, bool, Option<String>, Option<Vec<String>>)> {
    form.fields()
        .map(|field| {
            (
                field.name().to_string(),
                field.get_value(),
                field.is_visible(),
                field.is_enabled(),
                field.warning().map(str::to_string),
                field.options().map(<[String]>::to_vec),
            )
        })
        .collect()
}

#[test]
fn initial_population_keeps_persisted_selection() {
    let form = open_table_form(json!({"url": "flows.csv", "column": "flow"}));
    assert_eq!(form.phase(), FormPhase::Rendered);
    assert_eq!(form.resource("url"), Some(&flows()));
    let column = form.field("column").expect("column");
    assert_eq!(column.get_value(), json!("flow"));
    assert!(column.is_enabled());
    assert_eq!(
        column.options().map(<[String]>::to_vec),
        Some(vec!["date".to_string(), "flow".into(), "demand".into()])
    );
    let sheet = form.field("sheet_name").expect("sheet");
    assert_eq!(
        sheet.options().map(<[String]>::to_vec),
        Some(vec!["flows".to_string(), "demands".into()])
    );
    assert!(form.warnings().is_empty());
    assert!(!form.is_dirty());
}

#[test]
fn vanished_column_is_reported_once() {
    let mut form = open_table_form(json!({"url": "flows.csv", "column": "flow"}));
    let report = form
        .set_value("url", json!("flows_v2.csv"))
        .expect("edit applies");

    assert_eq!(report.warnings.len(), 1, "{:?}", report.warnings);
    let warning = report.warnings_for("column").next().expect("column warning");
    assert!(warning.contains("'flow'"), "{warning}");
    assert!(warning.contains("Column"), "{warning}");

    let column = form.field("column").expect("column");
    assert_eq!(column.get_value(), Value::Null);
    assert_eq!(column.warning(), Some(warning));
    assert!(column.is_enabled());
    assert_eq!(form.phase(), FormPhase::Rendered);
    assert!(form.set_value("column", json!("demand")).is_ok());
}

#[test]
fn repeating_an_edit_converges_to_the_same_state() {
    let mut form = open_table_form(json!({"url": "flows.csv", "column": "flow"}));
    form.set_value("url", json!("flows_v2.csv")).expect("first edit");
    let first = snapshot(&form);

    let report = form.set_value("url", json!("flows_v2.csv")).expect("second edit");
    assert!(report.warnings.is_empty());
    assert_eq!(snapshot(&form), first);

    form.trigger("url").expect("trigger");
    assert_eq!(snapshot(&form), first);
}

#[test]
fn option_cycle_processes_each_listener_once() {
    let mut form = open_table_form(json!({"url": "flows.csv"}));
    let report = form
        .set_value("sheet_name", json!("demands"))
        .expect("sheet edit");
    assert_eq!(report.touched, vec!["url".to_string(), "column".to_string()]);
    assert_eq!(form.value("sheet_name"), Some(json!("demands")));
    assert!(report.errors.is_empty());
}

#[test]
fn failed_load_disables_consumers_but_not_options() {
    let mut form = open_table_form(json!({"url": "flows.csv", "column": "flow"}));
    let report = form.set_value("url", json!("missing.csv")).expect("edit");

    assert_eq!(report.errors.len(), 1);
    let (field, error) = &report.errors[0];
    assert_eq!(field, "url");
    assert!(error.contains("missing.csv"), "{error}");
    assert_eq!(form.field("url").and_then(|f| f.error()), Some(error.as_str()));
    assert!(form.resource("url").is_none());

    let column = form.field("column").expect("column");
    assert!(!column.is_enabled());
    assert!(column.warning().is_some());
    assert!(form.field("sheet_name").expect("sheet").is_enabled());

    match form.save().expect("save runs") {
        SaveOutcome::Rejected(failure) => assert_eq!(failure.field.as_deref(), Some("url")),
        other => panic!("expected rejection, got {other:?}"),
    }

    form.set_value("url", json!("flows.csv")).expect("recover");
    let column = form.field("column").expect("column");
    assert!(column.is_enabled());
    assert_eq!(column.warning(), None);
    assert!(form.field("url").and_then(|f| f.error()).is_none());
}

#[test]
fn declared_edges_toggle_visibility_and_reset() {
    let schema = FormSchema::new().section(
        SectionSchema::new("general")
            .field(FieldSpec::new("enabled", "boolean").with_default(json!(false)))
            .field(FieldSpec::new("threshold", "float").with_default(json!(1.5)))
            .edge(EdgeSpec::new(
                "enabled",
                "threshold",
                CascadeAction::ToggleVisibility {
                    when: Condition::Truthy,
                },
            ))
            .edge(EdgeSpec::new(
                "enabled",
                "threshold",
                CascadeAction::ResetToDefault {
                    when: Condition::Equals { value: json!(false) },
                },
            )),
    );
    let mut form = Form::open(
        schema,
        &json!({"enabled": false, "threshold": 4}),
        FormOptions::default(),
    )
    .expect("form opens");
    let threshold = form.field("threshold").expect("threshold");
    assert!(!threshold.is_visible());
    assert_eq!(threshold.get_value(), json!(4), "initial pass never resets");

    form.set_value("enabled", json!(true)).expect("enable");
    assert!(form.field("threshold").expect("threshold").is_visible());
    form.set_value("threshold", json!(3)).expect("edit");

    form.set_value("enabled", json!(false)).expect("disable");
    let threshold = form.field("threshold").expect("threshold");
    assert!(!threshold.is_visible());
    assert_eq!(threshold.get_value(), json!(1.5));
}

#[test]
fn registering_edge_to_unknown_field_fails() {
    let mut form = open_table_form(json!({}));
    let err = form
        .register_edge(EdgeSpec::new(
            "url",
            "nowhere",
            CascadeAction::ReloadValueSource,
        ))
        .unwrap_err();
    assert_eq!(err, FormError::UnknownField("nowhere".into()));

    let schema = FormSchema::new()
        .section(SectionSchema::new("data").field(FieldSpec::new("column", "column_select").with_source("url")));
    let err = Form::open(schema, &json!({}), options()).unwrap_err();
    assert_eq!(err, FormError::UnknownField("url".into()));
}

#[test]
fn unknown_kind_fails_at_build() {
    let schema = FormSchema::new()
        .section(SectionSchema::new("data").field(FieldSpec::new("colour", "colour_picker")));
    let err = Form::open(schema, &json!({}), FormOptions::default()).unwrap_err();
    assert!(matches!(err, FormError::UnknownKind { ref kind, .. } if kind == "colour_picker"));
}
