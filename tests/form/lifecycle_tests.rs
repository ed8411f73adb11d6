use schemaform::form::NoValues;
use schemaform::prelude::*;
use serde_json::{Value, json};

use crate::fixtures::{options, table_schema, timestepper_schema};

#[test]
fn phases_follow_build_and_render() {
    let mut form = Form::new(timestepper_schema(), FormOptions::default());
    assert_eq!(form.phase(), FormPhase::Constructed);
    let err = form.set_value("days", json!(3)).unwrap_err();
    assert!(matches!(err, FormError::InvalidPhase { phase: "constructed", .. }));

    form.build(&json!({"days": 7})).expect("fields built");
    assert_eq!(form.phase(), FormPhase::FieldsBuilt);
    assert!(!form.is_initialized());
    let report = form.set_value("days", json!(14)).expect("edit before render");
    assert!(report.touched.is_empty());
    assert!(matches!(
        form.add_section(&SectionSchema::new("extra"), &NoValues),
        Err(FormError::InvalidPhase { .. })
    ));

    form.render().expect("rendered");
    assert_eq!(form.phase(), FormPhase::Rendered);
    assert!(form.is_initialized());
    assert!(!form.is_dirty(), "edits before render are not user edits");
    assert!(matches!(form.render(), Err(FormError::InvalidPhase { .. })));
}

#[test]
fn closed_form_rejects_everything() {
    let mut form = Form::open(timestepper_schema(), &json!({"days": 7}), FormOptions::default())
        .expect("form opens");
    form.close();
    form.close();
    assert_eq!(form.phase(), FormPhase::Closed);
    assert_eq!(form.set_value("days", json!(1)), Err(FormError::Closed));
    assert_eq!(form.save(), Err(FormError::Closed));
    assert_eq!(form.trigger("days"), Err(FormError::Closed));
    assert!(form.graph().is_empty());
    assert!(form.value("days").is_none());
}

#[test]
fn unknown_field_edit_is_an_error() {
    let mut form = Form::open(timestepper_schema(), &NoValues, FormOptions::default())
        .expect("form opens");
    assert_eq!(
        form.set_value("weeks", json!(2)),
        Err(FormError::UnknownField("weeks".into()))
    );
}

#[test]
fn dirty_tracking_follows_edits_and_saves() {
    let mut form = Form::open(
        timestepper_schema(),
        &json!({"days": 7}),
        FormOptions::default(),
    )
    .expect("form opens");
    assert!(!form.is_dirty());

    form.set_value("days", json!(7)).expect("same value");
    assert!(!form.is_dirty());

    form.set_value("days", json!(14)).expect("edit");
    assert!(form.is_dirty());
    assert!(form.field("days").is_some_and(|field| field.is_dirty()));

    assert!(form.save().expect("save runs").is_saved());
    assert!(!form.is_dirty());
    assert_eq!(form.phase(), FormPhase::Saved);
}

#[test]
fn reset_field_restores_default() {
    let mut form = Form::open(
        timestepper_schema(),
        &json!({"days": 7, "time_delta": 7}),
        FormOptions::default(),
    )
    .expect("form opens");
    form.reset_field("time_delta").expect("reset");
    assert_eq!(form.value("time_delta"), Some(json!(1)));

    form.reset_all().expect("reset all");
    assert_eq!(form.value("days"), Some(json!(0)));
}

#[test]
fn sections_can_be_added_and_removed() {
    let mut form = Form::open(
        table_schema(),
        &json!({"url": "flows.csv"}),
        options(),
    )
    .expect("form opens");

    let extra = SectionSchema::new("aggregation")
        .with_title("Aggregation")
        .field(FieldSpec::new("agg_func", "choice").with_options(["sum", "mean"]))
        .field(
            FieldSpec::new("index", "column_select")
                .with_source("url")
                .multiple(),
        );
    let report = form
        .add_section(&extra, &json!({"agg_func": "Mean", "index": ["date", "month"]}))
        .expect("section added");
    assert!(report.warnings_for("index").next().is_some(), "{report:?}");
    assert_eq!(form.value("agg_func"), Some(json!("mean")));
    assert_eq!(form.value("index"), Some(json!(["date"])));
    assert_eq!(form.section("aggregation").map(|s| s.title()), Some("Aggregation"));
    assert!(form.is_dirty());

    assert_eq!(
        form.add_section(&extra, &NoValues).unwrap_err(),
        FormError::DuplicateSection("aggregation".into())
    );

    let edges_before = form.graph().len();
    let removed = form.remove_section("aggregation").expect("section removed");
    assert_eq!(removed.len(), 2);
    assert!(form.graph().len() < edges_before);
    assert!(!form.contains_field("index"));

    let report = form.set_value("url", json!("flows_v2.csv")).expect("edit");
    assert!(report.touched.iter().all(|name| name != "index"));
    assert_eq!(
        form.remove_section("aggregation").unwrap_err(),
        FormError::UnknownSection("aggregation".into())
    );
}

#[test]
fn malformed_values_never_fail_opening() {
    let kinds = schemaform::form::kinds::ALL;
    let garbage = [
        json!(null),
        json!(true),
        json!(-3.5),
        json!("not a value"),
        json!([1, "two", null, {"three": 3}]),
        json!({"x": [1], "y": "oops"}),
    ];
    for raw in garbage {
        let mut section = SectionSchema::new("everything");
        let mut values = serde_json::Map::new();
        for kind in kinds {
            let name = format!("field_{kind}");
            let spec = match *kind {
                "source_select" => FieldSpec::new(&name, *kind).with_group("a", Vec::<String>::new()),
                "column_select" | "index_select" | "table_select" => {
                    FieldSpec::new(&name, *kind).with_source("field_file")
                }
                _ => FieldSpec::new(&name, *kind),
            };
            section = section.field(spec);
            values.insert(name, raw.clone());
        }
        let form = Form::open(
            FormSchema::new().section(section),
            &values,
            options(),
        )
        .unwrap_or_else(|err| panic!("opening with {raw} failed: {err}"));
        assert_eq!(form.phase(), FormPhase::Rendered);
        let _ = form.validate();
    }
}

#[test]
fn schema_title_and_warnings_are_exposed() {
    let form = Form::open(
        table_schema(),
        &json!({"url": 42}),
        options(),
    )
    .expect("form opens");
    assert_eq!(form.title(), Some("Inflow"));
    let warnings = form.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].0, "url");
    assert_eq!(form.value("url"), Some(Value::Null));
}
