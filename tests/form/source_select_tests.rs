use schemaform::prelude::*;
use serde_json::{Value, json};

use crate::fixtures::{options, parameter_schema};

const VALUE_GROUP: &[&str] = &["value"];
const TABLE_GROUP: &[&str] = &["url", "column"];

fn active(form: &Form, names: &[&str]) -> Vec<bool> {
    names
        .iter()
        .map(|name| form.field(name).is_some_and(|field| field.is_active()))
        .collect()
}

fn assert_only_group_active(form: &Form, group: &str) {
    let (selected, other) = match group {
        "value" => (VALUE_GROUP, TABLE_GROUP),
        _ => (TABLE_GROUP, VALUE_GROUP),
    };
    assert!(
        active(form, other).iter().all(|active| !active),
        "fields outside '{group}' must be inactive"
    );
    assert!(
        form.field(selected[0]).is_some_and(|field| field.is_visible()),
        "first member of '{group}' must be shown"
    );
}

#[test]
fn choice_is_inferred_from_provided_values() {
    let form = Form::open(
        parameter_schema(),
        &json!({"url": "flows.csv", "column": "flow"}),
        options(),
    )
    .expect("form opens");
    assert_eq!(form.value("source"), Some(json!("table")));
    assert_only_group_active(&form, "table");
    assert_eq!(form.value("column"), Some(json!("flow")));

    let output = form.validate().expect("valid");
    assert_eq!(output.get("url"), Some(&json!("flows.csv")));
    assert_eq!(output.get("column"), Some(&json!("flow")));
    assert!(!output.contains_key("source"), "selector is ui only");
    assert!(!output.contains_key("value"));
}

#[test]
fn first_group_is_selected_without_values() {
    let form = Form::open(parameter_schema(), &json!({}), options()).expect("form opens");
    assert_eq!(form.value("source"), Some(json!("value")));
    assert_only_group_active(&form, "value");
}

#[test]
fn inference_can_be_disabled() {
    let form = Form::open(
        parameter_schema(),
        &json!({"url": "flows.csv"}),
        options().with_infer_source_choice(false),
    )
    .expect("form opens");
    assert_eq!(form.value("source"), Some(json!("value")));
    assert_eq!(form.value("url"), Some(json!("flows.csv")), "hidden value is kept");
}

#[test]
fn switching_source_resets_the_other_group() {
    let mut form = Form::open(
        parameter_schema(),
        &json!({"url": "flows.csv", "column": "flow"}),
        options(),
    )
    .expect("form opens");

    form.set_value("source", json!("value")).expect("switch to value");
    assert_only_group_active(&form, "value");
    assert_eq!(form.value("url"), Some(Value::Null));
    assert_eq!(form.value("column"), Some(Value::Null));
    assert!(form.resource("url").is_none());

    form.set_value("value", json!(2.5)).expect("edit value");
    form.set_value("source", json!("table")).expect("switch to table");
    assert_only_group_active(&form, "table");
    assert_eq!(form.value("value"), Some(json!(0)), "value group reset");

    let column = form.field("column").expect("column");
    assert!(column.is_visible());
    assert!(!column.is_enabled(), "no table is loaded yet");

    form.set_value("url", json!("flows.csv")).expect("pick file");
    assert!(form.field("column").is_some_and(|field| field.is_active()));
}

#[test]
fn never_more_than_one_group_active() {
    let mut form = Form::open(
        parameter_schema(),
        &json!({"url": "flows.csv", "column": "flow"}),
        options(),
    )
    .expect("form opens");
    for choice in ["value", "table", "table", "value", "table"] {
        form.set_value("source", json!(choice)).expect("switch");
        let value_active = active(&form, VALUE_GROUP).iter().any(|active| *active);
        let table_active = active(&form, TABLE_GROUP).iter().any(|active| *active);
        assert!(!(value_active && table_active), "both groups active after '{choice}'");
    }
}
