use schemaform::prelude::*;
use schemaform::form::Section;
use serde_json::{Value, json};

fn parameter_schema() -> FormSchema {
    FormSchema::new()
        .section(
            SectionSchema::new("general")
                .field(FieldSpec::new("name", "text"))
                .field(FieldSpec::new("type", "type_select")),
        )
        .with_variants(
            VariantSet::new("type")
                .variant(
                    "constant",
                    vec![
                        SectionSchema::new("constant")
                            .field(FieldSpec::new("comment", "text").shared())
                            .field(FieldSpec::new("value", "float").with_default(json!(0))),
                    ],
                )
                .variant(
                    "monthly",
                    vec![
                        SectionSchema::new("monthly")
                            .field(FieldSpec::new("comment", "text").shared())
                            .field(FieldSpec::new("values", "number_list"))
                            .field(FieldSpec::new("scale", "float").with_default(json!(1))),
                    ],
                ),
        )
}

fn open(values: Value) -> Form {
    Form::open(parameter_schema(), &values, FormOptions::default()).expect("form opens")
}

#[test]
fn selected_variant_builds_its_sections() {
    let form = open(json!({"name": "demand", "type": "monthly", "values": [1, 2]}));
    assert_eq!(form.active_variant(), Some("monthly"));
    assert!(form.section("monthly").is_some_and(Section::is_dynamic));
    assert!(form.section("constant").is_none());
    assert_eq!(form.value("values"), Some(json!([1, 2])));
    assert_eq!(
        form.field("type").and_then(|field| field.options().map(<[String]>::to_vec)),
        Some(vec!["constant".to_string(), "monthly".into()])
    );
}

#[test]
fn swapping_type_keeps_shared_fields_only() {
    let mut form = open(json!({
        "name": "demand",
        "type": "constant",
        "comment": "baseline",
        "value": 5
    }));
    assert_eq!(form.active_variant(), Some("constant"));

    let report = form.set_value("type", json!("monthly")).expect("swap");
    let swap = report.swapped.expect("sections swapped");
    assert_eq!(swap.from.as_deref(), Some("constant"));
    assert_eq!(swap.to.as_deref(), Some("monthly"));

    assert_eq!(form.value("name"), Some(json!("demand")));
    assert_eq!(form.value("comment"), Some(json!("baseline")));
    assert_eq!(form.value("scale"), Some(json!(1)));
    assert!(!form.contains_field("value"));
    assert!(form.is_dirty());

    form.set_value("type", json!("constant")).expect("swap back");
    assert_eq!(form.value("value"), Some(json!(0)), "non-shared fields start over");
    assert_eq!(form.value("comment"), Some(json!("baseline")));
    assert!(!form.contains_field("scale"));

    let output = form.save().expect("save runs").into_result().expect("saved");
    assert_eq!(
        Value::Object(output),
        json!({"name": "demand", "type": "constant", "comment": "baseline"})
    );
}

#[test]
fn selecting_the_active_type_does_not_rebuild() {
    let mut form = open(json!({"type": "constant", "value": 5}));
    let report = form.set_value("type", json!("constant")).expect("edit");
    assert!(report.swapped.is_none());
    assert_eq!(form.value("value"), Some(json!(5)));
}

#[test]
fn reset_all_returns_to_first_variant() {
    let mut form = open(json!({"name": "demand", "type": "monthly", "scale": 2}));
    form.reset_all().expect("reset");
    assert_eq!(form.active_variant(), Some("constant"));
    assert_eq!(form.value("name"), Some(Value::Null));
    assert_eq!(form.value("value"), Some(json!(0)));
}

#[test]
fn variant_redeclaring_a_static_field_is_rejected() {
    let schema = FormSchema::new()
        .section(
            SectionSchema::new("general")
                .field(FieldSpec::new("name", "text"))
                .field(FieldSpec::new("type", "type_select")),
        )
        .with_variants(VariantSet::new("type").variant(
            "broken",
            vec![SectionSchema::new("broken").field(FieldSpec::new("name", "text"))],
        ));
    let err = Form::open(schema, &json!({}), FormOptions::default()).unwrap_err();
    assert_eq!(err, FormError::DuplicateField("name".into()));
}

fn flagged_schema() -> FormSchema {
    FormSchema::new()
        .section(
            SectionSchema::new("general")
                .field(FieldSpec::new("flag", "boolean").with_default(json!(true)))
                .field(FieldSpec::new("type", "type_select")),
        )
        .with_variants(
            VariantSet::new("type")
                .variant(
                    "constant",
                    vec![SectionSchema::new("constant").field(FieldSpec::new("value", "float"))],
                )
                .variant(
                    "monthly",
                    vec![
                        SectionSchema::new("monthly").field(
                            FieldSpec::new("scale", "float")
                                .with_default(json!(1))
                                .with_value(json!(9)),
                        ),
                    ],
                ),
        )
        .edge(EdgeSpec::new("flag", "scale", scale_toggle()))
}

fn scale_toggle() -> CascadeAction {
    CascadeAction::ToggleVisibility {
        when: Condition::truthy(),
    }
}

#[test]
fn swapped_in_fields_ignore_persisted_schema_values() {
    let mut form = Form::open(flagged_schema(), &json!({"type": "monthly"}), FormOptions::default())
        .expect("form opens");
    assert_eq!(form.value("scale"), Some(json!(9)));

    form.set_value("type", json!("constant")).expect("swap");
    form.set_value("type", json!("monthly")).expect("swap back");
    assert_eq!(form.value("scale"), Some(json!(1)));
}

#[test]
fn form_edges_into_a_variant_survive_swaps() {
    let mut form = Form::open(flagged_schema(), &json!({"type": "monthly"}), FormOptions::default())
        .expect("form opens");
    assert!(form.graph().has_edge("flag", "scale", &scale_toggle()));

    form.set_value("type", json!("constant")).expect("swap");
    assert!(form.graph().is_empty());
    form.set_value("type", json!("monthly")).expect("swap back");
    assert!(form.graph().has_edge("flag", "scale", &scale_toggle()));

    form.set_value("flag", json!(false)).expect("clear flag");
    assert!(!form.field("scale").expect("scale").is_visible());
}

#[test]
fn form_edge_into_an_inactive_variant_waits_for_it() {
    let mut form = Form::open(
        flagged_schema(),
        &json!({"type": "constant", "flag": false}),
        FormOptions::default(),
    )
    .expect("form opens");
    assert!(form.graph().is_empty());

    form.set_value("type", json!("monthly")).expect("swap");
    assert!(!form.field("scale").expect("scale").is_visible());
    form.set_value("flag", json!(true)).expect("set flag");
    assert!(form.field("scale").expect("scale").is_visible());
}
