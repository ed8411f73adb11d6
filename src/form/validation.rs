use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::{FieldSpec, Rule, RuleViolation};

use super::{
    error::{FailureScope, ValidationFailure},
    field::convert::same_value,
    section::Section,
    state::Form,
};

/// Validates the form and assembles its output dictionary.
///
/// Runs, stopping at the first failure:
/// 1. every active field in declaration order;
/// 2. section rules, then form rules;
/// 3. section filters, followed by default suppression.
///
/// Sections are merged in declaration order, so when two sections emit the
/// same key the later one wins. Nothing on the form is modified.
pub fn validate(form: &Form) -> Result<Map<String, Value>, ValidationFailure> {
    for section in form.sections.values() {
        for field in section.fields.values().filter(|field| field.is_active()) {
            field
                .validate()
                .map_err(|message| ValidationFailure::field(field.name(), field.label(), message))?;
        }
    }

    let mut all_values = Map::new();
    for section in form.sections.values() {
        let values = section.active_values();
        check_rules(form, &section.rules, &values, FailureScope::Section(section.name.clone()))?;
        all_values.extend(values);
    }
    check_rules(form, &form.schema.rules, &all_values, FailureScope::Form)?;

    let mut output = Map::new();
    for section in form.sections.values() {
        let values = section
            .filters
            .iter()
            .fold(section.output_values(), |values, filter| filter.apply(values));
        for (key, value) in values {
            if form.options.suppress_defaults && equals_default(section, &key, &value) {
                continue;
            }
            if output.contains_key(&key) {
                warn!(key = %key, section = %section.name, "output key overwritten by a later section");
            }
            output.insert(key, value);
        }
    }
    Ok(output)
}

fn check_rules(
    form: &Form,
    rules: &[Rule],
    values: &Map<String, Value>,
    scope: FailureScope,
) -> Result<(), ValidationFailure> {
    for rule in rules {
        rule.evaluate(values)
            .map_err(|violation| failure(form, violation, scope.clone()))?;
    }
    Ok(())
}

fn failure(form: &Form, violation: RuleViolation, scope: FailureScope) -> ValidationFailure {
    let label = violation
        .field
        .as_deref()
        .and_then(|name| form.field(name))
        .map(|field| field.label().to_string());
    ValidationFailure {
        field: violation.field,
        label,
        message: violation.message,
        scope,
    }
}

/// Keys introduced by filters have no spec and are always kept.
fn equals_default(section: &Section, key: &str, value: &Value) -> bool {
    section
        .field(key)
        .map(|field| field.spec())
        .is_some_and(|spec: &FieldSpec| same_value(value, &spec.default_value()))
}
